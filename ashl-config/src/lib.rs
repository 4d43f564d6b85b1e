//! Layered configuration for ashl.
//!
//! Sources, from lowest to highest precedence:
//!
//!     defaults/ashl.default.toml   embedded into every binary
//!     <shader dir>/ashl.toml       project file, optional
//!     --config FILE                explicit file, must exist
//!     --profile PRESET             command-line preset
//!
//! The language profile is a preset name plus optional switches; a switch set
//! in any file applies on top of whichever preset wins.

use ashl::{LanguageProfile, Stage};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/ashl.default.toml");

/// File name looked up next to the shader being compiled.
pub const PROJECT_FILE: &str = "ashl.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AshlConfig {
    pub profile: ProfileConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfilePreset {
    Extended,
    Core,
}

impl ProfilePreset {
    pub fn name(self) -> &'static str {
        match self {
            ProfilePreset::Extended => "extended",
            ProfilePreset::Core => "core",
        }
    }

    pub fn profile(self) -> LanguageProfile {
        match self {
            ProfilePreset::Extended => LanguageProfile::extended(),
            ProfilePreset::Core => LanguageProfile::core(),
        }
    }
}

impl std::str::FromStr for ProfilePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "extended" => Ok(ProfilePreset::Extended),
            "core" => Ok(ProfilePreset::Core),
            other => Err(format!("unknown profile preset '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    pub preset: ProfilePreset,
    pub extended_types: Option<bool>,
    pub arithmetic_separators: Option<bool>,
    pub arrow_functions: Option<bool>,
}

impl ProfileConfig {
    /// The preset's profile with every explicitly set switch applied.
    pub fn language_profile(&self) -> LanguageProfile {
        let mut profile = self.preset.profile();
        if let Some(on) = self.extended_types {
            profile.extended_types = on;
        }
        if let Some(on) = self.arithmetic_separators {
            profile.arithmetic_separators = on;
        }
        if let Some(on) = self.arrow_functions {
            profile.arrow_functions = on;
        }
        profile
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub stages: Vec<Stage>,
    pub preamble: Vec<String>,
    pub extensions: ExtensionsConfig,
}

/// File extension per stage, used when writing stages to a directory.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionsConfig {
    pub vertex: String,
    pub fragment: String,
}

impl ExtensionsConfig {
    pub fn for_stage(&self, stage: Stage) -> &str {
        match stage {
            Stage::Vertex => &self.vertex,
            Stage::Fragment => &self.fragment,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer the `ashl.toml` sitting next to `shader`, if there is one.
    pub fn with_project_file(mut self, shader: impl AsRef<Path>) -> Self {
        let dir = shader.as_ref().parent().unwrap_or_else(|| Path::new(""));
        let source = File::from(dir.join(PROJECT_FILE))
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Force the profile preset regardless of what the files say.
    pub fn with_preset(mut self, preset: ProfilePreset) -> Result<Self, ConfigError> {
        self.builder = self.builder.set_override("profile.preset", preset.name())?;
        Ok(self)
    }

    pub fn build(self) -> Result<AshlConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
