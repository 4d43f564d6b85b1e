//! Output formats
//!
//! Each way of printing a [`Compilation`] implements [`Formatter`] and is
//! registered by name in a [`FormatRegistry`]. A format renders either the
//! whole compilation or one extracted stage:
//!
//!     glsl      every stage under a `// <stage>` banner, or one stage's GLSL
//!     tokens    the root file's token stream as JSON (whole compilation only)
//!     ast       the expanded module, or one stage module, as a JSON snapshot
//!     ast-yaml  the same snapshots as YAML

use crate::ast::{NodeId, Stage};
use crate::pipeline::Compilation;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("format '{0}' not found")]
    FormatNotFound(String),
    #[error("format '{0}' has no per-stage output")]
    NotPerStage(String),
    #[error("{0} stage was not compiled")]
    StageNotCompiled(Stage),
    #[error("serialization error: {0}")]
    SerializationError(String),
}

pub trait Formatter: Send + Sync {
    /// Name used to select this format (e.g. "glsl", "ast")
    fn name(&self) -> &str;

    fn render(&self, compilation: &Compilation) -> Result<String, FormatError>;

    /// Output for a single compiled stage.
    fn render_stage(&self, _compilation: &Compilation, _stage: Stage) -> Result<String, FormatError> {
        Err(FormatError::NotPerStage(self.name().to_string()))
    }

    /// Appended after the stage extension when a stage is written to a file,
    /// so `ast` writes `main.frag.json`.
    fn file_suffix(&self) -> Option<&str> {
        None
    }

    fn description(&self) -> &str {
        ""
    }
}

pub struct FormatRegistry {
    formatters: HashMap<String, Box<dyn Formatter>>,
}

impl FormatRegistry {
    fn register<F: Formatter + 'static>(&mut self, formatter: F) {
        self.formatters
            .insert(formatter.name().to_string(), Box::new(formatter));
    }

    pub fn with_defaults() -> Self {
        let mut registry = FormatRegistry {
            formatters: HashMap::new(),
        };
        registry.register(GlslFormatter);
        registry.register(TokensFormatter);
        registry.register(AstJsonFormatter);
        registry.register(AstYamlFormatter);
        registry
    }

    pub fn get(&self, name: &str) -> Result<&dyn Formatter, FormatError> {
        self.formatters
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    /// Render `compilation` in `format`, restricted to `stage` when one is given.
    pub fn render(
        &self,
        compilation: &Compilation,
        format: &str,
        stage: Option<Stage>,
    ) -> Result<String, FormatError> {
        let formatter = self.get(format)?;
        match stage {
            Some(stage) => formatter.render_stage(compilation, stage),
            None => formatter.render(compilation),
        }
    }

    /// Registered names, sorted.
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formatters.keys().cloned().collect();
        names.sort();
        names
    }
}

fn stage_module(compilation: &Compilation, stage: Stage) -> Result<NodeId, FormatError> {
    compilation
        .stage_module(stage)
        .ok_or(FormatError::StageNotCompiled(stage))
}

fn serialization_error(e: impl std::fmt::Display) -> FormatError {
    FormatError::SerializationError(e.to_string())
}

pub struct GlslFormatter;

impl Formatter for GlslFormatter {
    fn name(&self) -> &str {
        "glsl"
    }

    /// A `// <stage>` banner precedes each stage when there are several.
    fn render(&self, compilation: &Compilation) -> Result<String, FormatError> {
        let banners = compilation.stages.len() > 1;
        let mut out = String::new();
        for &(stage, _) in &compilation.stages {
            if banners {
                if !out.is_empty() {
                    out.push('\n');
                }
                out += &format!("// {}\n", stage);
            }
            out += &self.render_stage(compilation, stage)?;
        }
        Ok(out)
    }

    fn render_stage(&self, compilation: &Compilation, stage: Stage) -> Result<String, FormatError> {
        stage_module(compilation, stage)?;
        compilation.glsl(stage).map_err(serialization_error)
    }

    fn description(&self) -> &str {
        "Generated GLSL per stage"
    }
}

pub struct TokensFormatter;

impl Formatter for TokensFormatter {
    fn name(&self) -> &str {
        "tokens"
    }

    fn render(&self, compilation: &Compilation) -> Result<String, FormatError> {
        let tokens: Vec<_> = compilation.tokens.iter().collect();
        serde_json::to_string_pretty(&tokens).map_err(serialization_error)
    }

    fn description(&self) -> &str {
        "Token stream of the root file as JSON"
    }
}

pub struct AstJsonFormatter;

impl Formatter for AstJsonFormatter {
    fn name(&self) -> &str {
        "ast"
    }

    fn render(&self, compilation: &Compilation) -> Result<String, FormatError> {
        let snapshot = compilation.ast.snapshot(compilation.module);
        serde_json::to_string_pretty(&snapshot).map_err(serialization_error)
    }

    fn render_stage(&self, compilation: &Compilation, stage: Stage) -> Result<String, FormatError> {
        let snapshot = compilation.ast.snapshot(stage_module(compilation, stage)?);
        serde_json::to_string_pretty(&snapshot).map_err(serialization_error)
    }

    fn file_suffix(&self) -> Option<&str> {
        Some("json")
    }

    fn description(&self) -> &str {
        "Expanded module, or one stage module, as a JSON snapshot"
    }
}

pub struct AstYamlFormatter;

impl Formatter for AstYamlFormatter {
    fn name(&self) -> &str {
        "ast-yaml"
    }

    fn render(&self, compilation: &Compilation) -> Result<String, FormatError> {
        let snapshot = compilation.ast.snapshot(compilation.module);
        serde_yaml::to_string(&snapshot).map_err(serialization_error)
    }

    fn render_stage(&self, compilation: &Compilation, stage: Stage) -> Result<String, FormatError> {
        let snapshot = compilation.ast.snapshot(stage_module(compilation, stage)?);
        serde_yaml::to_string(&snapshot).map_err(serialization_error)
    }

    fn file_suffix(&self) -> Option<&str> {
        Some("yaml")
    }

    fn description(&self) -> &str {
        "Expanded module, or one stage module, as a YAML snapshot"
    }
}
