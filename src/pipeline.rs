//! Compilation pipeline
//!
//!     [`Compiler`] runs the phases in order for one source file:
//!
//!         lex -> parse -> expand includes -> bind references -> extract stages
//!
//!     and keeps the result as a [`Compilation`]: the token stream, the arena,
//!     the expanded module and one extracted module per requested stage. GLSL is
//!     generated from a compilation on demand, or all at once through
//!     [`Compiler::compile_source`] which returns a [`CompiledShader`].
//!
//!     Every compilation owns its own arena and include set. A compiler can be
//!     reused for any number of files.

use crate::ast::{Ast, Node, NodeId, Stage};
use crate::error::{CompileError, GenerateError, SizeError};
use crate::glsl::generate_glsl;
use crate::lexer::Lexer;
use crate::loader::{FsLoader, SourceLoader};
use crate::parser::Parser;
use crate::passes::{bind_references, expand_includes};
use crate::profile::LanguageProfile;
use crate::stage::extract_stage;
use crate::token::TokenStream;
use log::{debug, info};

pub struct Compiler<L: SourceLoader = FsLoader> {
    lexer: Lexer,
    loader: L,
    preamble: Vec<String>,
    stages: Vec<Stage>,
}

impl Compiler<FsLoader> {
    /// A compiler reading from disk.
    pub fn new(profile: LanguageProfile) -> Self {
        Self::with_loader(profile, FsLoader)
    }
}

impl Default for Compiler<FsLoader> {
    fn default() -> Self {
        Self::new(LanguageProfile::default())
    }
}

impl<L: SourceLoader> Compiler<L> {
    pub fn with_loader(profile: LanguageProfile, loader: L) -> Self {
        Self {
            lexer: Lexer::new(profile),
            loader,
            preamble: Vec::new(),
            stages: Stage::ALL.to_vec(),
        }
    }

    /// Lines written at the top of every stage's GLSL, such as `#version 450`.
    pub fn with_preamble<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preamble = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Stages to extract, in output order.
    pub fn with_stages(mut self, stages: impl IntoIterator<Item = Stage>) -> Self {
        self.stages = stages.into_iter().collect();
        self
    }

    pub fn profile(&self) -> LanguageProfile {
        self.lexer.table().profile()
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Run every phase up to stage extraction on `text`.
    pub fn analyze_source(&self, file: &str, text: &str) -> Result<Compilation, CompileError> {
        let tokens = self.lexer.tokenize(file, text);

        let mut ast = Ast::new();
        let module = Parser::new(&mut ast, self.profile()).parse_module(tokens.clone())?;
        expand_includes(&mut ast, module, &self.loader, &self.lexer)?;
        bind_references(&mut ast, module);

        let stages = self
            .stages
            .iter()
            .map(|&stage| (stage, extract_stage(&mut ast, module, stage)))
            .collect();

        debug!("analyzed {} ({} nodes)", file, ast.len());
        Ok(Compilation {
            file: file.to_string(),
            tokens,
            ast,
            module,
            stages,
            preamble: self.preamble.clone(),
        })
    }

    /// Read `path` through the loader and analyze it.
    pub fn analyze_file(&self, path: &str) -> Result<Compilation, CompileError> {
        let text = self.loader.read_file(path)?;
        self.analyze_source(path, &text)
    }

    pub fn compile_source(&self, file: &str, text: &str) -> Result<CompiledShader, CompileError> {
        let shader = self.analyze_source(file, text)?.to_shader()?;
        info!("compiled {} into {} stage(s)", file, shader.stages.len());
        Ok(shader)
    }

    pub fn compile_file(&self, path: &str) -> Result<CompiledShader, CompileError> {
        let shader = self.analyze_file(path)?.to_shader()?;
        info!("compiled {} into {} stage(s)", path, shader.stages.len());
        Ok(shader)
    }
}

/// The analyzed form of one source file.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub file: String,
    /// Tokens of the root file, before include expansion.
    pub tokens: TokenStream,
    pub ast: Ast,
    /// The root module, includes expanded and references bound.
    pub module: NodeId,
    /// Extracted module per stage.
    pub stages: Vec<(Stage, NodeId)>,
    pub preamble: Vec<String>,
}

impl Compilation {
    pub fn stage_module(&self, stage: Stage) -> Option<NodeId> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, module)| *module)
    }

    /// GLSL for one stage, preamble first.
    pub fn glsl(&self, stage: Stage) -> Result<String, GenerateError> {
        let module = self
            .stage_module(stage)
            .ok_or(GenerateError::Unexpected("stage that was not extracted"))?;

        let mut out = String::new();
        for line in &self.preamble {
            out += line;
            out.push('\n');
        }
        out += &generate_glsl(&self.ast, module)?;
        Ok(out)
    }

    /// Byte size of the stage's push constant block, if it has one.
    pub fn push_constant_size(&self, stage: Stage) -> Result<Option<u64>, SizeError> {
        let Some(module) = self.stage_module(stage) else {
            return Ok(None);
        };
        self.ast
            .statements(module)
            .iter()
            .find(|&&id| matches!(self.ast[id], Node::PushConstant { .. }))
            .map(|&id| self.ast.size_of(id))
            .transpose()
    }

    /// The push block size when it can be computed. Members without a layout
    /// size (bools, samplers, unbound structs) leave it unknown.
    fn known_push_constant_size(&self, stage: Stage) -> Option<u64> {
        match self.push_constant_size(stage) {
            Ok(size) => size,
            Err(e) => {
                debug!("{} stage push constant size unknown: {}", stage, e);
                None
            }
        }
    }

    pub fn to_shader(&self) -> Result<CompiledShader, GenerateError> {
        let stages = self
            .stages
            .iter()
            .map(|&(stage, _)| {
                Ok(StageOutput {
                    stage,
                    glsl: self.glsl(stage)?,
                    push_constant_size: self.known_push_constant_size(stage),
                })
            })
            .collect::<Result<Vec<_>, GenerateError>>()?;

        Ok(CompiledShader {
            file: self.file.clone(),
            stages,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutput {
    pub stage: Stage,
    pub glsl: String,
    /// `None` without a push block, or when its size cannot be computed.
    pub push_constant_size: Option<u64>,
}

/// GLSL per stage for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledShader {
    pub file: String,
    pub stages: Vec<StageOutput>,
}

impl CompiledShader {
    pub fn stage(&self, stage: Stage) -> Option<&StageOutput> {
        self.stages.iter().find(|output| output.stage == stage)
    }

    pub fn stage_glsl(&self, stage: Stage) -> Option<&str> {
        self.stage(stage).map(|output| output.glsl.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;

    const SHADER: &str = r#"
#include "common.ash"
push(scalar) { float time; float4 tint; };
@Vertex {
    layout(location = 0) out float2 oUV;
    void main() { oUV = float2(0.0, 1.0); }
}
@Fragment {
    layout(location = 0) in float2 iUV;
    layout(location = 0) out float4 oColor;
    void main() { oColor = push.tint * scale(iUV.x); }
}
"#;

    fn compiler() -> Compiler<MemoryLoader> {
        let loader = MemoryLoader::new()
            .with_file("shaders/common.ash", "float scale(float x) -> x * 2.0;")
            .with_file("shaders/main.ash", SHADER);
        Compiler::with_loader(LanguageProfile::default(), loader).with_preamble(["#version 450"])
    }

    #[test]
    fn test_compile_file_produces_both_stages() {
        let shader = compiler().compile_file("shaders/main.ash").unwrap();
        assert_eq!(shader.stages.len(), 2);

        let vertex = shader.stage_glsl(Stage::Vertex).unwrap();
        assert!(vertex.starts_with("#version 450\nfloat scale(in float x)\n"));
        assert!(vertex.contains("layout(location = 0) out vec2 oUV;\n"));
        assert!(!vertex.contains("oColor"));

        let fragment = shader.stage(Stage::Fragment).unwrap();
        assert!(fragment.glsl.contains("\toColor = push.tint * scale( iUV.x );\n"));
        assert_eq!(fragment.push_constant_size, Some(20));
    }

    #[test]
    fn test_stage_selection() {
        let shader = compiler()
            .with_stages([Stage::Fragment])
            .compile_file("shaders/main.ash")
            .unwrap();
        assert!(shader.stage_glsl(Stage::Vertex).is_none());
        assert!(shader.stage_glsl(Stage::Fragment).is_some());
    }

    #[test]
    fn test_unsized_push_members_still_compile() {
        let shader = compiler()
            .compile_source(
                "shaders/flags.ash",
                "push() { bool enabled; float t; };\nvoid main() { }",
            )
            .unwrap();
        let vertex = shader.stage(Stage::Vertex).unwrap();
        assert_eq!(vertex.push_constant_size, None);
        assert!(vertex.glsl.contains("\tbool enabled;\n"));

        let compilation = compiler()
            .analyze_source("shaders/flags.ash", "push() { bool enabled; };")
            .unwrap();
        assert!(matches!(
            compilation.push_constant_size(Stage::Fragment),
            Err(SizeError::NoLayoutSize(_))
        ));
    }

    #[test]
    fn test_errors_are_wrapped() {
        let err = compiler().compile_source("bad.ash", "return;").unwrap_err();
        assert!(matches!(err, CompileError::Parse(_)));

        let err = compiler().compile_file("shaders/missing.ash").unwrap_err();
        assert!(matches!(err, CompileError::Load(_)));

        let err = compiler()
            .compile_source("shaders/x.ash", "#include \"nowhere.ash\"")
            .unwrap_err();
        assert!(matches!(err, CompileError::Include(_)));

        let err = compiler()
            .compile_source("shaders/x.ash", "void main() { a = !b; }")
            .unwrap_err();
        assert!(matches!(err, CompileError::Parse(_) | CompileError::Generate(_)));
    }
}
