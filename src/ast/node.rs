//! Node variants and their small attribute types.

use super::NodeId;
use crate::token::TokenKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shader stage a named scope belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    pub const ALL: [Stage; 2] = [Stage::Vertex, Stage::Fragment];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vertex" | "vert" => Ok(Stage::Vertex),
            "fragment" | "frag" => Ok(Stage::Fragment),
            other => Err(format!("unknown stage '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Multiply,
    Divide,
    Mod,
    Add,
    Subtract,
    And,
    Or,
    Not,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::OpMultiply => BinaryOperator::Multiply,
            TokenKind::OpDivide => BinaryOperator::Divide,
            TokenKind::OpMod => BinaryOperator::Mod,
            TokenKind::OpAdd => BinaryOperator::Add,
            TokenKind::OpSubtract => BinaryOperator::Subtract,
            TokenKind::OpAnd => BinaryOperator::And,
            TokenKind::OpOr => BinaryOperator::Or,
            TokenKind::OpNot => BinaryOperator::Not,
            TokenKind::OpEqual => BinaryOperator::Equal,
            TokenKind::OpNotEqual => BinaryOperator::NotEqual,
            TokenKind::OpLess => BinaryOperator::Less,
            TokenKind::OpLessEqual => BinaryOperator::LessEqual,
            TokenKind::OpGreater => BinaryOperator::Greater,
            TokenKind::OpGreaterEqual => BinaryOperator::GreaterEqual,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::Not => "!",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
        }
    }
}

/// Storage qualifier of a `layout(...)` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutKind {
    In,
    Out,
    Uniform,
    ReadOnly,
}

impl LayoutKind {
    pub fn keyword(self) -> &'static str {
        match self {
            LayoutKind::In => "in",
            LayoutKind::Out => "out",
            LayoutKind::Uniform => "uniform",
            LayoutKind::ReadOnly => "readonly",
        }
    }
}

/// Direction of a function argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    In,
    Out,
}

/// Built-in declaration types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    Float,
    Float2,
    Float3,
    Float4,
    Int,
    Int2,
    Int3,
    Int4,
    Mat3,
    Mat4,
    Bool,
    Void,
    Sampler2D,
    Sampler,
    Texture2D,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 15] = [
        PrimitiveType::Float,
        PrimitiveType::Float2,
        PrimitiveType::Float3,
        PrimitiveType::Float4,
        PrimitiveType::Int,
        PrimitiveType::Int2,
        PrimitiveType::Int3,
        PrimitiveType::Int4,
        PrimitiveType::Mat3,
        PrimitiveType::Mat4,
        PrimitiveType::Bool,
        PrimitiveType::Void,
        PrimitiveType::Sampler2D,
        PrimitiveType::Sampler,
        PrimitiveType::Texture2D,
    ];

    pub fn from_source_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.source_name() == name)
    }

    /// Spelling in GLSL.
    pub fn glsl_name(self) -> &'static str {
        match self {
            PrimitiveType::Float2 => "vec2",
            PrimitiveType::Float3 => "vec3",
            PrimitiveType::Float4 => "vec4",
            PrimitiveType::Int2 => "ivec2",
            PrimitiveType::Int3 => "ivec3",
            PrimitiveType::Int4 => "ivec4",
            other => other.source_name(),
        }
    }

    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::TypeFloat => PrimitiveType::Float,
            TokenKind::TypeFloat2 => PrimitiveType::Float2,
            TokenKind::TypeFloat3 => PrimitiveType::Float3,
            TokenKind::TypeFloat4 => PrimitiveType::Float4,
            TokenKind::TypeInt => PrimitiveType::Int,
            TokenKind::TypeInt2 => PrimitiveType::Int2,
            TokenKind::TypeInt3 => PrimitiveType::Int3,
            TokenKind::TypeInt4 => PrimitiveType::Int4,
            TokenKind::TypeMat3 => PrimitiveType::Mat3,
            TokenKind::TypeMat4 => PrimitiveType::Mat4,
            TokenKind::TypeBoolean => PrimitiveType::Bool,
            TokenKind::TypeVoid => PrimitiveType::Void,
            TokenKind::TypeSampler2D => PrimitiveType::Sampler2D,
            TokenKind::TypeSampler => PrimitiveType::Sampler,
            TokenKind::TypeTexture2D => PrimitiveType::Texture2D,
            _ => return None,
        })
    }

    /// Spelling in shader source.
    pub fn source_name(self) -> &'static str {
        match self {
            PrimitiveType::Float => "float",
            PrimitiveType::Float2 => "float2",
            PrimitiveType::Float3 => "float3",
            PrimitiveType::Float4 => "float4",
            PrimitiveType::Int => "int",
            PrimitiveType::Int2 => "int2",
            PrimitiveType::Int3 => "int3",
            PrimitiveType::Int4 => "int4",
            PrimitiveType::Mat3 => "mat3",
            PrimitiveType::Mat4 => "mat4",
            PrimitiveType::Bool => "bool",
            PrimitiveType::Void => "void",
            PrimitiveType::Sampler2D => "sampler2D",
            PrimitiveType::Sampler => "sampler",
            PrimitiveType::Texture2D => "texture2D",
        }
    }

    /// Size of one element in bytes, if the type has a layout size.
    pub fn element_size(self) -> Option<u64> {
        match self {
            PrimitiveType::Float | PrimitiveType::Int => Some(4),
            PrimitiveType::Float2 | PrimitiveType::Int2 => Some(8),
            PrimitiveType::Float3 | PrimitiveType::Int3 => Some(12),
            PrimitiveType::Float4 | PrimitiveType::Int4 => Some(16),
            PrimitiveType::Mat3 => Some(36),
            PrimitiveType::Mat4 => Some(64),
            PrimitiveType::Bool
            | PrimitiveType::Void
            | PrimitiveType::Sampler2D
            | PrimitiveType::Sampler
            | PrimitiveType::Texture2D => None,
        }
    }
}

/// One `key` or `key = value` entry of a layout or push tag list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    /// Empty when the tag has no value.
    pub value: String,
}

/// Prefix marking tags that steer the generator and are not emitted.
pub const HINT_PREFIX: char = '$';

/// Hint tag that requests the `flat` interpolation qualifier.
pub const FLAT_HINT: &str = "$flat";

#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationType {
    Primitive(PrimitiveType),
    /// A user struct. `binding` is filled in by reference binding and points at
    /// the struct node; it does not own it.
    Struct {
        struct_name: String,
        binding: Option<NodeId>,
    },
    /// `name { members }`: an anonymous interface block.
    Block { members: Vec<NodeId> },
    /// `buffer name { members }`.
    Buffer { members: Vec<NodeId> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub ty: DeclarationType,
    /// Empty for unnamed declarations such as function return types.
    pub name: String,
    /// `1` for a scalar, `N` for `[N]`, `-1` for an unsized `[]`.
    pub count: i32,
}

impl Declaration {
    pub const UNSIZED: i32 = -1;

    pub fn is_unsized(&self) -> bool {
        self.count == Self::UNSIZED
    }

    /// Type name as written in source.
    pub fn type_name(&self) -> String {
        match &self.ty {
            DeclarationType::Primitive(p) => p.source_name().to_string(),
            DeclarationType::Struct { struct_name, .. } => struct_name.clone(),
            DeclarationType::Block { .. } => format!("_block_{}", self.name),
            DeclarationType::Buffer { .. } => "buffer".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Module {
        statements: Vec<NodeId>,
    },
    Scope {
        statements: Vec<NodeId>,
    },
    NamedScope {
        stage: Stage,
        scope: NodeId,
    },
    Struct {
        name: String,
        members: Vec<NodeId>,
    },
    Declaration(Declaration),
    Function {
        return_declaration: NodeId,
        name: String,
        arguments: Vec<NodeId>,
        body: NodeId,
    },
    FunctionArgument {
        direction: Direction,
        declaration: NodeId,
    },
    BinaryOp {
        op: BinaryOperator,
        left: NodeId,
        right: NodeId,
    },
    Assign {
        target: NodeId,
        value: NodeId,
    },
    Access {
        left: NodeId,
        right: NodeId,
    },
    Index {
        target: NodeId,
        index: NodeId,
    },
    Call {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    Identifier(String),
    IntLiteral(i32),
    FloatLiteral(f32),
    BoolLiteral(bool),
    Increment {
        target: NodeId,
        prefix: bool,
    },
    Decrement {
        target: NodeId,
        prefix: bool,
    },
    Negate(NodeId),
    Precedence(NodeId),
    Discard,
    If {
        condition: NodeId,
        then_scope: NodeId,
        else_branch: Option<NodeId>,
    },
    For {
        init: NodeId,
        condition: NodeId,
        update: NodeId,
        body: NodeId,
    },
    Layout {
        kind: LayoutKind,
        tags: Vec<Tag>,
        declaration: NodeId,
    },
    PushConstant {
        tags: Vec<Tag>,
        members: Vec<NodeId>,
    },
    Define {
        name: String,
        value: NodeId,
    },
    Include {
        /// File the include statement was written in.
        source_file: String,
        /// Path as written between the quotes.
        target: String,
    },
    Conditional {
        condition: NodeId,
        if_true: NodeId,
        if_false: NodeId,
    },
    Return(NodeId),
    ArrayLiteral(Vec<NodeId>),
    Const(NodeId),
    NoOp,
}

impl Node {
    /// Variant name, used for snapshots, logs and errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Module { .. } => "Module",
            Node::Scope { .. } => "Scope",
            Node::NamedScope { .. } => "NamedScope",
            Node::Struct { .. } => "Struct",
            Node::Declaration(decl) => match decl.ty {
                DeclarationType::Primitive(_) => "Declaration",
                DeclarationType::Struct { .. } => "StructDeclaration",
                DeclarationType::Block { .. } => "BlockDeclaration",
                DeclarationType::Buffer { .. } => "BufferDeclaration",
            },
            Node::Function { .. } => "Function",
            Node::FunctionArgument { .. } => "FunctionArgument",
            Node::BinaryOp { .. } => "BinaryOp",
            Node::Assign { .. } => "Assign",
            Node::Access { .. } => "Access",
            Node::Index { .. } => "Index",
            Node::Call { .. } => "Call",
            Node::Identifier(_) => "Identifier",
            Node::IntLiteral(_) => "IntLiteral",
            Node::FloatLiteral(_) => "FloatLiteral",
            Node::BoolLiteral(_) => "BoolLiteral",
            Node::Increment { .. } => "Increment",
            Node::Decrement { .. } => "Decrement",
            Node::Negate(_) => "Negate",
            Node::Precedence(_) => "Precedence",
            Node::Discard => "Discard",
            Node::If { .. } => "If",
            Node::For { .. } => "For",
            Node::Layout { .. } => "Layout",
            Node::PushConstant { .. } => "PushConstant",
            Node::Define { .. } => "Define",
            Node::Include { .. } => "Include",
            Node::Conditional { .. } => "Conditional",
            Node::Return(_) => "Return",
            Node::ArrayLiteral(_) => "ArrayLiteral",
            Node::Const(_) => "Const",
            Node::NoOp => "NoOp",
        }
    }

    /// Discriminant folded into the structural hash.
    pub(crate) fn discriminant(&self) -> u64 {
        match self {
            Node::Module { .. } => 0,
            Node::Scope { .. } => 1,
            Node::NamedScope { .. } => 2,
            Node::Struct { .. } => 3,
            Node::Declaration(_) => 4,
            Node::Function { .. } => 5,
            Node::FunctionArgument { .. } => 6,
            Node::BinaryOp { .. } => 7,
            Node::Assign { .. } => 8,
            Node::Access { .. } => 9,
            Node::Index { .. } => 10,
            Node::Call { .. } => 11,
            Node::Identifier(_) => 12,
            Node::IntLiteral(_) => 13,
            Node::FloatLiteral(_) => 14,
            Node::BoolLiteral(_) => 15,
            Node::Increment { .. } => 16,
            Node::Decrement { .. } => 17,
            Node::Negate(_) => 18,
            Node::Precedence(_) => 19,
            Node::Discard => 20,
            Node::If { .. } => 21,
            Node::For { .. } => 22,
            Node::Layout { .. } => 23,
            Node::PushConstant { .. } => 24,
            Node::Define { .. } => 25,
            Node::Include { .. } => 26,
            Node::Conditional { .. } => 27,
            Node::Return(_) => 28,
            Node::ArrayLiteral(_) => 29,
            Node::Const(_) => 30,
            Node::NoOp => 31,
        }
    }

    /// Child nodes in source order. A bound struct declaration lists its struct.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Node::Module { statements } | Node::Scope { statements } => statements.clone(),
            Node::NamedScope { scope, .. } => vec![*scope],
            Node::Struct { members, .. } => members.clone(),
            Node::Declaration(decl) => match &decl.ty {
                DeclarationType::Primitive(_) => Vec::new(),
                DeclarationType::Struct { binding, .. } => binding.iter().copied().collect(),
                DeclarationType::Block { members } | DeclarationType::Buffer { members } => {
                    members.clone()
                }
            },
            Node::Function {
                return_declaration,
                arguments,
                body,
                ..
            } => {
                let mut children = vec![*return_declaration];
                children.extend(arguments.iter().copied());
                children.push(*body);
                children
            }
            Node::FunctionArgument { declaration, .. } => vec![*declaration],
            Node::BinaryOp { left, right, .. } | Node::Access { left, right } => {
                vec![*left, *right]
            }
            Node::Assign { target, value } => vec![*target, *value],
            Node::Index { target, index } => vec![*target, *index],
            Node::Call { callee, arguments } => {
                let mut children = vec![*callee];
                children.extend(arguments.iter().copied());
                children
            }
            Node::Increment { target, .. }
            | Node::Decrement { target, .. }
            | Node::Negate(target)
            | Node::Precedence(target)
            | Node::Return(target)
            | Node::Const(target) => vec![*target],
            Node::If {
                condition,
                then_scope,
                else_branch,
            } => {
                let mut children = vec![*condition, *then_scope];
                children.extend(else_branch.iter().copied());
                children
            }
            Node::For {
                init,
                condition,
                update,
                body,
            } => vec![*init, *condition, *update, *body],
            Node::Layout { declaration, .. } => vec![*declaration],
            Node::PushConstant { members, .. } => members.clone(),
            Node::Define { value, .. } => vec![*value],
            Node::Conditional {
                condition,
                if_true,
                if_false,
            } => vec![*condition, *if_true, *if_false],
            Node::ArrayLiteral(items) => items.clone(),
            Node::Identifier(_)
            | Node::IntLiteral(_)
            | Node::FloatLiteral(_)
            | Node::BoolLiteral(_)
            | Node::Discard
            | Node::Include { .. }
            | Node::NoOp => Vec::new(),
        }
    }
    /// Replace every owned child id with `f(child)`. Struct bindings are
    /// references, not children, and are left alone.
    pub fn replace_children(&mut self, mut f: impl FnMut(NodeId) -> NodeId) {
        match self {
            Node::Module { statements } | Node::Scope { statements } => {
                statements.iter_mut().for_each(|id| *id = f(*id))
            }
            Node::Struct { members, .. } | Node::PushConstant { members, .. } => {
                members.iter_mut().for_each(|id| *id = f(*id))
            }
            Node::Declaration(decl) => match &mut decl.ty {
                DeclarationType::Block { members } | DeclarationType::Buffer { members } => {
                    members.iter_mut().for_each(|id| *id = f(*id))
                }
                DeclarationType::Primitive(_) | DeclarationType::Struct { .. } => {}
            },
            Node::ArrayLiteral(items) => items.iter_mut().for_each(|id| *id = f(*id)),
            Node::Function {
                return_declaration,
                arguments,
                body,
                ..
            } => {
                *return_declaration = f(*return_declaration);
                arguments.iter_mut().for_each(|id| *id = f(*id));
                *body = f(*body);
            }
            Node::Call { callee, arguments } => {
                *callee = f(*callee);
                arguments.iter_mut().for_each(|id| *id = f(*id));
            }
            Node::NamedScope { scope: target, .. }
            | Node::FunctionArgument {
                declaration: target,
                ..
            }
            | Node::Layout {
                declaration: target,
                ..
            }
            | Node::Define { value: target, .. }
            | Node::Increment { target, .. }
            | Node::Decrement { target, .. }
            | Node::Negate(target)
            | Node::Precedence(target)
            | Node::Return(target)
            | Node::Const(target) => *target = f(*target),
            Node::BinaryOp { left, right, .. } | Node::Access { left, right } => {
                *left = f(*left);
                *right = f(*right);
            }
            Node::Assign { target, value } => {
                *target = f(*target);
                *value = f(*value);
            }
            Node::Index { target, index } => {
                *target = f(*target);
                *index = f(*index);
            }
            Node::If {
                condition,
                then_scope,
                else_branch,
            } => {
                *condition = f(*condition);
                *then_scope = f(*then_scope);
                if let Some(otherwise) = else_branch {
                    *otherwise = f(*otherwise);
                }
            }
            Node::For {
                init,
                condition,
                update,
                body,
            } => {
                *init = f(*init);
                *condition = f(*condition);
                *update = f(*update);
                *body = f(*body);
            }
            Node::Conditional {
                condition,
                if_true,
                if_false,
            } => {
                *condition = f(*condition);
                *if_true = f(*if_true);
                *if_false = f(*if_false);
            }
            Node::Identifier(_)
            | Node::IntLiteral(_)
            | Node::FloatLiteral(_)
            | Node::BoolLiteral(_)
            | Node::Discard
            | Node::Include { .. }
            | Node::NoOp => {}
        }
    }
}
