//! GLSL generation
//!
//!     A syntax-directed walk from a stage module to GLSL text. Each statement
//!     kind has a fixed layout; expressions are printed with single spaces around
//!     binary operators and inside non-empty call and grouping parentheses
//!     (`f( a , b )`, `( x )`).
//!
//!     Type names, in declarations and in identifiers alike, go through the
//!     primitive table (`float4` becomes `vec4`, `int2` becomes `ivec2`); other
//!     names are printed unchanged.
//!
//!     Named scopes are expected to be resolved by
//!     [`extract_stage`](crate::stage::extract_stage) first. Any left at module
//!     level are skipped.

use crate::ast::{
    Ast, BinaryOperator, Declaration, DeclarationType, Direction, Node, NodeId, PrimitiveType, Tag,
    FLAT_HINT, HINT_PREFIX,
};
use crate::error::GenerateError;
use log::debug;

/// GLSL text for a module.
pub fn generate_glsl(ast: &Ast, module: NodeId) -> Result<String, GenerateError> {
    GlslGenerator::new(ast).module(module, 0)
}

pub struct GlslGenerator<'a> {
    ast: &'a Ast,
}

impl<'a> GlslGenerator<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Self { ast }
    }

    pub fn module(&self, module: NodeId, depth: usize) -> Result<String, GenerateError> {
        let mut out = String::new();

        for &id in self.ast.statements(module) {
            match &self.ast[id] {
                Node::Include { target, .. } => {
                    out += &format!("{}#include \"{}\"\n", tabs(depth), target);
                }
                Node::Define { name, value } => {
                    out += &format!("{}#define {} {}\n", tabs(depth), name, self.expression(*value, 0)?);
                }
                Node::Function { .. } => out += &self.function(id, depth)?,
                Node::Layout { .. } => out += &self.layout(id, depth)?,
                Node::PushConstant { .. } => out += &self.push_constant(id, depth)?,
                Node::Struct { .. } => out += &self.struct_definition(id, depth)?,
                Node::NamedScope { stage, .. } => {
                    debug!("skipping unextracted {} scope", stage);
                }
                _ => {
                    let expression = self.expression(id, depth)?;
                    if !expression.is_empty() {
                        out += &format!("{}{};\n", tabs(depth), expression);
                    }
                }
            }
        }

        Ok(out)
    }

    fn declaration(&self, id: NodeId, depth: usize) -> Result<String, GenerateError> {
        let decl = self
            .ast
            .declaration(id)
            .ok_or(GenerateError::Unexpected(self.ast[id].kind_name()))?;

        match &decl.ty {
            DeclarationType::Block { members } => Ok(format!(
                "{} {{\n{}{}}} {}",
                decl.type_name(),
                self.members(members, depth + 1)?,
                tabs(depth),
                decl.name
            )),
            DeclarationType::Buffer { members } => Ok(format!(
                "buffer {} {{\n{}{}}}",
                decl.name,
                self.members(members, depth + 1)?,
                tabs(depth)
            )),
            _ => {
                let mut out = type_name(decl);
                if !decl.name.is_empty() {
                    out.push(' ');
                    out += &decl.name;
                }
                out += &count_suffix(decl.count);
                Ok(out)
            }
        }
    }

    /// One `declaration;` line per member at `depth`.
    fn members(&self, members: &[NodeId], depth: usize) -> Result<String, GenerateError> {
        let mut out = String::new();
        for &member in members {
            out += &format!("{}{};\n", tabs(depth), self.declaration(member, depth)?);
        }
        Ok(out)
    }

    fn function(&self, id: NodeId, depth: usize) -> Result<String, GenerateError> {
        let Node::Function {
            return_declaration,
            name,
            arguments,
            body,
        } = &self.ast[id]
        else {
            return Err(GenerateError::Unexpected(self.ast[id].kind_name()));
        };

        let arguments = arguments
            .iter()
            .map(|&argument| self.argument(argument))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(format!(
            "{indent}{} {}({})\n{indent}{}",
            self.declaration(*return_declaration, depth)?,
            name,
            arguments.join(" , "),
            self.scope(*body, depth)?,
            indent = tabs(depth),
        ))
    }

    fn argument(&self, id: NodeId) -> Result<String, GenerateError> {
        let Node::FunctionArgument {
            direction,
            declaration,
        } = &self.ast[id]
        else {
            return Err(GenerateError::Unexpected(self.ast[id].kind_name()));
        };
        let decl = self
            .ast
            .declaration(*declaration)
            .ok_or(GenerateError::Unexpected(self.ast[*declaration].kind_name()))?;

        let direction = match direction {
            Direction::In => "in",
            Direction::Out => "out",
        };
        Ok(format!(
            "{} {}{} {}",
            direction,
            type_name(decl),
            count_suffix(decl.count),
            decl.name
        ))
    }

    fn scope(&self, id: NodeId, depth: usize) -> Result<String, GenerateError> {
        let mut out = String::from("{\n");
        for &statement in self.ast.statements(id) {
            out += &tabs(depth + 1);
            out += &self.statement(statement, depth + 1)?;
        }
        out += &tabs(depth);
        out += "}\n";
        Ok(out)
    }

    /// A statement inside a scope. The caller writes the indentation.
    fn statement(&self, id: NodeId, depth: usize) -> Result<String, GenerateError> {
        match &self.ast[id] {
            Node::If { .. } => self.if_statement(id, depth),
            Node::For {
                init,
                condition,
                update,
                body,
            } => Ok(format!(
                "for({};{};{})\n{}{}",
                self.expression(*init, 0)?,
                self.expression(*condition, 0)?,
                self.expression(*update, 0)?,
                tabs(depth),
                self.scope(*body, depth)?
            )),
            _ => Ok(format!("{};\n", self.expression(id, depth)?)),
        }
    }

    fn if_statement(&self, id: NodeId, depth: usize) -> Result<String, GenerateError> {
        let Node::If {
            condition,
            then_scope,
            else_branch,
        } = &self.ast[id]
        else {
            return Err(GenerateError::Unexpected(self.ast[id].kind_name()));
        };

        let mut out = format!(
            "if({})\n{}{}",
            self.expression(*condition, 0)?,
            tabs(depth),
            self.scope(*then_scope, depth)?
        );

        if let Some(branch) = else_branch {
            out += &tabs(depth);
            match &self.ast[*branch] {
                Node::If { .. } => {
                    out += "else ";
                    out += &self.if_statement(*branch, depth)?;
                }
                _ => {
                    out += "else\n";
                    out += &tabs(depth);
                    out += &self.scope(*branch, depth)?;
                }
            }
        }

        Ok(out)
    }

    fn layout(&self, id: NodeId, depth: usize) -> Result<String, GenerateError> {
        let Node::Layout {
            kind,
            tags,
            declaration,
        } = &self.ast[id]
        else {
            return Err(GenerateError::Unexpected(self.ast[id].kind_name()));
        };

        let flat = if tags.iter().any(|tag| tag.key == FLAT_HINT) {
            " flat"
        } else {
            ""
        };
        Ok(format!(
            "{}layout({}){} {} {};\n",
            tabs(depth),
            tag_list(tags),
            flat,
            kind.keyword(),
            self.declaration(*declaration, depth)?
        ))
    }

    fn push_constant(&self, id: NodeId, depth: usize) -> Result<String, GenerateError> {
        let Node::PushConstant { tags, members } = &self.ast[id] else {
            return Err(GenerateError::Unexpected(self.ast[id].kind_name()));
        };

        let tags = tag_list(tags);
        let qualifiers = if tags.is_empty() {
            "push_constant".to_string()
        } else {
            format!("push_constant , {}", tags)
        };
        Ok(format!(
            "{indent}layout({}) uniform constant {{\n{}{indent}}} push;\n",
            qualifiers,
            self.members(members, depth + 1)?,
            indent = tabs(depth),
        ))
    }

    fn struct_definition(&self, id: NodeId, depth: usize) -> Result<String, GenerateError> {
        let Node::Struct { name, members } = &self.ast[id] else {
            return Err(GenerateError::Unexpected(self.ast[id].kind_name()));
        };
        Ok(format!(
            "{indent}struct {} {{\n{}{indent}}};\n",
            name,
            self.members(members, depth + 1)?,
            indent = tabs(depth),
        ))
    }

    pub fn expression(&self, id: NodeId, depth: usize) -> Result<String, GenerateError> {
        let node = &self.ast[id];
        Ok(match node {
            Node::NoOp => String::new(),
            Node::BinaryOp { op, left, right } => {
                if *op == BinaryOperator::Not {
                    return Err(GenerateError::UnsupportedNot);
                }
                format!(
                    "{} {} {}",
                    self.expression(*left, 0)?,
                    op.symbol(),
                    self.expression(*right, 0)?
                )
            }
            Node::Return(value) => format!("return {}", self.expression(*value, 0)?),
            Node::Assign { target, value } => format!(
                "{} = {}",
                self.expression(*target, depth)?,
                self.expression(*value, 0)?
            ),
            Node::Call { callee, arguments } => {
                let callee = self.expression(*callee, 0)?;
                if arguments.is_empty() {
                    format!("{}()", callee)
                } else {
                    format!("{}( {} )", callee, self.expression_list(arguments)?)
                }
            }
            Node::Access { left, right } => format!(
                "{}.{}",
                self.expression(*left, 0)?,
                self.expression(*right, 0)?
            ),
            Node::Index { target, index } => format!(
                "{}[{}]",
                self.expression(*target, 0)?,
                self.expression(*index, 0)?
            ),
            Node::Scope { .. } => self.scope(id, depth)?,
            Node::Identifier(text) => glsl_name(text).to_string(),
            Node::Declaration(_) => self.declaration(id, depth)?,
            Node::FloatLiteral(value) => format_float(*value),
            Node::IntLiteral(value) => value.to_string(),
            Node::BoolLiteral(value) => value.to_string(),
            Node::Const(declaration) => format!("const {}", self.expression(*declaration, depth)?),
            Node::ArrayLiteral(items) => format!("{{ {} }}", self.expression_list(items)?),
            Node::Negate(target) => format!("-{}", self.expression(*target, 0)?),
            Node::Precedence(inner) => format!("( {} )", self.expression(*inner, 0)?),
            Node::Increment { target, prefix } => {
                let target = self.expression(*target, 0)?;
                if *prefix {
                    format!("++{}", target)
                } else {
                    format!("{}++", target)
                }
            }
            Node::Decrement { target, prefix } => {
                let target = self.expression(*target, 0)?;
                if *prefix {
                    format!("--{}", target)
                } else {
                    format!("{}--", target)
                }
            }
            Node::Discard => "discard".to_string(),
            Node::Conditional {
                condition,
                if_true,
                if_false,
            } => format!(
                "{} ? {} : {}",
                self.expression(*condition, 0)?,
                self.expression(*if_true, 0)?,
                self.expression(*if_false, 0)?
            ),
            other => return Err(GenerateError::Unexpected(other.kind_name())),
        })
    }

    fn expression_list(&self, items: &[NodeId]) -> Result<String, GenerateError> {
        let items = items
            .iter()
            .map(|&item| self.expression(item, 0))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items.join(" , "))
    }
}

fn tabs(depth: usize) -> String {
    "\t".repeat(depth)
}

fn type_name(decl: &Declaration) -> String {
    match &decl.ty {
        DeclarationType::Primitive(primitive) => primitive.glsl_name().to_string(),
        _ => decl.type_name(),
    }
}

/// GLSL spelling of a source name; non-type names pass through.
pub fn glsl_name(name: &str) -> &str {
    match PrimitiveType::from_source_name(name) {
        Some(primitive) => primitive.glsl_name(),
        None => name,
    }
}

fn count_suffix(count: i32) -> String {
    match count {
        Declaration::UNSIZED => "[]".to_string(),
        n if n > 1 => format!("[{}]", n),
        _ => String::new(),
    }
}

/// `key` / `key = value` joined by ` , `, hint tags left out.
fn tag_list(tags: &[Tag]) -> String {
    tags.iter()
        .filter(|tag| !tag.key.starts_with(HINT_PREFIX))
        .map(|tag| {
            if tag.value.is_empty() {
                tag.key.clone()
            } else {
                format!("{} = {}", tag.key, tag.value)
            }
        })
        .collect::<Vec<_>>()
        .join(" , ")
}

/// Six decimals, then trailing zeros dropped down to one digit after the point.
fn format_float(value: f32) -> String {
    let mut text = format!("{:.6}", value);
    while text.ends_with('0') && !text[..text.len() - 1].ends_with('.') {
        text.pop();
    }
    text
}
