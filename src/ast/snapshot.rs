//! AST Snapshot - a normalized, serializable view of a subtree
//!
//! The arena form is awkward to print or compare, so tooling and tests go
//! through [`AstSnapshot`]: node type, a primary label, extra attributes and
//! nested children. Serializers (JSON, YAML) only ever see snapshots.
//!
//! A bound struct declaration does not repeat its struct as a child; it
//! records `bound = true` instead, which also keeps self-referencing structs
//! finite.

use super::{Ast, DeclarationType, Node, NodeId, Tag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstSnapshot {
    /// The node variant (e.g. "Function", "Layout")
    pub node_type: String,

    /// Name, operator or literal text, when the node has one
    pub label: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub attributes: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<AstSnapshot>,
}

impl AstSnapshot {
    pub fn new(node_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            label: label.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.insert(key.into(), value.to_string());
        self
    }

    pub fn with_child(mut self, child: AstSnapshot) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: Vec<AstSnapshot>) -> Self {
        self.children.extend(children);
        self
    }
}

fn tags_label(tags: &[Tag]) -> String {
    tags.iter()
        .map(|tag| {
            if tag.value.is_empty() {
                tag.key.clone()
            } else {
                format!("{}={}", tag.key, tag.value)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

impl Ast {
    /// Snapshot of `id` and everything below it.
    pub fn snapshot(&self, id: NodeId) -> AstSnapshot {
        let node = &self[id];
        let base = match node {
            Node::Declaration(decl) => {
                let mut snap = AstSnapshot::new(node.kind_name(), decl.name.clone())
                    .with_attribute("type", decl.type_name())
                    .with_attribute("count", decl.count);
                if let DeclarationType::Struct { binding, .. } = &decl.ty {
                    snap = snap.with_attribute("bound", binding.is_some());
                    return snap;
                }
                snap
            }
            Node::Struct { name, .. } | Node::Function { name, .. } | Node::Define { name, .. } => {
                AstSnapshot::new(node.kind_name(), name.clone())
            }
            Node::NamedScope { stage, .. } => AstSnapshot::new(node.kind_name(), stage.name()),
            Node::FunctionArgument { direction, .. } => {
                AstSnapshot::new(node.kind_name(), format!("{:?}", direction).to_lowercase())
            }
            Node::BinaryOp { op, .. } => AstSnapshot::new(node.kind_name(), op.symbol()),
            Node::Identifier(text) => AstSnapshot::new(node.kind_name(), text.clone()),
            Node::IntLiteral(value) => AstSnapshot::new(node.kind_name(), value.to_string()),
            Node::FloatLiteral(value) => AstSnapshot::new(node.kind_name(), value.to_string()),
            Node::BoolLiteral(value) => AstSnapshot::new(node.kind_name(), value.to_string()),
            Node::Increment { prefix, .. } | Node::Decrement { prefix, .. } => {
                AstSnapshot::new(node.kind_name(), "").with_attribute("prefix", prefix)
            }
            Node::Layout { kind, tags, .. } => AstSnapshot::new(node.kind_name(), kind.keyword())
                .with_attribute("tags", tags_label(tags)),
            Node::PushConstant { tags, .. } => {
                AstSnapshot::new(node.kind_name(), "").with_attribute("tags", tags_label(tags))
            }
            Node::Include {
                source_file,
                target,
            } => AstSnapshot::new(node.kind_name(), target.clone())
                .with_attribute("source", source_file.clone()),
            _ => AstSnapshot::new(node.kind_name(), ""),
        };

        let children = node
            .children()
            .into_iter()
            .map(|child| self.snapshot(child))
            .collect();
        base.with_children(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOperator, Declaration};

    #[test]
    fn test_snapshot_labels_and_children() {
        let mut ast = Ast::new();
        let left = ast.alloc(Node::Identifier("a".into()));
        let right = ast.alloc(Node::IntLiteral(2));
        let op = ast.alloc(Node::BinaryOp {
            op: BinaryOperator::Multiply,
            left,
            right,
        });

        let snap = ast.snapshot(op);
        assert_eq!(snap.node_type, "BinaryOp");
        assert_eq!(snap.label, "*");
        assert_eq!(snap.children.len(), 2);
        assert_eq!(snap.children[0].label, "a");
        assert_eq!(snap.children[1].node_type, "IntLiteral");
    }

    #[test]
    fn test_struct_declaration_records_binding() {
        let mut ast = Ast::new();
        let decl = ast.alloc(Node::Declaration(Declaration {
            ty: DeclarationType::Struct {
                struct_name: "Light".into(),
                binding: None,
            },
            name: "light".into(),
            count: 4,
        }));
        let snap = ast.snapshot(decl);
        assert_eq!(snap.node_type, "StructDeclaration");
        assert_eq!(snap.attributes["type"], "Light");
        assert_eq!(snap.attributes["count"], "4");
        assert_eq!(snap.attributes["bound"], "false");
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let mut ast = Ast::new();
        let id = ast.alloc(Node::Discard);
        let json = serde_json::to_string(&ast.snapshot(id)).expect("serializes");
        assert_eq!(json, r#"{"node_type":"Discard","label":""}"#);
    }
}
