//! Structural hashing
//!
//! A node's hash starts from its discriminant, folds in the attributes that
//! distinguish nodes of the same kind (operator, literal value, names, counts,
//! tags, stage) and then every child hash in order. Equal hashes mean the
//! subtrees are interchangeable for compilation.
//!
//! Bound struct declarations list their struct as a child. A struct that
//! contains itself would loop, so a node already being hashed further up the
//! current path contributes only its discriminant.

use super::{Ast, DeclarationType, Node, NodeId};
use rustc_hash::{FxHashSet, FxHasher};
use std::hash::{Hash, Hasher};

/// `seed ^= value + 0x9e3779b9 + (seed << 6) + (seed >> 2)`
pub fn hash_combine(seed: u64, value: u64) -> u64 {
    seed ^ value
        .wrapping_add(0x9e37_79b9)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

impl Ast {
    pub fn structural_hash(&self, id: NodeId) -> u64 {
        let mut in_progress = FxHashSet::default();
        self.hash_node(id, &mut in_progress)
    }

    fn hash_node(&self, id: NodeId, in_progress: &mut FxHashSet<NodeId>) -> u64 {
        let node = &self[id];
        if !in_progress.insert(id) {
            return node.discriminant();
        }

        let mut seed = self_hash(node);
        for child in node.children() {
            seed = hash_combine(seed, self.hash_node(child, in_progress));
        }

        in_progress.remove(&id);
        seed
    }
}

fn self_hash(node: &Node) -> u64 {
    let seed = node.discriminant();
    match node {
        Node::Declaration(decl) => {
            let mut seed = hash_combine(seed, hash_of(&decl.type_name()));
            seed = hash_combine(seed, hash_of(&decl.name));
            seed = hash_combine(seed, hash_of(&decl.count));
            if let DeclarationType::Struct { struct_name, .. } = &decl.ty {
                seed = hash_combine(seed, hash_of(struct_name));
            }
            seed
        }
        Node::Struct { name, .. } => hash_combine(seed, hash_of(name)),
        Node::Function { name, .. } => hash_combine(seed, hash_of(name)),
        Node::FunctionArgument { direction, .. } => hash_combine(seed, hash_of(direction)),
        Node::BinaryOp { op, .. } => hash_combine(seed, hash_of(op)),
        Node::Identifier(text) => hash_combine(seed, hash_of(text)),
        Node::IntLiteral(value) => hash_combine(seed, hash_of(value)),
        Node::FloatLiteral(value) => hash_combine(seed, hash_of(&value.to_bits())),
        Node::BoolLiteral(value) => hash_combine(seed, hash_of(value)),
        Node::Increment { prefix, .. } | Node::Decrement { prefix, .. } => {
            hash_combine(seed, hash_of(prefix))
        }
        Node::Layout { kind, tags, .. } => hash_combine(hash_combine(seed, hash_of(kind)), hash_of(tags)),
        Node::PushConstant { tags, .. } => hash_combine(seed, hash_of(tags)),
        Node::Define { name, .. } => hash_combine(seed, hash_of(name)),
        Node::Include {
            source_file,
            target,
        } => hash_combine(hash_combine(seed, hash_of(source_file)), hash_of(target)),
        Node::NamedScope { stage, .. } => hash_combine(seed, hash_of(stage)),
        _ => seed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOperator, Declaration};

    fn add(ast: &mut Ast, a: i32, b: i32) -> NodeId {
        let left = ast.alloc(Node::IntLiteral(a));
        let right = ast.alloc(Node::IntLiteral(b));
        ast.alloc(Node::BinaryOp {
            op: BinaryOperator::Add,
            left,
            right,
        })
    }

    #[test]
    fn test_equal_structure_equal_hash() {
        let mut ast = Ast::new();
        let a = add(&mut ast, 1, 2);
        let b = add(&mut ast, 1, 2);
        assert_ne!(a, b);
        assert_eq!(ast.structural_hash(a), ast.structural_hash(b));
    }

    #[test]
    fn test_attributes_change_hash() {
        let mut ast = Ast::new();
        let a = add(&mut ast, 1, 2);
        let b = add(&mut ast, 2, 1);
        assert_ne!(ast.structural_hash(a), ast.structural_hash(b));

        let x = ast.alloc(Node::Identifier("x".into()));
        let y = ast.alloc(Node::Identifier("y".into()));
        assert_ne!(ast.structural_hash(x), ast.structural_hash(y));

        let pre = ast.alloc(Node::Increment { target: x, prefix: true });
        let post = ast.alloc(Node::Increment { target: x, prefix: false });
        assert_ne!(ast.structural_hash(pre), ast.structural_hash(post));
    }

    #[test]
    fn test_self_referencing_struct_terminates() {
        let mut ast = Ast::new();
        let member = ast.alloc(Node::Declaration(Declaration {
            ty: DeclarationType::Struct {
                struct_name: "Node".into(),
                binding: None,
            },
            name: "next".into(),
            count: 1,
        }));
        let def = ast.alloc(Node::Struct {
            name: "Node".into(),
            members: vec![member],
        });
        if let Node::Declaration(decl) = &mut ast[member] {
            decl.ty = DeclarationType::Struct {
                struct_name: "Node".into(),
                binding: Some(def),
            };
        }
        let _ = ast.structural_hash(def);
    }

    #[test]
    fn test_hash_combine_matches_formula() {
        let seed = 7u64;
        let expected = seed ^ (11u64 + 0x9e37_79b9 + (seed << 6) + (seed >> 2));
        assert_eq!(hash_combine(seed, 11), expected);
    }
}
