//! Declaration sizes
//!
//! Byte sizes follow a packed scalar layout: `float`/`int` are 4 bytes, vectors
//! `4 * N`, `mat3` 36, `mat4` 64, and aggregates the sum of their members. Every
//! declaration multiplies by its array count.
//!
//! Runtime-sized arrays (`count == -1`) have no size of their own. Asking for
//! one directly is an error; inside an aggregate they are left out of the sum.

use super::{Ast, Declaration, DeclarationType, Node, NodeId};
use crate::error::SizeError;

impl Ast {
    /// Size in bytes of a declaration, struct, push block or layout statement.
    pub fn size_of(&self, id: NodeId) -> Result<u64, SizeError> {
        let mut open_structs = Vec::new();
        self.size_in(id, &mut open_structs)
    }

    fn size_in(&self, id: NodeId, open_structs: &mut Vec<NodeId>) -> Result<u64, SizeError> {
        match &self[id] {
            Node::Declaration(decl) => self.declaration_size(decl, open_structs),
            Node::Struct { name, members } => {
                if open_structs.contains(&id) {
                    return Err(SizeError::Recursive(name.clone()));
                }
                open_structs.push(id);
                let size = self.members_size(members, open_structs);
                open_structs.pop();
                size
            }
            Node::PushConstant { members, .. } => self.members_size(members, open_structs),
            Node::Layout { declaration, .. } => self.size_in(*declaration, open_structs),
            other => Err(SizeError::NotSized(other.kind_name())),
        }
    }

    fn declaration_size(
        &self,
        decl: &Declaration,
        open_structs: &mut Vec<NodeId>,
    ) -> Result<u64, SizeError> {
        if decl.is_unsized() {
            return Err(SizeError::RuntimeArray(decl.name.clone()));
        }

        let element = match &decl.ty {
            DeclarationType::Primitive(primitive) => primitive
                .element_size()
                .ok_or_else(|| SizeError::NoLayoutSize(primitive.source_name().to_string()))?,
            DeclarationType::Struct {
                struct_name,
                binding,
            } => {
                let def = binding.ok_or_else(|| SizeError::UnboundStruct(struct_name.clone()))?;
                self.size_in(def, open_structs)?
            }
            DeclarationType::Block { members } | DeclarationType::Buffer { members } => {
                self.members_size(members, open_structs)?
            }
        };

        element
            .checked_mul(decl.count.max(0) as u64)
            .ok_or_else(|| SizeError::Overflow(decl.name.clone()))
    }

    fn members_size(
        &self,
        members: &[NodeId],
        open_structs: &mut Vec<NodeId>,
    ) -> Result<u64, SizeError> {
        let mut total = 0;
        for &member in members {
            if self.declaration(member).is_some_and(Declaration::is_unsized) {
                continue;
            }
            let size = self.size_in(member, open_structs)?;
            total = u64::checked_add(total, size).ok_or_else(|| {
                let name = self.declaration(member).map(|d| d.name.clone());
                SizeError::Overflow(name.unwrap_or_default())
            })?;
        }
        Ok(total)
    }
}
