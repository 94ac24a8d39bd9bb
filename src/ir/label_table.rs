//! The label table: label identifier → (defining node, reference count).
//!
//! A `PrimaryMap`-backed side table keyed by an entity reference, in the
//! style of `cranelift_codegen::ir::Layout`, but tracking bookkeeping data
//! instead of list links — the links themselves live on `Stream`.

use crate::error::PeepholeError;
use crate::ir::{Inst, Label};
use cranelift_entity::PrimaryMap;

#[derive(Clone, Debug, Default)]
struct LabelEntry {
    /// The instruction node carrying this label, once it has been placed in
    /// the stream. `None` between `next_label()` and `insert_new_label()`.
    node: Option<Inst>,
    /// Exact count of stream instructions whose target is this label.
    refcount: u32,
}

/// Owns label-registry entries; the stream itself holds only `Label`
/// identifiers (non-owning references).
#[derive(Clone, Debug, Default)]
pub struct LabelTable {
    entries: PrimaryMap<Label, LabelEntry>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh, unused label identifier. The label has no defining
    /// node and a reference count of zero until `insert_new_label` is called.
    pub fn next_label(&mut self) -> Label {
        self.entries.push(LabelEntry::default())
    }

    /// Register `node` as the label node for `label`, with initial reference
    /// count `count`. Used both for labels produced by `next_label` and, by
    /// `Stream::from_instructions`, for labels the code generator already
    /// placed in its initial stream.
    pub fn insert_new_label(&mut self, label: Label, node: Inst, count: u32) {
        self.entries[label] = LabelEntry {
            node: Some(node),
            refcount: count,
        };
    }

    /// The position of the label node bearing `label`.
    pub fn destination(&self, label: Label) -> Result<Inst, PeepholeError> {
        self.entries
            .get(label)
            .and_then(|e| e.node)
            .ok_or(PeepholeError::MissingLabel(label))
    }

    pub fn refcount(&self, label: Label) -> u32 {
        self.entries.get(label).map(|e| e.refcount).unwrap_or(0)
    }

    /// Increment `label`'s reference count: one more instruction now targets it.
    pub fn copylabel(&mut self, label: Label) {
        self.entries[label].refcount += 1;
    }

    /// Decrement `label`'s reference count: one fewer instruction targets it.
    pub fn droplabel(&mut self, label: Label) -> Result<(), PeepholeError> {
        let entry = &mut self.entries[label];
        entry
            .refcount
            .checked_sub(1)
            .map(|n| entry.refcount = n)
            .ok_or(PeepholeError::NegativeLabelRefcount(label))
    }

    /// Forget that `label` has a defining node. Called when the `remove_dead_label`
    /// rule splices the label's marker instruction out of the stream.
    pub fn clear_node(&mut self, label: Label) {
        if let Some(entry) = self.entries.get_mut(label) {
            entry.node = None;
        }
    }

    pub fn is_dead(&self, label: Label) -> bool {
        self.refcount(label) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_label_has_no_destination() {
        let mut table = LabelTable::new();
        let l = table.next_label();
        assert!(table.destination(l).is_err());
        assert_eq!(table.refcount(l), 0);
    }

    #[test]
    fn copy_and_drop_are_exact() {
        let mut table = LabelTable::new();
        let l = table.next_label();
        table.insert_new_label(l, Inst::from_u32(0), 1);
        table.copylabel(l);
        assert_eq!(table.refcount(l), 2);
        table.droplabel(l).unwrap();
        table.droplabel(l).unwrap();
        assert_eq!(table.refcount(l), 0);
        assert!(table.droplabel(l).is_err());
    }
}
