//! Entity references used by the instruction stream.
//!
//! `Inst` names a position in the stream; `Label` names a jump target. Both
//! are opaque `u32` indices wrapped in newtypes, the same representation
//! `cranelift_entity` uses for `cranelift_codegen::ir::Block`/`ir::Value`.
//! Neither type carries any data of its own — all instruction data and
//! label bookkeeping lives in `Stream`.

use cranelift_entity::entity_impl;

/// A position in the instruction stream.
///
/// `Inst` values are never reused: once an instruction is spliced out of the
/// stream by [`Cursor::replace`](crate::ir::cursor::Cursor::replace), its
/// `Inst` handle becomes dangling and is never handed out again.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Inst(u32);
entity_impl!(Inst, "inst");

/// An opaque jump-target identifier.
///
/// A `Label` is a key into the [`LabelTable`](crate::ir::label_table::LabelTable),
/// not a position itself; resolving it to a position is
/// [`LabelTable::destination`](crate::ir::label_table::LabelTable::destination).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u32);
entity_impl!(Label, "label");
