//! The mutable instruction stream.
//!
//! `Stream` owns every instruction node in a `PrimaryMap`, exactly as
//! `cranelift_codegen::ir::Function` owns its instructions in a `PrimaryMap`
//! indexed by `ir::Inst`. Where `cranelift_codegen::ir::Layout` keeps a
//! doubly linked list (so it can walk backward without help), this stream is
//! singly linked: only a `next` link is stored, and a rule that needs a
//! node's predecessor gets it from the `Cursor` that was already walking
//! forward through that position, never by re-deriving it from the stream.

use crate::ir::label_table::LabelTable;
use crate::ir::{Inst, InstData, Label};
use cranelift_entity::{PrimaryMap, SecondaryMap};

/// The owning, singly linked sequence of instructions for one method body,
/// plus the label table that names jump targets into it.
#[derive(Clone, Debug, Default)]
pub struct Stream {
    insts: PrimaryMap<Inst, InstData>,
    next: SecondaryMap<Inst, Option<Inst>>,
    head: Option<Inst>,
    pub(crate) labels: LabelTable,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stream from a flat list of instructions that already embed
    /// `LabelMark` pseudo-instructions and well-formed `Label` references
    /// (this is the shape a code generator or a test hands in). Computes
    /// every label's reference count and defining node from scratch.
    pub fn from_instructions(instrs: impl IntoIterator<Item = InstData>) -> Self {
        let mut stream = Self::new();
        let mut prev: Option<Inst> = None;
        let mut max_label = 0u32;

        let nodes: Vec<InstData> = instrs.into_iter().collect();
        for data in &nodes {
            if let Some(l) = data.label_target() {
                max_label = max_label.max(l.as_u32() + 1);
            }
            if let InstData::LabelMark(l) = data {
                max_label = max_label.max(l.as_u32() + 1);
            }
        }
        for _ in 0..max_label {
            stream.labels.next_label();
        }

        for data in nodes {
            let target = data.label_target();
            let mark = match &data {
                InstData::LabelMark(l) => Some(*l),
                _ => None,
            };
            let id = stream.insts.push(data);
            stream.next[id] = None;
            match prev {
                Some(p) => stream.next[p] = Some(id),
                None => stream.head = Some(id),
            }
            prev = Some(id);

            if let Some(l) = mark {
                let count = stream.labels.refcount(l);
                stream.labels.insert_new_label(l, id, count);
            }
            if let Some(l) = target {
                stream.labels.copylabel(l);
            }
        }
        stream
    }

    pub fn head(&self) -> Option<Inst> {
        self.head
    }

    pub fn next(&self, pos: Inst) -> Option<Inst> {
        self.next[pos]
    }

    pub fn get(&self, pos: Inst) -> &InstData {
        &self.insts[pos]
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// An in-order iterator over the live instructions, following `next`
    /// links from the head. Dangling `Inst` handles left behind by past
    /// `replace` calls are never visited: nothing in the stream points at them.
    pub fn iter(&self) -> StreamIter<'_> {
        StreamIter {
            stream: self,
            cur: self.head,
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Splice `new` in immediately after `after` (or at the head, if `after`
    /// is `None`). Returns the `Inst` handle of the spliced-in node. Used by
    /// the handful of rules that insert a fresh label mid-stream beyond the
    /// window they matched.
    pub(crate) fn insert_after(&mut self, after: Option<Inst>, new: InstData) -> Inst {
        let old_next = match after {
            Some(a) => self.next[a],
            None => self.head,
        };
        let id = self.insts.push(new);
        self.next[id] = old_next;
        match after {
            Some(a) => self.next[a] = Some(id),
            None => self.head = Some(id),
        }
        id
    }

    pub(crate) fn push_node(&mut self, data: InstData) -> Inst {
        let id = self.insts.push(data);
        self.next[id] = None;
        id
    }

    pub(crate) fn set_next(&mut self, at: Inst, next: Option<Inst>) {
        self.next[at] = next;
    }

    pub(crate) fn set_head(&mut self, head: Option<Inst>) {
        self.head = head;
    }

    /// Retarget a label-using instruction in place. Returns `false` for a
    /// node that doesn't carry a label operand.
    pub(crate) fn set_label_at(&mut self, pos: Inst, new_label: Label) -> bool {
        self.insts[pos].set_label(new_label)
    }
}

pub struct StreamIter<'a> {
    stream: &'a Stream,
    cur: Option<Inst>,
}

impl<'a> Iterator for StreamIter<'a> {
    type Item = (Inst, &'a InstData);

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.cur?;
        self.cur = self.stream.next(cur);
        Some((cur, self.stream.get(cur)))
    }
}
