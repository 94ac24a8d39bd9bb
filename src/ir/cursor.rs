//! Cursor: the rule-facing view onto a `Stream`.
//!
//! Modeled on `cranelift_codegen::cursor::Cursor`, trimmed to the single
//! forward-scanning mode a local peephole pass needs: no `Before`/`After`
//! block positions, because this stream has no blocks, just one linear
//! sequence per method body. A `Cursor` tracks both the current position and
//! its immediate predecessor, since the stream itself stores only a forward
//! `next` link — any rule that needs to unlink or relink a node gets the
//! predecessor from whichever cursor was already there, rather than
//! re-deriving it by walking from the head.

use crate::error::PeepholeError;
use crate::ir::instruction::StackEffect;
use crate::ir::{stack_effect, Inst, InstData, Label, Stream};

/// A position in the stream together with everything a rule needs to
/// inspect or rewrite the window starting there.
pub struct Cursor<'f> {
    stream: &'f mut Stream,
    prev: Option<Inst>,
    cur: Option<Inst>,
    last_edit_counted: bool,
}

impl<'f> Cursor<'f> {
    /// Position a cursor at the head of the stream.
    pub fn at_head(stream: &'f mut Stream) -> Self {
        let cur = stream.head();
        Cursor {
            stream,
            prev: None,
            cur,
            last_edit_counted: true,
        }
    }

    pub fn at_end(&self) -> bool {
        self.cur.is_none()
    }

    pub fn position(&self) -> Option<Inst> {
        self.cur
    }

    /// The predecessor of the current position, if any. Used by rules that
    /// splice a fresh label in immediately before the node they matched on
    /// (the factoring rules).
    pub fn prev_position(&self) -> Option<Inst> {
        self.prev
    }

    pub fn stream(&self) -> &Stream {
        self.stream
    }

    /// Whether the most recent successful `replace`/`replace_modified` call
    /// (or `mark_progress`) should be tallied in `OptimizeReport::rule_firings`.
    pub fn last_edit_counted(&self) -> bool {
        self.last_edit_counted
    }

    /// Advance one position. Returns `false` (and leaves the cursor at
    /// end-of-stream) once there is nothing left to visit.
    pub fn advance(&mut self) -> bool {
        match self.cur {
            Some(c) => {
                self.prev = Some(c);
                self.cur = self.stream.next(c);
                self.cur.is_some()
            }
            None => false,
        }
    }

    /// The position `n` steps ahead of the cursor (`n == 0` is the cursor
    /// itself). `None` if the window runs past the end of the stream; a
    /// rule handles that by simply returning no match.
    pub fn nth(&self, n: usize) -> Option<Inst> {
        let mut pos = self.cur?;
        for _ in 0..n {
            pos = self.stream.next(pos)?;
        }
        Some(pos)
    }

    pub fn data_at(&self, n: usize) -> Option<&InstData> {
        self.nth(n).map(|p| self.stream.get(p))
    }

    pub fn data_of(&self, pos: Inst) -> &InstData {
        self.stream.get(pos)
    }

    pub fn next_of(&self, pos: Inst) -> Option<Inst> {
        self.stream.next(pos)
    }

    pub fn stack_effect_of(&self, pos: Inst) -> StackEffect {
        stack_effect(self.stream.get(pos))
    }

    pub fn destination(&self, label: Label) -> Result<Inst, PeepholeError> {
        self.stream.labels().destination(label)
    }

    pub fn refcount(&self, label: Label) -> u32 {
        self.stream.labels().refcount(label)
    }

    pub fn copylabel(&mut self, label: Label) {
        self.stream.labels.copylabel(label);
    }

    pub fn droplabel(&mut self, label: Label) -> Result<(), PeepholeError> {
        self.stream.labels.droplabel(label)
    }

    pub fn next_label(&mut self) -> Label {
        self.stream.labels.next_label()
    }

    pub fn insert_new_label(&mut self, label: Label, node: Inst, count: u32) {
        self.stream.labels.insert_new_label(label, node, count);
    }

    /// Forget `label`'s defining node, once a rule has spliced its marker out
    /// of the stream.
    pub fn clear_node(&mut self, label: Label) {
        self.stream.labels.clear_node(label);
    }

    /// Retarget a label-using instruction without touching any reference
    /// count; callers pair this with `droplabel`/`copylabel`. Returns
    /// `false` for a node that doesn't use a label.
    pub fn set_label(&mut self, pos: Inst, new_label: Label) -> bool {
        self.stream.set_label_at(pos, new_label)
    }

    /// Splice `new` in right after `after` (or at the head, if `after` is
    /// `None`). Used by rules that insert a fresh label mid-stream, beyond
    /// the window they matched.
    pub fn insert_after(&mut self, after: Option<Inst>, data: InstData) -> Inst {
        self.stream.insert_after(after, data)
    }

    /// Delete the `n` consecutive nodes starting at the cursor and splice
    /// `new` in their place, then leave the cursor at the first spliced-in
    /// node (or at the old successor, if `new` is empty). Counts as a rule
    /// firing for `OptimizeReport`.
    pub fn replace(&mut self, n: usize, new: impl IntoIterator<Item = InstData>) -> bool {
        self.splice(n, new, true)
    }

    /// Same as `replace`, but the edit is not tallied as a rule firing —
    /// for the auxiliary pointer edits a few rules make beyond their
    /// matched window.
    pub fn replace_modified(&mut self, n: usize, new: impl IntoIterator<Item = InstData>) -> bool {
        self.splice(n, new, false)
    }

    /// Record that the rule made progress without going through
    /// `replace`/`replace_modified` (the goto-chasing and label-fusing
    /// rules only retarget an operand in place).
    pub fn mark_progress(&mut self) {
        self.last_edit_counted = true;
    }

    /// Delete `n` consecutive nodes starting at `start` (whose predecessor is
    /// `before`) and splice `new` in their place. Unlike `replace`, this acts
    /// on a position the forward search already found rather than the
    /// cursor's own position, and does not move the cursor or affect
    /// `last_edit_counted` — callers that use this also call `mark_progress`.
    pub fn replace_at(
        &mut self,
        before: Option<Inst>,
        start: Inst,
        n: usize,
        new: impl IntoIterator<Item = InstData>,
    ) -> bool {
        let mut last = start;
        for _ in 1..n {
            match self.stream.next(last) {
                Some(next) => last = next,
                None => return false,
            }
        }
        let after = self.stream.next(last);

        let mut new_head = after;
        let built: Vec<InstData> = new.into_iter().collect();
        for data in built.into_iter().rev() {
            let id = self.stream.push_node(data);
            self.stream.set_next(id, new_head);
            new_head = Some(id);
        }

        match before {
            Some(p) => self.stream.set_next(p, new_head),
            None => self.stream.set_head(new_head),
        }
        true
    }

    fn splice(&mut self, n: usize, new: impl IntoIterator<Item = InstData>, counted: bool) -> bool {
        let after = if n == 0 {
            self.cur
        } else {
            let Some(mut last) = self.cur else {
                return false;
            };
            for _ in 1..n {
                match self.stream.next(last) {
                    Some(next) => last = next,
                    None => return false,
                }
            }
            self.stream.next(last)
        };

        let mut new_head = after;
        let built: Vec<InstData> = new.into_iter().collect();
        for data in built.into_iter().rev() {
            let id = self.stream.push_node(data);
            self.stream.set_next(id, new_head);
            new_head = Some(id);
        }

        match self.prev {
            Some(p) => self.stream.set_next(p, new_head),
            None => self.stream.set_head(new_head),
        }
        self.cur = new_head;
        self.last_edit_counted = counted;
        true
    }
}
