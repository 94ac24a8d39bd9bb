//! Dead-store elimination: a bounded forward walk proving no path from a
//! store reads the slot it just wrote before overwriting or abandoning it.

use std::collections::HashSet;

use smallvec::SmallVec;

use crate::error::PeepholeError;
use crate::ir::{Cursor, Inst, InstData};
use crate::OptimizerConfig;

/// Most dead-store walks never fork more than a couple of times before
/// resolving; inline storage avoids a heap allocation for the common case.
type WorkStack = SmallVec<[Inst; 8]>;

/// `store_int k`, `store_ref k`, or `inc k by c`, proven dead by a bounded
/// walk of everything reachable from the next instruction, replaced by
/// `pop` (stores, which leave a value on the stack to discard) or `nop`
/// (`inc`, which never touches the stack).
///
/// The walk forks at every conditional branch and follows `goto` to its
/// target; it succeeds on that path at end-of-stream, any `return`, or a
/// store to the same slot, and fails the instant it reaches a load of the
/// slot. A node already visited on this walk is not revisited, which both
/// bounds the work and keeps a cyclic `goto` from spinning forever; the
/// budget counter is the independent bound the design calls for.
pub fn remove_dead_store(cursor: &mut Cursor, config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    let is_inc = matches!(cursor.data_at(0), Some(InstData::Inc(_, _)));
    let slot = match cursor.data_at(0) {
        Some(InstData::StoreInt(k)) | Some(InstData::StoreRef(k)) => *k,
        Some(InstData::Inc(k, _)) => *k,
        _ => return Ok(false),
    };

    let mut budget = config.dead_store_budget;
    let mut stack: WorkStack = cursor.nth(1).into_iter().collect();
    let mut visited: HashSet<Inst> = HashSet::new();

    while let Some(pos) = stack.pop() {
        if !visited.insert(pos) {
            continue;
        }
        if budget == 0 {
            return Ok(false);
        }
        budget -= 1;

        match cursor.data_of(pos) {
            InstData::ReturnVoid | InstData::ReturnInt | InstData::ReturnRef => {}
            InstData::StoreInt(k) | InstData::StoreRef(k) if *k == slot => {}
            InstData::LoadInt(k) | InstData::LoadRef(k) if *k == slot => return Ok(false),
            InstData::Goto(l) => stack.push(cursor.destination(*l)?),
            other if other.is_conditional() => {
                let l = other.label_target().unwrap();
                stack.push(cursor.destination(l)?);
                if let Some(next) = cursor.next_of(pos) {
                    stack.push(next);
                }
            }
            _ => {
                if let Some(next) = cursor.next_of(pos) {
                    stack.push(next);
                }
            }
        }
    }

    let replacement = if is_inc { InstData::Nop } else { InstData::Pop };
    Ok(cursor.replace(1, [replacement]))
}
