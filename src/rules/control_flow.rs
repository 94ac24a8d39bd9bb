//! Jump and label rewrites: goto-chasing, label fusion, branch inversion,
//! dead-code-after-terminator cleanup, and the two-branch merges that collapse
//! a `dup; branch; pop` guard into a single branch at the far end.

use crate::error::PeepholeError;
use crate::ir::{Cursor, InstData};
use crate::rules::comparisons::bool_cmp;
use crate::OptimizerConfig;

/// `goto L1` where `L1` targets `return` → `return`.
pub fn goto_return(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    let Some(InstData::Goto(l1)) = cursor.data_at(0) else {
        return Ok(false);
    };
    let l1 = *l1;
    let dest = cursor.destination(l1)?;
    let Some(after_dest) = cursor.next_of(dest) else {
        return Ok(false);
    };
    if matches!(cursor.data_of(after_dest), InstData::ReturnVoid) {
        cursor.droplabel(l1)?;
        Ok(cursor.replace(1, [InstData::ReturnVoid]))
    } else {
        Ok(false)
    }
}

/// `cond L1; goto L2; L1:` → `inverse-cond L2; L1:`. The label mark at `L1`
/// is left in place as the window's third node; it becomes dead once nothing
/// else uses `L1`, and `remove_dead_label` takes it from there.
pub fn invert_comparison(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    let Some(cond) = cursor.data_at(0) else {
        return Ok(false);
    };
    if !cond.is_conditional() {
        return Ok(false);
    }
    let cond = cond.clone();
    let l1 = cond.label_target().unwrap();
    let Some(InstData::Goto(l2)) = cursor.data_at(1) else {
        return Ok(false);
    };
    let l2 = *l2;
    let Some(InstData::LabelMark(l3)) = cursor.data_at(2) else {
        return Ok(false);
    };
    if *l3 != l1 {
        return Ok(false);
    }
    cursor.droplabel(l1)?;
    let mut inverted = cond.inverted();
    inverted.set_label(l2);
    Ok(cursor.replace(2, [inverted]))
}

/// `push_int 0; goto L1` where `L1` targets `ifzero L2` → `goto L2`.
pub fn simplify_iconst_0_goto_ifeq(
    cursor: &mut Cursor,
    _config: &OptimizerConfig,
) -> Result<bool, PeepholeError> {
    if !matches!(cursor.data_at(0), Some(InstData::PushInt(0))) {
        return Ok(false);
    }
    let Some(InstData::Goto(l1)) = cursor.data_at(1) else {
        return Ok(false);
    };
    let l1 = *l1;
    let dest1 = cursor.destination(l1)?;
    let Some(after_dest1) = cursor.next_of(dest1) else {
        return Ok(false);
    };
    let Some(InstData::IfZero(l2)) = cursor.data_of(after_dest1) else {
        return Ok(false);
    };
    let l2 = *l2;
    cursor.droplabel(l1)?;
    cursor.copylabel(l2);
    Ok(cursor.replace(2, [InstData::Goto(l2)]))
}

/// `push_int 0; goto L1` where `L1` targets `dup; ifzero L2` → `push_int 0;
/// goto L2`. Skipped when `L2`'s own target is a plain `goto`, to avoid
/// chasing through a cycle the two goto-chasing rules would otherwise loop on.
pub fn simplify_iconst_0_goto_dup_ifeq(
    cursor: &mut Cursor,
    _config: &OptimizerConfig,
) -> Result<bool, PeepholeError> {
    if !matches!(cursor.data_at(0), Some(InstData::PushInt(0))) {
        return Ok(false);
    }
    let Some(InstData::Goto(l1)) = cursor.data_at(1) else {
        return Ok(false);
    };
    let l1 = *l1;
    let dest1 = cursor.destination(l1)?;
    let Some(after_dest1) = cursor.next_of(dest1) else {
        return Ok(false);
    };
    if !matches!(cursor.data_of(after_dest1), InstData::Dup) {
        return Ok(false);
    }
    let Some(after_dup) = cursor.next_of(after_dest1) else {
        return Ok(false);
    };
    let Some(InstData::IfZero(l2)) = cursor.data_of(after_dup) else {
        return Ok(false);
    };
    let l2 = *l2;
    let dest2 = cursor.destination(l2)?;
    if let Some(after_dest2) = cursor.next_of(dest2) {
        if matches!(cursor.data_of(after_dest2), InstData::Goto(_)) {
            return Ok(false);
        }
    }
    cursor.droplabel(l1)?;
    cursor.copylabel(l2);
    Ok(cursor.replace(2, [InstData::PushInt(0), InstData::Goto(l2)]))
}

/// `push_int v; goto L1` where `L1` targets a boolean branch to `L2`:
/// collapse to `goto L2` when the branch is always taken, or retarget past it
/// to a fresh label right after the branch when it never is.
pub fn simplify_iconst_goto_ifeq(
    cursor: &mut Cursor,
    _config: &OptimizerConfig,
) -> Result<bool, PeepholeError> {
    let Some(InstData::PushInt(v)) = cursor.data_at(0) else {
        return Ok(false);
    };
    let v = *v;
    let Some(InstData::Goto(l1)) = cursor.data_at(1) else {
        return Ok(false);
    };
    let l1 = *l1;
    let dest1 = cursor.destination(l1)?;
    let Some(after_dest1) = cursor.next_of(dest1) else {
        return Ok(false);
    };
    let Some((wants_nonzero, l2)) = bool_cmp(cursor.data_of(after_dest1)) else {
        return Ok(false);
    };
    cursor.droplabel(l1)?;
    if (v != 0) == wants_nonzero {
        cursor.copylabel(l2);
        Ok(cursor.replace(2, [InstData::Goto(l2)]))
    } else {
        let l3 = cursor.next_label();
        let new_mark = cursor.insert_after(Some(after_dest1), InstData::LabelMark(l3));
        cursor.insert_new_label(l3, new_mark, 1);
        Ok(cursor.replace(2, [InstData::Goto(l3)]))
    }
}

/// A node using `L1` whose target is itself `goto L2` → retarget it straight
/// to `L2`. Skipped when `L2`'s own target is a `goto`, which would make the
/// rewrite chase a cycle forever instead of converging.
pub fn simplify_goto_goto(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    let Some(inst) = cursor.data_at(0) else {
        return Ok(false);
    };
    let Some(l1) = inst.label_target() else {
        return Ok(false);
    };
    let dest1 = cursor.destination(l1)?;
    let Some(after_dest1) = cursor.next_of(dest1) else {
        return Ok(false);
    };
    let InstData::Goto(l2) = cursor.data_of(after_dest1) else {
        return Ok(false);
    };
    let l2 = *l2;
    let dest2 = cursor.destination(l2)?;
    if let Some(after_dest2) = cursor.next_of(dest2) {
        if matches!(cursor.data_of(after_dest2), InstData::Goto(_)) {
            return Ok(false);
        }
    }
    let pos = cursor.position().unwrap();
    cursor.droplabel(l1)?;
    cursor.copylabel(l2);
    cursor.set_label(pos, l2);
    cursor.mark_progress();
    Ok(true)
}

/// A label mark with no remaining references → `nop`.
pub fn remove_dead_label(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    let Some(InstData::LabelMark(l)) = cursor.data_at(0) else {
        return Ok(false);
    };
    let l = *l;
    if cursor.refcount(l) == 0 {
        cursor.clear_node(l);
        Ok(cursor.replace(1, [InstData::Nop]))
    } else {
        Ok(false)
    }
}

/// A node using `L1` whose target is immediately followed by another label
/// mark `L2` (two adjacent label definitions) → retarget it straight to `L2`.
pub fn fuse_labels(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    let Some(inst) = cursor.data_at(0) else {
        return Ok(false);
    };
    let Some(l1) = inst.label_target() else {
        return Ok(false);
    };
    let dest1 = cursor.destination(l1)?;
    let Some(after_dest1) = cursor.next_of(dest1) else {
        return Ok(false);
    };
    let Some(InstData::LabelMark(l2)) = cursor.data_of(after_dest1) else {
        return Ok(false);
    };
    let l2 = *l2;
    let pos = cursor.position().unwrap();
    cursor.droplabel(l1)?;
    cursor.copylabel(l2);
    cursor.set_label(pos, l2);
    cursor.mark_progress();
    Ok(true)
}

/// Any instruction right after a `goto`, other than a label mark (which might
/// still be a jump target for other code) → `nop`, dropping the label
/// reference if the erased instruction was itself a jump. Not counted as a
/// firing: it's bookkeeping the terminator rules trigger, not a rewrite of
/// its own.
pub fn remove_instruction_after_goto(
    cursor: &mut Cursor,
    _config: &OptimizerConfig,
) -> Result<bool, PeepholeError> {
    if !matches!(cursor.data_at(0), Some(InstData::Goto(_))) {
        return Ok(false);
    }
    let Some(next) = cursor.data_at(1) else {
        return Ok(false);
    };
    if next.is_label_mark() {
        return Ok(false);
    }
    let dead_label = next.label_target();
    cursor.advance();
    if let Some(l) = dead_label {
        cursor.droplabel(l)?;
    }
    Ok(cursor.replace_modified(1, [InstData::Nop]))
}

/// Same as [`remove_instruction_after_goto`], for any `return` variant.
pub fn remove_instruction_after_return(
    cursor: &mut Cursor,
    _config: &OptimizerConfig,
) -> Result<bool, PeepholeError> {
    let Some(cur) = cursor.data_at(0) else {
        return Ok(false);
    };
    let is_return = matches!(
        cur,
        InstData::ReturnVoid | InstData::ReturnInt | InstData::ReturnRef
    );
    if !is_return {
        return Ok(false);
    }
    let Some(next) = cursor.data_at(1) else {
        return Ok(false);
    };
    if next.is_label_mark() {
        return Ok(false);
    }
    let dead_label = next.label_target();
    cursor.advance();
    if let Some(l) = dead_label {
        cursor.droplabel(l)?;
    }
    Ok(cursor.replace_modified(1, [InstData::Nop]))
}

/// `goto L1; L1:` → `nop`, dropping the reference `goto` held to `L1`.
pub fn remove_unnecessary_goto(
    cursor: &mut Cursor,
    _config: &OptimizerConfig,
) -> Result<bool, PeepholeError> {
    let Some(InstData::Goto(l1)) = cursor.data_at(0) else {
        return Ok(false);
    };
    let l1 = *l1;
    let Some(InstData::LabelMark(l2)) = cursor.data_at(1) else {
        return Ok(false);
    };
    if *l2 != l1 {
        return Ok(false);
    }
    cursor.droplabel(l1)?;
    Ok(cursor.replace(1, [InstData::Nop]))
}

/// `dup; (ifzero|ifnonzero) L1; pop` where `L1` targets the *same-sense*
/// branch to `L2` → a single branch of that sense straight to `L2`.
pub fn simplify_dup_ifeq_ifeq(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    if !matches!(cursor.data_at(0), Some(InstData::Dup)) {
        return Ok(false);
    }
    let Some(sense0) = cursor.data_at(1) else {
        return Ok(false);
    };
    let (nonzero, l1) = match sense0 {
        InstData::IfZero(l) => (false, *l),
        InstData::IfNonZero(l) => (true, *l),
        _ => return Ok(false),
    };
    if !matches!(cursor.data_at(2), Some(InstData::Pop)) {
        return Ok(false);
    }
    let dest1 = cursor.destination(l1)?;
    let Some(after_dest1) = cursor.next_of(dest1) else {
        return Ok(false);
    };
    let l2 = match cursor.data_of(after_dest1) {
        InstData::IfZero(l) if !nonzero => *l,
        InstData::IfNonZero(l) if nonzero => *l,
        _ => return Ok(false),
    };
    cursor.droplabel(l1)?;
    cursor.copylabel(l2);
    let merged = if nonzero {
        InstData::IfNonZero(l2)
    } else {
        InstData::IfZero(l2)
    };
    Ok(cursor.replace(3, [merged]))
}

/// `dup; (ifzero|ifnonzero) L1; pop` where `L1` targets the *opposite-sense*
/// branch to `L2` → a single branch of the original sense to a fresh label
/// spliced in right after that far branch.
pub fn simplify_dup_ifeq_ifne(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    if !matches!(cursor.data_at(0), Some(InstData::Dup)) {
        return Ok(false);
    }
    let Some(sense0) = cursor.data_at(1) else {
        return Ok(false);
    };
    let (nonzero, l1) = match sense0 {
        InstData::IfZero(l) => (false, *l),
        InstData::IfNonZero(l) => (true, *l),
        _ => return Ok(false),
    };
    if !matches!(cursor.data_at(2), Some(InstData::Pop)) {
        return Ok(false);
    }
    let dest1 = cursor.destination(l1)?;
    let Some(after_dest1) = cursor.next_of(dest1) else {
        return Ok(false);
    };
    let opposite_matches = matches!(
        (cursor.data_of(after_dest1), nonzero),
        (InstData::IfZero(_), true) | (InstData::IfNonZero(_), false)
    );
    if !opposite_matches {
        return Ok(false);
    }
    cursor.droplabel(l1)?;
    let l3 = cursor.next_label();
    let new_mark = cursor.insert_after(Some(after_dest1), InstData::LabelMark(l3));
    cursor.insert_new_label(l3, new_mark, 1);
    let merged = if nonzero {
        InstData::IfNonZero(l3)
    } else {
        InstData::IfZero(l3)
    };
    Ok(cursor.replace(3, [merged]))
}

/// `push_int v (v != 0); dup; ifzero L; pop` → `nop`, dropping the reference
/// to `L` (the branch is never taken).
pub fn simplify_iconst_1_dup_ifeq_pop(
    cursor: &mut Cursor,
    _config: &OptimizerConfig,
) -> Result<bool, PeepholeError> {
    let Some(InstData::PushInt(v)) = cursor.data_at(0) else {
        return Ok(false);
    };
    if *v == 0 {
        return Ok(false);
    }
    if !matches!(cursor.data_at(1), Some(InstData::Dup)) {
        return Ok(false);
    }
    let Some(InstData::IfZero(l)) = cursor.data_at(2) else {
        return Ok(false);
    };
    let l = *l;
    if !matches!(cursor.data_at(3), Some(InstData::Pop)) {
        return Ok(false);
    }
    cursor.droplabel(l)?;
    Ok(cursor.replace(4, [InstData::Nop]))
}

/// A `nop` with a successor (never the last node in the stream) → deleted
/// outright. The one rule in the catalog allowed to replace with nothing:
/// every other rewrite that erases code leaves a `nop` for this rule to
/// sweep up.
pub fn remove_nop(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    if !matches!(cursor.data_at(0), Some(InstData::Nop)) {
        return Ok(false);
    }
    if cursor.nth(1).is_none() {
        return Ok(false);
    }
    Ok(cursor.replace(1, []))
}
