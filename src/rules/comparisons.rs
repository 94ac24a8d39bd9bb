//! Folding a constant push into the comparison that immediately follows it.

use crate::error::PeepholeError;
use crate::ir::{Cursor, IntCc, InstData, RefCc};
use crate::OptimizerConfig;

/// `push_int 0; icmpeq|icmpne L` → `ifzero L` / `ifnonzero L`.
pub fn simplify_icmp_0(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    if !matches!(cursor.data_at(0), Some(InstData::PushInt(0))) {
        return Ok(false);
    }
    match cursor.data_at(1) {
        Some(InstData::ICmp(IntCc::Eq, l)) => {
            let l = *l;
            Ok(cursor.replace(2, [InstData::IfZero(l)]))
        }
        Some(InstData::ICmp(IntCc::Ne, l)) => {
            let l = *l;
            Ok(cursor.replace(2, [InstData::IfNonZero(l)]))
        }
        _ => Ok(false),
    }
}

/// `push_null; acmpeq|acmpne L` → `ifnull L` / `ifnonnull L`.
pub fn simplify_acmp_null(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    if !matches!(cursor.data_at(0), Some(InstData::PushNull)) {
        return Ok(false);
    }
    match cursor.data_at(1) {
        Some(InstData::ACmp(RefCc::Eq, l)) => {
            let l = *l;
            Ok(cursor.replace(2, [InstData::IfNull(l)]))
        }
        Some(InstData::ACmp(RefCc::Ne, l)) => {
            let l = *l;
            Ok(cursor.replace(2, [InstData::IfNonNull(l)]))
        }
        _ => Ok(false),
    }
}

/// `is_boolcmp`: an `ifzero`/`ifnonzero` instruction, reported as (truth
/// value it requires on top-of-stack, target label).
pub(crate) fn bool_cmp(inst: &InstData) -> Option<(bool, crate::ir::Label)> {
    match *inst {
        InstData::IfZero(l) => Some((false, l)),
        InstData::IfNonZero(l) => Some((true, l)),
        _ => None,
    }
}

/// `push_int v; ifzero L` / `ifnonzero L`: if the branch is always taken,
/// collapse to `goto L`; if never taken, delete both and drop the reference
/// to `L`.
pub fn remove_iconst_ifeq(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    let Some(InstData::PushInt(v)) = cursor.data_at(0) else {
        return Ok(false);
    };
    let v = *v;
    let Some(next) = cursor.data_at(1) else {
        return Ok(false);
    };
    let Some((wants_nonzero, l)) = bool_cmp(next) else {
        return Ok(false);
    };
    if (v != 0) == wants_nonzero {
        Ok(cursor.replace(2, [InstData::Goto(l)]))
    } else {
        cursor.droplabel(l)?;
        Ok(cursor.replace(2, [InstData::Nop]))
    }
}
