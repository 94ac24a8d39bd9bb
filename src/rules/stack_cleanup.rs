//! Redundant stack traffic: dup/pop collapses, store-then-load idioms, and
//! the pure-expression cleanups.

use crate::error::PeepholeError;
use crate::ir::{Cursor, EffectClass, InstData};
use crate::OptimizerConfig;

/// `dup; X; pop` → `X`, for any `X` that is a normal (non-branching)
/// instruction consuming exactly one stack value and leaving the stack one
/// shorter. Subsumes the narrower "dup; store_ref k; pop" idiom: `StoreRef`
/// and `StoreInt` both satisfy the same delta/used shape.
pub fn simplify_dup_xxx_pop(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    if !matches!(cursor.data_at(0), Some(InstData::Dup)) {
        return Ok(false);
    }
    let Some(x_pos) = cursor.nth(1) else {
        return Ok(false);
    };
    let effect = cursor.stack_effect_of(x_pos);
    if effect.class != EffectClass::Normal || effect.delta != -1 || effect.used != 1 {
        return Ok(false);
    }
    if !matches!(cursor.data_at(2), Some(InstData::Pop)) {
        return Ok(false);
    }
    let x = cursor.data_of(x_pos).clone();
    Ok(cursor.replace(3, [x]))
}

/// `dup; pop` → `nop` (erased by `remove_nop` on a later sweep).
pub fn dup_pop(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    if matches!(cursor.data_at(0), Some(InstData::Dup)) && matches!(cursor.data_at(1), Some(InstData::Pop)) {
        Ok(cursor.replace(2, [InstData::Nop]))
    } else {
        Ok(false)
    }
}

/// `dup; load_ref k; swap; putfield f; pop` → `load_ref k; swap; putfield f`.
pub fn simplify_member_store(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    let Some(InstData::Dup) = cursor.data_at(0) else {
        return Ok(false);
    };
    let Some(InstData::LoadRef(k)) = cursor.data_at(1) else {
        return Ok(false);
    };
    let k = *k;
    if !matches!(cursor.data_at(2), Some(InstData::Swap)) {
        return Ok(false);
    }
    let Some(InstData::PutField(f)) = cursor.data_at(3) else {
        return Ok(false);
    };
    let f = f.clone();
    if !matches!(cursor.data_at(4), Some(InstData::Pop)) {
        return Ok(false);
    }
    Ok(cursor.replace(5, [InstData::LoadRef(k), InstData::Swap, InstData::PutField(f)]))
}

/// `store_ref k; load_ref k` → `dup; store_ref k`.
pub fn simplify_astore_aload(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    let Some(InstData::StoreRef(a)) = cursor.data_at(0) else {
        return Ok(false);
    };
    let a = *a;
    match cursor.data_at(1) {
        Some(InstData::LoadRef(b)) if *b == a => {
            Ok(cursor.replace(2, [InstData::Dup, InstData::StoreRef(a)]))
        }
        _ => Ok(false),
    }
}

/// `store_int k; load_int k` → `dup; store_int k`.
pub fn simplify_istore_iload(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    let Some(InstData::StoreInt(a)) = cursor.data_at(0) else {
        return Ok(false);
    };
    let a = *a;
    match cursor.data_at(1) {
        Some(InstData::LoadInt(b)) if *b == a => {
            Ok(cursor.replace(2, [InstData::Dup, InstData::StoreInt(a)]))
        }
        _ => Ok(false),
    }
}

/// `load_ref k; store_ref k` → `nop`.
pub fn simplify_aload_astore(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    let Some(InstData::LoadRef(a)) = cursor.data_at(0) else {
        return Ok(false);
    };
    let a = *a;
    match cursor.data_at(1) {
        Some(InstData::StoreRef(b)) if *b == a => Ok(cursor.replace(2, [InstData::Nop])),
        _ => Ok(false),
    }
}

/// `load_int k; store_int k` → `nop`.
pub fn simplify_iload_istore(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    let Some(InstData::LoadInt(a)) = cursor.data_at(0) else {
        return Ok(false);
    };
    let a = *a;
    match cursor.data_at(1) {
        Some(InstData::StoreInt(b)) if *b == a => Ok(cursor.replace(2, [InstData::Nop])),
        _ => Ok(false),
    }
}

/// A pure single-push instruction followed by `pop` → `nop`.
pub fn basic_expression_pop(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    let Some(x) = cursor.data_at(0) else {
        return Ok(false);
    };
    if !x.is_pure_single_push() {
        return Ok(false);
    }
    if matches!(cursor.data_at(1), Some(InstData::Pop)) {
        Ok(cursor.replace(2, [InstData::Nop]))
    } else {
        Ok(false)
    }
}

/// Two pure single-push instructions followed by `swap` → the same two
/// instructions in swapped textual order, with the `swap` dropped.
pub fn basic_unswap(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    let Some(a) = cursor.data_at(0) else {
        return Ok(false);
    };
    if !a.is_pure_single_push() {
        return Ok(false);
    }
    let Some(b) = cursor.data_at(1) else {
        return Ok(false);
    };
    if !b.is_pure_single_push() {
        return Ok(false);
    }
    if !matches!(cursor.data_at(2), Some(InstData::Swap)) {
        return Ok(false);
    }
    let (a, b) = (a.clone(), b.clone());
    Ok(cursor.replace(3, [b, a]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Stream;

    #[test]
    fn dup_store_ref_pop_collapses() {
        let mut stream = Stream::from_instructions([
            InstData::Dup,
            InstData::StoreRef(2),
            InstData::Pop,
            InstData::ReturnVoid,
        ]);
        let config = OptimizerConfig::default();
        let mut cursor = Cursor::at_head(&mut stream);
        assert!(simplify_dup_xxx_pop(&mut cursor, &config).unwrap());
        assert_eq!(
            stream.iter().map(|(_, d)| d.clone()).collect::<Vec<_>>(),
            vec![InstData::StoreRef(2), InstData::ReturnVoid]
        );
    }

    #[test]
    fn dup_xxx_pop_needs_a_third_instruction() {
        let mut stream = Stream::from_instructions([InstData::Dup, InstData::Pop]);
        let config = OptimizerConfig::default();
        let mut cursor = Cursor::at_head(&mut stream);
        assert!(!simplify_dup_xxx_pop(&mut cursor, &config).unwrap());
    }

    #[test]
    fn unswap_reorders_pure_pushes() {
        let mut stream =
            Stream::from_instructions([InstData::PushInt(1), InstData::PushInt(2), InstData::Swap]);
        let config = OptimizerConfig::default();
        let mut cursor = Cursor::at_head(&mut stream);
        assert!(basic_unswap(&mut cursor, &config).unwrap());
        assert_eq!(
            stream.iter().map(|(_, d)| d.clone()).collect::<Vec<_>>(),
            vec![InstData::PushInt(2), InstData::PushInt(1)]
        );
    }
}
