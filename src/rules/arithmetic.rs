//! Constant folding and strength reduction over integer arithmetic.

use crate::error::PeepholeError;
use crate::ir::{Cursor, InstData};
use crate::OptimizerConfig;

/// `push_int a; push_int b; add|mul` → `push_int (a+b)` / `push_int (a*b)`.
pub fn constant_fold(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    let (Some(InstData::PushInt(a)), Some(InstData::PushInt(b))) =
        (cursor.data_at(0), cursor.data_at(1))
    else {
        return Ok(false);
    };
    let (a, b) = (*a, *b);
    let folded = match cursor.data_at(2) {
        Some(InstData::Add) => a.wrapping_add(b),
        Some(InstData::Mul) => a.wrapping_mul(b),
        _ => return Ok(false),
    };
    Ok(cursor.replace(3, [InstData::PushInt(folded)]))
}

/// `load_int k; push_int c; mul` → strength-reduced form, or no rewrite for
/// any `c` outside `{0, 1, 2}`.
pub fn simplify_multiplication_right(
    cursor: &mut Cursor,
    _config: &OptimizerConfig,
) -> Result<bool, PeepholeError> {
    let Some(InstData::LoadInt(k)) = cursor.data_at(0) else {
        return Ok(false);
    };
    let k = *k;
    let Some(InstData::PushInt(c)) = cursor.data_at(1) else {
        return Ok(false);
    };
    let c = *c;
    if !matches!(cursor.data_at(2), Some(InstData::Mul)) {
        return Ok(false);
    }
    let replacement: Vec<InstData> = match c {
        0 => vec![InstData::PushInt(0)],
        1 => vec![InstData::LoadInt(k)],
        2 => vec![InstData::LoadInt(k), InstData::Dup, InstData::Add],
        _ => return Ok(false),
    };
    Ok(cursor.replace(3, replacement))
}

/// `load_int k; push_int c; add; store_int k` (0 ≤ c ≤ 127) → `inc k by c`.
pub fn positive_increment(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    increment_rule(cursor, true)
}

/// `load_int k; push_int c; sub; store_int k` (0 ≤ c ≤ 127) → `inc k by -c`.
pub fn negative_increment(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    increment_rule(cursor, false)
}

fn increment_rule(cursor: &mut Cursor, positive: bool) -> Result<bool, PeepholeError> {
    let Some(InstData::LoadInt(k)) = cursor.data_at(0) else {
        return Ok(false);
    };
    let k = *k;
    let Some(InstData::PushInt(c)) = cursor.data_at(1) else {
        return Ok(false);
    };
    let c = *c;
    let op_matches = match cursor.data_at(2) {
        Some(InstData::Add) => positive,
        Some(InstData::Sub) => !positive,
        _ => false,
    };
    if !op_matches {
        return Ok(false);
    }
    let Some(InstData::StoreInt(k2)) = cursor.data_at(3) else {
        return Ok(false);
    };
    if *k2 != k || !(0..=127).contains(&c) {
        return Ok(false);
    }
    let delta = if positive { c as i8 } else { -(c as i8) };
    Ok(cursor.replace(4, [InstData::Inc(k, delta)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Stream;

    #[test]
    fn folds_constant_add() {
        let mut stream = Stream::from_instructions([
            InstData::PushInt(2),
            InstData::PushInt(3),
            InstData::Add,
            InstData::ReturnInt,
        ]);
        let config = OptimizerConfig::default();
        let mut cursor = Cursor::at_head(&mut stream);
        assert!(constant_fold(&mut cursor, &config).unwrap());
        assert_eq!(stream.iter().map(|(_, d)| d.clone()).collect::<Vec<_>>(), vec![
            InstData::PushInt(5),
            InstData::ReturnInt,
        ]);
    }

    #[test]
    fn multiply_by_zero_drops_load() {
        let mut stream = Stream::from_instructions([
            InstData::LoadInt(1),
            InstData::PushInt(0),
            InstData::Mul,
            InstData::StoreInt(2),
        ]);
        let config = OptimizerConfig::default();
        let mut cursor = Cursor::at_head(&mut stream);
        assert!(simplify_multiplication_right(&mut cursor, &config).unwrap());
        assert_eq!(
            stream.iter().map(|(_, d)| d.clone()).collect::<Vec<_>>(),
            vec![InstData::PushInt(0), InstData::StoreInt(2)]
        );
    }

    #[test]
    fn positive_increment_collapses_to_inc() {
        let mut stream = Stream::from_instructions([
            InstData::LoadInt(3),
            InstData::PushInt(5),
            InstData::Add,
            InstData::StoreInt(3),
            InstData::ReturnVoid,
        ]);
        let config = OptimizerConfig::default();
        let mut cursor = Cursor::at_head(&mut stream);
        assert!(positive_increment(&mut cursor, &config).unwrap());
        assert_eq!(
            stream.iter().map(|(_, d)| d.clone()).collect::<Vec<_>>(),
            vec![InstData::Inc(3, 5), InstData::ReturnVoid]
        );
    }

    #[test]
    fn increment_out_of_byte_range_does_not_fire() {
        let mut stream = Stream::from_instructions([
            InstData::LoadInt(3),
            InstData::PushInt(200),
            InstData::Add,
            InstData::StoreInt(3),
        ]);
        let config = OptimizerConfig::default();
        let mut cursor = Cursor::at_head(&mut stream);
        assert!(!positive_increment(&mut cursor, &config).unwrap());
    }
}
