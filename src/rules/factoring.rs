//! Cross-branch instruction factoring: when two control-flow paths both run
//! an equal instruction right before merging, split a fresh label in so the
//! instruction exists once and both paths jump past it.

use crate::error::PeepholeError;
use crate::ir::{Cursor, Inst, InstData};
use crate::OptimizerConfig;

type Equal = fn(&InstData, &InstData) -> bool;

/// `X; goto L1`, where a later `X` (by `equal`) is followed by `goto L2` or
/// directly by `label L2` with `L1 == L2` → splice a fresh label right before
/// that later `X` and collapse the current window to `goto` it.
fn factor_before_goto(
    cursor: &mut Cursor,
    equal: Equal,
) -> Result<bool, PeepholeError> {
    let Some(x) = cursor.data_at(0) else {
        return Ok(false);
    };
    if x.is_label_mark() {
        return Ok(false);
    }
    let x = x.clone();
    let Some(InstData::Goto(l1)) = cursor.data_at(1) else {
        return Ok(false);
    };
    let l1 = *l1;

    let mut prev: Option<Inst> = cursor.nth(1);
    let mut pos = prev.and_then(|p| cursor.next_of(p));
    while let Some(candidate) = pos {
        if equal(&x, cursor.data_of(candidate)) {
            if let Some(after) = cursor.next_of(candidate) {
                let l2 = match cursor.data_of(after) {
                    InstData::Goto(l) => Some(*l),
                    InstData::LabelMark(l) => Some(*l),
                    _ => None,
                };
                if l2 == Some(l1) {
                    let l3 = cursor.next_label();
                    let mark = cursor.insert_after(prev, InstData::LabelMark(l3));
                    cursor.insert_new_label(l3, mark, 1);
                    cursor.droplabel(l1)?;
                    return Ok(cursor.replace(2, [InstData::Goto(l3)]));
                }
            }
        }
        prev = Some(candidate);
        pos = cursor.next_of(candidate);
    }
    Ok(false)
}

/// `X; label L1`, where a later `X` (by `equal`) is followed by `goto L2`
/// with `L1 == L2` → splice a fresh label right before the *current* `X` and
/// collapse the later `X; goto L2` window to `goto` it.
fn factor_before_label(
    cursor: &mut Cursor,
    equal: Equal,
) -> Result<bool, PeepholeError> {
    let Some(x) = cursor.data_at(0) else {
        return Ok(false);
    };
    if x.is_label_mark() {
        return Ok(false);
    }
    let x = x.clone();
    let Some(InstData::LabelMark(l1)) = cursor.data_at(1) else {
        return Ok(false);
    };
    let l1 = *l1;

    let mut prev: Option<Inst> = cursor.nth(1);
    let mut pos = prev.and_then(|p| cursor.next_of(p));
    while let Some(candidate) = pos {
        if equal(&x, cursor.data_of(candidate)) {
            if let Some(after) = cursor.next_of(candidate) {
                if let InstData::Goto(l2) = cursor.data_of(after) {
                    if *l2 == l1 {
                        let before = prev;
                        let l3 = cursor.next_label();
                        let anchor = cursor.prev_position();
                        let mark = cursor.insert_after(anchor, InstData::LabelMark(l3));
                        cursor.insert_new_label(l3, mark, 1);
                        cursor.droplabel(l1)?;
                        cursor.replace_at(before, candidate, 2, [InstData::Goto(l3)]);
                        cursor.mark_progress();
                        return Ok(true);
                    }
                }
            }
        }
        prev = Some(candidate);
        pos = cursor.next_of(candidate);
    }
    Ok(false)
}

pub fn factor_instruction(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    factor_before_goto(cursor, InstData::safe_equal)
}

pub fn factor_instruction2(cursor: &mut Cursor, _config: &OptimizerConfig) -> Result<bool, PeepholeError> {
    factor_before_label(cursor, InstData::safe_equal)
}

pub fn factor_instruction_risky(
    cursor: &mut Cursor,
    config: &OptimizerConfig,
) -> Result<bool, PeepholeError> {
    if !config.enable_risky_factoring {
        return Ok(false);
    }
    factor_before_goto(cursor, InstData::risky_equal)
}

pub fn factor_instruction2_risky(
    cursor: &mut Cursor,
    config: &OptimizerConfig,
) -> Result<bool, PeepholeError> {
    if !config.enable_risky_factoring {
        return Ok(false);
    }
    factor_before_label(cursor, InstData::risky_equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Label, Stream};
    use std::rc::Rc;

    #[test]
    fn factor_before_goto_merges_equal_tails() {
        let l1 = Label::from_u32(0);
        let l2 = Label::from_u32(1);
        let mut stream = Stream::from_instructions([
            InstData::PushInt(7),
            InstData::Goto(l1),
            InstData::LabelMark(l2),
            InstData::Pop,
            InstData::PushInt(7),
            InstData::LabelMark(l1),
            InstData::ReturnVoid,
        ]);
        let config = OptimizerConfig::default();
        let mut cursor = Cursor::at_head(&mut stream);
        assert!(factor_instruction(&mut cursor, &config).unwrap());
        assert!(matches!(
            stream.get(stream.head().unwrap()),
            InstData::Goto(_)
        ));
        assert_eq!(stream.labels().refcount(l1), 0);
    }

    #[test]
    fn factor_before_label_merges_equal_heads() {
        let l1 = Label::from_u32(0);
        let mut stream = Stream::from_instructions([
            InstData::PushInt(9),
            InstData::LabelMark(l1),
            InstData::Pop,
            InstData::PushInt(9),
            InstData::Goto(l1),
            InstData::ReturnVoid,
        ]);
        let config = OptimizerConfig::default();
        let mut cursor = Cursor::at_head(&mut stream);
        assert!(factor_instruction2(&mut cursor, &config).unwrap());
        assert_eq!(stream.labels().refcount(l1), 0);
    }

    #[test]
    fn risky_factoring_is_off_by_default() {
        let l1 = Label::from_u32(0);
        let l2 = Label::from_u32(1);
        let descriptor: Rc<str> = Rc::from("Foo/bar:I");
        let mut stream = Stream::from_instructions([
            InstData::GetField(descriptor.clone()),
            InstData::Goto(l1),
            InstData::LabelMark(l2),
            InstData::Pop,
            InstData::GetField(descriptor),
            InstData::LabelMark(l1),
            InstData::ReturnVoid,
        ]);
        let config = OptimizerConfig::default();
        let mut cursor = Cursor::at_head(&mut stream);
        assert!(!factor_instruction_risky(&mut cursor, &config).unwrap());
    }
}
