//! The two string-literal idioms the front end emits for `== null` checks
//! against interned constants: a direct `ldc` and the result of
//! `String.concat`, both of which are never-null once they reach this form.

use crate::error::PeepholeError;
use crate::ir::{Cursor, InstData, STRING_CONCAT_DESCRIPTOR};
use crate::OptimizerConfig;

/// `push_string s; dup; ifnonnull L` → `push_string s; goto L`. A string
/// literal is never null, so the branch is always taken.
pub fn simplify_ldc_string_ifnonnull(
    cursor: &mut Cursor,
    _config: &OptimizerConfig,
) -> Result<bool, PeepholeError> {
    let Some(InstData::PushString(s)) = cursor.data_at(0) else {
        return Ok(false);
    };
    let s = s.clone();
    if !matches!(cursor.data_at(1), Some(InstData::Dup)) {
        return Ok(false);
    }
    let Some(InstData::IfNonNull(l)) = cursor.data_at(2) else {
        return Ok(false);
    };
    let l = *l;
    Ok(cursor.replace(3, [InstData::PushString(s), InstData::Goto(l)]))
}

/// `invoke_virtual(String.concat); dup; ifnonnull L` → keep the call, replace
/// the follow-up with `goto L`. `String.concat` never returns null.
pub fn simplify_concat_string_ifnonnull(
    cursor: &mut Cursor,
    _config: &OptimizerConfig,
) -> Result<bool, PeepholeError> {
    let Some(InstData::InvokeVirtual(descriptor)) = cursor.data_at(0) else {
        return Ok(false);
    };
    if &**descriptor != STRING_CONCAT_DESCRIPTOR {
        return Ok(false);
    }
    if !matches!(cursor.data_at(1), Some(InstData::Dup)) {
        return Ok(false);
    }
    let Some(InstData::IfNonNull(l)) = cursor.data_at(2) else {
        return Ok(false);
    };
    let l = *l;
    cursor.advance();
    Ok(cursor.replace(2, [InstData::Goto(l)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Label, Stream};
    use std::rc::Rc;

    #[test]
    fn ldc_string_ifnonnull_collapses_to_goto() {
        let l = Label::from_u32(0);
        let s: Rc<str> = Rc::from("hello");
        let mut stream = Stream::from_instructions([
            InstData::PushString(s.clone()),
            InstData::Dup,
            InstData::IfNonNull(l),
            InstData::LabelMark(l),
        ]);
        let config = OptimizerConfig::default();
        let mut cursor = Cursor::at_head(&mut stream);
        assert!(simplify_ldc_string_ifnonnull(&mut cursor, &config).unwrap());
        assert_eq!(
            stream.iter().map(|(_, d)| d.clone()).collect::<Vec<_>>(),
            vec![InstData::PushString(s), InstData::Goto(l), InstData::LabelMark(l)]
        );
    }

    #[test]
    fn concat_result_ifnonnull_keeps_the_call() {
        let l = Label::from_u32(0);
        let descriptor: Rc<str> = Rc::from(STRING_CONCAT_DESCRIPTOR);
        let mut stream = Stream::from_instructions([
            InstData::InvokeVirtual(descriptor.clone()),
            InstData::Dup,
            InstData::IfNonNull(l),
            InstData::LabelMark(l),
        ]);
        let config = OptimizerConfig::default();
        let mut cursor = Cursor::at_head(&mut stream);
        assert!(simplify_concat_string_ifnonnull(&mut cursor, &config).unwrap());
        assert_eq!(
            stream.iter().map(|(_, d)| d.clone()).collect::<Vec<_>>(),
            vec![InstData::InvokeVirtual(descriptor), InstData::Goto(l), InstData::LabelMark(l)]
        );
    }
}
