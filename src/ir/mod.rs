//! The in-memory representation the optimizer rewrites: instructions,
//! labels, the stream that links them, and the cursor rules use to walk it.

mod cursor;
mod entities;
mod instruction;
mod label_table;
mod stream;

pub use cursor::Cursor;
pub use entities::{Inst, Label};
pub use instruction::{
    stack_effect, EffectClass, InstData, IntCc, RefCc, StackEffect, STRING_CONCAT_DESCRIPTOR,
};
pub use label_table::LabelTable;
pub use stream::{Stream, StreamIter};
