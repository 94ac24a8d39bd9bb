//! Fatal internal-invariant errors.
//!
//! The optimizer does not fail on any well-formed input. The variants here
//! can only arise from a bug in this crate or from an ill-formed stream
//! handed in by the code generator; a rule that merely fails to match a
//! window returns `false`, it never produces one of these.
//!
//! Styled after `cranelift_codegen::isa::fde::RegisterMappingError`.

use crate::ir::Label;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeepholeError {
    #[error("label {0:?} has no defining instruction in the stream")]
    MissingLabel(Label),

    #[error("reference count for label {0:?} would go negative")]
    NegativeLabelRefcount(Label),

    #[error("stream is not well-formed: {0}")]
    Malformed(&'static str),
}
