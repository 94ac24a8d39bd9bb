//! Peephole optimizer for a stack-based bytecode back end.
//!
//! This crate consumes the linear instruction stream a code generator
//! produces for one method body ([`ir::Stream`]), repeatedly applies local
//! rewrite rules ([`rules`]) via [`driver::optimize`] until none fire, and
//! hands the rewritten stream back for a downstream assembly writer to
//! serialize. It does not parse, type-check, generate code, or read/write any
//! textual format — those are external collaborators that produce or consume
//! the `Stream` this crate operates on.

pub mod driver;
pub mod error;
pub mod ir;
mod rules;

pub use driver::{optimize, OptimizeReport};
pub use error::PeepholeError;

/// Knobs for the optimizer that spec.md's Open Questions leave for an
/// implementation to fix explicitly, rather than burying as inline magic
/// numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizerConfig {
    /// Enable the `factor_instruction_risky`/`factor_instruction2_risky`
    /// rules, which merge `getfield`/`putfield`/`invoke_virtual` instructions
    /// across a control-flow split. These are known to be unsound against
    /// stack-type verification at the merge point they introduce (spec.md
    /// §9), so they default to off.
    pub enable_risky_factoring: bool,

    /// The forward-walk budget `remove_dead_store` uses to bound its search
    /// for a reachable load of the slot being stored to. Spec.md §4.3 fixes
    /// this at 200 forward instructions.
    pub dead_store_budget: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            enable_risky_factoring: false,
            dead_store_budget: 200,
        }
    }
}
