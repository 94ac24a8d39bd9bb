//! The rule registry and the fixed-point sweep.

use crate::error::PeepholeError;
use crate::ir::{Cursor, Stream};
use crate::rules;
use crate::OptimizerConfig;

/// A named rewrite rule: a function from a cursor positioned at a candidate
/// window to whether it rewrote that window.
///
/// Rules are plain function pointers, not closures, so the catalog can be a
/// `'static` table built once and the registration order stays visible in
/// one place (`rules::default_catalog`) rather than scattered across
/// `register_rule` call sites built at runtime.
pub type Matcher = fn(&mut Cursor, &OptimizerConfig) -> Result<bool, PeepholeError>;

#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub matcher: Matcher,
}

/// An ordered collection of rewrite rules. Registration order is the only
/// source of determinism when more than one rule could fire at the same
/// position, so `register_rule` appends rather than sorting or deduplicating.
#[derive(Default, Clone)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_rule(&mut self, name: &'static str, matcher: Matcher) -> &mut Self {
        self.rules.push(Rule { name, matcher });
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Sweep and rule-firing counts from a completed optimization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeReport {
    pub sweeps: u32,
    pub rule_firings: u32,
}

/// Apply the default rule catalog to `stream` until a complete sweep fires
/// no rule, in the registration order `rules::default_catalog` returns.
///
/// Any rule firing restarts the scan from the head: a replacement can change
/// predecessor links in ways that re-enable a rule at an earlier position.
pub fn optimize(stream: &mut Stream, config: &OptimizerConfig) -> Result<OptimizeReport, PeepholeError> {
    let registry = rules::default_catalog();
    let mut report = OptimizeReport::default();

    loop {
        report.sweeps += 1;
        let mut progress = false;
        let mut cursor = Cursor::at_head(stream);

        while !cursor.at_end() {
            let mut fired = false;
            for rule in registry.rules() {
                if (rule.matcher)(&mut cursor, config)? {
                    fired = true;
                    progress = true;
                    if cursor.last_edit_counted() {
                        report.rule_firings += 1;
                    }
                    log::trace!("rule {} fired", rule.name);
                    break;
                }
            }
            if fired {
                cursor = Cursor::at_head(stream);
            } else {
                cursor.advance();
            }
        }

        log::debug!(
            "sweep {} made progress: {} (total firings so far: {})",
            report.sweeps,
            progress,
            report.rule_firings
        );
        if !progress {
            break;
        }
    }

    Ok(report)
}
