//! The rule capability contract
//!
//! One rule checks one legal condition. Rules are gated by a requirement key
//! on the visa side; a visa that never mentions the condition makes the rule
//! not applicable, which is an explicit `None` — never a silent default that
//! could be confused with an unresolved product fact.

use crate::verdict::RuleOutcome;
use visacover_core::{Product, Visa};

/// One compliance check over a (visa, product) pair.
///
/// Implementations are stateless and read-only: the same inputs always
/// produce the same outcome, and a chain of rules can be shared freely
/// across threads.
pub trait ComplianceRule: Send + Sync {
    /// Human-readable name for decision logs.
    fn name(&self) -> &'static str;

    /// Check the pair.
    ///
    /// Returns `None` when the rule does not apply — the governing
    /// requirement is absent, or present but not at its triggering value.
    /// A `Some` outcome always contributes to the fold (or, for terminal
    /// outcomes, ends it).
    fn check(&self, visa: &Visa, product: &Product) -> Option<RuleOutcome>;
}
