//! Error types for the decision core.

use thiserror::Error;

/// Errors surfaced by the decision core. Most internal failures are absorbed
/// where they occur (rule predicates, advisory producers); these variants
/// cover what still escapes to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A governor rule predicate failed to evaluate. Never escapes
    /// `DomainRuleEngine::evaluate` (the rule is treated as non-matching);
    /// predicates use this variant to describe what went wrong.
    #[error("rule predicate '{rule}' failed: {detail}")]
    RulePredicate {
        rule: &'static str,
        detail: String,
    },

    /// An advisory producer failed outright before the deadline race.
    #[error("advisory producer '{producer}' failed: {detail}")]
    Advisory {
        producer: &'static str,
        detail: String,
    },

    /// Engine configuration could not be parsed.
    #[error("invalid engine configuration: {0}")]
    Config(String),
}
