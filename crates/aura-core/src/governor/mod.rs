//! Domain governor: static rules over the turn classification, merged by
//! precedence into one `MergedEffect`.
//!
//! Evaluation is pure and total — it never returns an error to the caller. A
//! predicate that fails is logged and treated as non-matching, so one broken
//! rule can degrade behavior but never take the turn down.

mod rules;

pub use rules::builtin_rules;

use crate::error::EngineError;
use crate::shared::{ActKind, Atmosphere, Classification, DepthCeiling, EngagementMode, Pacing};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Precedence tier. `Critical` is reserved for always-on safety rules (crisis
/// grounding, high-arousal regulation) and folds first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Critical,
    High,
    Normal,
    Low,
}

/// Behavioral effect a rule contributes when it matches. Options left `None`
/// contribute nothing for that field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleEffect {
    #[serde(default)]
    pub atmosphere: Option<Atmosphere>,
    #[serde(default)]
    pub mode: Option<EngagementMode>,
    #[serde(default)]
    pub depth_ceiling: Option<DepthCeiling>,
    #[serde(default)]
    pub pacing: Option<Pacing>,
    #[serde(default)]
    pub forbidden: BTreeSet<ActKind>,
    #[serde(default)]
    pub required: BTreeSet<ActKind>,
}

/// Activation predicate. Errors are swallowed by the engine (rule treated as
/// non-matching); determinism over robustness-by-retry.
pub type RulePredicate = fn(&Classification) -> Result<bool, EngineError>;

/// One governor rule: id, tier, activation predicate, effect.
pub struct GovernorRule {
    pub id: &'static str,
    pub tier: Tier,
    /// When set, this rule's atmosphere/mode take precedence over any
    /// non-override writer regardless of fold position.
    pub tone_override: bool,
    pub predicate: RulePredicate,
    pub effect: RuleEffect,
}

/// Folded result of all matching rules.
///
/// Invariants maintained by the fold:
/// - `depth_ceiling` is the most restrictive among matches (`surface` wins),
/// - `pacing` is the slowest among matches,
/// - `forbidden`/`required` are set unions,
/// - `atmosphere`/`mode` come from the highest-precedence override writer,
///   else the first non-override writer in fold order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedEffect {
    pub depth_ceiling: DepthCeiling,
    pub pacing: Pacing,
    pub forbidden: BTreeSet<ActKind>,
    pub required: BTreeSet<ActKind>,
    pub atmosphere: Option<Atmosphere>,
    pub mode: Option<EngagementMode>,
    /// Ids of the rules that matched, in fold order. Diagnostics only.
    pub matched: Vec<String>,
}

impl Default for MergedEffect {
    /// Permissive default: deepest ceiling, normal pacing, no constraints.
    fn default() -> Self {
        Self {
            depth_ceiling: DepthCeiling::Deep,
            pacing: Pacing::Normal,
            forbidden: BTreeSet::new(),
            required: BTreeSet::new(),
            atmosphere: None,
            mode: None,
            matched: Vec::new(),
        }
    }
}

/// Rule-based governor. Holds a fixed rule table; evaluation sorts matches by
/// tier and folds left to right.
///
/// Ties within a tier break by **declaration order** in the rule table. The
/// sort is stable, so "first non-override writer" is well-defined and does not
/// depend on incidental ordering.
pub struct DomainRuleEngine {
    rules: Vec<GovernorRule>,
}

impl Default for DomainRuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainRuleEngine {
    /// Engine with the built-in rule set.
    pub fn new() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }

    /// Engine with a custom rule table (tests, alternative personas).
    pub fn with_rules(rules: Vec<GovernorRule>) -> Self {
        Self { rules }
    }

    /// Evaluates every rule against the classification and folds the matches.
    /// Pure with respect to its inputs; never fails.
    pub fn evaluate(&self, classification: &Classification) -> MergedEffect {
        let mut matches: Vec<&GovernorRule> = Vec::new();
        for rule in &self.rules {
            match (rule.predicate)(classification) {
                Ok(true) => matches.push(rule),
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(
                        target: "aura::governor",
                        rule = rule.id,
                        error = %err,
                        "rule predicate failed; treating as non-matching"
                    );
                }
            }
        }

        // Stable sort: tier first, declaration order within a tier.
        matches.sort_by_key(|r| r.tier);

        let mut merged = MergedEffect::default();
        let mut tone_overridden = false;
        let mut mode_overridden = false;
        // Among matches, the ceiling is the most restrictive and the pacing
        // the slowest; the permissive defaults apply only when no match
        // writes the field at all.
        let mut ceiling_acc: Option<DepthCeiling> = None;
        let mut pacing_acc: Option<Pacing> = None;

        for rule in matches {
            let eff = &rule.effect;
            if let Some(ceiling) = eff.depth_ceiling {
                ceiling_acc = Some(ceiling_acc.map_or(ceiling, |c| c.min(ceiling)));
            }
            if let Some(pacing) = eff.pacing {
                pacing_acc = Some(pacing_acc.map_or(pacing, |p| p.min(pacing)));
            }
            merged.forbidden.extend(eff.forbidden.iter().copied());
            merged.required.extend(eff.required.iter().copied());

            if let Some(atmosphere) = eff.atmosphere {
                if rule.tone_override {
                    if !tone_overridden {
                        merged.atmosphere = Some(atmosphere);
                        tone_overridden = true;
                    }
                } else if !tone_overridden && merged.atmosphere.is_none() {
                    merged.atmosphere = Some(atmosphere);
                }
            }
            if let Some(mode) = eff.mode {
                if rule.tone_override {
                    if !mode_overridden {
                        merged.mode = Some(mode);
                        mode_overridden = true;
                    }
                } else if !mode_overridden && merged.mode.is_none() {
                    merged.mode = Some(mode);
                }
            }

            merged.matched.push(rule.id.to_string());
        }

        if let Some(ceiling) = ceiling_acc {
            merged.depth_ceiling = ceiling;
        }
        if let Some(pacing) = pacing_acc {
            merged.pacing = pacing;
        }

        if !merged.matched.is_empty() {
            tracing::debug!(
                target: "aura::governor",
                matched = ?merged.matched,
                ceiling = ?merged.depth_ceiling,
                pacing = ?merged.pacing,
                "governor fold complete"
            );
        }

        merged
    }
}
