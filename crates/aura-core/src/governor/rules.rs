//! Built-in governor rule table.
//!
//! Declaration order matters: within a tier, earlier rules fold first, so the
//! first non-override atmosphere/mode writer is the earliest declared match.

use super::{GovernorRule, RuleEffect, Tier};
use crate::error::EngineError;
use crate::shared::{
    ActKind, Atmosphere, Classification, DepthCeiling, Domain, EngagementMode, Pacing, TurnGoal,
};
use std::collections::BTreeSet;

fn acts(kinds: &[ActKind]) -> BTreeSet<ActKind> {
    kinds.iter().copied().collect()
}

fn crisis(cls: &Classification) -> Result<bool, EngineError> {
    Ok(cls.flags.acute_crisis)
}

fn high_arousal_negative(cls: &Classification) -> Result<bool, EngineError> {
    Ok(cls.arousal >= 0.75 && cls.valence < 0.0)
}

fn rumination(cls: &Classification) -> Result<bool, EngineError> {
    Ok(cls.flags.repetition && cls.valence <= 0.0)
}

fn existential_drift(cls: &Classification) -> Result<bool, EngineError> {
    Ok(cls.salience(Domain::Existential) >= 0.7 && cls.uncertainty >= 0.6)
}

fn decision_pressure(cls: &Classification) -> Result<bool, EngineError> {
    Ok(cls.goal == TurnGoal::Decide && cls.flags.high_stakes)
}

fn relational_conflict(cls: &Classification) -> Result<bool, EngineError> {
    Ok(cls.salience(Domain::Relational) >= 0.6 && cls.valence <= -0.3)
}

fn depleted(cls: &Classification) -> Result<bool, EngineError> {
    Ok(cls.arousal <= 0.2 && cls.valence < 0.0)
}

fn practical_focus(cls: &Classification) -> Result<bool, EngineError> {
    Ok(cls.salience(Domain::Practical) >= 0.7 && cls.arousal < 0.5)
}

/// The standard rule table.
pub fn builtin_rules() -> Vec<GovernorRule> {
    vec![
        // Crisis grounding: stay at the surface, slow down, no exploration or
        // advice until the moment is anchored.
        GovernorRule {
            id: "crisis_grounding",
            tier: Tier::Critical,
            tone_override: true,
            predicate: crisis,
            effect: RuleEffect {
                atmosphere: Some(Atmosphere::Grounded),
                mode: Some(EngagementMode::Witness),
                depth_ceiling: Some(DepthCeiling::Surface),
                pacing: Some(Pacing::Slow),
                forbidden: acts(&[ActKind::Explore, ActKind::Advise]),
                required: acts(&[ActKind::Ground, ActKind::Validate]),
            },
        },
        // High activation with negative tone: contain before anything else.
        GovernorRule {
            id: "arousal_regulation",
            tier: Tier::Critical,
            tone_override: true,
            predicate: high_arousal_negative,
            effect: RuleEffect {
                atmosphere: Some(Atmosphere::Contained),
                mode: None,
                depth_ceiling: Some(DepthCeiling::Medium),
                pacing: Some(Pacing::Slow),
                forbidden: acts(&[ActKind::Explore]),
                required: acts(&[ActKind::Ground]),
            },
        },
        // Same theme circling with flat-to-negative tone: stop feeding the
        // loop, hand the movement back.
        GovernorRule {
            id: "rumination_loop",
            tier: Tier::High,
            tone_override: false,
            predicate: rumination,
            effect: RuleEffect {
                pacing: Some(Pacing::Conservative),
                depth_ceiling: Some(DepthCeiling::Medium),
                required: acts(&[ActKind::Invite]),
                ..RuleEffect::default()
            },
        },
        // Existential material under high classifier uncertainty: mirror,
        // don't steer.
        GovernorRule {
            id: "existential_drift",
            tier: Tier::High,
            tone_override: false,
            predicate: existential_drift,
            effect: RuleEffect {
                atmosphere: Some(Atmosphere::Spacious),
                mode: Some(EngagementMode::Mirror),
                pacing: Some(Pacing::Conservative),
                ..RuleEffect::default()
            },
        },
        // High-stakes decision: clarify what the user actually weighs; the
        // decision stays theirs.
        GovernorRule {
            id: "decision_pressure",
            tier: Tier::Normal,
            tone_override: false,
            predicate: decision_pressure,
            effect: RuleEffect {
                mode: Some(EngagementMode::Guide),
                forbidden: acts(&[ActKind::Advise]),
                required: acts(&[ActKind::Clarify]),
                ..RuleEffect::default()
            },
        },
        GovernorRule {
            id: "relational_conflict",
            tier: Tier::Normal,
            tone_override: false,
            predicate: relational_conflict,
            effect: RuleEffect {
                atmosphere: Some(Atmosphere::Warm),
                pacing: Some(Pacing::Conservative),
                required: acts(&[ActKind::Validate]),
                ..RuleEffect::default()
            },
        },
        GovernorRule {
            id: "depleted_presence",
            tier: Tier::Normal,
            tone_override: false,
            predicate: depleted,
            effect: RuleEffect {
                atmosphere: Some(Atmosphere::Warm),
                depth_ceiling: Some(DepthCeiling::Medium),
                pacing: Some(Pacing::Slow),
                forbidden: acts(&[ActKind::Explore]),
                ..RuleEffect::default()
            },
        },
        GovernorRule {
            id: "practical_focus",
            tier: Tier::Low,
            tone_override: false,
            predicate: practical_focus,
            effect: RuleEffect {
                atmosphere: Some(Atmosphere::Neutral),
                mode: Some(EngagementMode::Guide),
                pacing: Some(Pacing::Responsive),
                ..RuleEffect::default()
            },
        },
    ]
}
