//! Integration test: Domain governor — verifies that the rule table merges by
//! precedence into a single `MergedEffect` with restrictive-wins semantics.
//!
//! ## Scenarios
//! 1. Quiet turn: no rule matches, the effect is the permissive default.
//! 2. Crisis turn: the crisis rule overrides tone and pins surface/slow.
//! 3. Two restrictive rules: ceiling and pacing take the most restrictive.
//! 4. Lone low-tier rule: responsive pacing takes effect with nothing to beat.
//! 5. Non-override tone: the earliest writer in fold order wins.
//! 6. Tone override in a later declaration beats an earlier non-override.

use aura_core::{
    Atmosphere, Classification, ClassificationFlags, DepthCeiling, Domain, DomainRuleEngine,
    EngagementMode, GovernorRule, MergedEffect, Pacing, RuleEffect, Tier, TurnGoal,
};

// ---------------------------------------------------------------------------
// Helper: classifications for each scenario
// ---------------------------------------------------------------------------

fn quiet_turn() -> Classification {
    Classification {
        arousal: 0.4,
        valence: 0.2,
        ..Classification::default()
    }
}

fn crisis_turn() -> Classification {
    Classification {
        arousal: 0.6,
        valence: -0.5,
        flags: ClassificationFlags {
            acute_crisis: true,
            ..ClassificationFlags::default()
        },
        ..Classification::default()
    }
}

fn ruminating_depleted_turn() -> Classification {
    Classification {
        arousal: 0.1,
        valence: -0.4,
        flags: ClassificationFlags {
            repetition: true,
            ..ClassificationFlags::default()
        },
        ..Classification::default()
    }
}

fn practical_turn() -> Classification {
    Classification::default()
        .with_salience(Domain::Practical, 0.8)
}

fn drifting_conflict_turn() -> Classification {
    let mut cls = Classification::default()
        .with_salience(Domain::Existential, 0.8)
        .with_salience(Domain::Relational, 0.7);
    cls.arousal = 0.3;
    cls.valence = -0.4;
    cls.uncertainty = 0.7;
    cls
}

// ===========================================================================
// Test 1: Quiet turn — permissive default
// ===========================================================================

#[test]
fn quiet_turn_yields_permissive_default() {
    let engine = DomainRuleEngine::new();
    let merged = engine.evaluate(&quiet_turn());
    assert_eq!(merged, MergedEffect::default());
    assert_eq!(merged.depth_ceiling, DepthCeiling::Deep);
    assert_eq!(merged.pacing, Pacing::Normal);
}

// ===========================================================================
// Test 2: Crisis — tone override, surface ceiling, slow pacing
// ===========================================================================

#[test]
fn crisis_rule_dominates_the_fold() {
    let engine = DomainRuleEngine::new();
    // Practical salience would normally match the responsive low-tier rule;
    // the crisis flag must win every contested field anyway.
    let mut cls = crisis_turn().with_salience(Domain::Practical, 0.9);
    cls.arousal = 0.3;
    let merged = engine.evaluate(&cls);

    assert_eq!(merged.depth_ceiling, DepthCeiling::Surface);
    assert_eq!(merged.pacing, Pacing::Slow);
    assert_eq!(merged.atmosphere, Some(Atmosphere::Grounded));
    assert_eq!(merged.mode, Some(EngagementMode::Witness));
    assert!(merged.forbidden.contains(&aura_core::ActKind::Explore));
    assert!(merged.forbidden.contains(&aura_core::ActKind::Advise));
    assert!(merged.required.contains(&aura_core::ActKind::Ground));
    assert_eq!(merged.matched[0], "crisis_grounding");
}

// ===========================================================================
// Test 3: Rumination + depletion — most restrictive among matches
// ===========================================================================

#[test]
fn overlapping_rules_take_the_most_restrictive_fields() {
    let engine = DomainRuleEngine::new();
    let merged = engine.evaluate(&ruminating_depleted_turn());

    assert!(merged.matched.contains(&"rumination_loop".to_string()));
    assert!(merged.matched.contains(&"depleted_presence".to_string()));
    // Rumination asks Conservative, depletion asks Slow; Slow wins.
    assert_eq!(merged.pacing, Pacing::Slow);
    assert_eq!(merged.depth_ceiling, DepthCeiling::Medium);
    assert!(merged.required.contains(&aura_core::ActKind::Invite));
}

// ===========================================================================
// Test 4: Lone low-tier rule — responsive pacing takes effect
// ===========================================================================

#[test]
fn lone_match_sets_its_fields_even_when_permissive() {
    let engine = DomainRuleEngine::new();
    let merged = engine.evaluate(&practical_turn());

    assert_eq!(merged.matched, vec!["practical_focus".to_string()]);
    assert_eq!(merged.pacing, Pacing::Responsive);
    assert_eq!(merged.atmosphere, Some(Atmosphere::Neutral));
    assert_eq!(merged.mode, Some(EngagementMode::Guide));
    // Nothing wrote a ceiling, so the permissive default stands.
    assert_eq!(merged.depth_ceiling, DepthCeiling::Deep);
}

// ===========================================================================
// Test 5: Non-override tone — first writer in fold order wins
// ===========================================================================

#[test]
fn first_non_override_tone_writer_wins() {
    let engine = DomainRuleEngine::new();
    let merged = engine.evaluate(&drifting_conflict_turn());

    // existential_drift (High) folds before relational_conflict (Normal).
    assert!(merged.matched.contains(&"existential_drift".to_string()));
    assert!(merged.matched.contains(&"relational_conflict".to_string()));
    assert_eq!(merged.atmosphere, Some(Atmosphere::Spacious));
    assert_eq!(merged.mode, Some(EngagementMode::Mirror));
    assert_eq!(merged.pacing, Pacing::Conservative);
}

// ===========================================================================
// Test 6: Tone override beats an earlier non-override writer
// ===========================================================================

fn always(_: &Classification) -> Result<bool, aura_core::EngineError> {
    Ok(true)
}

#[test]
fn tone_override_beats_earlier_non_override_writer() {
    let engine = DomainRuleEngine::with_rules(vec![
        GovernorRule {
            id: "soft_tone",
            tier: Tier::Normal,
            tone_override: false,
            predicate: always,
            effect: RuleEffect {
                atmosphere: Some(Atmosphere::Warm),
                ..RuleEffect::default()
            },
        },
        GovernorRule {
            id: "containment",
            tier: Tier::Normal,
            tone_override: true,
            predicate: always,
            effect: RuleEffect {
                atmosphere: Some(Atmosphere::Contained),
                ..RuleEffect::default()
            },
        },
    ]);
    let merged = engine.evaluate(&Classification::default());
    assert_eq!(merged.atmosphere, Some(Atmosphere::Contained));
    assert_eq!(merged.matched, vec!["soft_tone".to_string(), "containment".to_string()]);
}

// ===========================================================================
// Regression: decision pressure forbids advice but requires clarification
// ===========================================================================

#[test]
fn decision_pressure_keeps_the_decision_with_the_user() {
    let engine = DomainRuleEngine::new();
    let mut cls = Classification::default();
    cls.goal = TurnGoal::Decide;
    cls.flags.high_stakes = true;
    let merged = engine.evaluate(&cls);

    assert!(merged.matched.contains(&"decision_pressure".to_string()));
    assert!(merged.forbidden.contains(&aura_core::ActKind::Advise));
    assert!(merged.required.contains(&aura_core::ActKind::Clarify));
    assert_eq!(merged.mode, Some(EngagementMode::Guide));
}
