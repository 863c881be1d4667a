//! Delegation scorer: the hard-constraint side of the authority boundary.
//!
//! Estimates how much of the turn the user is handing over that they could
//! carry themselves, and maps the estimate to an operational hard policy.
//! Three sub-computations, all deterministic:
//!
//! 1. a motive distribution over seven categories, normalized to sum 1,
//! 2. avoidability = mean(ability, state), both in `[0, 1]`,
//! 3. inertia — geometric decay per prior same-session intervention with
//!    linear recovery over intervention-free turns.
//!
//! Score = avoidability × Σ(motive × problem weight) × inertia.
//!
//! **Crisis invariant**: an acute-crisis flag force-clears every hard
//! constraint after scoring, unconditionally. Crisis safety dominates
//! delegation concerns; no upstream error or score can suppress this.

use crate::TurnView;
use aura_core::policy::HardPolicy;
use aura_core::shared::{Classification, Domain, TurnGoal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why the user appears to be delegating this turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MotiveCategory {
    Incapacity,
    Tooling,
    Substitution,
    EmotionalOffload,
    Avoidance,
    ValidationSeeking,
    Habit,
}

/// Fixed problem weight per motive: how much each motive, when dominant,
/// indicates delegation worth constraining. Tooling barely matters; avoidance
/// matters most.
const PROBLEM_WEIGHTS: &[(MotiveCategory, f32)] = &[
    (MotiveCategory::Incapacity, 0.2),
    (MotiveCategory::Tooling, 0.1),
    (MotiveCategory::Substitution, 0.7),
    (MotiveCategory::EmotionalOffload, 0.5),
    (MotiveCategory::Avoidance, 1.0),
    (MotiveCategory::ValidationSeeking, 0.6),
    (MotiveCategory::Habit, 0.4),
];

/// Restriction tier the score landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegationTier {
    /// Below the watch threshold: no constraint.
    None,
    /// Above the watch threshold but below any constraint: logged only.
    Elevated,
    /// Bounded brevity.
    BoundedBrevity,
    /// Tool access withdrawn plus bounded brevity.
    ToolDisable,
}

/// Scorer thresholds and inertia parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelegationConfig {
    /// Watch threshold: scores above are flagged in diagnostics.
    pub watch_threshold: f32,
    /// Bounded-brevity threshold.
    pub brevity_threshold: f32,
    /// Tool-disable threshold.
    pub tool_disable_threshold: f32,
    /// Geometric decay base per prior intervention.
    pub inertia_decay_base: f32,
    /// Inertia never drops below this.
    pub inertia_floor: f32,
    /// Linear recovery per intervention-free turn.
    pub inertia_recovery_per_turn: f32,
}

impl Default for DelegationConfig {
    fn default() -> Self {
        Self {
            watch_threshold: 0.35,
            brevity_threshold: 0.55,
            tool_disable_threshold: 0.70,
            inertia_decay_base: 0.85,
            inertia_floor: 0.1,
            inertia_recovery_per_turn: 0.05,
        }
    }
}

/// Full scoring trace, kept alongside the policy for observability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelegationDiagnostics {
    /// Normalized motive distribution (sums to 1).
    pub motives: BTreeMap<MotiveCategory, f32>,
    pub dominant_motive: MotiveCategory,
    pub ability: f32,
    pub state: f32,
    pub avoidability: f32,
    pub inertia: f32,
    pub score: f32,
    pub tier: DelegationTier,
    /// The crisis invariant fired and cleared the policy.
    pub crisis_cleared: bool,
}

/// Scorer output: the hard policy plus its trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelegationAssessment {
    pub policy: HardPolicy,
    pub diagnostics: DelegationDiagnostics,
}

/// Deterministic delegation scorer. Pure: identical inputs give identical
/// assessments.
#[derive(Debug, Clone, Default)]
pub struct DelegationScorer {
    config: DelegationConfig,
}

impl DelegationScorer {
    pub fn new(config: DelegationConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, view: &TurnView) -> DelegationAssessment {
        let message = view.message.to_lowercase();
        let cls = &view.classification;

        let motives = motive_distribution(&message, cls, view.intervention_count);
        let dominant_motive = motives
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(m, _)| *m)
            .unwrap_or(MotiveCategory::Habit);

        let ability = ability_estimate(cls);
        let state = state_estimate(cls);
        let avoidability = (ability + state) / 2.0;

        let inertia = inertia_estimate(
            &self.config,
            view.intervention_count,
            view.turns_since_last_intervention,
        );

        let weighted: f32 = PROBLEM_WEIGHTS
            .iter()
            .map(|(motive, weight)| motives.get(motive).copied().unwrap_or(0.0) * weight)
            .sum();

        let score = avoidability * weighted * inertia;

        let (tier, mut policy) = if score >= self.config.tool_disable_threshold {
            (
                DelegationTier::ToolDisable,
                HardPolicy {
                    tools_disabled: true,
                    require_user_effort: dominant_motive == MotiveCategory::Substitution,
                    brevity_cap: Some(-1),
                },
            )
        } else if score >= self.config.brevity_threshold {
            (
                DelegationTier::BoundedBrevity,
                HardPolicy {
                    brevity_cap: Some(-1),
                    ..HardPolicy::default()
                },
            )
        } else if score >= self.config.watch_threshold {
            (DelegationTier::Elevated, HardPolicy::default())
        } else {
            (DelegationTier::None, HardPolicy::default())
        };

        // Crisis invariant: unconditional, evaluated last so nothing can
        // reintroduce a constraint after it.
        let crisis_cleared = cls.flags.acute_crisis;
        if crisis_cleared {
            policy = HardPolicy::default();
            tracing::info!(
                target: "aura::advisors::delegation",
                score,
                "acute crisis flagged; hard constraints force-cleared"
            );
        }

        tracing::debug!(
            target: "aura::advisors::delegation",
            score,
            ?tier,
            ?dominant_motive,
            avoidability,
            inertia,
            "delegation assessment"
        );

        DelegationAssessment {
            policy,
            diagnostics: DelegationDiagnostics {
                motives,
                dominant_motive,
                ability,
                state,
                avoidability,
                inertia,
                score,
                tier,
                crisis_cleared,
            },
        }
    }
}

/// Raw feature checks per motive, normalized to a distribution. The habit
/// baseline keeps the distribution well-defined on featureless turns.
fn motive_distribution(
    message: &str,
    cls: &Classification,
    intervention_count: u32,
) -> BTreeMap<MotiveCategory, f32> {
    let mut raw: BTreeMap<MotiveCategory, f32> = BTreeMap::new();
    let mut add = |motive: MotiveCategory, weight: f32| {
        *raw.entry(motive).or_insert(0.0) += weight;
    };

    if message.contains("i can't") || message.contains("i don't know how") {
        add(MotiveCategory::Incapacity, 2.0);
    }
    if cls.uncertainty >= 0.7 {
        add(MotiveCategory::Incapacity, 0.5);
    }

    if ["write", "draft", "summarize", "translate"]
        .iter()
        .any(|kw| message.contains(kw))
    {
        add(MotiveCategory::Tooling, 1.5);
    }

    if message.contains("do it for me") || message.contains("can you just") {
        add(MotiveCategory::Substitution, 2.0);
    }
    if cls.goal == TurnGoal::Solve {
        add(MotiveCategory::Substitution, 1.0);
    }

    if cls.salience(Domain::Emotional) >= 0.6 {
        add(MotiveCategory::EmotionalOffload, 1.5);
    }
    if message.contains("just need to talk") || message.contains("vent") {
        add(MotiveCategory::EmotionalOffload, 1.0);
    }

    if cls.goal == TurnGoal::Decide {
        add(MotiveCategory::Avoidance, 3.0);
    }
    if message.contains("putting off") || message.contains("procrastinat") || message.contains("avoiding") {
        add(MotiveCategory::Avoidance, 1.5);
    }

    if message.contains("am i right") || message.contains("tell me i'm") || message.contains("reassure me") {
        add(MotiveCategory::ValidationSeeking, 2.0);
    }
    if cls.goal == TurnGoal::Connect {
        add(MotiveCategory::ValidationSeeking, 0.5);
    }

    add(MotiveCategory::Habit, 0.5);
    if intervention_count >= 2 {
        add(MotiveCategory::Habit, 0.5);
    }

    let total: f32 = raw.values().sum();
    raw.into_iter().map(|(m, w)| (m, w / total)).collect()
}

/// Could the user plausibly act alone? High for meaning/identity material,
/// near zero under crisis.
fn ability_estimate(cls: &Classification) -> f32 {
    if cls.flags.acute_crisis {
        return 0.05;
    }
    let meaning = cls.meaning_salience();
    if meaning >= 0.6 {
        0.95
    } else {
        0.5 + 0.3 * meaning
    }
}

/// Psychological regulation right now. Low under high-arousal negative states
/// or crisis.
fn state_estimate(cls: &Classification) -> f32 {
    if cls.flags.acute_crisis {
        return 0.2;
    }
    if cls.arousal >= 0.7 && cls.valence < 0.0 {
        0.3
    } else if cls.arousal >= 0.5 && cls.valence <= -0.3 {
        0.6
    } else {
        0.9
    }
}

/// Geometric decay per prior intervention, floored, with linear recovery per
/// intervention-free turn, capped at 1.0.
fn inertia_estimate(cfg: &DelegationConfig, interventions: u32, turns_since_last: u32) -> f32 {
    let decayed = cfg
        .inertia_decay_base
        .powi(interventions as i32)
        .max(cfg.inertia_floor);
    (decayed + cfg.inertia_recovery_per_turn * turns_since_last as f32).min(1.0)
}
