//! Shared types used across the Aura decision core.
//!
//! Everything here is an immutable per-turn snapshot: the classifier produces a
//! `Classification`, the front end wraps it in a `TurnInput`, and every
//! downstream component reads it without mutation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Salience domains recognized by the upstream classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Practical,
    Emotional,
    Relational,
    Existential,
    Identity,
    Somatic,
}

/// What the user appears to want from this turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnGoal {
    Vent,
    #[default]
    Explore,
    Decide,
    Solve,
    Connect,
}

/// Binary flags raised by the classifier. `acute_crisis` dominates everything
/// downstream: it force-clears hard constraints and routes the governor to the
/// crisis-grounding rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationFlags {
    /// Acute crisis detected (self-harm risk, panic, dissociation).
    #[serde(default)]
    pub acute_crisis: bool,
    /// Decision or disclosure with lasting consequences.
    #[serde(default)]
    pub high_stakes: bool,
    /// The turn repeats recent turns (same theme, little movement).
    #[serde(default)]
    pub repetition: bool,
}

/// Classified description of one input turn, produced by the external
/// perception stage. Immutable for the duration of the turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Classification {
    /// Per-domain salience in `[0, 1]`. Absent domains read as 0.
    #[serde(default)]
    pub saliences: BTreeMap<Domain, f32>,
    /// Physiological activation estimate in `[0, 1]`.
    #[serde(default)]
    pub arousal: f32,
    /// Hedonic tone in `[-1, 1]`.
    #[serde(default)]
    pub valence: f32,
    /// Classifier self-reported uncertainty in `[0, 1]`.
    #[serde(default)]
    pub uncertainty: f32,
    #[serde(default)]
    pub goal: TurnGoal,
    #[serde(default)]
    pub flags: ClassificationFlags,
}

impl Classification {
    /// Salience for `domain`, 0 when the classifier reported nothing.
    pub fn salience(&self, domain: Domain) -> f32 {
        self.saliences.get(&domain).copied().unwrap_or(0.0)
    }

    /// Highest meaning-adjacent salience (existential or identity).
    pub fn meaning_salience(&self) -> f32 {
        self.salience(Domain::Existential)
            .max(self.salience(Domain::Identity))
    }

    /// Clamps all scalar fields to their valid ranges.
    pub fn clamp(&mut self) {
        for v in self.saliences.values_mut() {
            *v = v.clamp(0.0, 1.0);
        }
        self.arousal = self.arousal.clamp(0.0, 1.0);
        self.valence = self.valence.clamp(-1.0, 1.0);
        self.uncertainty = self.uncertainty.clamp(0.0, 1.0);
    }

    /// Builder-style salience setter, mostly for tests and fixtures.
    pub fn with_salience(mut self, domain: Domain, value: f32) -> Self {
        self.saliences.insert(domain, value.clamp(0.0, 1.0));
        self
    }
}

/// The act vocabulary plans are built from. Policy constrains how acts are
/// expressed; the act sequence itself is never rewritten by policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActKind {
    /// Anchor the moment; slow, concrete, sensory.
    Ground,
    /// Acknowledge the feeling as legitimate.
    Validate,
    /// Mirror back what was heard.
    Reflect,
    /// Ask what the user actually needs or means.
    Clarify,
    /// Open the theme further.
    Explore,
    /// Offer a concrete suggestion.
    Advise,
    /// Hand the next move back to the user.
    Invite,
    /// Wind the turn down gently.
    Close,
}

/// One step in a plan: an act plus a short rendering hint for the template
/// layer downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Act {
    pub kind: ActKind,
    pub intent: String,
}

impl Act {
    pub fn new(kind: ActKind, intent: impl Into<String>) -> Self {
        Self {
            kind,
            intent: intent.into(),
        }
    }
}

/// Overall tonal atmosphere a rule can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Atmosphere {
    Grounded,
    Warm,
    Neutral,
    Spacious,
    Contained,
}

/// Engagement stance the agent takes for the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementMode {
    Companion,
    Mirror,
    Guide,
    Witness,
}

/// How deep the response may go. Ordered from most to least restrictive:
/// `Surface < Medium < Deep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthCeiling {
    Surface,
    Medium,
    Deep,
}

/// Response pacing. Ordered from slowest to most responsive:
/// `Slow < Conservative < Normal < Responsive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pacing {
    Slow,
    Conservative,
    Normal,
    Responsive,
}

/// One complete input turn as consumed by the decision engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnInput {
    /// Raw user message (already transcript-normalized upstream).
    pub message: String,
    pub classification: Classification,
    /// How much charge the turn carries, `[0, 1]`. Drives Phase A toward
    /// fuller engagement.
    #[serde(default)]
    pub potency: f32,
    /// Bias toward minimal/withdrawn candidates, `[0, 1]`.
    #[serde(default)]
    pub withdrawal_bias: f32,
    /// Caller-requested advisory deadline. Clamped into the configured
    /// window before use; see `signals::await_early_signals`.
    #[serde(default = "default_requested_deadline_ms")]
    pub requested_deadline_ms: u64,
}

fn default_requested_deadline_ms() -> u64 {
    250
}

impl TurnInput {
    pub fn new(message: impl Into<String>, classification: Classification) -> Self {
        Self {
            message: message.into(),
            classification,
            potency: 0.5,
            withdrawal_bias: 0.0,
            requested_deadline_ms: default_requested_deadline_ms(),
        }
    }
}
