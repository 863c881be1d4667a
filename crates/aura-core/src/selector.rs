//! Phased candidate selection.
//!
//! **Phase A** generates 1–3 ranked candidate plans from the classification and
//! two scalar inputs (potency, withdrawal bias). It runs before any policy
//! exists and is a pure function of its inputs.
//!
//! **Phase B** commits to one candidate under the merged policy, the advisory
//! signals, and their status. Policy shapes only the chosen plan's constraints
//! block — the act sequence is never mutated by policy. Policy changes *how* a
//! plan is expressed, never *what* it does.

use crate::config::SelectorConfig;
use crate::governor::MergedEffect;
use crate::policy::{Policy, PronounMode};
use crate::shared::{
    Act, ActKind, Atmosphere, Classification, DepthCeiling, EngagementMode, Pacing, TurnGoal,
};
use crate::signals::{EarlySignals, EarlySignalsStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Constraints block attached to a plan. Starts permissive; Phase B folds the
/// governor effect and the merged policy into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintBlock {
    pub atmosphere: Option<Atmosphere>,
    pub mode: Option<EngagementMode>,
    pub depth_ceiling: DepthCeiling,
    pub pacing: Pacing,
    #[serde(default)]
    pub forbidden: BTreeSet<ActKind>,
    #[serde(default)]
    pub required: BTreeSet<ActKind>,
    pub tools_enabled: bool,
    /// Effective brevity bound; more negative is shorter. `None` = unbounded.
    pub brevity: Option<i8>,
    /// The next concrete step must come from the user.
    pub require_user_effort: bool,
    pub warmth_delta: f32,
    pub pronoun_mode: PronounMode,
}

impl Default for ConstraintBlock {
    fn default() -> Self {
        Self {
            atmosphere: None,
            mode: None,
            depth_ceiling: DepthCeiling::Deep,
            pacing: Pacing::Normal,
            forbidden: BTreeSet::new(),
            required: BTreeSet::new(),
            tools_enabled: true,
            brevity: None,
            require_user_effort: false,
            warmth_delta: 0.0,
            pronoun_mode: PronounMode::Default,
        }
    }
}

/// One candidate response plan: an ordered act sequence plus constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Short human-readable label ("engaged", "tempered", "minimal").
    pub label: String,
    pub acts: Vec<Act>,
    pub constraints: ConstraintBlock,
}

impl Plan {
    pub fn act_kinds(&self) -> impl Iterator<Item = ActKind> + '_ {
        self.acts.iter().map(|a| a.kind)
    }

    fn contains_act(&self, kind: ActKind) -> bool {
        self.acts.iter().any(|a| a.kind == kind)
    }
}

/// Ranked candidates, fuller engagement first, minimal/withdrawn last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet {
    pub plans: Vec<Plan>,
    /// Index Phase A recommends before policy is known.
    pub recommended: usize,
}

/// Why Phase B committed to the plan it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitReason {
    /// Phase A's deterministic recommendation stood.
    ByScore,
    /// A veto or a trusted suggestion moved the selection.
    BySignals,
    /// Timeout bias or the zero-candidate canonical plan.
    ByFallback,
}

/// Committed outcome of a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitResult {
    pub selected_index: usize,
    pub plan: Plan,
    pub commit_reason: CommitReason,
}

/// The plan generator seam. The default implementation is policy-free by
/// construction: it sees the classification and the two scalars, nothing else.
pub trait PlanSource: Send + Sync {
    fn generate(
        &self,
        classification: &Classification,
        potency: f32,
        withdrawal_bias: f32,
    ) -> CandidateSet;
}

/// Default Phase A generator.
pub struct BaselinePlanSource;

impl PlanSource for BaselinePlanSource {
    /// Builds three candidates ordered from fuller engagement to minimal and
    /// scores a recommendation. The score is a fixed linear lean:
    /// `withdrawal_bias - potency / 2`, plus a constant shift under acute
    /// crisis; identical inputs always yield the identical set.
    fn generate(
        &self,
        classification: &Classification,
        potency: f32,
        withdrawal_bias: f32,
    ) -> CandidateSet {
        let engaged = Plan {
            label: "engaged".to_string(),
            acts: engaged_acts(classification.goal),
            constraints: ConstraintBlock::default(),
        };
        let tempered = Plan {
            label: "tempered".to_string(),
            acts: vec![
                Act::new(ActKind::Validate, "acknowledge what is present"),
                Act::new(ActKind::Reflect, "mirror the core of it"),
                Act::new(ActKind::Invite, "hand the next step back"),
            ],
            constraints: ConstraintBlock::default(),
        };
        let minimal = minimal_plan();

        let mut lean = withdrawal_bias.clamp(0.0, 1.0) - potency.clamp(0.0, 1.0) * 0.5;
        if classification.flags.acute_crisis {
            lean += 0.6;
        }
        let recommended = if lean >= 0.6 {
            2
        } else if lean >= 0.25 {
            1
        } else {
            0
        };

        CandidateSet {
            plans: vec![engaged, tempered, minimal],
            recommended,
        }
    }
}

fn engaged_acts(goal: TurnGoal) -> Vec<Act> {
    match goal {
        TurnGoal::Decide => vec![
            Act::new(ActKind::Clarify, "surface what is actually being weighed"),
            Act::new(ActKind::Reflect, "mirror the stakes as heard"),
            Act::new(ActKind::Explore, "walk the options without steering"),
            Act::new(ActKind::Invite, "leave the decision with the user"),
        ],
        TurnGoal::Solve => vec![
            Act::new(ActKind::Clarify, "pin down the actual problem"),
            Act::new(ActKind::Explore, "lay out approaches"),
            Act::new(ActKind::Advise, "offer one concrete next step"),
            Act::new(ActKind::Invite, "check the step lands"),
        ],
        TurnGoal::Vent => vec![
            Act::new(ActKind::Validate, "receive it without fixing"),
            Act::new(ActKind::Reflect, "mirror the feeling"),
            Act::new(ActKind::Explore, "make room for what else is there"),
            Act::new(ActKind::Invite, "ask what would help now"),
        ],
        TurnGoal::Explore | TurnGoal::Connect => vec![
            Act::new(ActKind::Validate, "meet the opening"),
            Act::new(ActKind::Reflect, "mirror the thread"),
            Act::new(ActKind::Explore, "open the theme further"),
            Act::new(ActKind::Invite, "offer a direction, lightly"),
        ],
    }
}

/// The canonical minimal/safe plan, also used as the zero-candidate fallback.
fn minimal_plan() -> Plan {
    Plan {
        label: "minimal".to_string(),
        acts: vec![
            Act::new(ActKind::Ground, "anchor the moment"),
            Act::new(ActKind::Validate, "acknowledge, briefly"),
            Act::new(ActKind::Close, "wind down gently"),
        ],
        constraints: ConstraintBlock::default(),
    }
}

/// Two-phase candidate selector.
pub struct CandidateSelector {
    source: Box<dyn PlanSource>,
}

impl Default for CandidateSelector {
    fn default() -> Self {
        Self::new(Box::new(BaselinePlanSource))
    }
}

impl CandidateSelector {
    pub fn new(source: Box<dyn PlanSource>) -> Self {
        Self { source }
    }

    /// Phase A: generate candidates. Pure, policy-free.
    pub fn generate(
        &self,
        classification: &Classification,
        potency: f32,
        withdrawal_bias: f32,
    ) -> CandidateSet {
        self.source.generate(classification, potency, withdrawal_bias)
    }

    /// Phase B: commit to one candidate.
    ///
    /// Selection priority:
    /// 1. a veto at or above the severity threshold targeting an act of the
    ///    recommended plan shifts to a safer (higher-index) candidate,
    /// 2. a trusted suggestion naming a real candidate is honored,
    /// 3. the recommended index stands,
    /// 4. on timeout, selection biases one step toward the safer end.
    pub fn commit(
        &self,
        candidates: &CandidateSet,
        signals: &EarlySignals,
        status: &EarlySignalsStatus,
        effect: &MergedEffect,
        policy: &Policy,
        cfg: &SelectorConfig,
    ) -> CommitResult {
        if candidates.plans.is_empty() {
            tracing::warn!(
                target: "aura::selector",
                "no eligible candidates; committing canonical minimal plan"
            );
            let mut plan = minimal_plan();
            apply_constraints(&mut plan, effect, policy);
            return CommitResult {
                selected_index: 0,
                plan,
                commit_reason: CommitReason::ByFallback,
            };
        }

        let last = candidates.plans.len() - 1;
        let recommended = candidates.recommended.min(last);

        let (selected, reason) = if let Some(veto) =
            blocking_veto(signals, &candidates.plans[recommended], cfg)
        {
            let shifted = ((recommended + 1)..=last)
                .find(|&i| !candidates.plans[i].contains_act(veto.target))
                .unwrap_or(last);
            tracing::info!(
                target: "aura::selector",
                target_act = ?veto.target,
                severity = veto.severity,
                from = recommended,
                to = shifted,
                "veto shifted selection to a safer candidate"
            );
            (shifted, CommitReason::BySignals)
        } else if let Some(suggestion) = usable_suggestion(signals, candidates) {
            (suggestion.index, CommitReason::BySignals)
        } else if status.timed_out {
            ((recommended + 1).min(last), CommitReason::ByFallback)
        } else {
            (recommended, CommitReason::ByScore)
        };

        let mut plan = candidates.plans[selected].clone();
        apply_constraints(&mut plan, effect, policy);

        CommitResult {
            selected_index: selected,
            plan,
            commit_reason: reason,
        }
    }
}

fn blocking_veto<'a>(
    signals: &'a EarlySignals,
    recommended: &Plan,
    cfg: &SelectorConfig,
) -> Option<&'a crate::signals::Veto> {
    signals.vetoes.as_ref()?.iter().find(|v| {
        v.severity >= cfg.veto_severity_threshold && recommended.contains_act(v.target)
    })
}

fn usable_suggestion<'a>(
    signals: &'a EarlySignals,
    candidates: &CandidateSet,
) -> Option<&'a crate::signals::CandidateSuggestion> {
    signals
        .suggestion
        .as_ref()
        .filter(|s| s.trusted && s.index < candidates.plans.len())
}

/// Folds the governor effect and the merged policy into the plan's constraints
/// block. The act sequence is left untouched.
fn apply_constraints(plan: &mut Plan, effect: &MergedEffect, policy: &Policy) {
    let c = &mut plan.constraints;

    c.depth_ceiling = c.depth_ceiling.min(effect.depth_ceiling);
    c.pacing = c.pacing.min(effect.pacing);
    c.forbidden.extend(effect.forbidden.iter().copied());
    c.required.extend(effect.required.iter().copied());
    if effect.atmosphere.is_some() {
        c.atmosphere = effect.atmosphere;
    }
    if effect.mode.is_some() {
        c.mode = effect.mode;
    }

    c.tools_enabled = c.tools_enabled && !policy.hard.tools_disabled;
    c.require_user_effort = c.require_user_effort || policy.hard.require_user_effort;
    c.brevity = match (c.brevity, policy.effective_brevity()) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    c.warmth_delta = (c.warmth_delta + policy.soft.warmth_delta).clamp(-1.0, 1.0);
    c.pronoun_mode = c.pronoun_mode.max(policy.soft.pronoun_mode);
}
