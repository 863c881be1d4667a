//! aura-core: policy synthesis and phased decision engine.
//!
//! Given a classified description of an input turn, produce a single
//! constrained response plan under a hard wall-clock deadline, degrading to
//! conservative safety-biased defaults when advisory inputs are slow or
//! absent.
//!
//! The pieces, leaves first:
//! - [`governor::DomainRuleEngine`] — static behavioral rules merged by
//!   precedence into a [`governor::MergedEffect`],
//! - [`policy`] — the hard/soft policy split and its merge algebra,
//! - [`signals`] — the deadline-bounded advisory aggregation,
//! - [`selector`] — Phase A candidate generation and Phase B commit,
//! - [`engine::DecisionEngine`] — the per-turn pipeline,
//! - [`session::SessionContext`] — the cross-turn state owned by the caller.
//!
//! The advisory producers themselves (delegation scoring, presence
//! observation) live in the `aura-advisors` crate.

pub mod config;
pub mod engine;
pub mod error;
pub mod governor;
pub mod policy;
pub mod selector;
pub mod session;
pub mod shared;
pub mod signals;

pub use config::{DeadlineConfig, EngineConfig, SelectorConfig};
pub use engine::{merge_signal_policies, DecisionEngine, TurnDecision};
pub use error::EngineError;
pub use governor::{
    builtin_rules, DomainRuleEngine, GovernorRule, MergedEffect, RuleEffect, Tier,
};
pub use policy::{BrevityNudge, HardPolicy, Policy, PronounMode, SoftPolicy};
pub use selector::{
    BaselinePlanSource, CandidateSelector, CandidateSet, CommitReason, CommitResult,
    ConstraintBlock, Plan, PlanSource,
};
pub use session::{LateAdvisory, SessionContext, TurnRecord};
pub use shared::{
    Act, ActKind, Atmosphere, Classification, ClassificationFlags, DepthCeiling, Domain,
    EngagementMode, Pacing, TurnGoal, TurnInput,
};
pub use signals::{
    await_early_signals, conservative_defaults, ArrivalFlags, CandidateSuggestion, EarlySignals,
    EarlySignalsStatus, MetaEstimate, RiskFlags, Veto,
};
