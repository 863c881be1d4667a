//! The per-turn decision pipeline.
//!
//! Flow: classification → governor (sync) and, in parallel, the advisory
//! bundle → deadline-bounded aggregation → policy merge → Phase A candidates
//! (sync, generated before the await so they cannot depend on signals) →
//! Phase B commit. The aggregator await is the only suspension point.

use crate::config::EngineConfig;
use crate::governor::{DomainRuleEngine, MergedEffect};
use crate::policy::Policy;
use crate::selector::{CandidateSelector, CommitResult};
use crate::shared::TurnInput;
use crate::signals::{await_early_signals, EarlySignals, EarlySignalsStatus};
use serde::Serialize;
use std::future::Future;

/// Everything a turn decision produced, for the renderer and the orchestrator.
#[derive(Debug, Clone, Serialize)]
pub struct TurnDecision {
    pub effect: MergedEffect,
    pub policy: Policy,
    pub commit: CommitResult,
    pub status: EarlySignalsStatus,
}

impl TurnDecision {
    /// True when a hard constraint was active — the orchestrator uses this to
    /// bump the session's intervention counters after commit.
    pub fn intervened(&self) -> bool {
        !self.policy.hard.is_empty()
    }
}

/// Top-level decision engine. Holds only immutable configuration and pure
/// components; all session state stays with the caller.
pub struct DecisionEngine {
    config: EngineConfig,
    governor: DomainRuleEngine,
    selector: CandidateSelector,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl DecisionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            governor: DomainRuleEngine::new(),
            selector: CandidateSelector::default(),
        }
    }

    /// Replaces the governor rule table (alternative personas, tests).
    pub fn with_governor(mut self, governor: DomainRuleEngine) -> Self {
        self.governor = governor;
        self
    }

    /// Replaces the Phase A plan source.
    pub fn with_selector(mut self, selector: CandidateSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decides one turn. `bundle` is the combined advisory future — built by
    /// the advisors crate in production, trivially mockable in tests. Given
    /// identical classification, bundle payload, and race outcome, the
    /// decision is identical.
    pub async fn decide<F>(&self, turn: &TurnInput, bundle: F) -> TurnDecision
    where
        F: Future<Output = EarlySignals>,
    {
        let effect = self.governor.evaluate(&turn.classification);

        // Phase A runs before the await: candidates are a pure function of the
        // classification and the two scalars, independent of any signal.
        let candidates = self.selector.generate(
            &turn.classification,
            turn.potency,
            turn.withdrawal_bias,
        );

        let (signals, status) =
            await_early_signals(bundle, turn.requested_deadline_ms, &self.config.deadline).await;

        let policy = merge_signal_policies(&signals);

        let commit = self.selector.commit(
            &candidates,
            &signals,
            &status,
            &effect,
            &policy,
            &self.config.selector,
        );

        tracing::info!(
            target: "aura::engine",
            selected = commit.selected_index,
            reason = ?commit.commit_reason,
            timed_out = status.timed_out,
            intervened = !policy.hard.is_empty(),
            "turn committed"
        );

        TurnDecision {
            effect,
            policy,
            commit,
            status,
        }
    }
}

/// Lifts the two scorer outputs into policies along the authority boundary
/// and merges them. Order does not matter (the merge is commutative on these
/// inputs since each source populates only its own half).
pub fn merge_signal_policies(signals: &EarlySignals) -> Policy {
    let hard = signals.delegation.map(Policy::from_hard).unwrap_or_default();
    let soft = signals.presence.map(Policy::from_soft).unwrap_or_default();
    hard.merge(soft)
}
