//! aura-advisors: advisory producers for the Aura decision core.
//!
//! Each producer computes one slice of the early-signal bundle. The two core
//! scorers — [`delegation::DelegationScorer`] (hard constraints) and
//! [`presence::PresenceObserver`] (soft presentation) — are pure synchronous
//! functions wrapped in the [`AdvisoryProducer`] trait so they run as
//! independent tasks; additional producers (risk, memory hints,
//! metacognition, vetoes, suggestions) plug in through the same seam.
//!
//! [`gather`] spawns every producer and returns a combined future for the
//! core's deadline aggregator. When the aggregator times out, the spawned
//! tasks are **not** cancelled: each one reports its completed payload to the
//! session's late channel, so work that missed the deadline still feeds the
//! next turn's history.

pub mod delegation;
pub mod lexicon;
pub mod presence;

pub use delegation::{
    DelegationAssessment, DelegationConfig, DelegationScorer, DelegationTier, MotiveCategory,
};
pub use presence::{PresenceAssessment, PresenceBand, PresenceConfig, PresenceObserver};

use aura_core::session::{LateAdvisory, SessionContext};
use aura_core::shared::{Classification, TurnInput};
use aura_core::signals::{CandidateSuggestion, EarlySignals, MetaEstimate, RiskFlags, Veto};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

/// Errors from advisory producers. The gather layer logs these and leaves the
/// producer's field unresolved; the aggregator then substitutes its default —
/// a failed producer is handled exactly like one that timed out.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("producer '{producer}' failed: {detail}")]
    Failed {
        producer: &'static str,
        detail: String,
    },
}

/// Everything a producer may read for one turn: the message, its
/// classification, and an immutable snapshot of the session counters. Owned
/// so producer tasks can outlive the turn that spawned them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnView {
    pub message: String,
    pub classification: Classification,
    pub recent_outputs: Vec<String>,
    pub loop_count: u32,
    pub intervention_count: u32,
    pub turns_since_last_intervention: u32,
    pub turn: u64,
}

impl TurnView {
    pub fn new(turn: &TurnInput, session: &SessionContext) -> Self {
        Self {
            message: turn.message.clone(),
            classification: turn.classification.clone(),
            recent_outputs: session.recent_outputs_vec(),
            loop_count: session.loop_count(),
            intervention_count: session.intervention_count(),
            turns_since_last_intervention: session.turns_since_last_intervention(),
            turn: session.turn_counter() + 1,
        }
    }
}

/// One slice of the early-signal bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AdvisorySlice {
    Delegation(DelegationAssessment),
    Presence(PresenceAssessment),
    Risk(RiskFlags),
    MemoryHints(Vec<String>),
    Meta(MetaEstimate),
    Vetoes(Vec<Veto>),
    Suggestion(CandidateSuggestion),
}

/// An independent advisory producer.
#[async_trait::async_trait]
pub trait AdvisoryProducer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn produce(&self, view: &TurnView) -> Result<AdvisorySlice, AdvisorError>;
}

/// Delegation scorer behind the producer seam.
#[derive(Default)]
pub struct DelegationProducer {
    scorer: DelegationScorer,
}

impl DelegationProducer {
    pub fn new(config: DelegationConfig) -> Self {
        Self {
            scorer: DelegationScorer::new(config),
        }
    }
}

#[async_trait::async_trait]
impl AdvisoryProducer for DelegationProducer {
    fn name(&self) -> &'static str {
        "delegation"
    }

    async fn produce(&self, view: &TurnView) -> Result<AdvisorySlice, AdvisorError> {
        Ok(AdvisorySlice::Delegation(self.scorer.score(view)))
    }
}

/// Presence observer behind the producer seam.
#[derive(Default)]
pub struct PresenceProducer {
    observer: PresenceObserver,
}

impl PresenceProducer {
    pub fn new(config: PresenceConfig) -> Self {
        Self {
            observer: PresenceObserver::new(config),
        }
    }
}

#[async_trait::async_trait]
impl AdvisoryProducer for PresenceProducer {
    fn name(&self) -> &'static str {
        "presence"
    }

    async fn produce(&self, view: &TurnView) -> Result<AdvisorySlice, AdvisorError> {
        Ok(AdvisorySlice::Presence(self.observer.observe(
            &view.message,
            &view.recent_outputs,
            view.loop_count,
        )))
    }
}

/// The default producer set.
pub fn default_producers() -> Vec<Arc<dyn AdvisoryProducer>> {
    vec![
        Arc::new(DelegationProducer::default()),
        Arc::new(PresenceProducer::default()),
    ]
}

/// Spawns every producer as its own task and returns a future that folds the
/// results into one [`EarlySignals`] bundle.
///
/// Each task also reports its payload to `late_tx` once it completes. If the
/// core's deadline fires first, this combined future is dropped but the
/// spawned tasks keep running to completion — their late-channel reports are
/// what the session drains between turns. Producer failures are logged and
/// leave the corresponding field unresolved.
pub fn gather(
    producers: Vec<Arc<dyn AdvisoryProducer>>,
    view: TurnView,
    late_tx: Option<UnboundedSender<LateAdvisory>>,
) -> impl std::future::Future<Output = EarlySignals> + Send {
    let mut handles = Vec::with_capacity(producers.len());
    for producer in producers {
        let view = view.clone();
        let late_tx = late_tx.clone();
        handles.push(tokio::spawn(async move {
            let name = producer.name();
            let result = producer.produce(&view).await;
            match result {
                Ok(slice) => {
                    if let Some(tx) = late_tx {
                        let _ = tx.send(LateAdvisory {
                            producer: name.to_string(),
                            turn: view.turn,
                            payload: serde_json::to_value(&slice)
                                .unwrap_or(serde_json::Value::Null),
                        });
                    }
                    Some(slice)
                }
                Err(err) => {
                    tracing::warn!(
                        target: "aura::advisors",
                        producer = name,
                        error = %err,
                        "advisory producer failed; field left for defaulting"
                    );
                    None
                }
            }
        }));
    }

    async move {
        let mut signals = EarlySignals::default();
        for result in futures_util::future::join_all(handles).await {
            match result {
                Ok(Some(slice)) => fold_slice(&mut signals, slice),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(
                        target: "aura::advisors",
                        error = %err,
                        "advisory task aborted; field left for defaulting"
                    );
                }
            }
        }
        signals
    }
}

/// Folds one producer slice into the bundle. Vetoes accumulate; every other
/// slice kind lands in its own field.
fn fold_slice(signals: &mut EarlySignals, slice: AdvisorySlice) {
    match slice {
        AdvisorySlice::Delegation(assessment) => {
            signals.delegation = Some(assessment.policy);
        }
        AdvisorySlice::Presence(assessment) => {
            signals.presence = Some(assessment.policy);
        }
        AdvisorySlice::Risk(risk) => signals.risk = Some(risk),
        AdvisorySlice::MemoryHints(hints) => signals.memory_hints = Some(hints),
        AdvisorySlice::Meta(meta) => signals.meta = Some(meta),
        AdvisorySlice::Vetoes(vetoes) => {
            signals
                .vetoes
                .get_or_insert_with(Vec::new)
                .extend(vetoes);
        }
        AdvisorySlice::Suggestion(suggestion) => signals.suggestion = Some(suggestion),
    }
}
