//! Early signals: the deadline-bounded advisory bundle.
//!
//! Advisory producers run as independent tasks; `await_early_signals` races
//! their combined future against a clamped `tokio::time::timeout`. This is the
//! **only** suspension point and the only permitted source of non-determinism
//! in the core — everything downstream is a pure function of the bundle and
//! its status, so the race outcome can be mocked in tests.
//!
//! Unresolved fields are filled from a fixed conservative-defaults table that
//! is deliberately biased toward restriction: tool access disabled, moderate
//! risk assumed. Uncertainty never relaxes a constraint.

use crate::config::DeadlineConfig;
use crate::policy::{HardPolicy, SoftPolicy};
use crate::shared::ActKind;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// A targeted objection from a risk-oriented producer. Above the configured
/// severity threshold it can move Phase B off the recommended candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Veto {
    /// The act the veto objects to.
    pub target: ActKind,
    /// Severity in `[0, 1]`.
    pub severity: f32,
    pub reason: String,
}

/// An explicit candidate suggestion from a producer. Only honored when
/// `trusted` is set and the index names a real candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSuggestion {
    pub index: usize,
    pub trusted: bool,
    pub reason: String,
}

/// Coarse risk estimate for the turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFlags {
    /// Escalation likelihood in `[0, 1]`.
    pub escalation: f32,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Metacognitive/temporal estimate supplied by an advisory producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaEstimate {
    /// Producer confidence in its own read of the turn, `[0, 1]`.
    pub confidence: f32,
    /// How much the user seems to be pressing for speed, `[0, 1]`.
    pub time_pressure: f32,
}

/// Best-effort advisory bundle. Every field is optional; absence means the
/// producer did not resolve in time (or failed) and the conservative default
/// was substituted by `await_early_signals`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarlySignals {
    /// Hard-constraint policy from the delegation scorer.
    #[serde(default)]
    pub delegation: Option<HardPolicy>,
    /// Soft-presentation policy from the presence observer.
    #[serde(default)]
    pub presence: Option<SoftPolicy>,
    #[serde(default)]
    pub risk: Option<RiskFlags>,
    #[serde(default)]
    pub memory_hints: Option<Vec<String>>,
    #[serde(default)]
    pub meta: Option<MetaEstimate>,
    #[serde(default)]
    pub vetoes: Option<Vec<Veto>>,
    #[serde(default)]
    pub suggestion: Option<CandidateSuggestion>,
}

/// Per-field arrival flags, recorded before defaults are substituted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalFlags {
    pub delegation: bool,
    pub presence: bool,
    pub risk: bool,
    pub memory_hints: bool,
    pub meta: bool,
    pub vetoes: bool,
    pub suggestion: bool,
}

/// Outcome report for the deadline race.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarlySignalsStatus {
    /// The deadline actually used, after clamping the caller's request.
    pub deadline_used_ms: u64,
    /// Wall-clock time spent waiting on the bundle.
    pub waited_ms: u64,
    pub arrived: ArrivalFlags,
    /// Names of fields filled from the conservative-defaults table.
    #[serde(skip_deserializing)]
    pub defaulted_fields: Vec<&'static str>,
    pub timed_out: bool,
}

/// The conservative-defaults table. Restriction-biased: tools stay off,
/// moderate escalation risk is assumed, nothing suggests a candidate.
pub fn conservative_defaults() -> EarlySignals {
    EarlySignals {
        delegation: Some(HardPolicy {
            tools_disabled: true,
            require_user_effort: false,
            brevity_cap: Some(-1),
        }),
        presence: Some(SoftPolicy::default()),
        risk: Some(RiskFlags {
            escalation: 0.5,
            notes: vec!["defaulted: moderate uncertainty assumed".to_string()],
        }),
        memory_hints: Some(Vec::new()),
        meta: Some(MetaEstimate {
            confidence: 0.5,
            time_pressure: 0.5,
        }),
        vetoes: Some(Vec::new()),
        // No suggestion is ever fabricated.
        suggestion: None,
    }
}

/// Awaits the advisory bundle up to a clamped deadline.
///
/// The requested deadline is clamped into `[cfg.min_ms, cfg.max_ms]` no matter
/// what the caller asked for. If the bundle resolves first it is used as-is
/// apart from default substitution for fields its producers dropped; if the
/// timer fires first every field is defaulted and `timed_out` is set. Both
/// paths share `fill_defaults`, so on-time and on-timeout behavior cannot
/// diverge.
pub async fn await_early_signals<F>(
    bundle: F,
    requested_ms: u64,
    cfg: &DeadlineConfig,
) -> (EarlySignals, EarlySignalsStatus)
where
    F: Future<Output = EarlySignals>,
{
    let deadline_ms = requested_ms.clamp(cfg.min_ms, cfg.max_ms);
    let started = Instant::now();

    let (signals, timed_out) =
        match tokio::time::timeout(Duration::from_millis(deadline_ms), bundle).await {
            Ok(signals) => (signals, false),
            Err(_) => (EarlySignals::default(), true),
        };

    let waited_ms = started.elapsed().as_millis() as u64;
    let (signals, status) = fill_defaults(signals, deadline_ms, waited_ms, timed_out);

    if status.timed_out {
        tracing::warn!(
            target: "aura::signals",
            deadline_ms,
            waited_ms,
            defaulted = ?status.defaulted_fields,
            "advisory bundle timed out; conservative defaults substituted"
        );
    } else if !status.defaulted_fields.is_empty() {
        tracing::debug!(
            target: "aura::signals",
            defaulted = ?status.defaulted_fields,
            "bundle arrived with dropped fields; defaults substituted"
        );
    }

    (signals, status)
}

/// Substitutes conservative defaults for every unresolved field and records
/// arrival flags. Shared by the on-time and on-timeout paths.
fn fill_defaults(
    mut signals: EarlySignals,
    deadline_used_ms: u64,
    waited_ms: u64,
    timed_out: bool,
) -> (EarlySignals, EarlySignalsStatus) {
    let defaults = conservative_defaults();
    let mut status = EarlySignalsStatus {
        deadline_used_ms,
        waited_ms,
        timed_out,
        ..EarlySignalsStatus::default()
    };

    macro_rules! fill {
        ($field:ident) => {
            status.arrived.$field = signals.$field.is_some();
            if signals.$field.is_none() {
                signals.$field = defaults.$field;
                status.defaulted_fields.push(stringify!($field));
            }
        };
    }

    fill!(delegation);
    fill!(presence);
    fill!(risk);
    fill!(memory_hints);
    fill!(meta);
    fill!(vetoes);
    fill!(suggestion);

    (signals, status)
}
