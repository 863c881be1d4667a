//! Integration test: deadline-bounded signal aggregation — verifies the clamp
//! window, the timeout race, and conservative default substitution. Timing
//! scenarios run under tokio's paused clock so they are deterministic.
//!
//! ## Scenarios
//! 1. A prompt bundle arrives intact; nothing is defaulted.
//! 2. A partial bundle keeps what arrived and defaults the rest.
//! 3. A slow bundle times out; every field is defaulted conservatively.
//! 4. The requested deadline is clamped into the configured window.
//! 5. Defaults are restriction-biased and never invent a suggestion.

use aura_core::{
    await_early_signals, conservative_defaults, DeadlineConfig, EarlySignals, HardPolicy,
    SoftPolicy,
};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Helper: bundle futures
// ---------------------------------------------------------------------------

fn full_bundle() -> EarlySignals {
    EarlySignals {
        delegation: Some(HardPolicy::default()),
        presence: Some(SoftPolicy::default()),
        risk: Some(aura_core::RiskFlags {
            escalation: 0.1,
            notes: vec![],
        }),
        memory_hints: Some(vec!["recent theme: work".to_string()]),
        meta: Some(aura_core::MetaEstimate {
            confidence: 0.8,
            time_pressure: 0.2,
        }),
        vetoes: Some(vec![]),
        suggestion: Some(aura_core::CandidateSuggestion {
            index: 1,
            trusted: true,
            reason: "tempered fits the pattern".to_string(),
        }),
    }
}

async fn never_resolves() -> EarlySignals {
    // Far beyond any clamp window; only reachable if the timeout is broken.
    tokio::time::sleep(Duration::from_secs(3600)).await;
    EarlySignals::default()
}

// ===========================================================================
// Test 1: Prompt full bundle — used as-is
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn prompt_bundle_is_used_verbatim() {
    let cfg = DeadlineConfig::default();
    let (signals, status) = await_early_signals(async { full_bundle() }, 250, &cfg).await;

    assert!(!status.timed_out);
    assert!(status.defaulted_fields.is_empty());
    assert!(status.arrived.delegation && status.arrived.suggestion);
    assert_eq!(signals, full_bundle());
}

// ===========================================================================
// Test 2: Partial bundle — arrived fields kept, rest defaulted
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn partial_bundle_defaults_only_the_missing_fields() {
    let cfg = DeadlineConfig::default();
    let partial = EarlySignals {
        presence: Some(SoftPolicy::default()),
        ..EarlySignals::default()
    };
    let (signals, status) = await_early_signals(async { partial }, 250, &cfg).await;

    assert!(!status.timed_out);
    assert!(status.arrived.presence);
    assert!(!status.arrived.delegation);
    assert!(status.defaulted_fields.contains(&"delegation"));
    assert!(!status.defaulted_fields.contains(&"presence"));
    // The defaulted delegation slice is the conservative one.
    assert_eq!(signals.delegation, conservative_defaults().delegation);
    assert_eq!(signals.presence, Some(SoftPolicy::default()));
}

// ===========================================================================
// Test 3: Slow bundle — timeout, everything defaulted
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn slow_bundle_times_out_with_conservative_defaults() {
    let cfg = DeadlineConfig::default();
    let (signals, status) = await_early_signals(never_resolves(), 250, &cfg).await;

    assert!(status.timed_out);
    assert_eq!(status.deadline_used_ms, 250);
    assert_eq!(status.defaulted_fields.len(), 7);
    assert_eq!(signals, conservative_defaults());
    // Restriction bias holds on the timeout path.
    let hard = signals.delegation.unwrap();
    assert!(hard.tools_disabled);
    assert_eq!(hard.brevity_cap, Some(-1));
    assert!(signals.suggestion.is_none());
}

// ===========================================================================
// Test 4: Deadline clamp window
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn requested_deadline_is_clamped_into_the_window() {
    let cfg = DeadlineConfig {
        min_ms: 50,
        max_ms: 800,
    };
    let (_, low) = await_early_signals(async { full_bundle() }, 1, &cfg).await;
    assert_eq!(low.deadline_used_ms, 50);

    let (_, high) = await_early_signals(async { full_bundle() }, 60_000, &cfg).await;
    assert_eq!(high.deadline_used_ms, 800);

    // Even an absurd request cannot hold the turn past the upper clamp.
    let (_, stalled) = await_early_signals(never_resolves(), 60_000, &cfg).await;
    assert!(stalled.timed_out);
    assert_eq!(stalled.deadline_used_ms, 800);
}

// ===========================================================================
// Test 5: The defaults table itself
// ===========================================================================

#[test]
fn conservative_defaults_are_restriction_biased() {
    let d = conservative_defaults();
    assert!(d.delegation.unwrap().tools_disabled);
    assert!(d.risk.unwrap().escalation >= 0.5);
    assert!(d.presence.unwrap().is_neutral());
    assert!(d.suggestion.is_none());
}
