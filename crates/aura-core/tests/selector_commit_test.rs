//! Integration test: phased candidate selection — verifies Phase A ranking
//! and the Phase B priority order (veto, trusted suggestion, recommendation,
//! timeout bias), plus the zero-candidate fallback.
//!
//! ## Scenarios
//! 1. Phase A is deterministic: identical inputs, identical candidate sets.
//! 2. A severe veto against the recommended plan shifts to the first safer
//!    candidate that lacks the vetoed act.
//! 3. A veto below the severity threshold does not move selection.
//! 4. A trusted suggestion naming a real candidate is honored.
//! 5. A veto outranks a suggestion when both are present.
//! 6. On timeout, selection biases one step toward the safer end.
//! 7. With zero candidates, the canonical minimal plan commits as fallback.
//! 8. Constraints shape the committed plan; the act sequence is untouched.

use aura_core::{
    ActKind, CandidateSelector, CandidateSet, Classification, CommitReason, EarlySignals,
    EarlySignalsStatus, HardPolicy, MergedEffect, Policy, SelectorConfig, Veto,
};

// ---------------------------------------------------------------------------
// Helper: a standard Phase A set and signal fixtures
// ---------------------------------------------------------------------------

fn selector() -> CandidateSelector {
    CandidateSelector::default()
}

fn standard_candidates() -> CandidateSet {
    // Explore-goal default: engaged (with Explore), tempered, minimal.
    selector().generate(&Classification::default(), 0.5, 0.0)
}

fn quiet_status() -> EarlySignalsStatus {
    EarlySignalsStatus::default()
}

fn timed_out_status() -> EarlySignalsStatus {
    EarlySignalsStatus {
        timed_out: true,
        ..EarlySignalsStatus::default()
    }
}

fn veto_against(target: ActKind, severity: f32) -> EarlySignals {
    EarlySignals {
        vetoes: Some(vec![Veto {
            target,
            severity,
            reason: "pattern risk".to_string(),
        }]),
        ..EarlySignals::default()
    }
}

fn suggestion_for(index: usize, trusted: bool) -> EarlySignals {
    EarlySignals {
        suggestion: Some(aura_core::CandidateSuggestion {
            index,
            trusted,
            reason: "history says keep it small".to_string(),
        }),
        ..EarlySignals::default()
    }
}

fn commit_with(signals: &EarlySignals, status: &EarlySignalsStatus) -> aura_core::CommitResult {
    selector().commit(
        &standard_candidates(),
        signals,
        status,
        &MergedEffect::default(),
        &Policy::default(),
        &SelectorConfig::default(),
    )
}

// ===========================================================================
// Test 1: Phase A determinism
// ===========================================================================

#[test]
fn phase_a_is_deterministic() {
    let a = standard_candidates();
    let b = standard_candidates();
    assert_eq!(a, b);
    assert_eq!(a.plans.len(), 3);
    assert_eq!(a.recommended, 0);
}

// ===========================================================================
// Test 2: Severe veto shifts to the first safer candidate without the act
// ===========================================================================

#[test]
fn severe_veto_shifts_past_plans_with_the_vetoed_act() {
    // The engaged plan explores; tempered (index 1) does not.
    let result = commit_with(&veto_against(ActKind::Explore, 0.9), &quiet_status());
    assert_eq!(result.selected_index, 1);
    assert_eq!(result.commit_reason, CommitReason::BySignals);
    assert!(!result.plan.acts.iter().any(|a| a.kind == ActKind::Explore));
}

#[test]
fn veto_against_every_safer_candidate_lands_on_the_last() {
    // Every candidate validates, so the shift scan exhausts and lands on
    // the last (safest) candidate.
    let result = commit_with(&veto_against(ActKind::Validate, 0.9), &quiet_status());
    assert_eq!(result.selected_index, 2);
    assert_eq!(result.commit_reason, CommitReason::BySignals);
}

// ===========================================================================
// Test 3: Sub-threshold veto is recorded but inert
// ===========================================================================

#[test]
fn mild_veto_does_not_move_selection() {
    let result = commit_with(&veto_against(ActKind::Explore, 0.3), &quiet_status());
    assert_eq!(result.selected_index, 0);
    assert_eq!(result.commit_reason, CommitReason::ByScore);
}

// ===========================================================================
// Test 4: Trusted suggestion with a valid index is honored
// ===========================================================================

#[test]
fn trusted_suggestion_moves_selection() {
    let result = commit_with(&suggestion_for(2, true), &quiet_status());
    assert_eq!(result.selected_index, 2);
    assert_eq!(result.commit_reason, CommitReason::BySignals);
}

#[test]
fn untrusted_or_out_of_range_suggestions_are_ignored() {
    let untrusted = commit_with(&suggestion_for(2, false), &quiet_status());
    assert_eq!(untrusted.selected_index, 0);
    assert_eq!(untrusted.commit_reason, CommitReason::ByScore);

    let out_of_range = commit_with(&suggestion_for(9, true), &quiet_status());
    assert_eq!(out_of_range.selected_index, 0);
    assert_eq!(out_of_range.commit_reason, CommitReason::ByScore);
}

// ===========================================================================
// Test 5: Veto outranks suggestion
// ===========================================================================

#[test]
fn veto_outranks_a_trusted_suggestion() {
    let signals = EarlySignals {
        vetoes: veto_against(ActKind::Explore, 0.9).vetoes,
        suggestion: suggestion_for(0, true).suggestion,
        ..EarlySignals::default()
    };
    let result = commit_with(&signals, &quiet_status());
    assert_eq!(result.selected_index, 1);
    assert_eq!(result.commit_reason, CommitReason::BySignals);
}

// ===========================================================================
// Test 6: Timeout biases one step toward safety
// ===========================================================================

#[test]
fn timeout_biases_selection_one_step_safer() {
    let result = commit_with(&EarlySignals::default(), &timed_out_status());
    assert_eq!(result.selected_index, 1);
    assert_eq!(result.commit_reason, CommitReason::ByFallback);
}

// ===========================================================================
// Test 7: Zero candidates commit the canonical minimal plan
// ===========================================================================

#[test]
fn zero_candidates_fall_back_to_the_minimal_plan() {
    let empty = CandidateSet {
        plans: vec![],
        recommended: 0,
    };
    let result = selector().commit(
        &empty,
        &EarlySignals::default(),
        &quiet_status(),
        &MergedEffect::default(),
        &Policy::default(),
        &SelectorConfig::default(),
    );
    assert_eq!(result.commit_reason, CommitReason::ByFallback);
    assert_eq!(result.plan.label, "minimal");
    assert!(result.plan.acts.iter().any(|a| a.kind == ActKind::Ground));
}

// ===========================================================================
// Test 8: Policy shapes constraints, never the act sequence
// ===========================================================================

#[test]
fn commit_applies_policy_to_constraints_only() {
    let policy = Policy::from_hard(HardPolicy {
        tools_disabled: true,
        require_user_effort: true,
        brevity_cap: Some(-1),
    });
    let candidates = standard_candidates();
    let acts_before = candidates.plans[0].acts.clone();
    let result = selector().commit(
        &candidates,
        &EarlySignals::default(),
        &quiet_status(),
        &MergedEffect::default(),
        &policy,
        &SelectorConfig::default(),
    );
    assert_eq!(result.plan.acts, acts_before);
    assert!(!result.plan.constraints.tools_enabled);
    assert!(result.plan.constraints.require_user_effort);
    assert_eq!(result.plan.constraints.brevity, Some(-1));
}
