//! Session-scoped context.
//!
//! The engine itself is stateless per turn; everything that persists across
//! turns lives here and is owned by the external orchestrator. Counters are
//! updated exactly once per turn, after commit — never concurrently during
//! the advisory race. The turn log is append-only and exposed as a read-only
//! slice.

use crate::selector::CommitResult;
use crate::signals::EarlySignalsStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::mpsc;
use uuid::Uuid;

const RECENT_OUTPUT_WINDOW: usize = 8;

/// One committed turn, as recorded in the session log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn: u64,
    pub at: DateTime<Utc>,
    pub selected_index: usize,
    pub commit_reason: crate::selector::CommitReason,
    /// A hard constraint was active on this turn.
    pub intervened: bool,
    pub timed_out: bool,
}

/// A producer result that resolved after its turn's deadline. Not used for
/// the turn it was computed for; drained between turns as history input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LateAdvisory {
    pub producer: String,
    pub turn: u64,
    pub payload: serde_json::Value,
}

/// Mutable state for one conversation session.
pub struct SessionContext {
    pub id: Uuid,
    turn_counter: u64,
    intervention_count: u32,
    turns_since_last_intervention: u32,
    loop_count: u32,
    influence_budget: f32,
    recent_outputs: VecDeque<String>,
    turn_log: Vec<TurnRecord>,
    late_tx: mpsc::UnboundedSender<LateAdvisory>,
    late_rx: mpsc::UnboundedReceiver<LateAdvisory>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        let (late_tx, late_rx) = mpsc::unbounded_channel();
        Self {
            id: Uuid::new_v4(),
            turn_counter: 0,
            intervention_count: 0,
            turns_since_last_intervention: 0,
            loop_count: 0,
            influence_budget: 1.0,
            recent_outputs: VecDeque::new(),
            turn_log: Vec::new(),
            late_tx,
            late_rx,
        }
    }

    pub fn turn_counter(&self) -> u64 {
        self.turn_counter
    }

    /// Hard interventions committed so far this session.
    pub fn intervention_count(&self) -> u32 {
        self.intervention_count
    }

    pub fn turns_since_last_intervention(&self) -> u32 {
        self.turns_since_last_intervention
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    /// Remaining influence budget in `[0, 1]`. Each intervention spends some;
    /// a depleted budget is a signal to the orchestrator, not a gate here.
    pub fn influence_budget(&self) -> f32 {
        self.influence_budget
    }

    /// Recent agent outputs, oldest first. Input to the presence observer.
    pub fn recent_outputs(&self) -> impl Iterator<Item = &str> {
        self.recent_outputs.iter().map(String::as_str)
    }

    pub fn recent_outputs_vec(&self) -> Vec<String> {
        self.recent_outputs.iter().cloned().collect()
    }

    /// Read-only view of the append-only turn log.
    pub fn turn_log(&self) -> &[TurnRecord] {
        &self.turn_log
    }

    /// Records a committed turn. Called exactly once per turn, after commit.
    pub fn record_turn(&mut self, commit: &CommitResult, status: &EarlySignalsStatus, intervened: bool) {
        self.turn_counter += 1;
        if intervened {
            self.intervention_count += 1;
            self.turns_since_last_intervention = 0;
            self.influence_budget = (self.influence_budget - 0.1).max(0.0);
        } else {
            self.turns_since_last_intervention = self.turns_since_last_intervention.saturating_add(1);
        }
        self.turn_log.push(TurnRecord {
            turn: self.turn_counter,
            at: Utc::now(),
            selected_index: commit.selected_index,
            commit_reason: commit.commit_reason,
            intervened,
            timed_out: status.timed_out,
        });
    }

    /// Notes a rendered agent output for the presence observer's window.
    pub fn note_agent_output(&mut self, output: impl Into<String>) {
        if self.recent_outputs.len() == RECENT_OUTPUT_WINDOW {
            self.recent_outputs.pop_front();
        }
        self.recent_outputs.push_back(output.into());
    }

    /// Updates the repetition counter maintained by the external orchestrator.
    pub fn set_loop_count(&mut self, loop_count: u32) {
        self.loop_count = loop_count;
    }

    /// Sender handed to advisory producers so results that miss the deadline
    /// still land somewhere. The tasks are never force-cancelled.
    pub fn late_sender(&self) -> mpsc::UnboundedSender<LateAdvisory> {
        self.late_tx.clone()
    }

    /// Drains advisory results that arrived since the last drain. Called by
    /// the orchestrator between turns.
    pub fn drain_late(&mut self) -> Vec<LateAdvisory> {
        let mut drained = Vec::new();
        while let Ok(item) = self.late_rx.try_recv() {
            drained.push(item);
        }
        drained
    }
}
