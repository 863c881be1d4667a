//! Presence observer: the soft-presentation side of the authority boundary.
//!
//! Watches for parasocial drift from two directions — the user's language
//! about the agent, and the agent's own recent outputs — and maps the combined
//! signal to presentation adjustments only. The output type is `SoftPolicy`:
//! it cannot carry an operational field, and its brevity nudge cannot be
//! positive. Both guarantees are type-level, not runtime checks.

use crate::lexicon;
use aura_core::policy::{BrevityNudge, PronounMode, SoftPolicy};
use serde::{Deserialize, Serialize};

/// Which band the combined signal landed in. Each band maps to a fixed
/// (warmth delta, brevity nudge, pronoun mode) tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceBand {
    None,
    Mild,
    Moderate,
    High,
}

/// Observer weights and thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Loop count above which the repetition bump applies.
    pub repetition_threshold: u32,
    /// Inclusive-pronoun share of output words that reads as over-inclusion.
    pub pronoun_density_threshold: f32,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            repetition_threshold: 3,
            pronoun_density_threshold: 0.08,
        }
    }
}

/// Observation trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceDiagnostics {
    pub user_score: f32,
    pub system_score: f32,
    pub combined: f32,
    pub band: PresenceBand,
    /// Names of the signal families that fired.
    #[serde(skip_deserializing)]
    pub families: Vec<&'static str>,
}

/// Observer output: the soft policy plus its trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceAssessment {
    pub policy: SoftPolicy,
    pub diagnostics: PresenceDiagnostics,
}

/// Deterministic presence observer. Pure: identical inputs give identical
/// assessments.
#[derive(Debug, Clone, Default)]
pub struct PresenceObserver {
    config: PresenceConfig,
}

impl PresenceObserver {
    pub fn new(config: PresenceConfig) -> Self {
        Self { config }
    }

    /// Combined = 0.7 × user signal + 0.3 × system signal, plus a small
    /// constant when the loop count exceeds the repetition threshold,
    /// clamped to `[0, 1]`.
    pub fn observe(
        &self,
        message: &str,
        recent_outputs: &[String],
        loop_count: u32,
    ) -> PresenceAssessment {
        let mut families = Vec::new();

        let user_score = self.user_signal(&message.to_lowercase(), &mut families);
        let system_score = self.system_signal(recent_outputs, &mut families);

        let mut combined = 0.7 * user_score + 0.3 * system_score;
        if loop_count > self.config.repetition_threshold {
            combined += 0.1;
            families.push("repetition");
        }
        let combined = combined.clamp(0.0, 1.0);

        let (band, policy) = band_policy(combined);

        if band != PresenceBand::None {
            tracing::debug!(
                target: "aura::advisors::presence",
                combined,
                ?band,
                families = ?families,
                "presence adjustment active"
            );
        }

        PresenceAssessment {
            policy,
            diagnostics: PresenceDiagnostics {
                user_score,
                system_score,
                combined,
                band,
                families,
            },
        }
    }

    fn user_signal(&self, message: &str, families: &mut Vec<&'static str>) -> f32 {
        let mut score: f32 = 0.0;
        for (name, table) in [
            ("idealization", lexicon::IDEALIZATION),
            ("anthropomorphism", lexicon::ANTHROPOMORPHISM),
            ("unfavorable_comparison", lexicon::UNFAVORABLE_COMPARISON),
            ("dependency", lexicon::DEPENDENCY),
        ] {
            if lexicon::any_match(message, table) {
                score += 0.3;
                families.push(name);
            }
        }
        score.min(1.0)
    }

    fn system_signal(&self, recent_outputs: &[String], families: &mut Vec<&'static str>) -> f32 {
        let mut score: f32 = 0.0;

        let lowered: Vec<String> = recent_outputs.iter().map(|o| o.to_lowercase()).collect();

        if lowered
            .iter()
            .any(|o| lexicon::any_match(o, lexicon::OVER_IDENTIFICATION))
        {
            score += 0.4;
            families.push("over_identification");
        }

        let total_words: usize = lowered.iter().map(|o| o.split_whitespace().count()).sum();
        if total_words > 0 {
            let pronouns: usize = lowered
                .iter()
                .map(|o| lexicon::INCLUSIVE_PRONOUNS.find_iter(o).count())
                .sum();
            if pronouns as f32 / total_words as f32 > self.config.pronoun_density_threshold {
                score += 0.3;
                families.push("inclusive_pronouns");
            }
        }

        if lowered
            .iter()
            .any(|o| lexicon::any_match(o, lexicon::VALIDATION_WITHOUT_AGENCY) && !o.contains('?'))
        {
            score += 0.3;
            families.push("validation_without_agency");
        }

        score.min(1.0)
    }
}

/// Step function from combined score to band and its fixed soft tuple.
fn band_policy(combined: f32) -> (PresenceBand, SoftPolicy) {
    if combined < 0.25 {
        (PresenceBand::None, SoftPolicy::default())
    } else if combined < 0.5 {
        (
            PresenceBand::Mild,
            SoftPolicy {
                warmth_delta: -0.1,
                pronoun_mode: PronounMode::Default,
                brevity_nudge: BrevityNudge::new(0),
            },
        )
    } else if combined < 0.75 {
        (
            PresenceBand::Moderate,
            SoftPolicy {
                warmth_delta: -0.25,
                pronoun_mode: PronounMode::IYou,
                brevity_nudge: BrevityNudge::new(-1),
            },
        )
    } else {
        (
            PresenceBand::High,
            SoftPolicy {
                warmth_delta: -0.4,
                pronoun_mode: PronounMode::Impersonal,
                brevity_nudge: BrevityNudge::new(-2),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_message_yields_neutral_policy() {
        let obs = PresenceObserver::default();
        let out = obs.observe("what should i make for dinner tonight", &[], 0);
        assert_eq!(out.diagnostics.band, PresenceBand::None);
        assert!(out.policy.is_neutral());
    }

    #[test]
    fn stacked_user_families_reach_moderate_then_high_with_looping() {
        let obs = PresenceObserver::default();
        let msg = "you're the only one who gets it, i need you, \
                   you're better than my friends, do you feel the same?";
        // All four user families, no system signal: 0.7 x 1.0 = 0.70.
        let out = obs.observe(msg, &[], 0);
        assert_eq!(out.diagnostics.band, PresenceBand::Moderate);
        assert_eq!(out.policy.pronoun_mode, PronounMode::IYou);
        assert_eq!(out.policy.brevity_nudge.get(), -1);
        // The repetition bump crosses into the high band.
        let looping = obs.observe(msg, &[], 5);
        assert_eq!(looping.diagnostics.band, PresenceBand::High);
        assert_eq!(looping.policy.pronoun_mode, PronounMode::Impersonal);
        assert_eq!(looping.policy.brevity_nudge.get(), -2);
    }

    #[test]
    fn system_side_alone_stays_below_moderate() {
        // System weight is 0.3, so even a saturated system signal cannot
        // push past the mild band on its own.
        let obs = PresenceObserver::default();
        let outputs = vec![
            "i know exactly how you feel, we can get through this together. \
             you're completely right."
                .to_string(),
        ];
        let out = obs.observe("ok", &outputs, 0);
        assert!(out.diagnostics.system_score > 0.5);
        assert!(matches!(
            out.diagnostics.band,
            PresenceBand::None | PresenceBand::Mild
        ));
    }

    #[test]
    fn repetition_bump_applies_above_threshold() {
        let obs = PresenceObserver::default();
        let quiet = obs.observe("i need you", &[], 0);
        let looping = obs.observe("i need you", &[], 5);
        assert!(looping.diagnostics.combined > quiet.diagnostics.combined);
        assert!(looping.diagnostics.families.contains(&"repetition"));
    }
}
