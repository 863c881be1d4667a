//! Policy types and the merge algebra.
//!
//! The policy is split along an authority boundary: **hard** fields may only be
//! populated by the delegation scorer, **soft** fields only by the presence
//! observer. The boundary is structural — `Policy::from_hard` and
//! `Policy::from_soft` are the only ways a scorer output enters a `Policy`, and
//! neither constructor touches the other half.
//!
//! Merge operators per field:
//! - hard booleans: logical OR (monotonic — once true, never false again),
//! - numeric bounds: minimum when present in both sources,
//! - warmth delta: sum, clamped to `[-1, 1]`,
//! - pronoun mode: fixed dominance order (`impersonal > i_you > default`).

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};

/// Pronoun handling requested of the renderer. Dominance-ordered: a merge
/// keeps the strongest mode seen, so a later mild signal cannot downgrade an
/// earlier strong one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PronounMode {
    #[default]
    Default,
    /// Keep a clear I/you separation; avoid "we".
    IYou,
    /// Drop self-reference where possible.
    Impersonal,
}

/// Non-positive brevity adjustment. The presence observer may only shorten
/// output, never lengthen it; this newtype makes a positive nudge
/// unrepresentable. A positive value at a deserialization boundary is a
/// programming error upstream and is rejected loudly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct BrevityNudge(i8);

impl BrevityNudge {
    /// Builds a nudge, saturating positive inputs to 0.
    pub const fn new(value: i8) -> Self {
        if value > 0 {
            Self(0)
        } else {
            Self(value)
        }
    }

    pub const fn get(self) -> i8 {
        self.0
    }

    pub const fn is_neutral(self) -> bool {
        self.0 == 0
    }
}

impl<'de> Deserialize<'de> for BrevityNudge {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i8::deserialize(deserializer)?;
        if value > 0 {
            // A positive nudge here means an upstream component wrote into a
            // field it has no authority over. Fail loudly, never coerce.
            return Err(D::Error::custom(format!(
                "brevity nudge must be non-positive, got {value}"
            )));
        }
        Ok(Self(value))
    }
}

/// Operational constraints. Settable only by the delegation scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardPolicy {
    /// Tool access withdrawn for this turn.
    #[serde(default)]
    pub tools_disabled: bool,
    /// The next concrete step must come from the user, not the agent.
    #[serde(default)]
    pub require_user_effort: bool,
    /// Brevity bound in response-length steps; more negative is shorter.
    #[serde(default)]
    pub brevity_cap: Option<i8>,
}

impl HardPolicy {
    /// True when no hard constraint is active.
    pub fn is_empty(&self) -> bool {
        !self.tools_disabled && !self.require_user_effort && self.brevity_cap.is_none()
    }
}

/// Presentation adjustments. Settable only by the presence observer. Contains
/// no operational fields by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftPolicy {
    /// Warmth adjustment in `[-1, 1]`; negative cools the register.
    #[serde(default)]
    pub warmth_delta: f32,
    #[serde(default)]
    pub pronoun_mode: PronounMode,
    #[serde(default)]
    pub brevity_nudge: BrevityNudge,
}

impl SoftPolicy {
    /// True when no presentation adjustment is active.
    pub fn is_neutral(&self) -> bool {
        self.warmth_delta == 0.0
            && self.pronoun_mode == PronounMode::Default
            && self.brevity_nudge.is_neutral()
    }
}

/// Merged turn policy: disjoint hard and soft halves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub hard: HardPolicy,
    #[serde(default)]
    pub soft: SoftPolicy,
}

impl Policy {
    /// Lifts a delegation-scorer output into a policy. The soft half stays
    /// neutral; this is the only entry point for hard fields.
    pub fn from_hard(hard: HardPolicy) -> Self {
        Self {
            hard,
            soft: SoftPolicy::default(),
        }
    }

    /// Lifts a presence-observer output into a policy. The hard half stays
    /// empty; this is the only entry point for soft fields.
    pub fn from_soft(soft: SoftPolicy) -> Self {
        Self {
            hard: HardPolicy::default(),
            soft,
        }
    }

    /// Field-by-field merge. Hard booleans OR, bounds take the minimum,
    /// warmth sums then clamps, pronoun mode keeps the dominant value.
    pub fn merge(self, other: Self) -> Self {
        Self {
            hard: HardPolicy {
                tools_disabled: self.hard.tools_disabled || other.hard.tools_disabled,
                require_user_effort: self.hard.require_user_effort
                    || other.hard.require_user_effort,
                brevity_cap: min_bound(self.hard.brevity_cap, other.hard.brevity_cap),
            },
            soft: SoftPolicy {
                warmth_delta: (self.soft.warmth_delta + other.soft.warmth_delta)
                    .clamp(-1.0, 1.0),
                pronoun_mode: self.soft.pronoun_mode.max(other.soft.pronoun_mode),
                brevity_nudge: self.soft.brevity_nudge.min(other.soft.brevity_nudge),
            },
        }
    }

    /// Brevity appears in both halves; the effective bound is the minimum
    /// (more restrictive) of the two.
    pub fn effective_brevity(&self) -> Option<i8> {
        let nudge = if self.soft.brevity_nudge.is_neutral() {
            None
        } else {
            Some(self.soft.brevity_nudge.get())
        };
        min_bound(self.hard.brevity_cap, nudge)
    }
}

fn min_bound(a: Option<i8>, b: Option<i8>) -> Option<i8> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) => Some(x),
        (None, Some(y)) => Some(y),
        (None, None) => None,
    }
}
