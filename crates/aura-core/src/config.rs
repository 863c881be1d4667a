//! Engine configuration.
//!
//! Plain serde structs with per-field defaults, loadable from TOML, with
//! `AURA_*` environment overrides for the knobs operators actually turn.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | AURA_DEADLINE_MIN_MS | 50 | Lower clamp for the advisory deadline. |
//! | AURA_DEADLINE_MAX_MS | 800 | Upper clamp for the advisory deadline. |
//! | AURA_VETO_SEVERITY_THRESHOLD | 0.6 | Minimum veto severity Phase B acts on. |

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

fn default_min_ms() -> u64 {
    50
}

fn default_max_ms() -> u64 {
    800
}

fn default_veto_severity() -> f32 {
    0.6
}

/// Clamp window for the advisory deadline. Caller requests outside
/// `[min_ms, max_ms]` are pulled back into the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineConfig {
    #[serde(default = "default_min_ms")]
    pub min_ms: u64,
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for DeadlineConfig {
    fn default() -> Self {
        Self {
            min_ms: default_min_ms(),
            max_ms: default_max_ms(),
        }
    }
}

/// Phase B knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Vetoes below this severity are recorded but do not move selection.
    #[serde(default = "default_veto_severity")]
    pub veto_severity_threshold: f32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            veto_severity_threshold: default_veto_severity(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub deadline: DeadlineConfig,
    #[serde(default)]
    pub selector: SelectorConfig,
}

impl EngineConfig {
    /// Parses a TOML document; missing fields fall back to defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, EngineError> {
        let mut config: Self =
            toml::from_str(raw).map_err(|e| EngineError::Config(e.to_string()))?;
        config.normalize();
        Ok(config)
    }

    /// Applies `AURA_*` environment overrides on top of the current values.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_u64("AURA_DEADLINE_MIN_MS") {
            self.deadline.min_ms = v;
        }
        if let Some(v) = env_u64("AURA_DEADLINE_MAX_MS") {
            self.deadline.max_ms = v;
        }
        if let Ok(raw) = std::env::var("AURA_VETO_SEVERITY_THRESHOLD") {
            if let Ok(v) = raw.trim().parse::<f32>() {
                self.selector.veto_severity_threshold = v.clamp(0.0, 1.0);
            }
        }
        self.normalize();
    }

    /// Keeps the clamp window well-formed (min never above max).
    fn normalize(&mut self) {
        if self.deadline.min_ms > self.deadline.max_ms {
            tracing::warn!(
                target: "aura::config",
                min_ms = self.deadline.min_ms,
                max_ms = self.deadline.max_ms,
                "deadline window inverted; using min for both bounds"
            );
            self.deadline.max_ms = self.deadline.min_ms;
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.trim().parse().ok()
}
