//! Label confidence threshold.
//!
//! Set once at client construction, immutable afterward. Invalid configured
//! values never abort startup: they log a warning and fall back to the
//! default, matching the rest of the service's recover-and-log posture.

use tracing::warn;

/// Default minimum confidence for a label to be retained.
pub const DEFAULT_LABEL_THRESHOLD: f32 = 0.75;

/// Minimum confidence a label must exceed to be kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelThreshold(f32);

impl Default for LabelThreshold {
    fn default() -> Self {
        Self(DEFAULT_LABEL_THRESHOLD)
    }
}

impl LabelThreshold {
    /// Build from an already-validated value. Out-of-range input falls back
    /// to the default with a warning.
    pub fn new(value: f32) -> Self {
        if !(0.0..=1.0).contains(&value) || value.is_nan() {
            warn!(
                value,
                default = DEFAULT_LABEL_THRESHOLD,
                "Label threshold out of [0, 1], using default"
            );
            return Self::default();
        }
        Self(value)
    }

    /// Resolve a raw configured string. Missing input means the default;
    /// non-numeric or out-of-range input logs a warning and keeps the
    /// default.
    pub fn resolve(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        match trimmed.parse::<f32>() {
            Ok(value) => Self::new(value),
            Err(_) => {
                warn!(
                    raw = trimmed,
                    default = DEFAULT_LABEL_THRESHOLD,
                    "Label threshold is not a number, using default"
                );
                Self::default()
            }
        }
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Whether a label with this confidence score is kept. The comparison is
    /// strictly greater-than: a score equal to the threshold is discarded.
    pub fn keeps(&self, score: f32) -> bool {
        score > self.0
    }
}
