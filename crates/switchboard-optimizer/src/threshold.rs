//! Threshold ladder schema.
//!
//! A `ThresholdTable` is deserialized from TOML and holds one
//! `MetricThresholds` ladder per metric. Each ladder has a critical tier and
//! an optional warning tier; a reading fires at most one of them, critical
//! first. All comparisons are strict: a reading equal to `above` does not
//! fire.

use std::path::Path;

use serde::{Deserialize, Serialize};

use switchboard_contracts::{
    error::{SwitchboardError, SwitchboardResult},
    optimize::{MetricKind, Priority, RecommendationCategory},
};

/// Threshold file compiled into the binary.
pub const BUILTIN_THRESHOLDS: &str = include_str!("../rules/thresholds.toml");

/// Placeholder replaced by the observed value in `description`.
pub const VALUE_PLACEHOLDER: &str = "{value}";

fn default_precision() -> usize {
    1
}

/// Which rung of the ladder fired. Used in recommendation ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Critical,
    Warning,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Critical => "critical",
            Tier::Warning => "warning",
        }
    }
}

/// One rung of a ladder.
///
/// ```toml
/// [metrics.warning]
/// above = 70.0
/// priority = "high"
/// description = "High CPU usage: {value}%"
/// action = "Monitor and consider restart if usage continues"
/// impact = "Prevent potential performance degradation"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTier {
    /// Fires when the reading is strictly greater than this.
    pub above: f64,
    pub priority: Priority,
    /// May contain `{value}`.
    pub description: String,
    pub action: String,
    pub impact: String,
}

impl ThresholdTier {
    pub fn fires(&self, value: f64) -> bool {
        value > self.above
    }

    pub fn describe(&self, value: f64, precision: usize) -> String {
        self.description
            .replace(VALUE_PLACEHOLDER, &format!("{:.*}", precision, value))
    }
}

/// The ladder for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricThresholds {
    pub metric: MetricKind,
    pub category: RecommendationCategory,
    /// Decimal places used when the value is written into a description.
    #[serde(default = "default_precision")]
    pub precision: usize,
    pub critical: ThresholdTier,
    #[serde(default)]
    pub warning: Option<ThresholdTier>,
}

impl MetricThresholds {
    /// The highest tier `value` breaches, if any.
    pub fn tier_for(&self, value: f64) -> Option<(Tier, &ThresholdTier)> {
        if self.critical.fires(value) {
            return Some((Tier::Critical, &self.critical));
        }
        match &self.warning {
            Some(warning) if warning.fires(value) => Some((Tier::Warning, warning)),
            _ => None,
        }
    }
}

/// The top-level structure deserialized from a thresholds file.
///
/// Ladders are evaluated in declaration order, which is also the order of
/// the recommendations they produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub metrics: Vec<MetricThresholds>,
}

impl ThresholdTable {
    /// Parse and validate a thresholds file.
    ///
    /// Returns `SwitchboardError::ConfigError` if the TOML is malformed, a
    /// metric appears twice, a critical tier is not `critical`, a warning
    /// tier is `critical`, or a warning threshold is not below its critical
    /// threshold.
    pub fn from_toml_str(s: &str) -> SwitchboardResult<Self> {
        let table: ThresholdTable = toml::from_str(s).map_err(|e| SwitchboardError::ConfigError {
            reason: format!("failed to parse thresholds TOML: {}", e),
        })?;
        table.validate()?;
        Ok(table)
    }

    pub fn from_file(path: &Path) -> SwitchboardResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| SwitchboardError::ConfigError {
            reason: format!("failed to read thresholds file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn builtin() -> SwitchboardResult<Self> {
        Self::from_toml_str(BUILTIN_THRESHOLDS)
    }

    pub fn get(&self, metric: MetricKind) -> Option<&MetricThresholds> {
        self.metrics.iter().find(|m| m.metric == metric)
    }

    fn validate(&self) -> SwitchboardResult<()> {
        for (idx, ladder) in self.metrics.iter().enumerate() {
            let name = ladder.metric.as_str();
            let invalid = |reason: String| SwitchboardError::ConfigError { reason };

            if self.metrics[..idx].iter().any(|m| m.metric == ladder.metric) {
                return Err(invalid(format!("metric '{}' has more than one ladder", name)));
            }
            if ladder.critical.priority != Priority::Critical {
                return Err(invalid(format!(
                    "critical tier of '{}' must have priority 'critical', got '{}'",
                    name, ladder.critical.priority
                )));
            }
            if let Some(warning) = &ladder.warning {
                if warning.priority == Priority::Critical {
                    return Err(invalid(format!(
                        "warning tier of '{}' cannot have priority 'critical'",
                        name
                    )));
                }
                if warning.above >= ladder.critical.above {
                    return Err(invalid(format!(
                        "warning threshold of '{}' ({}) must be below its critical threshold ({})",
                        name, warning.above, ladder.critical.above
                    )));
                }
            }
        }
        Ok(())
    }
}
