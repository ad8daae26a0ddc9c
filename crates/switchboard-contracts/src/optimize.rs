//! Metrics, recommendation and optimization record types.
//!
//! The optimizer reads a `MetricsSnapshot` per monitored target, turns
//! threshold breaches into `Recommendation`s, and records an
//! `OptimizationRecord` for every critical one. Records are append-only:
//! once written they are never modified.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A service the optimizer watches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredTarget {
    /// Identifier used in recommendation ids and storage rows.
    pub id: String,
    /// Free-form role tag ("ai", "backend", "database", ...).
    #[serde(default)]
    pub kind: String,
    /// Probed for response time. Targets without one report 0 ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_url: Option<String>,
}

/// Network counters captured alongside a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkIo {
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// One metrics reading for one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub target_id: String,
    /// Percent, 0..=100.
    pub cpu_usage: f64,
    /// Percent, 0..=100.
    pub memory_usage: f64,
    /// Percent, 0..=100.
    pub disk_usage: f64,
    pub response_time_ms: f64,
    /// Fraction, 0..=1. Fed externally; the system source reports 0.0.
    #[serde(default)]
    pub error_rate: f64,
    #[serde(default)]
    pub network: NetworkIo,
    pub timestamp: DateTime<Utc>,
}

impl MetricsSnapshot {
    /// A snapshot with all readings at zero, stamped now.
    pub fn idle(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            cpu_usage: 0.0,
            memory_usage: 0.0,
            disk_usage: 0.0,
            response_time_ms: 0.0,
            error_rate: 0.0,
            network: NetworkIo::default(),
            timestamp: Utc::now(),
        }
    }
}

/// The metric a threshold rule reads from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Cpu,
    Memory,
    Disk,
    ResponseTime,
    ErrorRate,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Cpu => "cpu",
            MetricKind::Memory => "memory",
            MetricKind::Disk => "disk",
            MetricKind::ResponseTime => "response",
            MetricKind::ErrorRate => "error_rate",
        }
    }

    /// Read this metric's value out of a snapshot.
    pub fn read(self, snapshot: &MetricsSnapshot) -> f64 {
        match self {
            MetricKind::Cpu => snapshot.cpu_usage,
            MetricKind::Memory => snapshot.memory_usage,
            MetricKind::Disk => snapshot.disk_usage,
            MetricKind::ResponseTime => snapshot.response_time_ms,
            MetricKind::ErrorRate => snapshot.error_rate,
        }
    }
}

/// What area a recommendation concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Performance,
    Memory,
    Disk,
    Reliability,
}

impl RecommendationCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            RecommendationCategory::Performance => "performance",
            RecommendationCategory::Memory => "memory",
            RecommendationCategory::Disk => "disk",
            RecommendationCategory::Reliability => "reliability",
        }
    }
}

/// Recommendation urgency. Only `Critical` is auto-applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A suggested remediation produced by one threshold breach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// `{metric}_{tier}_{target}_{unix_seconds}_{sequence}`.
    pub id: String,
    pub target_id: String,
    pub category: RecommendationCategory,
    pub description: String,
    pub priority: Priority,
    pub action: String,
    pub estimated_impact: String,
    pub timestamp: DateTime<Utc>,
}

/// A critical recommendation that was recorded as applied.
///
/// `applied = true` means the optimization was recorded, not that the
/// underlying problem was verified as resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRecord {
    pub id: String,
    pub target_id: String,
    pub category: RecommendationCategory,
    pub description: String,
    /// Priority of the originating recommendation.
    pub impact: Priority,
    pub applied: bool,
    pub timestamp: DateTime<Utc>,
    /// `{ action_taken, estimated_impact, original_recommendation }`.
    pub details: Value,
}

/// Result of one optimizer cycle across all targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub optimizations_applied: usize,
    pub recommendations_generated: usize,
    pub targets_evaluated: usize,
    pub targets_skipped: usize,
    pub timestamp: DateTime<Utc>,
}

/// Response body of `GET /optimizer/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerStatus {
    pub status: String,
    pub last_cycle: Option<DateTime<Utc>>,
    pub total_optimizations: usize,
    pub last_recommendations: usize,
    pub targets_monitored: usize,
}
