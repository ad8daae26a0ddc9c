//! Trait seams for the Switchboard service.
//!
//! Everything the dispatcher and the optimizer talk to goes through one of
//! these traits:
//!
//! - `IntentClassifier`: pure text → intent mapping
//! - `AgentHandler`: the agent doing the actual work (external)
//! - `MetricsSource`: per-target metrics probe (external)
//! - `RecordStore`: append-only store for optimizer records (external)
//! - `ProviderProbe`: provider health check (external)
//!
//! Every implementation must be `Send + Sync`: handlers run on the blocking
//! pool and the same instances are shared by all request tasks.

use serde_json::Value;

use switchboard_contracts::{
    dispatch::HandlerRequest,
    error::SwitchboardResult,
    intent::IntentResult,
    optimize::{MetricsSnapshot, MonitoredTarget, OptimizationRecord, Recommendation},
    provider::{ProviderDescriptor, ProviderStatus},
};

/// Maps free text to an intent.
///
/// Implementations must be pure and infallible: unmatched input yields
/// the default intent, never an error.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> IntentResult;
}

/// An agent that answers dispatched requests.
///
/// The dispatcher calls `handle()` exactly once per dispatch, on a blocking
/// thread, under the dispatch timeout. Retries, if any, belong inside the
/// implementation.
pub trait AgentHandler: Send + Sync {
    /// Produce the response payload for `request`.
    ///
    /// Return `SwitchboardError::HandlerFailed` (or any other error) to
    /// signal failure; the dispatcher converts it into a structured result.
    fn handle(&self, request: &HandlerRequest) -> SwitchboardResult<Value>;
}

/// Supplies a metrics snapshot for a monitored target.
pub trait MetricsSource: Send + Sync {
    /// Collect one snapshot for `target`.
    ///
    /// `SwitchboardError::MetricsUnavailable` makes the optimizer skip the
    /// target for the current cycle.
    fn collect(&self, target: &MonitoredTarget) -> SwitchboardResult<MetricsSnapshot>;
}

/// Append-only persistence for optimizer output.
///
/// Rows are keyed by their generated id and never modified once written.
/// Reads return the most recent rows first.
pub trait RecordStore: Send + Sync {
    fn append_metrics(&self, snapshot: &MetricsSnapshot) -> SwitchboardResult<()>;

    fn append_recommendation(&self, recommendation: &Recommendation) -> SwitchboardResult<()>;

    fn append_optimization(&self, record: &OptimizationRecord) -> SwitchboardResult<()>;

    fn recent_metrics(&self, limit: usize) -> SwitchboardResult<Vec<MetricsSnapshot>>;

    fn recent_recommendations(&self, limit: usize) -> SwitchboardResult<Vec<Recommendation>>;

    fn recent_optimizations(&self, limit: usize) -> SwitchboardResult<Vec<OptimizationRecord>>;
}

/// Checks whether a provider is reachable.
pub trait ProviderProbe: Send + Sync {
    /// Return the observed status, or `None` when the provider cannot be
    /// probed (no health endpoint) and should keep its current status.
    fn probe(&self, provider: &ProviderDescriptor) -> Option<ProviderStatus>;
}
