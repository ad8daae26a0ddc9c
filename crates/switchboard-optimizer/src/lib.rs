//! # switchboard-optimizer
//!
//! Threshold-based recommendations for monitored services.
//!
//! - [`ThresholdTable`]: per-metric critical/warning ladders, loaded from TOML
//! - [`RecommendationEngine`]: snapshot → recommendations, criticals →
//!   applied optimization records
//! - [`Optimizer`]: the per-target collect/evaluate/store cycle
//! - [`SystemMetricsSource`]: host readings via `sysinfo`, response time via
//!   an HTTP probe

pub mod cycle;
pub mod engine;
pub mod metrics;
pub mod threshold;

pub use cycle::{Optimizer, DEFAULT_RECENT_LIMIT};
pub use engine::RecommendationEngine;
pub use metrics::{SystemMetricsSource, UNREACHABLE_RESPONSE_MS};
pub use threshold::{MetricThresholds, ThresholdTable, ThresholdTier, Tier, BUILTIN_THRESHOLDS};
