//! The optimizer cycle.
//!
//! For each monitored target:
//!
//!   Collect → Store snapshot → Evaluate → Store recommendations
//!         → Auto-apply criticals → Store optimizations
//!
//! A target whose metrics cannot be collected is skipped for this cycle.
//! Store failures are logged and the cycle carries on: `run_cycle` always
//! completes and always returns a summary.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use switchboard_contracts::{
    error::SwitchboardResult,
    optimize::{
        CycleSummary, MetricsSnapshot, MonitoredTarget, OptimizationRecord, OptimizerStatus,
        Recommendation,
    },
};
use switchboard_core::traits::{MetricsSource, RecordStore};

use crate::engine::RecommendationEngine;

/// Default page size for the recent-record queries.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

#[derive(Debug, Default)]
struct CycleState {
    last_cycle: Option<DateTime<Utc>>,
    total_optimizations: usize,
    last_recommendations: usize,
}

pub struct Optimizer {
    engine: RecommendationEngine,
    source: Arc<dyn MetricsSource>,
    store: Arc<dyn RecordStore>,
    targets: Vec<MonitoredTarget>,
    state: Mutex<CycleState>,
    // Held for a whole cycle so scheduled and manual runs never interleave.
    running: Mutex<()>,
}

impl Optimizer {
    pub fn new(
        engine: RecommendationEngine,
        source: Arc<dyn MetricsSource>,
        store: Arc<dyn RecordStore>,
        targets: Vec<MonitoredTarget>,
    ) -> Self {
        Self {
            engine,
            source,
            store,
            targets,
            state: Mutex::new(CycleState::default()),
            running: Mutex::new(()),
        }
    }

    pub fn targets(&self) -> &[MonitoredTarget] {
        &self.targets
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Run one cycle over the configured targets.
    pub fn run_cycle(&self) -> CycleSummary {
        self.run_cycle_for(&self.targets)
    }

    /// Run one cycle over `targets`.
    pub fn run_cycle_for(&self, targets: &[MonitoredTarget]) -> CycleSummary {
        let _running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        info!(targets = targets.len(), "optimization cycle started");

        let mut recommendations_generated = 0;
        let mut optimizations_applied = 0;
        let mut targets_evaluated = 0;
        let mut targets_skipped = 0;

        for target in targets {
            // ── Collect ──────────────────────────────────────────────────────
            let snapshot = match self.source.collect(target) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(target_id = %target.id, error = %e, "metrics unavailable, target skipped");
                    targets_skipped += 1;
                    continue;
                }
            };
            if let Err(e) = self.store.append_metrics(&snapshot) {
                warn!(target_id = %target.id, error = %e, "failed to store metrics snapshot");
            }

            // ── Evaluate ─────────────────────────────────────────────────────
            let recommendations = self.engine.evaluate(&snapshot);
            for rec in &recommendations {
                if let Err(e) = self.store.append_recommendation(rec) {
                    warn!(recommendation_id = %rec.id, error = %e, "failed to store recommendation");
                }
            }

            // ── Auto-apply ───────────────────────────────────────────────────
            let optimizations = self.engine.auto_apply(&recommendations);
            for opt in &optimizations {
                info!(
                    target_id = %opt.target_id,
                    optimization_id = %opt.id,
                    description = %opt.description,
                    "optimization applied"
                );
                if let Err(e) = self.store.append_optimization(opt) {
                    warn!(optimization_id = %opt.id, error = %e, "failed to store optimization");
                }
            }

            recommendations_generated += recommendations.len();
            optimizations_applied += optimizations.len();
            targets_evaluated += 1;
        }

        let now = Utc::now();
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.last_cycle = Some(now);
            state.total_optimizations += optimizations_applied;
            state.last_recommendations = recommendations_generated;
        }

        info!(
            optimizations_applied,
            recommendations_generated,
            targets_evaluated,
            targets_skipped,
            "optimization cycle completed"
        );

        CycleSummary {
            optimizations_applied,
            recommendations_generated,
            targets_evaluated,
            targets_skipped,
            timestamp: now,
        }
    }

    pub fn status(&self) -> OptimizerStatus {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        OptimizerStatus {
            status: "active".to_string(),
            last_cycle: state.last_cycle,
            total_optimizations: state.total_optimizations,
            last_recommendations: state.last_recommendations,
            targets_monitored: self.targets.len(),
        }
    }

    /// Up to `limit` stored snapshots, most recent first.
    pub fn recent_metrics(&self, limit: usize) -> SwitchboardResult<Vec<MetricsSnapshot>> {
        self.store.recent_metrics(limit)
    }

    pub fn recent_recommendations(&self, limit: usize) -> SwitchboardResult<Vec<Recommendation>> {
        self.store.recent_recommendations(limit)
    }

    pub fn recent_optimizations(&self, limit: usize) -> SwitchboardResult<Vec<OptimizationRecord>> {
        self.store.recent_optimizations(limit)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use switchboard_contracts::{
        error::SwitchboardError,
        optimize::{MetricsSnapshot, Priority},
    };

    use crate::threshold::ThresholdTable;

    use super::*;

    // ── Mock helpers ─────────────────────────────────────────────────────────

    /// Serves fixed snapshots; targets missing from the table are unavailable.
    struct FixedSource {
        snapshots: HashMap<String, MetricsSnapshot>,
    }

    impl MetricsSource for FixedSource {
        fn collect(&self, target: &MonitoredTarget) -> SwitchboardResult<MetricsSnapshot> {
            self.snapshots
                .get(&target.id)
                .cloned()
                .ok_or_else(|| SwitchboardError::MetricsUnavailable {
                    target: target.id.clone(),
                    reason: "no reading".to_string(),
                })
        }
    }

    #[derive(Default)]
    struct VecStore {
        metrics: Mutex<Vec<MetricsSnapshot>>,
        recommendations: Mutex<Vec<Recommendation>>,
        optimizations: Mutex<Vec<OptimizationRecord>>,
    }

    impl RecordStore for VecStore {
        fn append_metrics(&self, snapshot: &MetricsSnapshot) -> SwitchboardResult<()> {
            self.metrics.lock().unwrap().push(snapshot.clone());
            Ok(())
        }

        fn append_recommendation(&self, rec: &Recommendation) -> SwitchboardResult<()> {
            self.recommendations.lock().unwrap().push(rec.clone());
            Ok(())
        }

        fn append_optimization(&self, record: &OptimizationRecord) -> SwitchboardResult<()> {
            self.optimizations.lock().unwrap().push(record.clone());
            Ok(())
        }

        fn recent_metrics(&self, limit: usize) -> SwitchboardResult<Vec<MetricsSnapshot>> {
            Ok(self.metrics.lock().unwrap().iter().rev().take(limit).cloned().collect())
        }

        fn recent_recommendations(&self, limit: usize) -> SwitchboardResult<Vec<Recommendation>> {
            Ok(self.recommendations.lock().unwrap().iter().rev().take(limit).cloned().collect())
        }

        fn recent_optimizations(&self, limit: usize) -> SwitchboardResult<Vec<OptimizationRecord>> {
            Ok(self.optimizations.lock().unwrap().iter().rev().take(limit).cloned().collect())
        }
    }

    /// Fails every write.
    struct BrokenStore;

    impl RecordStore for BrokenStore {
        fn append_metrics(&self, _: &MetricsSnapshot) -> SwitchboardResult<()> {
            Err(SwitchboardError::PersistenceFailed { reason: "disk full".to_string() })
        }

        fn append_recommendation(&self, _: &Recommendation) -> SwitchboardResult<()> {
            Err(SwitchboardError::PersistenceFailed { reason: "disk full".to_string() })
        }

        fn append_optimization(&self, _: &OptimizationRecord) -> SwitchboardResult<()> {
            Err(SwitchboardError::PersistenceFailed { reason: "disk full".to_string() })
        }

        fn recent_metrics(&self, _: usize) -> SwitchboardResult<Vec<MetricsSnapshot>> {
            Ok(Vec::new())
        }

        fn recent_recommendations(&self, _: usize) -> SwitchboardResult<Vec<Recommendation>> {
            Ok(Vec::new())
        }

        fn recent_optimizations(&self, _: usize) -> SwitchboardResult<Vec<OptimizationRecord>> {
            Ok(Vec::new())
        }
    }

    fn target(id: &str) -> MonitoredTarget {
        MonitoredTarget { id: id.to_string(), kind: "ai".to_string(), health_url: None }
    }

    fn reading(id: &str, cpu: f64) -> MetricsSnapshot {
        MetricsSnapshot {
            cpu_usage: cpu,
            memory_usage: 40.0,
            disk_usage: 10.0,
            response_time_ms: 100.0,
            ..MetricsSnapshot::idle(id)
        }
    }

    fn optimizer(
        snapshots: Vec<MetricsSnapshot>,
        store: Arc<dyn RecordStore>,
        targets: &[&str],
    ) -> Optimizer {
        let source = FixedSource {
            snapshots: snapshots.into_iter().map(|s| (s.target_id.clone(), s)).collect(),
        };
        Optimizer::new(
            RecommendationEngine::new(ThresholdTable::builtin().unwrap()),
            Arc::new(source),
            store,
            targets.iter().map(|t| target(t)).collect(),
        )
    }

    // ── Test cases ────────────────────────────────────────────────────────────

    #[test]
    fn critical_cpu_is_recommended_and_applied() {
        let store = Arc::new(VecStore::default());
        let optimizer = optimizer(vec![reading("X", 95.0)], store.clone(), &["X"]);

        let summary = optimizer.run_cycle();
        assert_eq!(summary.recommendations_generated, 1);
        assert_eq!(summary.optimizations_applied, 1);
        assert_eq!(summary.targets_evaluated, 1);

        let recs = store.recommendations.lock().unwrap();
        let opts = store.optimizations.lock().unwrap();
        assert_eq!(recs[0].priority, Priority::Critical);
        assert_eq!(opts[0].details["original_recommendation"]["id"], recs[0].id.as_str());
        assert_eq!(store.metrics.lock().unwrap().len(), 1);
    }

    #[test]
    fn warning_cpu_is_recommended_only() {
        let store = Arc::new(VecStore::default());
        let optimizer = optimizer(vec![reading("X", 75.0)], store.clone(), &["X"]);

        let summary = optimizer.run_cycle();
        assert_eq!(summary.recommendations_generated, 1);
        assert_eq!(summary.optimizations_applied, 0);
        assert_eq!(store.recommendations.lock().unwrap()[0].priority, Priority::High);
        assert!(store.optimizations.lock().unwrap().is_empty());
    }

    #[test]
    fn unavailable_target_is_skipped() {
        let store = Arc::new(VecStore::default());
        let optimizer = optimizer(vec![reading("a", 95.0)], store, &["a", "offline", "b"]);

        let summary = optimizer.run_cycle();
        assert_eq!(summary.targets_evaluated, 1);
        assert_eq!(summary.targets_skipped, 2);
        assert_eq!(summary.optimizations_applied, 1);
    }

    #[test]
    fn store_failures_do_not_abort_the_cycle() {
        let optimizer = optimizer(
            vec![reading("a", 95.0), reading("b", 75.0)],
            Arc::new(BrokenStore),
            &["a", "b"],
        );

        let summary = optimizer.run_cycle();
        assert_eq!(summary.targets_evaluated, 2);
        assert_eq!(summary.recommendations_generated, 2);
        assert_eq!(summary.optimizations_applied, 1);
    }

    #[test]
    fn status_tracks_cycles() {
        let store = Arc::new(VecStore::default());
        let optimizer = optimizer(vec![reading("X", 95.0)], store, &["X"]);

        let before = optimizer.status();
        assert!(before.last_cycle.is_none());
        assert_eq!(before.targets_monitored, 1);

        optimizer.run_cycle();
        optimizer.run_cycle();

        let after = optimizer.status();
        assert!(after.last_cycle.is_some());
        assert_eq!(after.total_optimizations, 2);
        assert_eq!(after.last_recommendations, 1);
    }

    #[test]
    fn recent_records_come_from_the_store() {
        let store = Arc::new(VecStore::default());
        let optimizer = optimizer(vec![reading("X", 95.0)], store, &["X"]);

        optimizer.run_cycle();
        optimizer.run_cycle();

        let recs = optimizer.recent_recommendations(DEFAULT_RECENT_LIMIT).unwrap();
        assert_eq!(recs.len(), 2);
        assert_ne!(recs[0].id, recs[1].id);
        assert_eq!(optimizer.recent_optimizations(1).unwrap().len(), 1);
    }

    #[test]
    fn explicit_target_list_overrides_configured() {
        let store = Arc::new(VecStore::default());
        let optimizer = optimizer(vec![reading("X", 10.0), reading("Y", 95.0)], store, &["X"]);

        let summary = optimizer.run_cycle_for(&[target("Y")]);
        assert_eq!(summary.targets_evaluated, 1);
        assert_eq!(summary.optimizations_applied, 1);
    }
}
