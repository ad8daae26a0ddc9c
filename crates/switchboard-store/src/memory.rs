//! In-memory implementation of `RecordStore`.
//!
//! `InMemoryStore` keeps every row in a `Vec` behind a `Mutex`, in append
//! order. Nothing survives a restart; use `SqliteStore` for that. Handy for
//! tests and for running without a database path configured.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use switchboard_contracts::{
    error::{SwitchboardError, SwitchboardResult},
    optimize::{MetricsSnapshot, OptimizationRecord, Recommendation},
};
use switchboard_core::traits::RecordStore;

// ── Internal mutable state ────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub(crate) struct MemoryState {
    pub(crate) metrics: Vec<MetricsSnapshot>,
    pub(crate) recommendations: Vec<Recommendation>,
    pub(crate) optimizations: Vec<OptimizationRecord>,
}

// ── Public store ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> SwitchboardResult<MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|e| SwitchboardError::PersistenceFailed {
            reason: format!("store lock poisoned: {}", e),
        })
    }
}

fn newest_first<T: Clone>(rows: &[T], limit: usize) -> Vec<T> {
    rows.iter().rev().take(limit).cloned().collect()
}

impl RecordStore for InMemoryStore {
    fn append_metrics(&self, snapshot: &MetricsSnapshot) -> SwitchboardResult<()> {
        self.lock()?.metrics.push(snapshot.clone());
        Ok(())
    }

    fn append_recommendation(&self, recommendation: &Recommendation) -> SwitchboardResult<()> {
        let mut state = self.lock()?;
        if state.recommendations.iter().any(|r| r.id == recommendation.id) {
            return Err(SwitchboardError::PersistenceFailed {
                reason: format!("recommendation '{}' already stored", recommendation.id),
            });
        }
        debug!(recommendation_id = %recommendation.id, "recommendation stored");
        state.recommendations.push(recommendation.clone());
        Ok(())
    }

    fn append_optimization(&self, record: &OptimizationRecord) -> SwitchboardResult<()> {
        let mut state = self.lock()?;
        if state.optimizations.iter().any(|o| o.id == record.id) {
            return Err(SwitchboardError::PersistenceFailed {
                reason: format!("optimization '{}' already stored", record.id),
            });
        }
        debug!(optimization_id = %record.id, "optimization stored");
        state.optimizations.push(record.clone());
        Ok(())
    }

    fn recent_metrics(&self, limit: usize) -> SwitchboardResult<Vec<MetricsSnapshot>> {
        Ok(newest_first(&self.lock()?.metrics, limit))
    }

    fn recent_recommendations(&self, limit: usize) -> SwitchboardResult<Vec<Recommendation>> {
        Ok(newest_first(&self.lock()?.recommendations, limit))
    }

    fn recent_optimizations(&self, limit: usize) -> SwitchboardResult<Vec<OptimizationRecord>> {
        Ok(newest_first(&self.lock()?.optimizations, limit))
    }
}
