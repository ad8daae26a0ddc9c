//! Threshold evaluation and auto-apply.
//!
//! `evaluate` is a pure function of the snapshot and the table, apart from
//! the ids and timestamps it stamps on its output. `auto_apply` turns every
//! critical recommendation into an applied `OptimizationRecord`. Applying
//! means recording: no remediation is performed.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use switchboard_contracts::optimize::{
    MetricsSnapshot, OptimizationRecord, Priority, Recommendation,
};

use crate::threshold::ThresholdTable;

// Shared by every engine in the process so ids never collide within a second.
static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

fn next_seq() -> u64 {
    NEXT_SEQ.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    table: ThresholdTable,
}

impl RecommendationEngine {
    pub fn new(table: ThresholdTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ThresholdTable {
        &self.table
    }

    /// Recommendations for every ladder `snapshot` breaches, in ladder order.
    pub fn evaluate(&self, snapshot: &MetricsSnapshot) -> Vec<Recommendation> {
        let now = Utc::now();
        let mut out = Vec::new();

        for ladder in &self.table.metrics {
            let value = ladder.metric.read(snapshot);
            let Some((tier, rung)) = ladder.tier_for(value) else {
                continue;
            };

            debug!(
                target_id = %snapshot.target_id,
                metric = ladder.metric.as_str(),
                tier = tier.as_str(),
                value,
                "threshold breached"
            );

            out.push(Recommendation {
                id: format!(
                    "{}_{}_{}_{}_{}",
                    ladder.metric.as_str(),
                    tier.as_str(),
                    snapshot.target_id,
                    now.timestamp(),
                    next_seq()
                ),
                target_id: snapshot.target_id.clone(),
                category: ladder.category,
                description: rung.describe(value, ladder.precision),
                priority: rung.priority,
                action: rung.action.clone(),
                estimated_impact: rung.impact.clone(),
                timestamp: now,
            });
        }

        out
    }

    /// One applied optimization per critical recommendation.
    pub fn auto_apply(&self, recommendations: &[Recommendation]) -> Vec<OptimizationRecord> {
        recommendations
            .iter()
            .filter(|r| r.priority == Priority::Critical)
            .map(apply)
            .collect()
    }
}

fn apply(rec: &Recommendation) -> OptimizationRecord {
    let now = Utc::now();
    OptimizationRecord {
        id: format!("opt_{}_{}_{}", now.timestamp(), rec.target_id, next_seq()),
        target_id: rec.target_id.clone(),
        category: rec.category,
        description: rec.description.clone(),
        impact: rec.priority,
        applied: true,
        timestamp: now,
        details: json!({
            "action_taken": rec.action,
            "estimated_impact": rec.estimated_impact,
            "original_recommendation": serde_json::to_value(rec).unwrap_or(Value::Null),
        }),
    }
}
