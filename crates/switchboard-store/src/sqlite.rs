//! SQLite implementation of `RecordStore`.
//!
//! One connection, serialized behind a `Mutex`. Rows are inserted once and
//! never updated; a duplicate id is a `PersistenceFailed` error. Enum
//! columns hold their snake_case tags, timestamps are RFC 3339 text, and
//! optimization details are stored as a JSON document.

use std::fmt::Display;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use switchboard_contracts::{
    error::{SwitchboardError, SwitchboardResult},
    optimize::{MetricsSnapshot, NetworkIo, OptimizationRecord, Recommendation},
};
use switchboard_core::traits::RecordStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS metrics_snapshots (
    id TEXT PRIMARY KEY,
    target_id TEXT NOT NULL,
    cpu_usage REAL NOT NULL,
    memory_usage REAL NOT NULL,
    disk_usage REAL NOT NULL,
    response_time_ms REAL NOT NULL,
    error_rate REAL NOT NULL,
    bytes_sent INTEGER NOT NULL,
    bytes_received INTEGER NOT NULL,
    timestamp TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_metrics_target ON metrics_snapshots(target_id);

CREATE TABLE IF NOT EXISTS recommendations (
    id TEXT PRIMARY KEY,
    target_id TEXT NOT NULL,
    category TEXT NOT NULL,
    description TEXT NOT NULL,
    priority TEXT NOT NULL,
    action TEXT NOT NULL,
    estimated_impact TEXT NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS optimizations (
    id TEXT PRIMARY KEY,
    target_id TEXT NOT NULL,
    category TEXT NOT NULL,
    description TEXT NOT NULL,
    impact TEXT NOT NULL,
    applied INTEGER NOT NULL,
    timestamp TEXT NOT NULL,
    details TEXT NOT NULL
);
";

fn persistence<E: Display>(context: &str) -> impl FnOnce(E) -> SwitchboardError + '_ {
    move |e| SwitchboardError::PersistenceFailed {
        reason: format!("{}: {}", context, e),
    }
}

/// Serialize a unit enum to its serde tag.
fn tag<T: serde::Serialize>(value: &T) -> SwitchboardResult<String> {
    match serde_json::to_value(value).map_err(persistence("encode tag"))? {
        Value::String(s) => Ok(s),
        other => Err(SwitchboardError::PersistenceFailed {
            reason: format!("expected a string tag, got {}", other),
        }),
    }
}

fn untag<T: DeserializeOwned>(text: String) -> SwitchboardResult<T> {
    serde_json::from_value(Value::String(text)).map_err(persistence("decode tag"))
}

/// SQLite integers are signed; clamp anything larger.
fn sql_int<T: TryInto<i64>>(value: T) -> i64 {
    value.try_into().unwrap_or(i64::MAX)
}

fn parse_time(text: &str) -> SwitchboardResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(persistence("decode timestamp"))
}

// ── Raw rows ──────────────────────────────────────────────────────────────────
//
// Read as plain columns first so conversion errors surface as
// `SwitchboardError` rather than inside rusqlite's row closure.

struct RecommendationRow {
    id: String,
    target_id: String,
    category: String,
    description: String,
    priority: String,
    action: String,
    estimated_impact: String,
    timestamp: String,
}

impl RecommendationRow {
    fn decode(self) -> SwitchboardResult<Recommendation> {
        Ok(Recommendation {
            id: self.id,
            target_id: self.target_id,
            category: untag(self.category)?,
            description: self.description,
            priority: untag(self.priority)?,
            action: self.action,
            estimated_impact: self.estimated_impact,
            timestamp: parse_time(&self.timestamp)?,
        })
    }
}

struct OptimizationRow {
    id: String,
    target_id: String,
    category: String,
    description: String,
    impact: String,
    applied: bool,
    timestamp: String,
    details: String,
}

impl OptimizationRow {
    fn decode(self) -> SwitchboardResult<OptimizationRecord> {
        Ok(OptimizationRecord {
            id: self.id,
            target_id: self.target_id,
            category: untag(self.category)?,
            description: self.description,
            impact: untag(self.impact)?,
            applied: self.applied,
            timestamp: parse_time(&self.timestamp)?,
            details: serde_json::from_str(&self.details).map_err(persistence("decode details"))?,
        })
    }
}

// ── Public store ──────────────────────────────────────────────────────────────

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and make sure the tables exist.
    pub fn open(path: &Path) -> SwitchboardResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(persistence("create database directory"))?;
        }
        let conn = Connection::open(path).map_err(persistence("open database"))?;
        info!(path = %path.display(), "sqlite store opened");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> SwitchboardResult<Self> {
        let conn = Connection::open_in_memory().map_err(persistence("open in-memory database"))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> SwitchboardResult<Self> {
        conn.execute_batch(SCHEMA).map_err(persistence("initialize schema"))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> SwitchboardResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| SwitchboardError::PersistenceFailed {
            reason: format!("connection lock poisoned: {}", e),
        })
    }

}

impl RecordStore for SqliteStore {
    fn append_metrics(&self, snapshot: &MetricsSnapshot) -> SwitchboardResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO metrics_snapshots
                 (id, target_id, cpu_usage, memory_usage, disk_usage, response_time_ms,
                  error_rate, bytes_sent, bytes_received, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                Uuid::new_v4().to_string(),
                &snapshot.target_id,
                snapshot.cpu_usage,
                snapshot.memory_usage,
                snapshot.disk_usage,
                snapshot.response_time_ms,
                snapshot.error_rate,
                sql_int(snapshot.network.bytes_sent),
                sql_int(snapshot.network.bytes_received),
                snapshot.timestamp.to_rfc3339(),
            ],
        )
        .map_err(persistence("insert metrics snapshot"))?;
        Ok(())
    }

    fn append_recommendation(&self, rec: &Recommendation) -> SwitchboardResult<()> {
        let category = tag(&rec.category)?;
        let priority = tag(&rec.priority)?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO recommendations
                 (id, target_id, category, description, priority, action, estimated_impact, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &rec.id,
                &rec.target_id,
                category,
                &rec.description,
                priority,
                &rec.action,
                &rec.estimated_impact,
                rec.timestamp.to_rfc3339(),
            ],
        )
        .map_err(persistence("insert recommendation"))?;

        debug!(recommendation_id = %rec.id, "recommendation stored");
        Ok(())
    }

    fn append_optimization(&self, record: &OptimizationRecord) -> SwitchboardResult<()> {
        let category = tag(&record.category)?;
        let impact = tag(&record.impact)?;
        let details = serde_json::to_string(&record.details).map_err(persistence("encode details"))?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO optimizations
                 (id, target_id, category, description, impact, applied, timestamp, details)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &record.id,
                &record.target_id,
                category,
                &record.description,
                impact,
                record.applied,
                record.timestamp.to_rfc3339(),
                details,
            ],
        )
        .map_err(persistence("insert optimization"))?;

        debug!(optimization_id = %record.id, "optimization stored");
        Ok(())
    }

    fn recent_metrics(&self, limit: usize) -> SwitchboardResult<Vec<MetricsSnapshot>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT target_id, cpu_usage, memory_usage, disk_usage, response_time_ms,
                        error_rate, bytes_sent, bytes_received, timestamp
                 FROM metrics_snapshots
                 ORDER BY rowid DESC
                 LIMIT ?1",
            )
            .map_err(persistence("prepare metrics query"))?;

        let rows = stmt
            .query_map(params![sql_int(limit)], |row| {
                Ok((
                    MetricsSnapshot {
                        target_id: row.get(0)?,
                        cpu_usage: row.get(1)?,
                        memory_usage: row.get(2)?,
                        disk_usage: row.get(3)?,
                        response_time_ms: row.get(4)?,
                        error_rate: row.get(5)?,
                        network: NetworkIo {
                            bytes_sent: u64::try_from(row.get::<_, i64>(6)?).unwrap_or(0),
                            bytes_received: u64::try_from(row.get::<_, i64>(7)?).unwrap_or(0),
                        },
                        timestamp: Utc::now(),
                    },
                    row.get::<_, String>(8)?,
                ))
            })
            .map_err(persistence("query metrics"))?;

        let mut out = Vec::new();
        for row in rows {
            let (mut snapshot, timestamp) = row.map_err(persistence("read metrics row"))?;
            snapshot.timestamp = parse_time(&timestamp)?;
            out.push(snapshot);
        }
        Ok(out)
    }

    fn recent_recommendations(&self, limit: usize) -> SwitchboardResult<Vec<Recommendation>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, target_id, category, description, priority, action,
                        estimated_impact, timestamp
                 FROM recommendations
                 ORDER BY rowid DESC
                 LIMIT ?1",
            )
            .map_err(persistence("prepare recommendations query"))?;

        let rows = stmt
            .query_map(params![sql_int(limit)], |row| {
                Ok(RecommendationRow {
                    id: row.get(0)?,
                    target_id: row.get(1)?,
                    category: row.get(2)?,
                    description: row.get(3)?,
                    priority: row.get(4)?,
                    action: row.get(5)?,
                    estimated_impact: row.get(6)?,
                    timestamp: row.get(7)?,
                })
            })
            .map_err(persistence("query recommendations"))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(persistence("read recommendation row"))?.decode()?);
        }
        Ok(out)
    }

    fn recent_optimizations(&self, limit: usize) -> SwitchboardResult<Vec<OptimizationRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, target_id, category, description, impact, applied, timestamp, details
                 FROM optimizations
                 ORDER BY rowid DESC
                 LIMIT ?1",
            )
            .map_err(persistence("prepare optimizations query"))?;

        let rows = stmt
            .query_map(params![sql_int(limit)], |row| {
                Ok(OptimizationRow {
                    id: row.get(0)?,
                    target_id: row.get(1)?,
                    category: row.get(2)?,
                    description: row.get(3)?,
                    impact: row.get(4)?,
                    applied: row.get(5)?,
                    timestamp: row.get(6)?,
                    details: row.get(7)?,
                })
            })
            .map_err(persistence("query optimizations"))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(persistence("read optimization row"))?.decode()?);
        }
        Ok(out)
    }
}
