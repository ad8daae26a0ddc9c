//! # switchboard-store
//!
//! Append-only persistence for optimizer output.
//!
//! ## Overview
//!
//! Two implementations of the
//! [`RecordStore`](switchboard_core::traits::RecordStore) trait:
//!
//! - [`InMemoryStore`]: rows in `Vec`s behind a `Mutex`, lost on restart
//! - [`SqliteStore`]: `metrics_snapshots`, `recommendations` and
//!   `optimizations` tables in a single SQLite file
//!
//! Both reject a second row with an existing id and return recent rows
//! most recent first.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use switchboard_store::SqliteStore;
//! use switchboard_core::traits::RecordStore;
//!
//! let store = SqliteStore::open(Path::new("data/switchboard.db"))?;
//! store.append_recommendation(&rec)?;
//! let latest = store.recent_recommendations(10)?;
//! ```

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
