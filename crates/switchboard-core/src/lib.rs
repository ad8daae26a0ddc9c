//! # switchboard-core
//!
//! Routing runtime for the Switchboard dispatch service.
//!
//! This crate provides:
//! - The service seams (`IntentClassifier`, `AgentHandler`, `MetricsSource`,
//!   `RecordStore`, `ProviderProbe`)
//! - The agent and provider registries
//! - The `Dispatcher` that turns free text into one agent call, and its
//!   capped `DispatchLog`
//! - The provider `HealthMonitor`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use switchboard_core::{Dispatcher, DispatcherSettings, AgentRegistry, ProviderRegistry};
//! ```

pub mod dispatcher;
pub mod health;
pub mod log;
pub mod registry;
pub mod traits;

pub use dispatcher::{Dispatcher, DispatcherSettings};
pub use health::HealthMonitor;
pub use log::{DispatchLog, DEFAULT_LOG_CAPACITY};
pub use registry::{AgentEntry, AgentRegistry, ProviderRegistry};
