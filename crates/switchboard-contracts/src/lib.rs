//! # switchboard-contracts
//!
//! Shared types and error contracts for the Switchboard dispatch service.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod agent;
pub mod capability;
pub mod dispatch;
pub mod error;
pub mod intent;
pub mod optimize;
pub mod provider;
