//! Agent identity and descriptor types.
//!
//! An agent is anything that can answer a dispatched request. Switchboard
//! only knows what an agent declares about itself here; the handler that
//! does the work lives behind the `AgentHandler` trait in switchboard-core.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capability::CapabilitySet;

/// Stable, human-readable identifier for an agent.
///
/// Used in routing tables, dispatch logs and the HTTP surface.
/// Example: AgentId("system_diagnoser")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether an agent may currently be selected by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[default]
    Available,
    Unavailable,
}

impl Availability {
    pub fn is_available(self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// Everything the registry knows about one agent.
///
/// Descriptors are built from configuration at startup. `availability` is
/// the only field that changes at runtime, and it changes by replacing the
/// whole descriptor in the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Unique identifier within the registry.
    pub id: AgentId,
    /// Name shown to operators (e.g. "System Diagnoser").
    pub display_name: String,
    /// Capabilities this agent declares. Matched against an intent's
    /// required capabilities during agent selection.
    pub capabilities: CapabilitySet,
    /// Current selection status.
    #[serde(default)]
    pub availability: Availability,
    /// Free-form persona line carried through to status endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
}

impl AgentDescriptor {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: AgentId::new(id),
            display_name: display_name.into(),
            capabilities: CapabilitySet::default(),
            availability: Availability::Available,
            personality: None,
        }
    }

    /// Builder-style helper used by configuration loading and tests.
    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in capabilities {
            self.capabilities.grant(crate::capability::Capability::new(name));
        }
        self
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }
}
