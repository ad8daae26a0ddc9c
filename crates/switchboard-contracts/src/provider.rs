//! Provider descriptor types.
//!
//! Providers are the model back ends an agent may call out to (Ollama,
//! OpenRouter, ...). For dispatch they are advisory metadata: the
//! dispatcher picks one and hands it to the agent handler, but a request
//! can succeed with no provider at all.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier for a provider, e.g. ProviderId("ollama").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of work a provider serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCategory {
    #[default]
    LanguageModel,
    Image,
    Speech,
    Communication,
}

/// Where a provider runs. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Local,
    #[default]
    Cloud,
    Fallback,
}

/// Health status of a provider. Only `Active` providers are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    #[default]
    Active,
    Inactive,
    Error,
}

/// Everything the registry knows about one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub display_name: String,
    #[serde(default)]
    pub category: ProviderCategory,
    #[serde(default)]
    pub kind: ProviderKind,
    #[serde(default)]
    pub status: ProviderStatus,
    /// Lower is preferred. Equal priorities keep declaration order.
    pub priority: u32,
    #[serde(default)]
    pub models: Vec<String>,
    /// Endpoint polled by the HTTP health probe. Providers without one
    /// keep whatever status they were configured with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_url: Option<String>,
}

impl ProviderDescriptor {
    pub fn new(id: impl Into<String>, priority: u32) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id: ProviderId(id),
            category: ProviderCategory::LanguageModel,
            kind: ProviderKind::Cloud,
            status: ProviderStatus::Active,
            priority,
            models: Vec::new(),
            health_url: None,
        }
    }

    pub fn with_status(mut self, status: ProviderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_category(mut self, category: ProviderCategory) -> Self {
        self.category = category;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == ProviderStatus::Active
    }
}
