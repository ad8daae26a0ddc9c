//! Keyword rule and routing table schema.
//!
//! A `ClassifierConfig` is deserialized from TOML and holds an ordered list
//! of `IntentRule`s plus one `IntentRoute` per intent. Rules are evaluated
//! in declaration order and the first rule with a matching keyword wins.
//! If no rule matches, the classifier answers `general_conversation` with
//! `default_confidence`.

use serde::{Deserialize, Serialize};

use switchboard_contracts::{
    agent::AgentId,
    capability::Capability,
    intent::Intent,
    provider::{ProviderCategory, ProviderId},
};

/// Confidence assigned to unmatched input when the file does not set one.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

/// A single keyword rule.
///
/// Example in TOML:
/// ```toml
/// [[rules]]
/// intent = "code_review"
/// confidence = 0.8
/// keywords = ["code", "bug", "review", "কোড"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRule {
    pub intent: Intent,

    /// Reported as-is on every match. Must lie within [0, 1].
    pub confidence: f64,

    /// Case-insensitive. A keyword containing spaces matches a contiguous
    /// run of input tokens.
    pub keywords: Vec<String>,
}

/// Routing hints attached to an intent after classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentRoute {
    pub intent: Intent,

    /// An agent needs at least one of these to be a candidate. Leave empty
    /// to send the intent straight to the default agent.
    #[serde(default)]
    pub required_capabilities: Vec<Capability>,

    #[serde(default)]
    pub suggested_agents: Vec<AgentId>,

    #[serde(default)]
    pub suggested_providers: Vec<ProviderId>,

    /// Defaults to `language_model`.
    #[serde(default)]
    pub provider_category: ProviderCategory,
}

/// The top-level structure deserialized from an intent rules file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_confidence")]
    pub default_confidence: f64,

    /// Ordered list of rules. First match wins.
    #[serde(default)]
    pub rules: Vec<IntentRule>,

    /// At most one route per intent.
    #[serde(default)]
    pub routes: Vec<IntentRoute>,
}
