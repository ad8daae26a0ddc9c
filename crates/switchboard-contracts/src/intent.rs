//! Intent classification result types.
//!
//! The classifier turns free text into an `IntentResult`. It is produced
//! once per dispatch call, never persisted, and never modified.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    agent::AgentId,
    capability::Capability,
    provider::{ProviderCategory, ProviderId},
};

/// Coarse category of what a request is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    SystemDiagnose,
    CodeReview,
    ImageToHtml,
    ProjectSuggestion,
    DatabaseAnalyze,
    ProviderManage,
    GeneralHelp,
    /// Returned when no keyword rule matches.
    #[default]
    GeneralConversation,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::SystemDiagnose => "system_diagnose",
            Intent::CodeReview => "code_review",
            Intent::ImageToHtml => "image_to_html",
            Intent::ProjectSuggestion => "project_suggestion",
            Intent::DatabaseAnalyze => "database_analyze",
            Intent::ProviderManage => "provider_manage",
            Intent::GeneralHelp => "general_help",
            Intent::GeneralConversation => "general_conversation",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language detected from the script of the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "bn")]
    Bengali,
    #[default]
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Bengali => "bn",
            Language::English => "en",
        }
    }
}

/// The classifier's verdict for one piece of input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    /// Fixed per rule tier, always within [0, 1].
    pub confidence: f64,
    pub language: Language,
    /// Capabilities an agent must declare (at least one of) to be a
    /// candidate for this intent. Empty for intents served by the
    /// default agent.
    pub required_capabilities: Vec<Capability>,
    /// Preferred agent order for this intent, if the routing table has one.
    #[serde(default)]
    pub suggested_agents: Vec<AgentId>,
    /// Providers tried before the fallback chain.
    #[serde(default)]
    pub suggested_providers: Vec<ProviderId>,
    /// Only providers of this category are considered for the request.
    #[serde(default)]
    pub provider_category: ProviderCategory,
}

impl IntentResult {
    /// A result with no routing hints. Used for the default intent.
    pub fn bare(intent: Intent, confidence: f64, language: Language) -> Self {
        Self {
            intent,
            confidence,
            language,
            required_capabilities: Vec::new(),
            suggested_agents: Vec::new(),
            suggested_providers: Vec::new(),
            provider_category: ProviderCategory::default(),
        }
    }
}
