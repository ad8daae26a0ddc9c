//! Dispatch request, result and log types.
//!
//! `DispatchResult` is what the dispatcher returns for every call,
//! successful or not. `DispatchLogEntry` is what lands in the capped log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    agent::AgentId,
    intent::{Intent, IntentResult, Language},
    provider::ProviderId,
};

/// Longest input excerpt stored in a log entry, in characters.
pub const LOG_EXCERPT_CHARS: usize = 100;

/// Body of `POST /dispatch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub text: String,
    #[serde(default)]
    pub context: Option<Value>,
}

/// What an agent handler receives.
///
/// The classification and the selected provider are passed along so that
/// handlers never need to re-analyse the text themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerRequest {
    pub text: String,
    /// Caller-supplied context, `Value::Null` when absent.
    pub context: Value,
    pub intent: IntentResult,
    pub agent: AgentId,
    pub provider: Option<ProviderId>,
}

/// Machine-readable failure kind carried in `DispatchResult::error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchFailure {
    NoAgentAvailable,
    HandlerFailure,
    Timeout,
}

impl DispatchFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchFailure::NoAgentAvailable => "no_agent_available",
            DispatchFailure::HandlerFailure => "handler_failure",
            DispatchFailure::Timeout => "timeout",
        }
    }

    /// User-facing message for this kind of failure.
    pub fn user_message(self) -> &'static str {
        match self {
            DispatchFailure::NoAgentAvailable => "সব এজেন্ট বর্তমানে অপ্রাপ্য",
            DispatchFailure::HandlerFailure => "ডিসপ্যাচে সমস্যা হয়েছে",
            DispatchFailure::Timeout => "এজেন্ট নির্ধারিত সময়ে সাড়া দেয়নি",
        }
    }
}

/// Routing metadata attached to every dispatch that selected an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchInfo {
    pub agent: AgentId,
    pub provider: Option<ProviderId>,
    pub intent: Intent,
    pub confidence: f64,
    pub language: Language,
    pub timestamp: DateTime<Utc>,
}

/// The structured outcome of a dispatch call.
///
/// Never an exception: failures are reported with `success = false`,
/// a machine-readable `error` kind and a human-readable `message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DispatchFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Underlying cause for handler failures and timeouts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatch_info: Option<DispatchInfo>,
}

impl DispatchResult {
    pub fn succeeded(data: Value, info: DispatchInfo) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            detail: None,
            dispatch_info: Some(info),
        }
    }

    pub fn failed(kind: DispatchFailure, detail: Option<String>, info: Option<DispatchInfo>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(kind),
            message: Some(kind.user_message().to_string()),
            detail,
            dispatch_info: info,
        }
    }

    pub fn agent(&self) -> Option<&AgentId> {
        self.dispatch_info.as_ref().map(|i| &i.agent)
    }

    pub fn provider(&self) -> Option<&ProviderId> {
        self.dispatch_info.as_ref().and_then(|i| i.provider.as_ref())
    }
}

/// One line of the capped dispatch log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchLogEntry {
    pub timestamp: DateTime<Utc>,
    /// At most `LOG_EXCERPT_CHARS` characters of the input, followed by
    /// "..." when truncated.
    pub input: String,
    pub agent: Option<AgentId>,
    pub provider: Option<ProviderId>,
    pub intent: Intent,
    pub confidence: f64,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Truncate `text` to `LOG_EXCERPT_CHARS` characters, appending "..." if
/// anything was cut. Counts characters, not bytes, so Bengali text is
/// never split inside a code point.
pub fn excerpt(text: &str) -> String {
    match text.char_indices().nth(LOG_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Response body of `GET /dispatcher/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherStatus {
    pub agents_loaded: usize,
    pub providers_loaded: usize,
    pub fallback_chain: Vec<ProviderId>,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}
