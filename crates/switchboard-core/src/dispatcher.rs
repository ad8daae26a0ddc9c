//! The Switchboard dispatcher: intent → agent → provider → handler.
//!
//! Every call runs the same pipeline:
//!
//!   Classify → Select agent → Select provider → [AgentHandler::handle] → Log
//!
//! The dispatcher never returns an error. Missing agents, handler failures
//! and timeouts all come back as a `DispatchResult` with `success = false`,
//! and every call, successful or not, appends exactly one log entry.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use switchboard_contracts::{
    agent::AgentId,
    dispatch::{
        excerpt, DispatchFailure, DispatchInfo, DispatchLogEntry, DispatchResult,
        DispatcherStatus, HandlerRequest,
    },
    error::{SwitchboardError, SwitchboardResult},
    intent::IntentResult,
    provider::ProviderId,
};

use crate::{
    log::{DispatchLog, DEFAULT_LOG_CAPACITY},
    registry::{AgentEntry, AgentRegistry, ProviderRegistry},
    traits::{AgentHandler, IntentClassifier},
};

/// Tunables for the dispatcher, read from the `[dispatcher]` config table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherSettings {
    /// Agent used when no capable agent is available. Must be registered.
    pub default_agent: AgentId,
    /// Upper bound on a single handler call.
    pub timeout_ms: u64,
    /// Number of dispatch log entries retained.
    pub log_capacity: usize,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            default_agent: AgentId::new("personal_agent"),
            timeout_ms: 30_000,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl DispatcherSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Routes free-text requests to agents.
///
/// Holds shared handles to the registries; owns only its capped log.
pub struct Dispatcher {
    classifier: Arc<dyn IntentClassifier>,
    agents: Arc<AgentRegistry>,
    providers: Arc<ProviderRegistry>,
    log: DispatchLog,
    settings: DispatcherSettings,
}

impl Dispatcher {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        agents: Arc<AgentRegistry>,
        providers: Arc<ProviderRegistry>,
        settings: DispatcherSettings,
    ) -> Self {
        Self {
            log: DispatchLog::new(settings.log_capacity),
            classifier,
            agents,
            providers,
            settings,
        }
    }

    /// Dispatch one request.
    ///
    /// # Pipeline
    ///
    /// 1. Classify `text`
    /// 2. Select the first available agent whose capabilities intersect the
    ///    intent's requirements, suggested agents first, then registration
    ///    order; else the default agent if it is available
    /// 3. If no agent qualifies → log, return `no_agent_available`
    /// 4. Select the first active provider: suggested, then fallback chain
    /// 5. Invoke the handler exactly once under the dispatch timeout
    /// 6. Log the outcome and return it as a structured result
    pub async fn dispatch(&self, text: &str, context: Option<Value>) -> DispatchResult {
        // ── Step 1: Classification ───────────────────────────────────────────
        let intent = self.classifier.classify(text);

        debug!(
            intent = %intent.intent,
            confidence = intent.confidence,
            language = intent.language.code(),
            "input classified"
        );

        // ── Steps 2 & 3: Agent selection ─────────────────────────────────────
        let Some(entry) = self.select_agent(&intent) else {
            warn!(intent = %intent.intent, "no agent available for dispatch");
            let err = SwitchboardError::NoAgentAvailable;
            self.record(text, &intent, None, None, Some(err.to_string()));
            return DispatchResult::failed(DispatchFailure::NoAgentAvailable, None, None);
        };
        let agent_id = entry.descriptor.id.clone();

        // ── Step 4: Provider selection ───────────────────────────────────────
        //
        // Advisory only: a request still goes through with no active provider.
        let provider = self.providers.select(&intent.suggested_providers, intent.provider_category);

        let info = DispatchInfo {
            agent: agent_id.clone(),
            provider: provider.clone(),
            intent: intent.intent,
            confidence: intent.confidence,
            language: intent.language,
            timestamp: Utc::now(),
        };

        // ── Step 5: Handler invocation ───────────────────────────────────────
        let request = HandlerRequest {
            text: text.to_string(),
            context: context.unwrap_or(Value::Null),
            intent: intent.clone(),
            agent: agent_id.clone(),
            provider: provider.clone(),
        };
        let outcome = self.invoke(entry.handler, &agent_id, request).await;

        // ── Step 6: Log and respond ──────────────────────────────────────────
        match outcome {
            Ok(data) => {
                info!(
                    agent_id = %agent_id,
                    provider = provider.as_ref().map(ProviderId::as_str).unwrap_or("none"),
                    intent = %intent.intent,
                    input = %excerpt(text),
                    "dispatch completed"
                );
                self.record(text, &intent, Some(agent_id), provider, None);
                DispatchResult::succeeded(data, info)
            }
            Err(err) => {
                let kind = match err {
                    SwitchboardError::Timeout { .. } => DispatchFailure::Timeout,
                    _ => DispatchFailure::HandlerFailure,
                };
                warn!(
                    agent_id = %agent_id,
                    input = %excerpt(text),
                    error = %err,
                    "dispatch failed"
                );
                self.record(text, &intent, Some(agent_id), provider, Some(err.to_string()));
                DispatchResult::failed(kind, Some(err.to_string()), Some(info))
            }
        }
    }

    /// Pick the agent for `intent`, or `None` if nothing can take it.
    pub fn select_agent(&self, intent: &IntentResult) -> Option<AgentEntry> {
        let entries = self.agents.entries();

        let capable: Vec<&AgentEntry> = entries
            .iter()
            .filter(|e| e.descriptor.capabilities.intersects(&intent.required_capabilities))
            .collect();

        // Suggested order first, remaining capable agents in registration order.
        let mut ranked: Vec<&AgentEntry> = Vec::with_capacity(capable.len());
        for id in &intent.suggested_agents {
            if let Some(entry) = capable.iter().find(|e| &e.descriptor.id == id) {
                if !ranked.iter().any(|r| r.descriptor.id == entry.descriptor.id) {
                    ranked.push(entry);
                }
            }
        }
        for entry in &capable {
            if !ranked.iter().any(|r| r.descriptor.id == entry.descriptor.id) {
                ranked.push(entry);
            }
        }

        if let Some(entry) = ranked
            .into_iter()
            .find(|e| e.descriptor.availability.is_available())
        {
            return Some(entry.clone());
        }

        entries
            .iter()
            .find(|e| {
                e.descriptor.id == self.settings.default_agent
                    && e.descriptor.availability.is_available()
            })
            .cloned()
    }

    /// Run the handler on the blocking pool under the dispatch timeout.
    ///
    /// On timeout the blocking task is left to finish on its own; its result
    /// is discarded.
    async fn invoke(
        &self,
        handler: Arc<dyn AgentHandler>,
        agent_id: &AgentId,
        request: HandlerRequest,
    ) -> SwitchboardResult<Value> {
        let task = tokio::task::spawn_blocking(move || handler.handle(&request));

        match tokio::time::timeout(self.settings.timeout(), task).await {
            Ok(Ok(Ok(data))) => Ok(data),
            Ok(Ok(Err(err @ SwitchboardError::HandlerFailed { .. }))) => Err(err),
            Ok(Ok(Err(other))) => Err(SwitchboardError::HandlerFailed {
                agent: agent_id.to_string(),
                reason: other.to_string(),
            }),
            Ok(Err(join_err)) => Err(SwitchboardError::HandlerFailed {
                agent: agent_id.to_string(),
                reason: format!("handler panicked: {}", join_err),
            }),
            Err(_elapsed) => Err(SwitchboardError::Timeout {
                agent: agent_id.to_string(),
                after_ms: self.settings.timeout_ms,
            }),
        }
    }

    fn record(
        &self,
        text: &str,
        intent: &IntentResult,
        agent: Option<AgentId>,
        provider: Option<ProviderId>,
        error: Option<String>,
    ) {
        self.log.push(DispatchLogEntry {
            timestamp: Utc::now(),
            input: excerpt(text),
            agent,
            provider,
            intent: intent.intent,
            confidence: intent.confidence,
            language: intent.language,
            error,
        });
    }

    pub fn status(&self) -> DispatcherStatus {
        DispatcherStatus {
            agents_loaded: self.agents.len(),
            providers_loaded: self.providers.len(),
            fallback_chain: self.providers.fallback_chain(),
            status: "active".to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Up to `limit` log entries, most recent first.
    pub fn recent_log(&self, limit: usize) -> Vec<DispatchLogEntry> {
        self.log.recent(limit)
    }

    pub fn log(&self) -> &DispatchLog {
        &self.log
    }

    pub fn classifier(&self) -> &dyn IntentClassifier {
        self.classifier.as_ref()
    }

    pub fn agents(&self) -> &Arc<AgentRegistry> {
        &self.agents
    }

    pub fn providers(&self) -> &Arc<ProviderRegistry> {
        &self.providers
    }

    pub fn settings(&self) -> &DispatcherSettings {
        &self.settings
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
