//! `AgentHandler` implementations.
//!
//! Two kinds of agent exist. Specialists answer with the fixed template for
//! the classified intent. The personal agent answers with the same template
//! but adds a `context` block and remembers the last exchanges.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use switchboard_contracts::{
    agent::AgentId,
    dispatch::HandlerRequest,
    error::{SwitchboardError, SwitchboardResult},
    intent::Intent,
};
use switchboard_core::traits::AgentHandler;

use crate::templates::{processed_by, response_template};

/// Exchanges kept by `PersonalAgent`.
pub const MEMORY_CAPACITY: usize = 50;

/// Which handler implementation backs an agent in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    Personal,
    #[default]
    Specialist,
}

/// Build the handler for an agent of `kind`.
pub fn build_handler(kind: HandlerKind, agent: &AgentId) -> Arc<dyn AgentHandler> {
    match kind {
        HandlerKind::Personal => Arc::new(PersonalAgent::new(agent.clone())),
        HandlerKind::Specialist => Arc::new(SpecialistAgent::new(agent.clone())),
    }
}

/// Merge `fields` into a template object.
fn annotate(agent: &AgentId, body: &mut Value, fields: Value) -> SwitchboardResult<()> {
    match (body.as_object_mut(), fields) {
        (Some(map), Value::Object(extra)) => {
            map.extend(extra);
            Ok(())
        }
        _ => Err(SwitchboardError::HandlerFailed {
            agent: agent.to_string(),
            reason: "response template is not an object".to_string(),
        }),
    }
}

// ── Specialist ────────────────────────────────────────────────────────────────

pub struct SpecialistAgent {
    id: AgentId,
}

impl SpecialistAgent {
    pub fn new(id: AgentId) -> Self {
        Self { id }
    }
}

impl AgentHandler for SpecialistAgent {
    fn handle(&self, request: &HandlerRequest) -> SwitchboardResult<Value> {
        let mut body = response_template(request.intent.intent);
        annotate(
            &self.id,
            &mut body,
            json!({
                "agent": self.id,
                "provider": request.provider,
                "confidence": request.intent.confidence,
                "note": processed_by(&self.id),
            }),
        )?;

        debug!(agent = %self.id, intent = %request.intent.intent, "specialist answered");
        Ok(body)
    }
}

// ── Personal agent ────────────────────────────────────────────────────────────

/// One remembered request/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub input: String,
    pub intent: Intent,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

/// What `PersonalAgent` currently knows about the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub agent: AgentId,
    pub user_mood: String,
    pub project_focus: String,
    pub last_task: Option<Intent>,
    pub conversations: Vec<Exchange>,
}

#[derive(Debug, Default)]
struct Memory {
    conversations: VecDeque<Exchange>,
    last_task: Option<Intent>,
}

/// The default agent. Keeps a bounded conversation history.
pub struct PersonalAgent {
    id: AgentId,
    user_mood: String,
    project_focus: String,
    memory: Mutex<Memory>,
}

impl PersonalAgent {
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            user_mood: "neutral".to_string(),
            project_focus: "ZombieCoder".to_string(),
            memory: Mutex::new(Memory::default()),
        }
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    /// Current context and remembered exchanges, oldest first.
    pub fn snapshot(&self) -> SwitchboardResult<MemorySnapshot> {
        let memory = self.lock_memory()?;
        Ok(MemorySnapshot {
            agent: self.id.clone(),
            user_mood: self.user_mood.clone(),
            project_focus: self.project_focus.clone(),
            last_task: memory.last_task,
            conversations: memory.conversations.iter().cloned().collect(),
        })
    }

    fn lock_memory(&self) -> SwitchboardResult<MutexGuard<'_, Memory>> {
        self.memory.lock().map_err(|e| SwitchboardError::HandlerFailed {
            agent: self.id.to_string(),
            reason: format!("memory lock poisoned: {}", e),
        })
    }

    fn remember(&self, exchange: Exchange) -> SwitchboardResult<()> {
        let mut memory = self.lock_memory()?;
        memory.last_task = Some(exchange.intent);
        memory.conversations.push_back(exchange);
        while memory.conversations.len() > MEMORY_CAPACITY {
            memory.conversations.pop_front();
        }
        Ok(())
    }
}

impl AgentHandler for PersonalAgent {
    fn handle(&self, request: &HandlerRequest) -> SwitchboardResult<Value> {
        let now = Utc::now();
        let mut body = response_template(request.intent.intent);
        annotate(
            &self.id,
            &mut body,
            json!({
                "agent": self.id,
                "provider": request.provider,
                "context": {
                    "user_mood": self.user_mood,
                    "project_focus": self.project_focus,
                    "timestamp": now,
                    "confidence": request.intent.confidence,
                },
            }),
        )?;

        let action = body["action"].as_str().unwrap_or_default().to_string();
        self.remember(Exchange {
            input: request.text.clone(),
            intent: request.intent.intent,
            action,
            timestamp: now,
        })?;

        debug!(agent = %self.id, intent = %request.intent.intent, "personal agent answered");
        Ok(body)
    }
}
