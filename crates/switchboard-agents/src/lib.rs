//! # switchboard-agents
//!
//! The agents Switchboard ships with.
//!
//! - [`SpecialistAgent`] answers with the fixed template for the classified
//!   intent, tagged with its own id and the selected provider.
//! - [`PersonalAgent`] is the default agent: same template, plus a
//!   `context` block and a bounded conversation memory.
//!
//! Templates live in [`templates`]; [`build_handler`] maps the configured
//! [`HandlerKind`] to an `Arc<dyn AgentHandler>`.

pub mod handlers;
pub mod templates;

pub use handlers::{
    build_handler, Exchange, HandlerKind, MemorySnapshot, PersonalAgent, SpecialistAgent, MEMORY_CAPACITY,
};
pub use templates::response_template;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use switchboard_contracts::{
        agent::AgentId,
        dispatch::HandlerRequest,
        intent::{Intent, IntentResult, Language},
        provider::ProviderId,
    };
    use switchboard_core::traits::AgentHandler;

    use super::*;

    const ALL_INTENTS: [Intent; 8] = [
        Intent::SystemDiagnose,
        Intent::CodeReview,
        Intent::ImageToHtml,
        Intent::ProjectSuggestion,
        Intent::DatabaseAnalyze,
        Intent::ProviderManage,
        Intent::GeneralHelp,
        Intent::GeneralConversation,
    ];

    fn request(text: &str, intent: Intent, confidence: f64) -> HandlerRequest {
        HandlerRequest {
            text: text.to_string(),
            context: Value::Null,
            intent: IntentResult::bare(intent, confidence, Language::English),
            agent: AgentId::new("test_agent"),
            provider: Some(ProviderId::new("ollama")),
        }
    }

    // ── 1. Templates ──────────────────────────────────────────────────────────

    #[test]
    fn test_every_intent_has_a_complete_template() {
        for intent in ALL_INTENTS {
            let body = response_template(intent);
            assert!(body["action"].is_string(), "{intent}: action");
            assert!(!body["message"].as_str().unwrap().is_empty(), "{intent}: message");
            assert!(
                ["high", "medium", "low"].contains(&body["priority"].as_str().unwrap()),
                "{intent}: priority"
            );
            assert!(!body["suggestions"].as_array().unwrap().is_empty(), "{intent}: suggestions");
        }
    }

    #[test]
    fn test_general_intents_share_the_conversation_template() {
        assert_eq!(
            response_template(Intent::GeneralHelp),
            response_template(Intent::GeneralConversation)
        );
        assert_eq!(
            response_template(Intent::GeneralHelp)["action"],
            "general_conversation"
        );
    }

    #[test]
    fn test_system_template_is_high_priority() {
        let body = response_template(Intent::SystemDiagnose);
        assert_eq!(body["action"], "system_diagnose");
        assert_eq!(body["priority"], "high");
        assert_eq!(body["suggestions"].as_array().unwrap().len(), 4);
    }

    // ── 2. SpecialistAgent ────────────────────────────────────────────────────

    #[test]
    fn test_specialist_returns_template_with_routing_fields() {
        let agent = SpecialistAgent::new(AgentId::new("code_reviewer"));
        let body = agent
            .handle(&request("please review my code", Intent::CodeReview, 0.85))
            .unwrap();

        let template = response_template(Intent::CodeReview);
        assert_eq!(body["action"], template["action"]);
        assert_eq!(body["message"], template["message"]);
        assert_eq!(body["agent"], "code_reviewer");
        assert_eq!(body["provider"], "ollama");
        assert_eq!(body["confidence"], 0.85);
        assert!(body["note"].as_str().unwrap().contains("code_reviewer"));
    }

    #[test]
    fn test_specialist_without_provider_reports_null() {
        let agent = SpecialistAgent::new(AgentId::new("html_converter"));
        let mut req = request("convert this image to html", Intent::ImageToHtml, 0.85);
        req.provider = None;

        let body = agent.handle(&req).unwrap();
        assert!(body["provider"].is_null());
    }

    // ── 3. PersonalAgent ──────────────────────────────────────────────────────

    #[test]
    fn test_personal_agent_adds_context_block() {
        let agent = PersonalAgent::new(AgentId::new("personal_agent"));
        let body = agent.handle(&request("hello there", Intent::GeneralConversation, 0.5)).unwrap();

        assert_eq!(body["action"], "general_conversation");
        assert_eq!(body["agent"], "personal_agent");
        assert_eq!(body["context"]["user_mood"], "neutral");
        assert_eq!(body["context"]["project_focus"], "ZombieCoder");
        assert_eq!(body["context"]["confidence"], 0.5);
        assert!(body["context"]["timestamp"].is_string());
    }

    #[test]
    fn test_personal_agent_remembers_last_task() {
        let agent = PersonalAgent::new(AgentId::new("personal_agent"));
        assert_eq!(agent.snapshot().unwrap().last_task, None);

        agent.handle(&request("project ideas?", Intent::ProjectSuggestion, 0.8)).unwrap();
        agent.handle(&request("check the database", Intent::DatabaseAnalyze, 0.8)).unwrap();

        let memory = agent.snapshot().unwrap();
        assert_eq!(memory.last_task, Some(Intent::DatabaseAnalyze));
        assert_eq!(memory.user_mood, "neutral");
        let history = memory.conversations;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].input, "project ideas?");
        assert_eq!(history[0].action, "project_suggestion");
        assert_eq!(history[1].intent, Intent::DatabaseAnalyze);
    }

    #[test]
    fn test_personal_agent_memory_is_bounded() {
        let agent = PersonalAgent::new(AgentId::new("personal_agent"));
        for i in 0..MEMORY_CAPACITY + 7 {
            agent
                .handle(&request(&format!("message {i}"), Intent::GeneralConversation, 0.5))
                .unwrap();
        }

        let history = agent.snapshot().unwrap().conversations;
        assert_eq!(history.len(), MEMORY_CAPACITY);
        assert_eq!(history[0].input, "message 7");
        assert_eq!(history[MEMORY_CAPACITY - 1].input, format!("message {}", MEMORY_CAPACITY + 6));
    }

    // ── 4. build_handler ──────────────────────────────────────────────────────

    #[test]
    fn test_build_handler_picks_implementation_by_kind() {
        let req = request("hi", Intent::GeneralHelp, 0.7);

        let personal = build_handler(HandlerKind::Personal, &AgentId::new("personal_agent"));
        assert!(personal.handle(&req).unwrap().get("context").is_some());

        let specialist = build_handler(HandlerKind::Specialist, &AgentId::new("system_diagnoser"));
        let body = specialist.handle(&req).unwrap();
        assert!(body.get("context").is_none());
        assert_eq!(body["agent"], "system_diagnoser");
    }

    #[test]
    fn test_handler_kind_parses_snake_case() {
        let kind: HandlerKind = serde_json::from_str("\"personal\"").unwrap();
        assert_eq!(kind, HandlerKind::Personal);
        assert_eq!(HandlerKind::default(), HandlerKind::Specialist);
    }
}
