//! Agent and provider registries.
//!
//! Both registries are filled once at startup and then only see whole-record
//! replacements (`set_availability`, `set_status`) from the health-check
//! task or the admin endpoints. A write lock is held only for the swap, so
//! readers never observe a half-updated descriptor. Readers get cloned
//! snapshots and tolerate staleness.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use switchboard_contracts::{
    agent::{AgentDescriptor, AgentId, Availability},
    error::{SwitchboardError, SwitchboardResult},
    provider::{ProviderCategory, ProviderDescriptor, ProviderId, ProviderStatus},
};

use crate::traits::AgentHandler;

// Records are replaced whole, so a poisoned lock still guards consistent data.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

// ── Agents ────────────────────────────────────────────────────────────────────

/// A registered agent: its descriptor plus the handler that serves it.
#[derive(Clone)]
pub struct AgentEntry {
    pub descriptor: AgentDescriptor,
    pub handler: Arc<dyn AgentHandler>,
}

/// Registry of agents in registration order.
#[derive(Default)]
pub struct AgentRegistry {
    entries: RwLock<Vec<AgentEntry>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent. Ids must be unique.
    pub fn register(
        &self,
        descriptor: AgentDescriptor,
        handler: Arc<dyn AgentHandler>,
    ) -> SwitchboardResult<()> {
        let mut entries = write(&self.entries);
        if entries.iter().any(|e| e.descriptor.id == descriptor.id) {
            return Err(SwitchboardError::ConfigError {
                reason: format!("agent '{}' registered twice", descriptor.id),
            });
        }
        info!(
            agent_id = %descriptor.id,
            capabilities = descriptor.capabilities.len(),
            "agent registered"
        );
        entries.push(AgentEntry { descriptor, handler });
        Ok(())
    }

    pub fn get(&self, id: &AgentId) -> SwitchboardResult<AgentDescriptor> {
        read(&self.entries)
            .iter()
            .find(|e| &e.descriptor.id == id)
            .map(|e| e.descriptor.clone())
            .ok_or_else(|| SwitchboardError::AgentNotFound { id: id.to_string() })
    }

    /// All descriptors in registration order.
    pub fn list(&self) -> Vec<AgentDescriptor> {
        read(&self.entries).iter().map(|e| e.descriptor.clone()).collect()
    }

    /// Snapshot of all entries, handlers included, in registration order.
    pub fn entries(&self) -> Vec<AgentEntry> {
        read(&self.entries).clone()
    }

    /// Replace the agent's availability. Idempotent, last write wins.
    pub fn set_availability(&self, id: &AgentId, availability: Availability) -> SwitchboardResult<()> {
        let mut entries = write(&self.entries);
        let entry = entries
            .iter_mut()
            .find(|e| &e.descriptor.id == id)
            .ok_or_else(|| SwitchboardError::AgentNotFound { id: id.to_string() })?;

        let mut updated = entry.descriptor.clone();
        updated.availability = availability;
        entry.descriptor = updated;

        debug!(agent_id = %id, ?availability, "agent availability updated");
        Ok(())
    }

    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Providers ─────────────────────────────────────────────────────────────────

/// Registry of providers in declaration order.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: RwLock<Vec<ProviderDescriptor>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Ids must be unique.
    pub fn register(&self, descriptor: ProviderDescriptor) -> SwitchboardResult<()> {
        let mut providers = write(&self.providers);
        if providers.iter().any(|p| p.id == descriptor.id) {
            return Err(SwitchboardError::ConfigError {
                reason: format!("provider '{}' registered twice", descriptor.id),
            });
        }
        info!(provider_id = %descriptor.id, priority = descriptor.priority, "provider registered");
        providers.push(descriptor);
        Ok(())
    }

    pub fn get(&self, id: &ProviderId) -> SwitchboardResult<ProviderDescriptor> {
        read(&self.providers)
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| SwitchboardError::ProviderNotFound { id: id.to_string() })
    }

    pub fn list(&self) -> Vec<ProviderDescriptor> {
        read(&self.providers).clone()
    }

    /// Replace the provider's status. Idempotent, last write wins.
    pub fn set_status(&self, id: &ProviderId, status: ProviderStatus) -> SwitchboardResult<()> {
        let mut providers = write(&self.providers);
        let slot = providers
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| SwitchboardError::ProviderNotFound { id: id.to_string() })?;

        *slot = ProviderDescriptor { status, ..slot.clone() };

        debug!(provider_id = %id, ?status, "provider status updated");
        Ok(())
    }

    /// Provider ids ordered by ascending priority. The sort is stable, so
    /// equal priorities keep declaration order.
    pub fn fallback_chain(&self) -> Vec<ProviderId> {
        sorted_ids(self.list())
    }

    /// The fallback chain restricted to one category.
    pub fn fallback_chain_for(&self, category: ProviderCategory) -> Vec<ProviderId> {
        let mut providers = self.list();
        providers.retain(|p| p.category == category);
        sorted_ids(providers)
    }

    /// Pick the first active provider of `category` from `suggested`
    /// followed by that category's fallback chain, skipping duplicates,
    /// unknown ids and providers of other categories.
    pub fn select(&self, suggested: &[ProviderId], category: ProviderCategory) -> Option<ProviderId> {
        let providers = self.list();
        let chain = self.fallback_chain_for(category);

        let mut seen: Vec<&ProviderId> = Vec::new();
        for id in suggested.iter().chain(chain.iter()) {
            if seen.contains(&id) {
                continue;
            }
            seen.push(id);

            if providers
                .iter()
                .any(|p| &p.id == id && p.category == category && p.is_active())
            {
                return Some(id.clone());
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        read(&self.providers).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn sorted_ids(mut providers: Vec<ProviderDescriptor>) -> Vec<ProviderId> {
    providers.sort_by_key(|p| p.priority);
    providers.into_iter().map(|p| p.id).collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use switchboard_contracts::{dispatch::HandlerRequest, error::SwitchboardResult};

    use super::*;

    struct NullHandler;

    impl AgentHandler for NullHandler {
        fn handle(&self, _request: &HandlerRequest) -> SwitchboardResult<Value> {
            Ok(json!({}))
        }
    }

    fn provider(id: &str, priority: u32, status: ProviderStatus) -> ProviderDescriptor {
        ProviderDescriptor::new(id, priority).with_status(status)
    }

    #[test]
    fn agent_register_get_and_list_keep_order() {
        let registry = AgentRegistry::new();
        registry.register(AgentDescriptor::new("b", "B"), Arc::new(NullHandler)).unwrap();
        registry.register(AgentDescriptor::new("a", "A"), Arc::new(NullHandler)).unwrap();

        let ids: Vec<String> = registry.list().into_iter().map(|d| d.id.0).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(registry.get(&AgentId::new("a")).unwrap().display_name, "A");
    }

    #[test]
    fn agent_duplicate_registration_is_rejected() {
        let registry = AgentRegistry::new();
        registry.register(AgentDescriptor::new("a", "A"), Arc::new(NullHandler)).unwrap();
        let err = registry.register(AgentDescriptor::new("a", "A2"), Arc::new(NullHandler));
        assert!(matches!(err, Err(SwitchboardError::ConfigError { .. })));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn agent_get_unknown_is_not_found() {
        let registry = AgentRegistry::new();
        match registry.get(&AgentId::new("ghost")) {
            Err(SwitchboardError::AgentNotFound { id }) => assert_eq!(id, "ghost"),
            other => panic!("expected AgentNotFound, got {:?}", other.map(|d| d.id)),
        }
    }

    #[test]
    fn set_availability_is_idempotent() {
        let registry = AgentRegistry::new();
        let id = AgentId::new("a");
        registry.register(AgentDescriptor::new("a", "A"), Arc::new(NullHandler)).unwrap();

        registry.set_availability(&id, Availability::Unavailable).unwrap();
        registry.set_availability(&id, Availability::Unavailable).unwrap();
        assert_eq!(registry.get(&id).unwrap().availability, Availability::Unavailable);

        registry.set_availability(&id, Availability::Available).unwrap();
        assert!(registry.get(&id).unwrap().availability.is_available());
    }

    #[test]
    fn fallback_chain_sorts_by_priority_then_declaration() {
        let registry = ProviderRegistry::new();
        registry.register(provider("together_ai", 3, ProviderStatus::Active)).unwrap();
        registry.register(provider("openrouter", 2, ProviderStatus::Active)).unwrap();
        registry.register(provider("ollama", 1, ProviderStatus::Active)).unwrap();
        registry.register(provider("huggingface", 2, ProviderStatus::Active)).unwrap();

        let chain: Vec<String> = registry.fallback_chain().into_iter().map(|p| p.0).collect();
        assert_eq!(chain, vec!["ollama", "openrouter", "huggingface", "together_ai"]);
    }

    #[test]
    fn select_prefers_suggested_then_chain() {
        let registry = ProviderRegistry::new();
        registry.register(provider("ollama", 1, ProviderStatus::Inactive)).unwrap();
        registry.register(provider("openrouter", 2, ProviderStatus::Active)).unwrap();
        registry.register(provider("dalle", 5, ProviderStatus::Active)).unwrap();

        registry.register(provider("together_ai", 5, ProviderStatus::Active)).unwrap();

        // Suggested and active wins even with a worse priority.
        assert_eq!(
            registry.select(&[ProviderId::new("together_ai")], ProviderCategory::LanguageModel),
            Some(ProviderId::new("together_ai"))
        );

        // Suggested but inactive (or unknown) falls through to the chain.
        assert_eq!(
            registry.select(
                &[ProviderId::new("stable_diffusion"), ProviderId::new("ollama")],
                ProviderCategory::LanguageModel
            ),
            Some(ProviderId::new("openrouter"))
        );
    }

    #[test]
    fn select_stays_within_the_category() {
        let registry = ProviderRegistry::new();
        registry.register(provider("ollama", 1, ProviderStatus::Inactive)).unwrap();
        registry.register(provider("openrouter", 2, ProviderStatus::Error)).unwrap();
        registry
            .register(provider("dalle", 0, ProviderStatus::Active).with_category(ProviderCategory::Image))
            .unwrap();

        // A text request never lands on an image provider, even a suggested one.
        assert_eq!(registry.select(&[], ProviderCategory::LanguageModel), None);
        assert_eq!(
            registry.select(&[ProviderId::new("dalle")], ProviderCategory::LanguageModel),
            None
        );
        assert_eq!(
            registry.select(&[], ProviderCategory::Image),
            Some(ProviderId::new("dalle"))
        );

        let chain: Vec<String> = registry
            .fallback_chain_for(ProviderCategory::LanguageModel)
            .into_iter()
            .map(|p| p.0)
            .collect();
        assert_eq!(chain, vec!["ollama", "openrouter"]);
        assert_eq!(registry.fallback_chain()[0], ProviderId::new("dalle"));
    }

    #[test]
    fn select_returns_none_when_nothing_is_active() {
        let registry = ProviderRegistry::new();
        registry.register(provider("ollama", 1, ProviderStatus::Error)).unwrap();
        assert_eq!(
            registry.select(&[ProviderId::new("ollama")], ProviderCategory::LanguageModel),
            None
        );

        let empty = ProviderRegistry::new();
        assert_eq!(empty.select(&[], ProviderCategory::LanguageModel), None);
    }

    #[test]
    fn set_status_replaces_record() {
        let registry = ProviderRegistry::new();
        registry.register(provider("ollama", 1, ProviderStatus::Active)).unwrap();
        registry.set_status(&ProviderId::new("ollama"), ProviderStatus::Error).unwrap();

        let updated = registry.get(&ProviderId::new("ollama")).unwrap();
        assert_eq!(updated.status, ProviderStatus::Error);
        assert_eq!(updated.priority, 1);

        assert!(matches!(
            registry.set_status(&ProviderId::new("ghost"), ProviderStatus::Active),
            Err(SwitchboardError::ProviderNotFound { .. })
        ));
    }
}
