//! Application context: everything the routes and schedulers share.
//!
//! Built once at startup from `SwitchboardConfig` and handed around as
//! `Arc<AppContext>`. There are no globals; tests build their own context
//! with stub sources and stores.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use switchboard_agents::{build_handler, HandlerKind, PersonalAgent};
use switchboard_contracts::{
    agent::AgentId,
    error::{SwitchboardError, SwitchboardResult},
};
use switchboard_core::{
    traits::{MetricsSource, ProviderProbe, RecordStore},
    AgentRegistry, Dispatcher, HealthMonitor, ProviderRegistry,
};
use switchboard_intent::KeywordClassifier;
use switchboard_optimizer::{Optimizer, RecommendationEngine, SystemMetricsSource, ThresholdTable};
use switchboard_store::{InMemoryStore, SqliteStore};

use crate::config::SwitchboardConfig;
use crate::probe::HttpProviderProbe;

pub struct AppContext {
    pub config: SwitchboardConfig,
    pub dispatcher: Dispatcher,
    pub optimizer: Optimizer,
    pub health: HealthMonitor,
    /// Personal agents by id, for reading their memory.
    pub personal: HashMap<AgentId, Arc<PersonalAgent>>,
    pub started: Instant,
}

/// The configured intent rules, or the built-in table.
pub fn build_classifier(config: &SwitchboardConfig) -> SwitchboardResult<KeywordClassifier> {
    match &config.rules.intents {
        Some(path) => KeywordClassifier::from_file(path),
        None => KeywordClassifier::builtin(),
    }
}

fn build_thresholds(config: &SwitchboardConfig) -> SwitchboardResult<ThresholdTable> {
    match &config.rules.thresholds {
        Some(path) => ThresholdTable::from_file(path),
        None => ThresholdTable::builtin(),
    }
}

fn build_store(config: &SwitchboardConfig) -> SwitchboardResult<Arc<dyn RecordStore>> {
    Ok(match &config.storage.database {
        Some(path) => Arc::new(SqliteStore::open(path)?),
        None => {
            info!("no database configured, optimizer records kept in memory");
            Arc::new(InMemoryStore::new())
        }
    })
}

impl AppContext {
    /// Production wiring: host metrics, the configured store and the HTTP
    /// provider probe.
    pub fn from_config(config: SwitchboardConfig) -> SwitchboardResult<Self> {
        let source = Arc::new(
            SystemMetricsSource::new(config.targets.clone())
                .with_probe_timeout(config.optimizer.probe_timeout()),
        );
        let store = build_store(&config)?;
        let probe = Arc::new(HttpProviderProbe::new(config.health.timeout()));
        Self::assemble(config, source, store, probe)
    }

    pub fn assemble(
        config: SwitchboardConfig,
        source: Arc<dyn MetricsSource>,
        store: Arc<dyn RecordStore>,
        probe: Arc<dyn ProviderProbe>,
    ) -> SwitchboardResult<Self> {
        let classifier = Arc::new(build_classifier(&config)?);

        let agents = Arc::new(AgentRegistry::new());
        let mut personal = HashMap::new();
        for agent in &config.agents {
            let descriptor = agent.descriptor();
            if agent.handler == HandlerKind::Personal {
                let handler = Arc::new(PersonalAgent::new(descriptor.id.clone()));
                personal.insert(handler.id().clone(), handler.clone());
                agents.register(descriptor, handler)?;
            } else {
                let handler = build_handler(agent.handler, &descriptor.id);
                agents.register(descriptor, handler)?;
            }
        }

        let providers = Arc::new(ProviderRegistry::new());
        for provider in &config.providers {
            providers.register(provider.clone())?;
        }

        let dispatcher = Dispatcher::new(classifier, agents, providers.clone(), config.dispatcher.clone());
        let health = HealthMonitor::new(providers, probe);

        let engine = RecommendationEngine::new(build_thresholds(&config)?);
        let optimizer = Optimizer::new(engine, source, store, config.targets.clone());

        info!(
            agents = config.agents.len(),
            providers = config.providers.len(),
            targets = config.targets.len(),
            "application context ready"
        );

        Ok(Self {
            config,
            dispatcher,
            optimizer,
            health,
            personal,
            started: Instant::now(),
        })
    }

    /// The personal agent registered as `id`.
    pub fn personal_agent(&self, id: &AgentId) -> SwitchboardResult<&PersonalAgent> {
        self.personal
            .get(id)
            .map(|agent| agent.as_ref())
            .ok_or_else(|| SwitchboardError::AgentNotFound { id: id.to_string() })
    }
}
