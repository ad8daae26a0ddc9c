//! Service configuration.
//!
//! One TOML document with a table per concern plus the agent, provider and
//! target lists. `SwitchboardConfig::builtin()` parses the file shipped in
//! `config/switchboard.toml`; `load()` reads an operator-supplied one.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use switchboard_agents::HandlerKind;
use switchboard_contracts::{
    agent::{AgentDescriptor, Availability},
    error::{SwitchboardError, SwitchboardResult},
    optimize::MonitoredTarget,
    provider::ProviderDescriptor,
};
use switchboard_core::DispatcherSettings;

pub const DEFAULT_CONFIG: &str = include_str!("../config/switchboard.toml");

fn config_error(reason: impl Into<String>) -> SwitchboardError {
    SwitchboardError::ConfigError { reason: reason.into() }
}

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerSection {
    pub fn addr(&self) -> SwitchboardResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| config_error(format!("invalid listen address '{}:{}': {}", self.host, self.port, e)))
    }
}

/// `[optimizer]`: the background recommendation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSection {
    pub enabled: bool,
    pub interval_secs: u64,
    /// Timeout for the per-target response-time probe.
    pub probe_timeout_ms: u64,
}

impl Default for OptimizerSection {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300,
            probe_timeout_ms: 5_000,
        }
    }
}

impl OptimizerSection {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// `[health]`: the background provider health check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSection {
    pub enabled: bool,
    pub interval_secs: u64,
    pub timeout_ms: u64,
}

impl Default for HealthSection {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300,
            timeout_ms: 5_000,
        }
    }
}

impl HealthSection {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// SQLite file for optimizer records. `None` keeps them in memory.
    pub database: Option<PathBuf>,
}

/// `[rules]`: replacements for the built-in rule tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesSection {
    pub intents: Option<PathBuf>,
    pub thresholds: Option<PathBuf>,
}

/// One `[[agents]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub handler: HandlerKind,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub personality: Option<String>,
}

impl AgentConfig {
    pub fn descriptor(&self) -> AgentDescriptor {
        let mut descriptor = AgentDescriptor::new(&self.id, &self.name)
            .with_capabilities(self.capabilities.iter().cloned())
            .with_availability(self.availability);
        descriptor.personality = self.personality.clone();
        descriptor
    }
}

// ── Root ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchboardConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub dispatcher: DispatcherSettings,
    #[serde(default)]
    pub optimizer: OptimizerSection,
    #[serde(default)]
    pub health: HealthSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub rules: RulesSection,
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
    #[serde(default)]
    pub providers: Vec<ProviderDescriptor>,
    #[serde(default)]
    pub targets: Vec<MonitoredTarget>,
}

impl SwitchboardConfig {
    pub fn from_toml_str(s: &str) -> SwitchboardResult<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| config_error(format!("failed to parse configuration TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> SwitchboardResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| config_error(format!("failed to read config file '{}': {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn builtin() -> SwitchboardResult<Self> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    /// `path` if given, otherwise the built-in configuration.
    pub fn load(path: Option<&Path>) -> SwitchboardResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    /// Reject settings the service cannot start with.
    pub fn validate(&self) -> SwitchboardResult<()> {
        if self.dispatcher.timeout_ms == 0 {
            return Err(config_error("dispatcher.timeout_ms must be greater than zero"));
        }
        if self.dispatcher.log_capacity == 0 {
            return Err(config_error("dispatcher.log_capacity must be greater than zero"));
        }
        if self.optimizer.interval_secs == 0 {
            return Err(config_error("optimizer.interval_secs must be greater than zero"));
        }
        if self.health.interval_secs == 0 {
            return Err(config_error("health.interval_secs must be greater than zero"));
        }

        let default_agent = self.dispatcher.default_agent.as_str();
        if !self.agents.iter().any(|a| a.id == default_agent) {
            return Err(config_error(format!(
                "default agent '{}' is not in the agent list",
                default_agent
            )));
        }

        for (i, target) in self.targets.iter().enumerate() {
            if self.targets[..i].iter().any(|t| t.id == target.id) {
                return Err(config_error(format!("target '{}' listed twice", target.id)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_parses() {
        let config = SwitchboardConfig::builtin().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.dispatcher.default_agent.as_str(), "personal_agent");
        assert_eq!(config.dispatcher.timeout_ms, 30_000);
        assert_eq!(config.optimizer.interval_secs, 300);
        assert_eq!(config.health.interval_secs, 300);
        assert_eq!(config.agents.len(), 4);
        assert_eq!(config.targets.len(), 8);

        let ids: Vec<&str> = config.providers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(&ids[..3], &["ollama", "openrouter", "together_ai"]);
    }

    #[test]
    fn builtin_agents_have_expected_handlers() {
        let config = SwitchboardConfig::builtin().unwrap();
        let personal = config.agents.iter().find(|a| a.id == "personal_agent").unwrap();
        assert_eq!(personal.handler, HandlerKind::Personal);

        let diagnoser = config.agents.iter().find(|a| a.id == "system_diagnoser").unwrap();
        assert_eq!(diagnoser.handler, HandlerKind::Specialist);
        assert!(diagnoser.descriptor().capabilities.len() >= 2);
    }

    #[test]
    fn missing_tables_take_defaults() {
        let config = SwitchboardConfig::from_toml_str(
            r#"
            [[agents]]
            id = "personal_agent"
            name = "Personal Agent"
            handler = "personal"
            "#,
        )
        .unwrap();

        assert_eq!(config.server, ServerSection::default());
        assert_eq!(config.dispatcher, DispatcherSettings::default());
        assert_eq!(config.storage.database, None);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn unknown_default_agent_is_rejected() {
        let result = SwitchboardConfig::from_toml_str(
            r#"
            [dispatcher]
            default_agent = "ghost"

            [[agents]]
            id = "personal_agent"
            name = "Personal Agent"
            "#,
        );
        match result {
            Err(SwitchboardError::ConfigError { reason }) => assert!(reason.contains("ghost")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn zero_interval_is_rejected() {
        let result = SwitchboardConfig::from_toml_str(
            r#"
            [optimizer]
            interval_secs = 0

            [[agents]]
            id = "personal_agent"
            name = "Personal Agent"
            "#,
        );
        assert!(matches!(result, Err(SwitchboardError::ConfigError { .. })));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(
            SwitchboardConfig::from_toml_str("[server\nport = 1"),
            Err(SwitchboardError::ConfigError { .. })
        ));
    }

    #[test]
    fn listen_address_is_parsed() {
        let server = ServerSection { host: "0.0.0.0".to_string(), port: 9000 };
        assert_eq!(server.addr().unwrap().port(), 9000);

        let bad = ServerSection { host: "not a host".to_string(), port: 9000 };
        assert!(bad.addr().is_err());
    }
}
