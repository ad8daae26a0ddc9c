//! Periodic provider health checks.
//!
//! `HealthMonitor::run_once()` is called by the server's background task.
//! It asks the probe about every registered provider and writes back any
//! status that changed.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{registry::ProviderRegistry, traits::ProviderProbe};

pub struct HealthMonitor {
    providers: Arc<ProviderRegistry>,
    probe: Arc<dyn ProviderProbe>,
}

impl HealthMonitor {
    pub fn new(providers: Arc<ProviderRegistry>, probe: Arc<dyn ProviderProbe>) -> Self {
        Self { providers, probe }
    }

    /// Probe every provider once. Returns how many statuses changed.
    pub fn run_once(&self) -> usize {
        let mut changed = 0;

        for provider in self.providers.list() {
            let Some(observed) = self.probe.probe(&provider) else {
                debug!(provider_id = %provider.id, "provider has no health endpoint, skipped");
                continue;
            };
            if observed == provider.status {
                continue;
            }

            match self.providers.set_status(&provider.id, observed) {
                Ok(()) => {
                    info!(
                        provider_id = %provider.id,
                        from = ?provider.status,
                        to = ?observed,
                        "provider status changed"
                    );
                    changed += 1;
                }
                Err(e) => warn!(provider_id = %provider.id, error = %e, "status update failed"),
            }
        }

        changed
    }
}
