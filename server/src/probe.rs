//! HTTP provider health probe.

use std::time::Duration;

use tracing::{debug, warn};

use switchboard_contracts::provider::{ProviderDescriptor, ProviderStatus};
use switchboard_core::traits::ProviderProbe;

/// GETs each provider's `health_url`.
///
/// 2xx maps to `Active`, any other status to `Error`, and a connection
/// failure or timeout to `Inactive`. Providers without a URL are left alone.
/// Blocking: run it on the blocking pool.
pub struct HttpProviderProbe {
    timeout: Duration,
}

impl HttpProviderProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

/// Status for a probe response code.
pub fn status_for(code: reqwest::StatusCode) -> ProviderStatus {
    if code.is_success() {
        ProviderStatus::Active
    } else {
        ProviderStatus::Error
    }
}

impl ProviderProbe for HttpProviderProbe {
    fn probe(&self, provider: &ProviderDescriptor) -> Option<ProviderStatus> {
        let url = provider.health_url.as_deref()?;

        let client = match reqwest::blocking::Client::builder().timeout(self.timeout).build() {
            Ok(client) => client,
            Err(e) => {
                warn!(provider_id = %provider.id, error = %e, "could not build probe client");
                return None;
            }
        };

        let status = match client.get(url).send() {
            Ok(resp) => status_for(resp.status()),
            Err(e) => {
                debug!(provider_id = %provider.id, error = %e, "provider unreachable");
                ProviderStatus::Inactive
            }
        };
        Some(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_codes_are_active() {
        assert_eq!(status_for(reqwest::StatusCode::OK), ProviderStatus::Active);
        assert_eq!(status_for(reqwest::StatusCode::NO_CONTENT), ProviderStatus::Active);
    }

    #[test]
    fn other_codes_are_errors() {
        assert_eq!(status_for(reqwest::StatusCode::NOT_FOUND), ProviderStatus::Error);
        assert_eq!(status_for(reqwest::StatusCode::SERVICE_UNAVAILABLE), ProviderStatus::Error);
    }

    #[test]
    fn provider_without_url_is_skipped() {
        let probe = HttpProviderProbe::new(Duration::from_millis(100));
        assert_eq!(probe.probe(&ProviderDescriptor::new("openrouter", 2)), None);
    }

    #[test]
    fn unreachable_provider_is_inactive() {
        let probe = HttpProviderProbe::new(Duration::from_millis(500));
        let mut provider = ProviderDescriptor::new("ollama", 1);
        // Port 9 (discard) is closed on test hosts.
        provider.health_url = Some("http://127.0.0.1:9/health".to_string());
        assert_eq!(probe.probe(&provider), Some(ProviderStatus::Inactive));
    }
}
