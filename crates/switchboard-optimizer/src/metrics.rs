//! Host metrics source.
//!
//! All monitored targets share one host, so CPU, memory, disk and network
//! readings come from the same `sysinfo` sample. Response time is per
//! target: a GET against the target's health URL.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;
use sysinfo::{Disks, Networks, System, MINIMUM_CPU_UPDATE_INTERVAL};
use tracing::{debug, warn};

use switchboard_contracts::{
    error::{SwitchboardError, SwitchboardResult},
    optimize::{MetricsSnapshot, MonitoredTarget, NetworkIo},
};
use switchboard_core::traits::MetricsSource;

/// Reported when the health probe fails or answers with a non-200 status.
pub const UNREACHABLE_RESPONSE_MS: f64 = 9999.0;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// A `System` plus the time of its last CPU refresh.
struct CpuSampler {
    system: System,
    refreshed_at: Instant,
}

pub struct SystemMetricsSource {
    targets: Vec<MonitoredTarget>,
    probe_timeout: Duration,
    // Kept across calls so CPU usage is measured between two refreshes.
    sampler: Mutex<CpuSampler>,
}

/// How long to wait before the next CPU refresh gives a usable reading.
pub fn cpu_settle_delay(since_last_refresh: Duration) -> Duration {
    MINIMUM_CPU_UPDATE_INTERVAL.saturating_sub(since_last_refresh)
}

impl SystemMetricsSource {
    pub fn new(targets: Vec<MonitoredTarget>) -> Self {
        let mut system = System::new();
        system.refresh_cpu();
        system.refresh_memory();
        Self {
            targets,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            sampler: Mutex::new(CpuSampler {
                system,
                refreshed_at: Instant::now(),
            }),
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    fn host_sample(&self) -> (f64, f64, f64, NetworkIo) {
        let (cpu, memory) = {
            let mut sampler = self.sampler.lock().unwrap_or_else(|e| e.into_inner());
            let wait = cpu_settle_delay(sampler.refreshed_at.elapsed());
            if !wait.is_zero() {
                std::thread::sleep(wait);
            }
            let sys = &mut sampler.system;
            sys.refresh_cpu();
            sys.refresh_memory();

            let cpu = sys.global_cpu_info().cpu_usage() as f64;
            let total = sys.total_memory();
            let memory = if total > 0 {
                sys.used_memory() as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            sampler.refreshed_at = Instant::now();
            (cpu, memory)
        };

        let disks = Disks::new_with_refreshed_list();
        let (mut total, mut available) = (0u64, 0u64);
        for disk in disks.list() {
            total += disk.total_space();
            available += disk.available_space();
        }
        let disk = if total > 0 {
            total.saturating_sub(available) as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        let networks = Networks::new_with_refreshed_list();
        let mut network = NetworkIo::default();
        for (_name, data) in networks.list() {
            network.bytes_sent += data.total_transmitted();
            network.bytes_received += data.total_received();
        }

        (cpu, memory, disk, network)
    }

    /// Milliseconds for a GET of `url`, or `UNREACHABLE_RESPONSE_MS`.
    ///
    /// Must be called from a blocking context: the blocking client runs its
    /// own runtime internally.
    fn probe_response_time(&self, target_id: &str, url: &str) -> f64 {
        let client = match reqwest::blocking::Client::builder()
            .timeout(self.probe_timeout)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                warn!(target_id, error = %e, "could not build probe client");
                return UNREACHABLE_RESPONSE_MS;
            }
        };

        let started = Instant::now();
        match client.get(url).send() {
            Ok(resp) if resp.status() == reqwest::StatusCode::OK => {
                started.elapsed().as_secs_f64() * 1000.0
            }
            Ok(resp) => {
                debug!(target_id, status = %resp.status(), "health probe returned non-200");
                UNREACHABLE_RESPONSE_MS
            }
            Err(e) => {
                warn!(target_id, error = %e, "health probe failed");
                UNREACHABLE_RESPONSE_MS
            }
        }
    }
}

impl MetricsSource for SystemMetricsSource {
    fn collect(&self, target: &MonitoredTarget) -> SwitchboardResult<MetricsSnapshot> {
        if !self.targets.iter().any(|t| t.id == target.id) {
            return Err(SwitchboardError::MetricsUnavailable {
                target: target.id.clone(),
                reason: "target is not monitored".to_string(),
            });
        }

        let (cpu_usage, memory_usage, disk_usage, network) = self.host_sample();
        let response_time_ms = match &target.health_url {
            Some(url) => self.probe_response_time(&target.id, url),
            None => 0.0,
        };

        Ok(MetricsSnapshot {
            target_id: target.id.clone(),
            cpu_usage,
            memory_usage,
            disk_usage,
            response_time_ms,
            error_rate: 0.0,
            network,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: &str, health_url: Option<&str>) -> MonitoredTarget {
        MonitoredTarget {
            id: id.to_string(),
            kind: "ai".to_string(),
            health_url: health_url.map(str::to_string),
        }
    }

    #[test]
    fn settle_delay_covers_the_remaining_interval() {
        assert_eq!(cpu_settle_delay(Duration::ZERO), MINIMUM_CPU_UPDATE_INTERVAL);
        assert_eq!(cpu_settle_delay(MINIMUM_CPU_UPDATE_INTERVAL), Duration::ZERO);
        assert_eq!(cpu_settle_delay(MINIMUM_CPU_UPDATE_INTERVAL * 3), Duration::ZERO);
    }

    #[test]
    fn first_sample_waits_for_a_full_cpu_interval() {
        let constructed = Instant::now();
        let source = SystemMetricsSource::new(vec![target("ai-server", None)]);

        let (cpu, ..) = source.host_sample();
        assert!(
            constructed.elapsed() >= MINIMUM_CPU_UPDATE_INTERVAL,
            "cold sample read CPU before sysinfo could measure it"
        );
        assert!((0.0..=100.0).contains(&cpu));
    }

    #[test]
    fn unknown_target_is_unavailable() {
        let source = SystemMetricsSource::new(vec![target("ai-server", None)]);
        match source.collect(&target("ghost", None)) {
            Err(SwitchboardError::MetricsUnavailable { target, .. }) => assert_eq!(target, "ghost"),
            other => panic!("expected MetricsUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn target_without_url_reports_zero_latency() {
        let source = SystemMetricsSource::new(vec![target("xampp-mysql", None)]);
        let snapshot = source.collect(&target("xampp-mysql", None)).unwrap();

        assert_eq!(snapshot.target_id, "xampp-mysql");
        assert_eq!(snapshot.response_time_ms, 0.0);
        assert_eq!(snapshot.error_rate, 0.0);
        assert!((0.0..=100.0).contains(&snapshot.memory_usage));
        assert!((0.0..=100.0).contains(&snapshot.disk_usage));
    }

    #[test]
    fn unreachable_url_reports_sentinel() {
        // Port 9 (discard) on localhost is closed on any sane test host.
        let t = target("voice-server", Some("http://127.0.0.1:9/health"));
        let source = SystemMetricsSource::new(vec![t.clone()])
            .with_probe_timeout(Duration::from_millis(500));

        let snapshot = source.collect(&t).unwrap();
        assert_eq!(snapshot.response_time_ms, UNREACHABLE_RESPONSE_MS);
    }
}
