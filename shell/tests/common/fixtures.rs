//! Test fixtures for bootstrap tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use shared::{Dependency, HealthStatus};
use shell::{BootstrapConfig, DependencyProber, ProbeTarget, Protocol};

pub struct TestFixtures;

impl TestFixtures {
    pub const BACKEND_PID: u32 = 4242;
    pub const HELP_URL: &'static str = "https://help.example.test/mongodb";

    /// Production defaults with a short splash and a fixed help page
    pub fn config() -> BootstrapConfig {
        let mut config = BootstrapConfig::default();
        config.splash_min_display = Duration::from_millis(10);
        config.help_url = Self::HELP_URL.to_string();
        config
    }

    /// Small health budget for tests that only care about the outcome
    pub fn quick_config() -> BootstrapConfig {
        Self::config().with_health_budget(3, Duration::from_millis(10), Duration::from_millis(50))
    }
}

/// Prober whose answers are switched from the test
///
/// HTTP targets are the backend, TCP targets the database. The backend can be
/// set to come up on a given attempt; with `simulate_timeouts` a down target
/// takes its full timeout to answer.
#[derive(Clone, Default)]
pub struct SwitchProber {
    pub backend_up: Arc<AtomicBool>,
    pub database_up: Arc<AtomicBool>,
    backend_up_on_attempt: Option<u32>,
    simulate_timeouts: bool,
    backend_calls: Arc<AtomicU32>,
    database_calls: Arc<AtomicU32>,
}

impl SwitchProber {
    pub fn new(backend_up: bool, database_up: bool) -> Self {
        let prober = Self::default();
        prober.backend_up.store(backend_up, Ordering::SeqCst);
        prober.database_up.store(database_up, Ordering::SeqCst);
        prober
    }

    /// Backend answers 200 from the given (1-based) attempt on
    pub fn with_backend_up_on_attempt(mut self, attempt: u32) -> Self {
        self.backend_up_on_attempt = Some(attempt);
        self
    }

    pub fn with_simulated_timeouts(mut self) -> Self {
        self.simulate_timeouts = true;
        self
    }

    pub fn set_up(&self, dependency: Dependency, up: bool) {
        match dependency {
            Dependency::Backend => self.backend_up.store(up, Ordering::SeqCst),
            Dependency::Database => self.database_up.store(up, Ordering::SeqCst),
        }
    }

    pub fn calls(&self, dependency: Dependency) -> u32 {
        match dependency {
            Dependency::Backend => self.backend_calls.load(Ordering::SeqCst),
            Dependency::Database => self.database_calls.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl DependencyProber for SwitchProber {
    async fn check(&self, target: &ProbeTarget) -> HealthStatus {
        let up = match target.protocol {
            Protocol::Http { .. } => {
                let attempt = self.backend_calls.fetch_add(1, Ordering::SeqCst) + 1;
                match self.backend_up_on_attempt {
                    Some(first_up) if attempt >= first_up => true,
                    _ => self.backend_up.load(Ordering::SeqCst),
                }
            }
            Protocol::Tcp => {
                self.database_calls.fetch_add(1, Ordering::SeqCst);
                self.database_up.load(Ordering::SeqCst)
            }
        };

        if !up && self.simulate_timeouts {
            tokio::time::sleep(target.timeout).await;
        }
        HealthStatus::from_reachable(up)
    }
}
