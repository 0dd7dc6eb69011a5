//! Health monitor: runs probes and records the status of both dependencies
//!
//! Every probe publishes `Checking` first and the probe result afterwards, so
//! subscribers see the same status sequence the status indicator shows.

use async_trait::async_trait;
use futures_util::stream::{self, Stream, StreamExt};
use std::time::Duration;
use tokio::sync::watch;

use bridge::StatusSource;
use shared::{shell_debug, shell_info, Component, Dependency, HealthSnapshot, HealthStatus};
use crate::traits::DependencyProber;
use crate::types::ProbeTarget;

pub struct HealthMonitor<P: DependencyProber> {
    prober: P,
    backend: ProbeTarget,
    database: ProbeTarget,
    status: watch::Sender<HealthSnapshot>,
}

impl<P: DependencyProber> HealthMonitor<P> {
    pub fn new(prober: P, backend: ProbeTarget, database: ProbeTarget) -> Self {
        let (status, _) = watch::channel(HealthSnapshot::default());
        Self {
            prober,
            backend,
            database,
            status,
        }
    }

    pub fn target(&self, dependency: Dependency) -> &ProbeTarget {
        match dependency {
            Dependency::Backend => &self.backend,
            Dependency::Database => &self.database,
        }
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        *self.status.borrow()
    }

    /// Receiver of every status change
    pub fn subscribe(&self) -> watch::Receiver<HealthSnapshot> {
        self.status.subscribe()
    }

    fn record(&self, dependency: Dependency, value: HealthStatus) {
        self.status.send_modify(|snapshot| match dependency {
            Dependency::Backend => snapshot.backend = value,
            Dependency::Database => snapshot.database = value,
        });
    }

    /// Probe one dependency once and record the result
    pub async fn probe(&self, dependency: Dependency) -> HealthStatus {
        self.record(dependency, HealthStatus::Checking);
        let result = self.prober.check(self.target(dependency)).await;
        self.record(dependency, result);
        shell_debug!(Component::Prober, "{} is {}", dependency, result);
        result
    }

    /// Probe results until the first `Online` or `max_attempts` probes
    ///
    /// Waits `interval` between attempts, never before the first one nor after
    /// the last one.
    pub fn poll_until_healthy(
        &self,
        dependency: Dependency,
        max_attempts: u32,
        interval: Duration,
    ) -> impl Stream<Item = HealthStatus> + '_ {
        stream::unfold((0u32, false), move |(attempt, done)| async move {
            if done || attempt >= max_attempts {
                return None;
            }
            if attempt > 0 {
                tokio::time::sleep(interval).await;
            }
            let result = self.probe(dependency).await;
            shell_debug!(
                Component::Prober,
                "{} attempt {}/{}: {}",
                dependency,
                attempt + 1,
                max_attempts,
                result
            );
            Some((result, (attempt + 1, result.is_online())))
        })
    }

    /// Drive `poll_until_healthy` to the end and return the final status
    pub async fn wait_until_healthy(&self, dependency: Dependency, max_attempts: u32, interval: Duration) -> HealthStatus {
        let polls = self.poll_until_healthy(dependency, max_attempts, interval);
        futures_util::pin_mut!(polls);

        let mut last = HealthStatus::Offline;
        while let Some(status) = polls.next().await {
            last = status;
        }
        if last.is_online() {
            shell_info!(Component::Prober, "✅ {} is healthy", dependency);
        }
        last
    }
}

#[async_trait]
impl<P: DependencyProber> StatusSource for HealthMonitor<P> {
    async fn check(&self, dependency: Dependency) -> bool {
        self.probe(dependency).await.is_online()
    }

    fn snapshot(&self) -> HealthSnapshot {
        HealthMonitor::snapshot(self)
    }
}
