//! Network dependency prober
//!
//! HTTP targets are healthy only on a `200` answer; TCP targets are reachable
//! when a connection opens. Either way the check is bounded by the target's
//! timeout and never returns an error.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

use shared::{shell_debug, Component, HealthStatus};
use crate::error::{ShellError, ShellResult};
use crate::traits::DependencyProber;
use crate::types::{Protocol, ProbeTarget};

/// Prober backed by a reqwest client and plain TCP connects
pub struct NetworkProber {
    client: Client,
}

impl NetworkProber {
    pub fn new() -> ShellResult<Self> {
        let client = Client::builder()
            // a redirect is not a 200
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .map_err(|e| ShellError::ProbeClient(e.to_string()))?;
        Ok(Self { client })
    }

    async fn check_http(&self, url: String, limit: Duration) -> HealthStatus {
        match timeout(limit, self.client.get(&url).send()).await {
            Ok(Ok(response)) => {
                let status = response.status();
                shell_debug!(Component::Prober, "GET {} -> {}", url, status);
                HealthStatus::from_reachable(status == reqwest::StatusCode::OK)
            }
            Ok(Err(e)) => {
                shell_debug!(Component::Prober, "GET {} failed: {}", url, e);
                HealthStatus::Offline
            }
            Err(_) => {
                shell_debug!(Component::Prober, "GET {} timed out after {:?}", url, limit);
                HealthStatus::Offline
            }
        }
    }

    async fn check_tcp(&self, host: &str, port: u16, limit: Duration) -> HealthStatus {
        match timeout(limit, TcpStream::connect((host, port))).await {
            Ok(Ok(_stream)) => HealthStatus::Online,
            Ok(Err(e)) => {
                shell_debug!(Component::Prober, "tcp://{}:{} refused: {}", host, port, e);
                HealthStatus::Offline
            }
            Err(_) => {
                shell_debug!(Component::Prober, "tcp://{}:{} timed out after {:?}", host, port, limit);
                HealthStatus::Offline
            }
        }
    }
}

#[async_trait]
impl DependencyProber for NetworkProber {
    async fn check(&self, target: &ProbeTarget) -> HealthStatus {
        match &target.protocol {
            Protocol::Http { .. } => match target.url() {
                Some(url) => self.check_http(url, target.timeout).await,
                None => HealthStatus::Offline,
            },
            Protocol::Tcp => self.check_tcp(&target.host, target.port, target.timeout).await,
        }
    }
}
