//! Value types passed between the shell components

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// How a dependency is checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Protocol {
    /// Reachable iff a TCP connection opens
    Tcp,
    /// Healthy iff `GET path` answers 200
    Http { path: String },
}

/// Network target of a reachability or health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    pub timeout: Duration,
}

impl ProbeTarget {
    pub fn tcp(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            protocol: Protocol::Tcp,
            timeout,
        }
    }

    pub fn http(host: impl Into<String>, port: u16, path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            protocol: Protocol::Http { path: path.into() },
            timeout,
        }
    }

    /// Request URL for HTTP targets
    pub fn url(&self) -> Option<String> {
        match &self.protocol {
            Protocol::Http { path } => Some(format!("http://{}:{}{}", self.host, self.port, path)),
            Protocol::Tcp => None,
        }
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.protocol {
            Protocol::Tcp => write!(f, "tcp://{}:{}", self.host, self.port),
            Protocol::Http { path } => write!(f, "http://{}:{}{}", self.host, self.port, path),
        }
    }
}

/// Everything needed to spawn the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub command: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Added on top of the inherited host environment
    pub env: BTreeMap<String, String>,
}

/// Handle information returned by a successful start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessInfo {
    Spawned { pid: u32 },
    /// The backend is run by someone else (development mode)
    ExternallyManaged,
}

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    /// `None` when the process was ended by a signal
    pub code: Option<i32>,
}

/// Notifications from the process supervisor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    /// The child exited without a stop request
    Exited { pid: u32, outcome: ExitOutcome },
}
