//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// External dependency the shell must see alive before the UI is usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dependency {
    Backend,
    Database,
}

impl Dependency {
    pub const ALL: [Dependency; 2] = [Dependency::Backend, Dependency::Database];
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Backend => write!(f, "backend"),
            Dependency::Database => write!(f, "database"),
        }
    }
}

/// Availability of a dependency as last observed by the prober
///
/// A probe moves a status through `Unknown -> Checking -> {Online, Offline}`;
/// later probes go `{Online, Offline} -> Checking -> {Online, Offline}` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Unknown,
    Checking,
    Online,
    Offline,
}

impl HealthStatus {
    pub fn is_online(self) -> bool {
        self == HealthStatus::Online
    }

    /// True for the two values a finished probe can produce
    pub fn is_settled(self) -> bool {
        matches!(self, HealthStatus::Online | HealthStatus::Offline)
    }

    pub fn from_reachable(reachable: bool) -> Self {
        if reachable {
            HealthStatus::Online
        } else {
            HealthStatus::Offline
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Unknown => write!(f, "unknown"),
            HealthStatus::Checking => write!(f, "checking"),
            HealthStatus::Online => write!(f, "online"),
            HealthStatus::Offline => write!(f, "offline"),
        }
    }
}

/// Snapshot of both dependencies for the status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub backend: HealthStatus,
    pub database: HealthStatus,
}

impl HealthSnapshot {
    pub fn get(&self, dependency: Dependency) -> HealthStatus {
        match dependency {
            Dependency::Backend => self.backend,
            Dependency::Database => self.database,
        }
    }
}
