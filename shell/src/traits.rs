//! Trait definitions with mockall annotations for testing
//!
//! Every side effect of the bootstrap orchestrator goes through one of these
//! seams: network probes, the backend process, the window, the user's
//! decision and the external help page.

use futures_util::future::BoxFuture;
use std::time::Duration;
use tokio::sync::mpsc;

use shared::HealthStatus;
use crate::error::ShellResult;
use crate::state::{FailureReason, UserDecision};
use crate::types::{LaunchSpec, ProbeTarget, ProcessInfo, SupervisorEvent};

/// Timeout-bounded reachability check against a network target
#[mockall::automock]
#[async_trait::async_trait]
pub trait DependencyProber: Send + Sync {
    /// Check the target once
    ///
    /// Never fails: every error, non-200 answer or timeout is
    /// `HealthStatus::Offline`. Resolves within `target.timeout` plus a small
    /// slack and only ever returns `Online` or `Offline`.
    async fn check(&self, target: &ProbeTarget) -> HealthStatus;
}

/// Owner of the backend child process
#[mockall::automock]
#[async_trait::async_trait]
pub trait ProcessSupervisor: Send {
    /// Spawn the backend; spawn failures are reported, never retried here
    async fn start(&mut self, spec: &LaunchSpec) -> ShellResult<ProcessInfo>;

    /// Terminate the backend and its descendants; a no-op when nothing runs
    async fn stop(&mut self);

    /// Whether a started child is still alive
    fn is_running(&mut self) -> bool;

    /// Channel of unexpected exits; can be taken once
    fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<SupervisorEvent>>;
}

/// The application window and its splash screen
#[mockall::automock]
#[async_trait::async_trait]
pub trait WindowManager: Send {
    async fn show_splash(&mut self) -> ShellResult<()>;

    async fn open_main(&mut self) -> ShellResult<()>;

    async fn dismiss_splash(&mut self, min_display: Duration);

    /// Future that resolves when the window is closed
    fn closed(&self) -> BoxFuture<'static, ()>;

    async fn destroy(&mut self);
}

/// Asks the user how to continue after a bootstrap failure
#[mockall::automock]
#[async_trait::async_trait]
pub trait DecisionPrompt: Send + Sync {
    async fn decide(&self, reason: &FailureReason) -> UserDecision;
}

/// Opens the external help page
#[mockall::automock]
pub trait HelpOpener: Send + Sync {
    fn open(&self, url: &str) -> ShellResult<()>;
}
