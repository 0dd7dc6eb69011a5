//! Bootstrap orchestrator: the single owner of the bootstrap state machine
//!
//! Runs one linear sequence: database check, backend start, backend health
//! wait, then the main window. Every failure on that path becomes a decision
//! point; nothing escapes as an error. Once Ready, the orchestrator only
//! watches for shutdown, window close and backend exits.

use std::future::pending;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use shared::{logging, shell_debug, shell_info, shell_warn, Component, Dependency};
use crate::config::BootstrapConfig;
use crate::services::HealthMonitor;
use crate::state::{BootstrapState, FailureReason, ShellExit, UserDecision};
use crate::traits::{DecisionPrompt, DependencyProber, HelpOpener, ProcessSupervisor, WindowManager};
use crate::types::{LaunchSpec, ProcessInfo, SupervisorEvent};

/// What interrupted the bootstrap sequence or the Ready loop
enum Interrupt {
    Shutdown,
    WindowClosed,
}

enum ReadyEvent {
    Quit(Interrupt),
    Supervisor(SupervisorEvent),
}

pub struct BootstrapOrchestrator<P, S, W, D, H>
where
    P: DependencyProber,
    S: ProcessSupervisor,
    W: WindowManager,
    D: DecisionPrompt,
    H: HelpOpener,
{
    config: Arc<BootstrapConfig>,
    health: Arc<HealthMonitor<P>>,
    supervisor: S,
    window: W,
    prompt: D,
    help: H,
    launch: LaunchSpec,

    state: BootstrapState,
    transitions: Vec<BootstrapState>,
    passive_poller: Option<JoinHandle<()>>,

    /// Shutdown signal
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: Option<mpsc::Receiver<()>>,
}

impl<P, S, W, D, H> BootstrapOrchestrator<P, S, W, D, H>
where
    P: DependencyProber + 'static,
    S: ProcessSupervisor,
    W: WindowManager,
    D: DecisionPrompt,
    H: HelpOpener,
{
    pub fn new(
        config: BootstrapConfig,
        health: Arc<HealthMonitor<P>>,
        supervisor: S,
        window: W,
        prompt: D,
        help: H,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let state = Self::initial_state(&config);

        Self {
            launch: config.launch_spec(),
            config: Arc::new(config),
            health,
            supervisor,
            window,
            prompt,
            help,
            transitions: vec![state.clone()],
            state,
            passive_poller: None,
            shutdown_tx,
            shutdown_rx: Some(shutdown_rx),
        }
    }

    /// Dev mode skips the whole bootstrap; so does the database check when disabled
    fn initial_state(config: &BootstrapConfig) -> BootstrapState {
        if config.dev_mode {
            BootstrapState::Ready
        } else if config.verify_database {
            BootstrapState::CheckingDatabase
        } else {
            BootstrapState::StartingBackend
        }
    }

    pub fn state(&self) -> &BootstrapState {
        &self.state
    }

    /// Every state entered so far, in order
    pub fn transitions(&self) -> &[BootstrapState] {
        &self.transitions
    }

    pub fn health(&self) -> &Arc<HealthMonitor<P>> {
        &self.health
    }

    pub fn get_shutdown_sender(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    fn transition(&mut self, next: BootstrapState) {
        if next != self.state {
            shell_info!(Component::Orchestrator, "{} -> {}", self.state, next);
            self.state = next.clone();
            self.transitions.push(next);
        }
    }

    /// Run bootstrap, then stay up until the window closes or shutdown is requested
    pub async fn run(&mut self) -> ShellExit {
        let mut shutdown_rx = self.shutdown_rx.take();
        let mut closed = self.window.closed();
        let mut events = self.supervisor.take_events();

        logging::log_startup(Component::Orchestrator, &format!("bootstrap ({})", self.state));
        if let Err(e) = self.window.show_splash().await {
            shell_warn!(Component::Orchestrator, "Splash screen unavailable: {}", e);
        }

        // Bootstrap path
        loop {
            match self.state.clone() {
                BootstrapState::Ready => match self.enter_ready().await {
                    Ok(()) => break,
                    Err(reason) => self.transition(BootstrapState::Failed(reason)),
                },
                BootstrapState::Failed(reason) => return self.fail(reason).await,
                _ => {
                    let interrupted = tokio::select! {
                        biased;
                        _ = wait_shutdown(&mut shutdown_rx) => Some(Interrupt::Shutdown),
                        _ = &mut closed => Some(Interrupt::WindowClosed),
                        next = self.step() => {
                            self.transition(next);
                            None
                        }
                    };
                    if let Some(interrupt) = interrupted {
                        return self.quit(interrupt).await;
                    }
                }
            }
        }

        // Ready
        loop {
            let event = tokio::select! {
                biased;
                _ = wait_shutdown(&mut shutdown_rx) => ReadyEvent::Quit(Interrupt::Shutdown),
                _ = &mut closed => ReadyEvent::Quit(Interrupt::WindowClosed),
                event = next_event(&mut events) => ReadyEvent::Supervisor(event),
            };

            match event {
                ReadyEvent::Quit(interrupt) => return self.quit(interrupt).await,
                ReadyEvent::Supervisor(SupervisorEvent::Exited { pid, outcome }) => {
                    shell_warn!(
                        Component::Orchestrator,
                        "Backend PID {} exited ({:?}); updating status",
                        pid,
                        outcome.code
                    );
                    let health = self.health.clone();
                    tokio::spawn(async move {
                        health.probe(Dependency::Backend).await;
                    });
                }
            }
        }
    }

    /// Execute the current non-terminal state and return the next one
    async fn step(&mut self) -> BootstrapState {
        match self.state.clone() {
            BootstrapState::CheckingDatabase => {
                let target = self.health.target(Dependency::Database).to_string();
                shell_info!(Component::Orchestrator, "🔍 Checking database at {}", target);
                if self.health.probe(Dependency::Database).await.is_online() {
                    BootstrapState::StartingBackend
                } else {
                    BootstrapState::AwaitingUserRetryDecision(FailureReason::DatabaseUnreachable)
                }
            }
            BootstrapState::StartingBackend => match self.supervisor.start(&self.launch).await {
                Ok(ProcessInfo::Spawned { pid }) => {
                    shell_debug!(Component::Orchestrator, "Backend spawned with PID {}", pid);
                    BootstrapState::WaitingBackendHealthy
                }
                Ok(ProcessInfo::ExternallyManaged) => BootstrapState::WaitingBackendHealthy,
                Err(e) => {
                    logging::log_error(Component::Orchestrator, "Backend start", &e);
                    BootstrapState::AwaitingUserRetryDecision(FailureReason::SpawnFailed { message: e.to_string() })
                }
            },
            BootstrapState::WaitingBackendHealthy => {
                let status = self
                    .health
                    .wait_until_healthy(
                        Dependency::Backend,
                        self.config.max_health_attempts,
                        self.config.health_poll_interval,
                    )
                    .await;
                if status.is_online() {
                    BootstrapState::Ready
                } else {
                    BootstrapState::AwaitingUserRetryDecision(FailureReason::BackendUnhealthy)
                }
            }
            BootstrapState::AwaitingUserRetryDecision(reason) => self.resolve_failure(reason).await,
            terminal @ (BootstrapState::Ready | BootstrapState::Failed(_)) => terminal,
        }
    }

    /// Ask until the user retries or exits; the help action keeps asking
    async fn resolve_failure(&mut self, reason: FailureReason) -> BootstrapState {
        shell_warn!(Component::Orchestrator, "⚠️ {}", reason);
        loop {
            match self.prompt.decide(&reason).await {
                UserDecision::OpenHelp => {
                    if let Err(e) = self.help.open(&self.config.help_url) {
                        shell_warn!(Component::Orchestrator, "{}", e);
                    }
                }
                UserDecision::Retry => {
                    self.supervisor.stop().await;
                    return reason.retry_state();
                }
                UserDecision::Exit => return BootstrapState::Failed(reason),
            }
        }
    }

    async fn enter_ready(&mut self) -> Result<(), FailureReason> {
        self.window
            .open_main()
            .await
            .map_err(|e| FailureReason::WindowUnavailable { message: e.to_string() })?;
        self.window.dismiss_splash(self.config.splash_min_display).await;

        self.passive_poller = Some(spawn_passive_poller(self.health.clone(), self.config.clone()));
        logging::log_success(Component::Orchestrator, "Application ready");
        Ok(())
    }

    async fn teardown(&mut self) {
        if let Some(poller) = self.passive_poller.take() {
            poller.abort();
        }
        self.supervisor.stop().await;
        self.window.destroy().await;
    }

    async fn quit(&mut self, interrupt: Interrupt) -> ShellExit {
        let why = match interrupt {
            Interrupt::Shutdown => "shutdown requested",
            Interrupt::WindowClosed => "window closed",
        };
        logging::log_shutdown(Component::Orchestrator, why);
        self.teardown().await;
        ShellExit::Normal
    }

    async fn fail(&mut self, reason: FailureReason) -> ShellExit {
        shell_warn!(Component::Orchestrator, "Bootstrap failed: {}", reason);
        self.teardown().await;
        ShellExit::Failed(reason)
    }
}

/// Re-probe the dependencies on a fixed interval while the window is open
fn spawn_passive_poller<P>(health: Arc<HealthMonitor<P>>, config: Arc<BootstrapConfig>) -> JoinHandle<()>
where
    P: DependencyProber + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.passive_poll_interval);
        loop {
            ticker.tick().await;
            health.probe(Dependency::Backend).await;
            if config.verify_database {
                health.probe(Dependency::Database).await;
            }
        }
    })
}

async fn wait_shutdown(rx: &mut Option<mpsc::Receiver<()>>) {
    match rx {
        Some(rx) => {
            if rx.recv().await.is_none() {
                pending::<()>().await;
            }
        }
        None => pending().await,
    }
}

async fn next_event(events: &mut Option<mpsc::UnboundedReceiver<SupervisorEvent>>) -> SupervisorEvent {
    match events {
        Some(rx) => match rx.recv().await {
            Some(event) => event,
            None => pending().await,
        },
        None => pending().await,
    }
}
