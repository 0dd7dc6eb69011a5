//! Builder and harness for bootstrap orchestrator tests
//!
//! Mocks record every side effect into a shared call log so tests can assert
//! on ordering (for example that the backend is stopped before the window
//! is destroyed).

use futures_util::FutureExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use shared::Dependency;
use shell::services::HealthMonitor;
use shell::traits::{MockDecisionPrompt, MockHelpOpener, MockProcessSupervisor, MockWindowManager};
use bridge::BridgeError;
use shell::{
    BootstrapConfig, BootstrapOrchestrator, FailureReason, ProcessInfo, ShellError, ShellExit, SupervisorEvent,
    UserDecision,
};
use super::fixtures::{SwitchProber, TestFixtures};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub type TestOrchestrator = BootstrapOrchestrator<
    SwitchProber,
    MockProcessSupervisor,
    MockWindowManager,
    MockDecisionPrompt,
    MockHelpOpener,
>;

/// Everything a test needs to observe and poke one orchestrator
pub struct Harness {
    pub health: Arc<HealthMonitor<SwitchProber>>,
    pub prober: SwitchProber,
    pub calls: CallLog,
    /// Reasons presented at each decision prompt, in order
    pub prompts: Arc<Mutex<Vec<FailureReason>>>,
    pub events: mpsc::UnboundedSender<SupervisorEvent>,
    close: watch::Sender<bool>,
}

impl Harness {
    /// Simulate the user closing the window
    pub fn close_window(&self) {
        self.close.send_replace(true);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, name: &str) -> bool {
        self.calls().iter().any(|call| call.starts_with(name))
    }

    /// Index of the first call starting with `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.calls().iter().position(|call| call.starts_with(name))
    }

    pub fn prompts(&self) -> Vec<FailureReason> {
        self.prompts.lock().unwrap().clone()
    }
}

/// Builder pattern for creating test orchestrators with sensible defaults
pub struct OrchestratorBuilder {
    config: BootstrapConfig,
    prober: SwitchProber,
    decisions: VecDeque<UserDecision>,
    on_decide: Option<Box<dyn Fn(&FailureReason) + Send + Sync>>,
    spawn_fails: bool,
    splash_fails: bool,
    open_main_fails: bool,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            config: TestFixtures::config(),
            prober: SwitchProber::new(true, true),
            decisions: VecDeque::new(),
            on_decide: None,
            spawn_fails: false,
            splash_fails: false,
            open_main_fails: false,
        }
    }

    pub fn with_config(mut self, config: BootstrapConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_prober(mut self, prober: SwitchProber) -> Self {
        self.prober = prober;
        self
    }

    /// Answers given at successive decision prompts; Exit once exhausted
    pub fn with_decisions(mut self, decisions: impl IntoIterator<Item = UserDecision>) -> Self {
        self.decisions = decisions.into_iter().collect();
        self
    }

    /// Hook run every time the user is asked, before the answer is returned
    pub fn on_decide<F>(mut self, hook: F) -> Self
    where
        F: Fn(&FailureReason) + Send + Sync + 'static,
    {
        self.on_decide = Some(Box::new(hook));
        self
    }

    pub fn with_spawn_failure(mut self) -> Self {
        self.spawn_fails = true;
        self
    }

    pub fn with_splash_failure(mut self) -> Self {
        self.splash_fails = true;
        self
    }

    pub fn with_window_failure(mut self) -> Self {
        self.open_main_fails = true;
        self
    }

    pub fn build(self) -> (TestOrchestrator, Harness) {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = watch::channel(false);
        let dev_mode = self.config.dev_mode;

        // Supervisor
        let mut supervisor = MockProcessSupervisor::new();
        let log = calls.clone();
        let spawn_fails = self.spawn_fails;
        if dev_mode {
            supervisor.expect_start().never();
        } else {
            supervisor.expect_start().returning(move |spec| {
                log.lock().unwrap().push("start".to_string());
                if spawn_fails {
                    Err(ShellError::Spawn {
                        command: spec.command.clone(),
                        source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                    })
                } else {
                    Ok(ProcessInfo::Spawned { pid: TestFixtures::BACKEND_PID })
                }
            });
        }
        let log = calls.clone();
        supervisor.expect_stop().returning(move || {
            log.lock().unwrap().push("stop".to_string());
        });
        supervisor.expect_is_running().returning(|| false);
        supervisor.expect_take_events().return_once(move || Some(events_rx));

        // Window
        let mut window = MockWindowManager::new();
        let log = calls.clone();
        let splash_fails = self.splash_fails;
        window.expect_show_splash().returning(move || {
            log.lock().unwrap().push("show_splash".to_string());
            if splash_fails {
                Err(ShellError::Window(BridgeError::WindowClosed))
            } else {
                Ok(())
            }
        });
        let log = calls.clone();
        let prober = self.prober.clone();
        let open_main_fails = self.open_main_fails;
        window.expect_open_main().returning(move || {
            log.lock().unwrap().push(format!(
                "open_main backend={} database={}",
                prober.calls(Dependency::Backend),
                prober.calls(Dependency::Database)
            ));
            if open_main_fails {
                Err(ShellError::Window(BridgeError::WindowClosed))
            } else {
                Ok(())
            }
        });
        let log = calls.clone();
        window.expect_dismiss_splash().returning(move |_| {
            log.lock().unwrap().push("dismiss_splash".to_string());
        });
        window.expect_closed().returning(move || {
            let mut rx = close_rx.clone();
            async move {
                let _ = rx.wait_for(|closed| *closed).await;
            }
            .boxed()
        });
        let log = calls.clone();
        window.expect_destroy().returning(move || {
            log.lock().unwrap().push("destroy".to_string());
        });

        // Decision prompt
        let mut prompt = MockDecisionPrompt::new();
        let decisions = Mutex::new(self.decisions);
        let seen = prompts.clone();
        let hook = self.on_decide;
        prompt.expect_decide().returning(move |reason| {
            seen.lock().unwrap().push(reason.clone());
            if let Some(hook) = &hook {
                hook(reason);
            }
            decisions.lock().unwrap().pop_front().unwrap_or(UserDecision::Exit)
        });

        // Help
        let mut help = MockHelpOpener::new();
        let log = calls.clone();
        help.expect_open().returning(move |url| {
            log.lock().unwrap().push(format!("help {url}"));
            Ok(())
        });

        let health = Arc::new(HealthMonitor::new(
            self.prober.clone(),
            self.config.backend_target(),
            self.config.database_target(),
        ));
        let orchestrator = BootstrapOrchestrator::new(self.config, health.clone(), supervisor, window, prompt, help);

        let harness = Harness {
            health,
            prober: self.prober,
            calls,
            prompts,
            events: events_tx,
            close: close_tx,
        };
        (orchestrator, harness)
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the orchestrator on its own task and hand it back with the exit
pub fn spawn_run(mut orchestrator: TestOrchestrator) -> JoinHandle<(TestOrchestrator, ShellExit)> {
    tokio::spawn(async move {
        let exit = orchestrator.run().await;
        (orchestrator, exit)
    })
}

/// Poll `condition` until it holds or `limit` passes
pub async fn eventually<F>(limit: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
