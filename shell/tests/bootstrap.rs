//! Bootstrap orchestrator scenarios against mocked services
//!
//! Probing goes through a switchable prober behind a real `HealthMonitor`;
//! the supervisor, window, prompt and help opener are mocks that record
//! their calls.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use shared::{Dependency, HealthStatus};
use shell::{BootstrapState, ExitOutcome, FailureReason, ShellExit, SupervisorEvent, UserDecision};

mod common;
use common::{eventually, spawn_run, OrchestratorBuilder, SwitchProber, TestFixtures};

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test(start_paused = true)]
async fn test_backend_never_healthy_reaches_decision_within_budget() {
    let started = tokio::time::Instant::now();
    let asked_at = Arc::new(Mutex::new(None));
    let record = asked_at.clone();

    let prober = SwitchProber::new(false, true).with_simulated_timeouts();
    let (mut orchestrator, harness) = OrchestratorBuilder::new()
        .with_prober(prober)
        .on_decide(move |_| {
            record.lock().unwrap().get_or_insert(started.elapsed());
        })
        .build();

    let exit = orchestrator.run().await;

    let elapsed = asked_at.lock().unwrap().expect("decision prompt shown");
    assert!(elapsed >= Duration::from_secs(30), "gave up too early: {elapsed:?}");
    assert!(elapsed <= Duration::from_secs(90), "gave up too late: {elapsed:?}");
    assert_eq!(harness.prober.calls(Dependency::Backend), 30);
    assert_eq!(harness.prompts(), vec![FailureReason::BackendUnhealthy]);
    assert_eq!(exit, ShellExit::Failed(FailureReason::BackendUnhealthy));
}

#[tokio::test]
async fn test_happy_path_opens_window_after_healthy_backend() {
    let config = TestFixtures::config().with_health_budget(30, Duration::from_millis(10), Duration::from_millis(100));
    let prober = SwitchProber::new(false, true).with_backend_up_on_attempt(3);
    let (orchestrator, harness) = OrchestratorBuilder::new()
        .with_config(config)
        .with_prober(prober)
        .build();

    let task = spawn_run(orchestrator);
    assert!(eventually(WAIT, || harness.called("dismiss_splash")).await);

    // probe counts at the moment the main window was created
    assert!(harness.called("open_main backend=3 database=1"), "calls: {:?}", harness.calls());
    assert!(harness.position("start") < harness.position("open_main"));
    assert_eq!(harness.health.snapshot().backend, HealthStatus::Online);

    harness.close_window();
    let (orchestrator, exit) = tokio::time::timeout(WAIT, task).await.unwrap().unwrap();

    assert_eq!(exit, ShellExit::Normal);
    assert_eq!(exit.code(), 0);
    assert_eq!(
        orchestrator.transitions(),
        &[
            BootstrapState::CheckingDatabase,
            BootstrapState::StartingBackend,
            BootstrapState::WaitingBackendHealthy,
            BootstrapState::Ready,
        ]
    );
    assert!(harness.prompts().is_empty());
    assert!(harness.position("stop") < harness.position("destroy"));
}

#[tokio::test]
async fn test_ready_after_one_probe_each_when_everything_is_up() {
    let (orchestrator, harness) = OrchestratorBuilder::new()
        .with_prober(SwitchProber::new(true, true))
        .build();

    let task = spawn_run(orchestrator);
    assert!(eventually(WAIT, || harness.called("dismiss_splash")).await);
    assert!(harness.called("open_main backend=1 database=1"), "calls: {:?}", harness.calls());

    harness.close_window();
    let (orchestrator, exit) = tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
    assert_eq!(exit, ShellExit::Normal);
    assert_eq!(orchestrator.state(), &BootstrapState::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_exit_at_decision_stops_backend_and_fails() {
    let (mut orchestrator, harness) = OrchestratorBuilder::new()
        .with_config(TestFixtures::quick_config())
        .with_prober(SwitchProber::new(false, true))
        .with_decisions([UserDecision::Exit])
        .build();

    let exit = orchestrator.run().await;

    assert_eq!(exit, ShellExit::Failed(FailureReason::BackendUnhealthy));
    assert_ne!(exit.code(), 0);
    assert_eq!(
        orchestrator.state(),
        &BootstrapState::Failed(FailureReason::BackendUnhealthy)
    );

    let stop = harness.position("stop").expect("backend stopped");
    let destroy = harness.position("destroy").expect("window destroyed");
    assert!(harness.position("start") < Some(stop));
    assert!(stop < destroy);
    assert!(!harness.called("open_main"));
}

#[tokio::test]
async fn test_backend_exit_after_ready_only_updates_status() {
    let mut config = TestFixtures::quick_config();
    config.passive_poll_interval = Duration::from_secs(3600);
    let (orchestrator, harness) = OrchestratorBuilder::new()
        .with_config(config)
        .with_prober(SwitchProber::new(true, true))
        .build();

    let task = spawn_run(orchestrator);
    assert!(eventually(WAIT, || harness.called("dismiss_splash")).await);
    // bootstrap probe plus the passive poller's first tick
    assert!(eventually(WAIT, || harness.prober.calls(Dependency::Backend) >= 2).await);
    assert_eq!(harness.health.snapshot().backend, HealthStatus::Online);

    harness.prober.set_up(Dependency::Backend, false);
    harness
        .events
        .send(SupervisorEvent::Exited {
            pid: TestFixtures::BACKEND_PID,
            outcome: ExitOutcome { code: Some(1) },
        })
        .unwrap();

    assert!(eventually(WAIT, || harness.health.snapshot().backend == HealthStatus::Offline).await);
    assert!(!task.is_finished());
    assert!(harness.prompts().is_empty(), "no decision prompt after Ready");

    harness.close_window();
    let (orchestrator, exit) = tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
    assert_eq!(exit, ShellExit::Normal);
    assert_eq!(orchestrator.state(), &BootstrapState::Ready);
}

#[tokio::test]
async fn test_database_retry_reenters_database_check() {
    let (mut orchestrator, harness) = OrchestratorBuilder::new()
        .with_config(TestFixtures::quick_config())
        .with_prober(SwitchProber::new(true, false))
        .with_decisions([UserDecision::Retry, UserDecision::Exit])
        .build();

    let exit = orchestrator.run().await;

    assert_eq!(exit, ShellExit::Failed(FailureReason::DatabaseUnreachable));
    let awaiting = BootstrapState::AwaitingUserRetryDecision(FailureReason::DatabaseUnreachable);
    assert_eq!(
        orchestrator.transitions(),
        &[
            BootstrapState::CheckingDatabase,
            awaiting.clone(),
            BootstrapState::CheckingDatabase,
            awaiting,
            BootstrapState::Failed(FailureReason::DatabaseUnreachable),
        ]
    );
    assert_eq!(harness.prober.calls(Dependency::Database), 2);
    assert!(!harness.called("start"), "backend must not start without a database");
}

#[tokio::test]
async fn test_retry_after_database_comes_up_reaches_ready() {
    let prober = SwitchProber::new(true, false);
    let database = prober.clone();
    let (orchestrator, harness) = OrchestratorBuilder::new()
        .with_config(TestFixtures::quick_config())
        .with_prober(prober)
        .with_decisions([UserDecision::Retry])
        .on_decide(move |_| database.set_up(Dependency::Database, true))
        .build();

    let task = spawn_run(orchestrator);
    assert!(eventually(WAIT, || harness.called("dismiss_splash")).await);
    harness.close_window();
    let (orchestrator, exit) = tokio::time::timeout(WAIT, task).await.unwrap().unwrap();

    assert_eq!(exit, ShellExit::Normal);
    assert_eq!(
        orchestrator.transitions(),
        &[
            BootstrapState::CheckingDatabase,
            BootstrapState::AwaitingUserRetryDecision(FailureReason::DatabaseUnreachable),
            BootstrapState::CheckingDatabase,
            BootstrapState::StartingBackend,
            BootstrapState::WaitingBackendHealthy,
            BootstrapState::Ready,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_backend_retry_restarts_backend() {
    let prober = SwitchProber::new(false, true);
    let backend = prober.clone();
    let (orchestrator, harness) = OrchestratorBuilder::new()
        .with_config(TestFixtures::quick_config())
        .with_prober(prober)
        .with_decisions([UserDecision::Retry])
        .on_decide(move |_| backend.set_up(Dependency::Backend, true))
        .build();

    let task = spawn_run(orchestrator);
    assert!(eventually(WAIT, || harness.called("dismiss_splash")).await);

    let calls = harness.calls();
    let starts = calls.iter().filter(|call| *call == "start").count();
    assert_eq!(starts, 2);
    // the partially started backend is stopped before the retry
    let first_stop = harness.position("stop").unwrap();
    let second_start = calls.iter().rposition(|call| call == "start").unwrap();
    assert!(first_stop < second_start);

    harness.close_window();
    let (orchestrator, exit) = tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
    assert_eq!(exit, ShellExit::Normal);
    // retry after an unhealthy backend does not re-check the database
    let checks = orchestrator
        .transitions()
        .iter()
        .filter(|state| **state == BootstrapState::CheckingDatabase)
        .count();
    assert_eq!(checks, 1);
}

#[tokio::test]
async fn test_open_help_keeps_asking() {
    let (mut orchestrator, harness) = OrchestratorBuilder::new()
        .with_config(TestFixtures::quick_config())
        .with_prober(SwitchProber::new(true, false))
        .with_decisions([UserDecision::OpenHelp, UserDecision::OpenHelp, UserDecision::Exit])
        .build();

    let exit = orchestrator.run().await;

    assert_eq!(exit, ShellExit::Failed(FailureReason::DatabaseUnreachable));
    assert_eq!(harness.prompts().len(), 3);
    let help_calls = harness
        .calls()
        .into_iter()
        .filter(|call| call == &format!("help {}", TestFixtures::HELP_URL))
        .count();
    assert_eq!(help_calls, 2);
    // help does not leave the decision point
    assert_eq!(harness.prober.calls(Dependency::Database), 1);
}

#[tokio::test]
async fn test_spawn_failure_is_a_decision_point() {
    let (mut orchestrator, harness) = OrchestratorBuilder::new()
        .with_config(TestFixtures::quick_config())
        .with_spawn_failure()
        .build();

    let exit = orchestrator.run().await;

    let prompts = harness.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(matches!(&prompts[0], FailureReason::SpawnFailed { message } if message.contains("not found")));
    assert!(matches!(exit, ShellExit::Failed(FailureReason::SpawnFailed { .. })));
    assert_eq!(harness.prober.calls(Dependency::Backend), 0);
}

#[tokio::test]
async fn test_skipping_database_check_starts_backend_first() {
    let config = TestFixtures::quick_config().with_database_check(false);
    let (orchestrator, harness) = OrchestratorBuilder::new()
        .with_config(config)
        .with_prober(SwitchProber::new(true, false))
        .build();

    let task = spawn_run(orchestrator);
    assert!(eventually(WAIT, || harness.called("dismiss_splash")).await);
    harness.close_window();
    let (orchestrator, exit) = tokio::time::timeout(WAIT, task).await.unwrap().unwrap();

    assert_eq!(exit, ShellExit::Normal);
    assert_eq!(orchestrator.transitions()[0], BootstrapState::StartingBackend);
    assert_eq!(harness.prober.calls(Dependency::Database), 0);
}

#[tokio::test]
async fn test_dev_mode_never_spawns_backend() {
    let config = TestFixtures::quick_config().with_dev_mode(true);
    let (orchestrator, harness) = OrchestratorBuilder::new()
        .with_config(config)
        .with_prober(SwitchProber::new(false, false))
        .build();

    let task = spawn_run(orchestrator);
    assert!(eventually(WAIT, || harness.called("dismiss_splash")).await);
    harness.close_window();
    let (orchestrator, exit) = tokio::time::timeout(WAIT, task).await.unwrap().unwrap();

    assert_eq!(exit, ShellExit::Normal);
    assert_eq!(orchestrator.transitions(), &[BootstrapState::Ready]);
    assert!(!harness.called("start"));
    assert!(harness.called("open_main backend=0 database=0"));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_bootstrap_tears_down() {
    let prober = SwitchProber::new(false, true).with_simulated_timeouts();
    let (orchestrator, harness) = OrchestratorBuilder::new().with_prober(prober).build();

    let shutdown = orchestrator.get_shutdown_sender();
    let task = spawn_run(orchestrator);
    assert!(eventually(WAIT, || harness.called("start")).await);

    shutdown.send(()).await.unwrap();
    let (orchestrator, exit) = task.await.unwrap();

    assert_eq!(exit, ShellExit::Normal);
    assert_eq!(orchestrator.state(), &BootstrapState::WaitingBackendHealthy);
    assert!(harness.position("stop") < harness.position("destroy"));
    assert!(!harness.called("open_main"));
}

#[tokio::test(start_paused = true)]
async fn test_window_close_during_health_wait_exits_normally() {
    let prober = SwitchProber::new(false, true).with_simulated_timeouts();
    let (orchestrator, harness) = OrchestratorBuilder::new().with_prober(prober).build();

    let task = spawn_run(orchestrator);
    assert!(eventually(WAIT, || harness.called("start")).await);
    harness.close_window();
    let (orchestrator, exit) = task.await.unwrap();

    assert_eq!(exit, ShellExit::Normal);
    assert_eq!(orchestrator.state(), &BootstrapState::WaitingBackendHealthy);
    assert!(harness.prompts().is_empty());
    assert!(harness.position("stop") < harness.position("destroy"));
}

#[tokio::test]
async fn test_splash_failure_does_not_stop_bootstrap() {
    let (mut orchestrator, harness) = OrchestratorBuilder::new().with_splash_failure().build();
    let task = spawn_run(orchestrator);

    assert!(eventually(WAIT, || harness.called("dismiss_splash")).await);
    assert!(harness.position("show_splash") < harness.position("open_main"));

    harness.close_window();
    let (orchestrator, exit) = tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
    assert_eq!(exit, ShellExit::Normal);
    assert!(orchestrator.transitions().contains(&BootstrapState::Ready));
}

#[tokio::test]
async fn test_window_failure_is_fatal() {
    let (mut orchestrator, harness) = OrchestratorBuilder::new()
        .with_config(TestFixtures::quick_config())
        .with_window_failure()
        .build();

    let exit = orchestrator.run().await;

    assert!(matches!(exit, ShellExit::Failed(FailureReason::WindowUnavailable { .. })));
    assert_eq!(exit.code(), 1);
    assert!(harness.prompts().is_empty());
    assert!(harness.position("stop") < harness.position("destroy"));
}
