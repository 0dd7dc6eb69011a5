//! Real process supervisor for the backend child
//!
//! The child is started in its own process group (its own console process
//! group on Windows) so that stopping it also stops whatever it spawned.
//! Stopping sends a termination request to the whole tree, waits for the
//! grace window, then kills the tree.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

use shared::{shell_debug, shell_error, shell_info, shell_warn, Component};
use crate::error::{ShellError, ShellResult};
use crate::services::process_output_handler::{
    configure_child_stdio, spawn_output_consumers, OutputSink, TracingSink,
};
use crate::traits::ProcessSupervisor;
use crate::types::{ExitOutcome, LaunchSpec, ProcessInfo, SupervisorEvent};

/// How long a force-killed tree gets to be reaped
const REAP_TIMEOUT: Duration = Duration::from_secs(2);

#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Handle for the running child; the child itself is owned by its monitor task
struct ChildProcessHandle {
    pid: u32,
    exit: watch::Receiver<Option<ExitOutcome>>,
    stop_requested: Arc<AtomicBool>,
}

impl ChildProcessHandle {
    fn has_exited(&self) -> bool {
        self.exit.borrow().is_some()
    }

    /// Wait up to `limit` for the child to exit
    async fn wait_exit(&mut self, limit: Duration) -> bool {
        matches!(
            timeout(limit, self.exit.wait_for(|outcome| outcome.is_some())).await,
            Ok(Ok(_))
        )
    }
}

pub struct RealProcessSupervisor {
    stop_grace: Duration,
    externally_managed: bool,
    sink: Arc<dyn OutputSink>,
    handle: Option<ChildProcessHandle>,
    events_tx: mpsc::UnboundedSender<SupervisorEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<SupervisorEvent>>,
}

impl RealProcessSupervisor {
    pub fn new(stop_grace: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            stop_grace,
            externally_managed: false,
            sink: Arc::new(TracingSink),
            handle: None,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Supervisor for development mode, where the backend runs on its own
    pub fn externally_managed() -> Self {
        let mut supervisor = Self::new(Duration::ZERO);
        supervisor.externally_managed = true;
        supervisor
    }

    /// Configure where child output goes (fluent API)
    pub fn with_output_sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = sink;
        self
    }

    /// PID of the running child, if any
    pub fn pid(&self) -> Option<u32> {
        self.handle.as_ref().map(|handle| handle.pid)
    }

    fn build_command(spec: &LaunchSpec) -> Command {
        let mut cmd = Command::new(&spec.command);
        cmd.args(&spec.args).envs(&spec.env).kill_on_drop(true);
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }
        configure_child_stdio(&mut cmd);

        #[cfg(unix)]
        cmd.process_group(0);
        #[cfg(windows)]
        cmd.creation_flags(CREATE_NEW_PROCESS_GROUP | CREATE_NO_WINDOW);

        cmd
    }
}

async fn monitor_child(
    mut child: Child,
    pid: u32,
    exit_tx: watch::Sender<Option<ExitOutcome>>,
    stop_requested: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<SupervisorEvent>,
) {
    let outcome = match child.wait().await {
        Ok(status) => ExitOutcome { code: status.code() },
        Err(e) => {
            shell_error!(Component::Supervisor, "Failed to wait for PID {}: {}", pid, e);
            ExitOutcome { code: None }
        }
    };
    exit_tx.send_replace(Some(outcome));

    if stop_requested.load(Ordering::SeqCst) {
        shell_debug!(Component::Supervisor, "PID {} exited after stop ({:?})", pid, outcome.code);
    } else {
        shell_warn!(Component::Supervisor, "⚠️ Backend PID {} exited unexpectedly ({:?})", pid, outcome.code);
        let _ = events.send(SupervisorEvent::Exited { pid, outcome });
    }
}

/// Process group id for a child started as its own group leader
///
/// `None` for ids that cannot name a single group: 0 and anything beyond
/// `i32::MAX` would reach our own group or every process we may signal.
#[cfg(unix)]
pub(crate) fn process_group_id(pid: u32) -> Option<i32> {
    match i32::try_from(pid) {
        Ok(pgid) if pgid > 0 => Some(pgid),
        _ => {
            shell_error!(Component::Supervisor, "PID {} is not a valid process group id", pid);
            None
        }
    }
}

#[cfg(unix)]
async fn signal_tree(pid: u32, force: bool) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pgid) = process_group_id(pid) else {
        return;
    };
    let signal = if force { Signal::SIGKILL } else { Signal::SIGTERM };
    match killpg(Pid::from_raw(pgid), signal) {
        Ok(()) => shell_debug!(Component::Supervisor, "Sent {:?} to process group {}", signal, pid),
        Err(nix::errno::Errno::ESRCH) => {}
        Err(e) => shell_warn!(Component::Supervisor, "Failed to send {:?} to group {}: {}", signal, pid, e),
    }
}

#[cfg(windows)]
async fn signal_tree(pid: u32, force: bool) {
    let pid_arg = pid.to_string();
    let mut cmd = Command::new("taskkill");
    cmd.args(["/PID", pid_arg.as_str(), "/T"]);
    if force {
        cmd.arg("/F");
    }
    cmd.creation_flags(CREATE_NO_WINDOW);
    match cmd.output().await {
        Ok(output) if output.status.success() => {
            shell_debug!(Component::Supervisor, "taskkill /T{} on {}", if force { " /F" } else { "" }, pid)
        }
        Ok(_) => {}
        Err(e) => shell_warn!(Component::Supervisor, "taskkill failed for {}: {}", pid, e),
    }
}

#[async_trait]
impl ProcessSupervisor for RealProcessSupervisor {
    async fn start(&mut self, spec: &LaunchSpec) -> ShellResult<ProcessInfo> {
        if self.externally_managed {
            shell_info!(Component::Supervisor, "Backend is managed externally; not spawning");
            return Ok(ProcessInfo::ExternallyManaged);
        }
        if self.handle.is_some() {
            self.stop().await;
        }

        let mut child = Self::build_command(spec).spawn().map_err(|source| ShellError::Spawn {
            command: spec.command.clone(),
            source,
        })?;
        let pid = child.id().ok_or_else(|| ShellError::Spawn {
            command: spec.command.clone(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "process exited before reporting a PID"),
        })?;
        spawn_output_consumers(&mut child, self.sink.clone());

        let (exit_tx, exit) = watch::channel(None);
        let stop_requested = Arc::new(AtomicBool::new(false));
        tokio::spawn(monitor_child(
            child,
            pid,
            exit_tx,
            stop_requested.clone(),
            self.events_tx.clone(),
        ));

        shell_info!(
            Component::Supervisor,
            "🚀 Started backend (PID: {}): {} {}",
            pid,
            spec.command,
            spec.args.join(" ")
        );
        self.handle = Some(ChildProcessHandle {
            pid,
            exit,
            stop_requested,
        });
        Ok(ProcessInfo::Spawned { pid })
    }

    async fn stop(&mut self) {
        let Some(mut handle) = self.handle.take() else {
            return;
        };
        handle.stop_requested.store(true, Ordering::SeqCst);

        if !handle.has_exited() {
            shell_info!(Component::Supervisor, "🛑 Stopping backend (PID: {})", handle.pid);
            signal_tree(handle.pid, false).await;

            if !handle.wait_exit(self.stop_grace).await {
                shell_warn!(
                    Component::Supervisor,
                    "Backend ignored termination for {:?}; killing process tree",
                    self.stop_grace
                );
                signal_tree(handle.pid, true).await;
                if !handle.wait_exit(REAP_TIMEOUT).await {
                    shell_error!(Component::Supervisor, "PID {} still not reaped", handle.pid);
                }
            }
        }

        // descendants that outlived the group leader
        #[cfg(unix)]
        signal_tree(handle.pid, true).await;

        shell_debug!(Component::Supervisor, "Backend PID {} stopped", handle.pid);
    }

    fn is_running(&mut self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.has_exited())
    }

    fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<SupervisorEvent>> {
        self.events_rx.take()
    }
}
