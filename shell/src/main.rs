//! Main entry point for the SGE desktop shell

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

use bridge::{AppInfo, HostBridge, HostWindow, TerminalSaveDialog};
use shared::{logging, shell_info, Component};
use shell::services::{
    HealthMonitor, NetworkProber, RealProcessSupervisor, SystemHelpOpener, TerminalDecisionPrompt,
};
use shell::{BootstrapConfig, BootstrapOrchestrator, ShellArgs, ShellExit};

fn main() {
    dotenv::dotenv().ok();
    let args = ShellArgs::parse();
    logging::init_tracing_with_level(Some(&args.log_level));

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            logging::log_error(Component::Orchestrator, "Runtime setup", &e);
            std::process::exit(1);
        }
    };

    let code = match runtime.block_on(run(args)) {
        Ok(exit) => exit.code(),
        Err(e) => {
            logging::log_error(Component::Orchestrator, "Startup", &e);
            1
        }
    };

    // a pending console prompt must not keep the process alive
    runtime.shutdown_background();
    std::process::exit(i32::from(code));
}

async fn run(args: ShellArgs) -> anyhow::Result<ShellExit> {
    let config = BootstrapConfig::from_args(&args)?;
    logging::log_startup(
        Component::Orchestrator,
        if config.dev_mode { "desktop shell (development)" } else { "desktop shell" },
    );

    let health = Arc::new(HealthMonitor::new(
        NetworkProber::new()?,
        config.backend_target(),
        config.database_target(),
    ));

    let app_info = AppInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        name: "SGE Desktop".to_string(),
        dev_mode: config.dev_mode,
    };
    let host_bridge = HostBridge::new(app_info, health.clone(), TerminalSaveDialog::default());
    let bind_addr = SocketAddr::from(([127, 0, 0, 1], config.shell_port));
    let window = HostWindow::new(bind_addr, config.content_source()?, host_bridge);

    let supervisor = if config.dev_mode {
        RealProcessSupervisor::externally_managed()
    } else {
        RealProcessSupervisor::new(config.stop_grace)
    };

    let mut orchestrator = BootstrapOrchestrator::new(
        config,
        health,
        supervisor,
        window,
        TerminalDecisionPrompt,
        SystemHelpOpener,
    );

    // Set up graceful shutdown
    let shutdown_sender = orchestrator.get_shutdown_sender();
    tokio::spawn(async move {
        wait_for_termination().await;
        logging::log_shutdown(Component::Orchestrator, "Received termination signal");
        let _ = shutdown_sender.send(()).await;
    });

    let exit = orchestrator.run().await;
    shell_info!(Component::Orchestrator, "Exiting with code {}", exit.code());
    Ok(exit)
}

#[cfg(unix)]
async fn wait_for_termination() {
    use signal::unix::{signal as unix_signal, SignalKind};

    match unix_signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = signal::ctrl_c() => {},
                _ = sigterm.recv() => {},
            }
        }
        Err(e) => {
            logging::log_error(Component::Orchestrator, "Signal handling", &e);
            let _ = signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() {
    if let Err(e) = signal::ctrl_c().await {
        logging::log_error(Component::Orchestrator, "Signal handling", &e);
        std::future::pending::<()>().await;
    }
}
