//! Command line and environment configuration
//!
//! [`ShellArgs`] is what the user (or the installer's shortcut) passes in;
//! [`BootstrapConfig`] is the validated, immutable result every component reads.

use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use bridge::ContentSource;
use crate::error::{ShellError, ShellResult};
use crate::types::{LaunchSpec, ProbeTarget};

pub const DEFAULT_DB_NAME: &str = "sge_database";
pub const DEFAULT_JWT_SECRET: &str = "sge-desktop-secret-key-2024";
pub const DEFAULT_HELP_URL: &str = "https://www.mongodb.com/try/download/community";

#[cfg(windows)]
const DEFAULT_BACKEND_COMMAND: &str = "python";
#[cfg(not(windows))]
const DEFAULT_BACKEND_COMMAND: &str = "python3";

/// SGE desktop shell: starts the local backend and opens the application window
#[derive(Parser, Debug, Clone)]
#[command(name = "sge-desktop")]
#[command(about = "Starts the SGE backend, waits for it to be healthy and opens the application window")]
pub struct ShellArgs {
    /// Development mode: backend and UI dev server are run separately
    #[arg(long, env = "SGE_DEV")]
    pub dev: bool,

    /// Backend HTTP port
    #[arg(long, env = "SGE_BACKEND_PORT", default_value_t = 8001)]
    pub backend_port: u16,

    /// UI development server port (dev mode only)
    #[arg(long, env = "SGE_FRONTEND_PORT", default_value_t = 3000)]
    pub frontend_port: u16,

    /// Database host
    #[arg(long, env = "SGE_DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "SGE_DB_PORT", default_value_t = 27017)]
    pub db_port: u16,

    /// Backend health endpoint
    #[arg(long, env = "SGE_HEALTH_PATH", default_value = "/api/health")]
    pub health_path: String,

    /// Health polls before giving up on the backend
    #[arg(long, default_value_t = 30)]
    pub max_health_attempts: u32,

    /// Pause between backend health polls
    #[arg(long, default_value_t = 1000)]
    pub health_poll_interval_ms: u64,

    /// Timeout of a single backend health request
    #[arg(long, default_value_t = 2000)]
    pub health_timeout_ms: u64,

    /// Timeout of the database reachability check
    #[arg(long, default_value_t = 3000)]
    pub db_check_timeout_ms: u64,

    /// Skip the database check before starting the backend
    #[arg(long, env = "SGE_SKIP_DB_CHECK")]
    pub skip_db_check: bool,

    /// Interval of the status re-poll once the window is open
    #[arg(long, default_value_t = 30_000)]
    pub passive_poll_interval_ms: u64,

    /// Minimum time the splash screen stays up
    #[arg(long, default_value_t = 1500)]
    pub splash_min_ms: u64,

    /// Time the backend gets to exit after a termination request
    #[arg(long, default_value_t = 5000)]
    pub stop_grace_ms: u64,

    /// Port of the local window server
    #[arg(long, env = "SGE_SHELL_PORT", default_value_t = 8765)]
    pub shell_port: u16,

    /// Directory holding `backend/` and `build/` (defaults to the executable's directory)
    #[arg(long, env = "SGE_RESOURCES")]
    pub resources: Option<PathBuf>,

    /// Interpreter used to run the backend
    #[arg(long, env = "SGE_BACKEND_COMMAND", default_value = DEFAULT_BACKEND_COMMAND)]
    pub backend_command: String,

    /// Page offered by the "help" action when bootstrap fails
    #[arg(long, default_value = DEFAULT_HELP_URL)]
    pub help_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Immutable bootstrap configuration, built once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub dev_mode: bool,
    pub verify_database: bool,
    pub backend_host: String,
    pub backend_port: u16,
    pub frontend_port: u16,
    pub db_host: String,
    pub db_port: u16,
    pub health_path: String,
    /// Environment added to the backend process
    pub env_overrides: BTreeMap<String, String>,
    pub max_health_attempts: u32,
    pub health_poll_interval: Duration,
    pub health_timeout: Duration,
    pub db_check_timeout: Duration,
    pub passive_poll_interval: Duration,
    pub splash_min_display: Duration,
    pub stop_grace: Duration,
    pub shell_port: u16,
    pub resources_dir: PathBuf,
    pub backend_command: String,
    pub help_url: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            verify_database: true,
            backend_host: "localhost".to_string(),
            backend_port: 8001,
            frontend_port: 3000,
            db_host: "localhost".to_string(),
            db_port: 27017,
            health_path: "/api/health".to_string(),
            env_overrides: backend_env("localhost", 27017, |_| None),
            max_health_attempts: 30,
            health_poll_interval: Duration::from_millis(1000),
            health_timeout: Duration::from_millis(2000),
            db_check_timeout: Duration::from_millis(3000),
            passive_poll_interval: Duration::from_millis(30_000),
            splash_min_display: Duration::from_millis(1500),
            stop_grace: Duration::from_millis(5000),
            shell_port: 8765,
            resources_dir: PathBuf::from("."),
            backend_command: DEFAULT_BACKEND_COMMAND.to_string(),
            help_url: DEFAULT_HELP_URL.to_string(),
        }
    }
}

/// Backend environment with host-environment overrides applied
pub fn backend_env<F>(db_host: &str, db_port: u16, lookup: F) -> BTreeMap<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = [
        ("MONGO_URL", format!("mongodb://{db_host}:{db_port}")),
        ("DB_NAME", DEFAULT_DB_NAME.to_string()),
        ("JWT_SECRET_KEY", DEFAULT_JWT_SECRET.to_string()),
        ("CORS_ORIGINS", "*".to_string()),
    ];

    defaults
        .into_iter()
        .map(|(key, default)| {
            let value = lookup(key).filter(|v| !v.is_empty()).unwrap_or(default);
            (key.to_string(), value)
        })
        .collect()
}

impl BootstrapConfig {
    /// Build from parsed arguments and the host environment
    pub fn from_args(args: &ShellArgs) -> ShellResult<Self> {
        let legacy_dev = std::env::var("ELECTRON_DEV").map(|v| v == "true").unwrap_or(false);
        let resources_dir = match &args.resources {
            Some(dir) => dir.clone(),
            None => default_resources_dir()?,
        };

        let config = Self {
            dev_mode: args.dev || legacy_dev,
            verify_database: !args.skip_db_check,
            backend_host: "localhost".to_string(),
            backend_port: args.backend_port,
            frontend_port: args.frontend_port,
            db_host: args.db_host.clone(),
            db_port: args.db_port,
            health_path: args.health_path.clone(),
            env_overrides: backend_env(&args.db_host, args.db_port, |key| std::env::var(key).ok()),
            max_health_attempts: args.max_health_attempts,
            health_poll_interval: Duration::from_millis(args.health_poll_interval_ms),
            health_timeout: Duration::from_millis(args.health_timeout_ms),
            db_check_timeout: Duration::from_millis(args.db_check_timeout_ms),
            passive_poll_interval: Duration::from_millis(args.passive_poll_interval_ms),
            splash_min_display: Duration::from_millis(args.splash_min_ms),
            stop_grace: Duration::from_millis(args.stop_grace_ms),
            shell_port: args.shell_port,
            resources_dir,
            backend_command: args.backend_command.clone(),
            help_url: args.help_url.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ShellResult<()> {
        for (field, port) in [
            ("backend_port", self.backend_port),
            ("frontend_port", self.frontend_port),
            ("db_port", self.db_port),
        ] {
            if port == 0 {
                return Err(ShellError::config(field, "port must be non-zero"));
            }
        }
        if self.max_health_attempts == 0 {
            return Err(ShellError::config("max_health_attempts", "must be at least 1"));
        }
        if !self.health_path.starts_with('/') {
            return Err(ShellError::config("health_path", "must start with '/'"));
        }
        for (field, duration) in [
            ("health_timeout", self.health_timeout),
            ("db_check_timeout", self.db_check_timeout),
            ("passive_poll_interval", self.passive_poll_interval),
        ] {
            if duration.is_zero() {
                return Err(ShellError::config(field, "must be greater than zero"));
            }
        }
        if self.backend_command.trim().is_empty() {
            return Err(ShellError::config("backend_command", "must not be empty"));
        }
        Ok(())
    }

    /// Fluent setter for development mode
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// Fluent setter for the database check
    pub fn with_database_check(mut self, verify: bool) -> Self {
        self.verify_database = verify;
        self
    }

    /// Fluent setter for the backend health budget
    pub fn with_health_budget(mut self, attempts: u32, interval: Duration, timeout: Duration) -> Self {
        self.max_health_attempts = attempts;
        self.health_poll_interval = interval;
        self.health_timeout = timeout;
        self
    }

    pub fn backend_target(&self) -> ProbeTarget {
        ProbeTarget::http(
            self.backend_host.clone(),
            self.backend_port,
            self.health_path.clone(),
            self.health_timeout,
        )
    }

    pub fn database_target(&self) -> ProbeTarget {
        ProbeTarget::tcp(self.db_host.clone(), self.db_port, self.db_check_timeout)
    }

    /// `<python> -m uvicorn server:app` inside the bundled backend directory
    pub fn launch_spec(&self) -> LaunchSpec {
        LaunchSpec {
            command: self.backend_command.clone(),
            args: vec![
                "-m".to_string(),
                "uvicorn".to_string(),
                "server:app".to_string(),
                "--host".to_string(),
                "0.0.0.0".to_string(),
                "--port".to_string(),
                self.backend_port.to_string(),
            ],
            cwd: Some(self.resources_dir.join("backend")),
            env: self.env_overrides.clone(),
        }
    }

    /// Dev server in development mode, the bundled UI otherwise
    pub fn content_source(&self) -> ShellResult<ContentSource> {
        let source = if self.dev_mode {
            ContentSource::dev_server(self.frontend_port)?
        } else {
            ContentSource::static_bundle(self.resources_dir.join("build"))?
        };
        Ok(source)
    }

    /// Upper bound of the backend health wait: attempts x (timeout + interval)
    pub fn max_health_wait(&self) -> Duration {
        (self.health_timeout + self.health_poll_interval) * self.max_health_attempts
    }
}

fn default_resources_dir() -> ShellResult<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map(|dir| dir.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}
