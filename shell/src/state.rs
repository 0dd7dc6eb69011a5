//! Bootstrap state machine vocabulary

use std::fmt;

use shared::Dependency;

/// Why bootstrap stopped and asked the user what to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    DatabaseUnreachable,
    SpawnFailed { message: String },
    BackendUnhealthy,
    /// The shell window itself could not be created; not retryable
    WindowUnavailable { message: String },
}

impl FailureReason {
    /// State a retry re-enters
    pub fn retry_state(&self) -> BootstrapState {
        match self {
            FailureReason::DatabaseUnreachable => BootstrapState::CheckingDatabase,
            FailureReason::SpawnFailed { .. }
            | FailureReason::BackendUnhealthy
            | FailureReason::WindowUnavailable { .. } => BootstrapState::StartingBackend,
        }
    }

    /// Dependency named in the decision prompt
    pub fn dependency(&self) -> Option<Dependency> {
        match self {
            FailureReason::DatabaseUnreachable => Some(Dependency::Database),
            FailureReason::SpawnFailed { .. } | FailureReason::BackendUnhealthy => Some(Dependency::Backend),
            FailureReason::WindowUnavailable { .. } => None,
        }
    }

    /// Text shown to the user at the decision point
    pub fn user_message(&self) -> String {
        match self {
            FailureReason::DatabaseUnreachable => {
                "Não foi possível conectar ao MongoDB. Verifique se o MongoDB está instalado e rodando.".to_string()
            }
            FailureReason::SpawnFailed { message } => {
                format!("Não foi possível iniciar o servidor local: {message}")
            }
            FailureReason::BackendUnhealthy => {
                "O servidor local não respondeu a tempo. Verifique se o MongoDB está instalado e rodando.".to_string()
            }
            FailureReason::WindowUnavailable { message } => {
                format!("Não foi possível abrir a janela do aplicativo: {message}")
            }
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::DatabaseUnreachable => write!(f, "database unreachable"),
            FailureReason::SpawnFailed { message } => write!(f, "backend spawn failed: {message}"),
            FailureReason::BackendUnhealthy => write!(f, "backend unhealthy"),
            FailureReason::WindowUnavailable { message } => write!(f, "window unavailable: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapState {
    CheckingDatabase,
    StartingBackend,
    WaitingBackendHealthy,
    AwaitingUserRetryDecision(FailureReason),
    Ready,
    Failed(FailureReason),
}

impl BootstrapState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BootstrapState::Ready | BootstrapState::Failed(_))
    }
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapState::CheckingDatabase => write!(f, "CheckingDatabase"),
            BootstrapState::StartingBackend => write!(f, "StartingBackend"),
            BootstrapState::WaitingBackendHealthy => write!(f, "WaitingBackendHealthy"),
            BootstrapState::AwaitingUserRetryDecision(reason) => write!(f, "AwaitingUserRetryDecision({reason})"),
            BootstrapState::Ready => write!(f, "Ready"),
            BootstrapState::Failed(reason) => write!(f, "Failed({reason})"),
        }
    }
}

/// Answer at the retry decision point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserDecision {
    Retry,
    Exit,
    /// Open the help page; does not leave the decision point
    OpenHelp,
}

/// How the shell ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellExit {
    /// Window closed or quit requested
    Normal,
    Failed(FailureReason),
}

impl ShellExit {
    pub fn code(&self) -> u8 {
        match self {
            ShellExit::Normal => 0,
            ShellExit::Failed(_) => 1,
        }
    }
}
