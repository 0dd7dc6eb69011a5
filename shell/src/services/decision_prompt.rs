//! Terminal decision prompt and the system help opener

use async_trait::async_trait;

use shared::{console, shell_warn, Component};
use crate::error::{ShellError, ShellResult};
use crate::state::{FailureReason, UserDecision};
use crate::traits::{DecisionPrompt, HelpOpener};

/// Map a typed answer to a decision; `None` for anything unrecognised
pub fn parse_decision(answer: &str) -> Option<UserDecision> {
    match answer.trim().to_lowercase().as_str() {
        "r" | "t" | "tentar" | "retry" => Some(UserDecision::Retry),
        "s" | "sair" | "exit" | "q" => Some(UserDecision::Exit),
        "a" | "ajuda" | "help" | "?" => Some(UserDecision::OpenHelp),
        _ => None,
    }
}

/// Asks on the terminal until a recognised answer arrives
///
/// A closed stdin counts as Exit so the shell never loops on a dead console.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalDecisionPrompt;

#[async_trait]
impl DecisionPrompt for TerminalDecisionPrompt {
    async fn decide(&self, reason: &FailureReason) -> UserDecision {
        let dependency = reason
            .dependency()
            .map(|d| format!(" ({d})"))
            .unwrap_or_default();
        let mut question = format!(
            "\n⚠️  {}{}\n[r] Tentar novamente  [s] Sair  [a] Ajuda: ",
            reason.user_message(),
            dependency
        );

        loop {
            match console::ask(question.clone()).await {
                Ok(answer) => match parse_decision(&answer) {
                    Some(decision) => return decision,
                    None => question = "Escolha r, s ou a: ".to_string(),
                },
                Err(e) => {
                    shell_warn!(Component::Orchestrator, "Decision prompt unavailable ({}); exiting", e);
                    return UserDecision::Exit;
                }
            }
        }
    }
}

/// Opens URLs with the platform's default handler
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHelpOpener;

#[cfg(target_os = "macos")]
fn open_command(url: &str) -> std::process::Command {
    let mut cmd = std::process::Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(windows)]
fn open_command(url: &str) -> std::process::Command {
    let mut cmd = std::process::Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    cmd
}

#[cfg(all(unix, not(target_os = "macos")))]
fn open_command(url: &str) -> std::process::Command {
    let mut cmd = std::process::Command::new("xdg-open");
    cmd.arg(url);
    cmd
}

impl HelpOpener for SystemHelpOpener {
    fn open(&self, url: &str) -> ShellResult<()> {
        open_command(url)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|e| ShellError::HelpOpen {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}
