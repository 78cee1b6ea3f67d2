//! Command execution - runs a translated command under an execution mode
//!
//! Preview never launches anything. Confirm asks the [`Confirmer`] first and
//! only launches on a yes. Accept launches straight away. The shell is the
//! only side effect and it is reached only after the mode gate passes.

use crate::command::confirm::Confirmer;
use crate::command::hazard;
use crate::core::error::{Result, TaiError};
use crate::llm::parser::TranslationResult;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

/// How a translated command is handled, fixed for the whole invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Show the command, never run it
    Preview,
    /// Ask before running
    #[default]
    Confirm,
    /// Run without asking
    Accept,
}

impl ExecutionMode {
    /// Map CLI flags to a mode; `no_exec` wins over `accept`
    pub fn from_flags(accept: bool, no_exec: bool) -> Self {
        match (accept, no_exec) {
            (_, true) => ExecutionMode::Preview,
            (true, false) => ExecutionMode::Accept,
            (false, false) => ExecutionMode::Confirm,
        }
    }
}

/// What happened to the command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Shown only
    Previewed,
    /// The operator said no
    Declined,
    /// The shell ran and exited with this status
    Completed { exit_code: i32 },
}

impl ExecutionOutcome {
    pub fn executed(&self) -> bool {
        matches!(self, ExecutionOutcome::Completed { .. })
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecutionOutcome::Completed { exit_code } => Some(*exit_code),
            _ => None,
        }
    }

    /// Exit code the CLI should report for this outcome
    pub fn process_exit_code(&self) -> i32 {
        self.exit_code().unwrap_or(0)
    }
}

/// Starts a command and waits for it
pub trait Launcher {
    fn launch(&mut self, command: &str) -> Result<i32>;
}

impl<T: Launcher + ?Sized> Launcher for &mut T {
    fn launch(&mut self, command: &str) -> Result<i32> {
        (**self).launch(command)
    }
}

/// Runs commands as `<shell> -c <command>` with inherited stdio
#[derive(Debug, Clone)]
pub struct ShellLauncher {
    shell: String,
    cwd: Option<PathBuf>,
}

impl ShellLauncher {
    pub fn new(shell: impl Into<String>, cwd: Option<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
            cwd,
        }
    }
}

impl Launcher for ShellLauncher {
    fn launch(&mut self, command: &str) -> Result<i32> {
        let mut process = Command::new(&self.shell);
        process.arg("-c").arg(command);
        if let Some(cwd) = &self.cwd {
            process.current_dir(cwd);
        }

        tracing::info!("Executing with {}: {}", self.shell, command);
        let status = process
            .status()
            .map_err(|e| TaiError::Execution(format!("failed to launch {}: {}", self.shell, e)))?;

        let code = status_code(status);
        tracing::debug!("Command exited with {}", code);
        Ok(code)
    }
}

/// Exit status as a shell would report it (`128 + signal` when killed)
fn status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Applies an execution mode to a translated command
pub struct CommandRunner<L, C> {
    launcher: L,
    confirmer: C,
}

impl<L: Launcher, C: Confirmer> CommandRunner<L, C> {
    pub fn new(launcher: L, confirmer: C) -> Self {
        Self {
            launcher,
            confirmer,
        }
    }

    pub fn run(
        &mut self,
        result: &TranslationResult,
        mode: ExecutionMode,
    ) -> Result<ExecutionOutcome> {
        let hazard = hazard::assess(&result.command);

        match mode {
            ExecutionMode::Preview => return Ok(ExecutionOutcome::Previewed),
            ExecutionMode::Confirm => {
                if !self.confirmer.confirm(result, hazard.as_ref())? {
                    tracing::info!("Command declined");
                    return Ok(ExecutionOutcome::Declined);
                }
            }
            ExecutionMode::Accept => {
                if let Some(hazard) = &hazard {
                    tracing::info!("Running without confirmation: {}", hazard);
                }
            }
        }

        let exit_code = self.launcher.launch(&result.command)?;
        Ok(ExecutionOutcome::Completed { exit_code })
    }
}
