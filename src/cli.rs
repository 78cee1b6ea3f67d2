//! Command-line frontend
//!
//! Argument parsing, config layering, logging setup and the
//! translate -> display -> run sequence used by the `tai` binary.

use crate::agent::TranslateAgent;
use crate::command::confirm::Confirmer;
use crate::command::executor::{CommandRunner, ExecutionMode, ExecutionOutcome, Launcher};
use crate::command::hazard;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::task::Task;
use crate::llm::client::ModelClient;
use crate::llm::parser::TranslationResult;
use clap::{ArgAction, Parser};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Terminal AI - natural language to shell commands
#[derive(Parser, Debug)]
#[command(name = "tai", version)]
#[command(about = "Translate a task into a shell command, explain it, and run it on confirmation")]
pub struct Args {
    /// Natural language description of the task (read from stdin when omitted)
    pub task: Vec<String>,

    /// Run the command without asking
    #[arg(long)]
    pub accept: bool,

    /// Print the command without running it
    #[arg(long, visible_alias = "dry-run", conflicts_with = "accept")]
    pub no_exec: bool,

    /// Model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// API key (overrides TERMINAL_AI_API_KEY / OPENAI_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model API base URL, e.g. https://api.openai.com/v1
    #[arg(long)]
    pub base_url: Option<String>,

    /// Directory holding prompt template overrides
    #[arg(long)]
    pub prompt_dir: Option<PathBuf>,

    /// Template file name inside the prompt directory
    #[arg(long)]
    pub prompt: Option<String>,

    /// Shell used to run the command
    #[arg(long)]
    pub shell: Option<String>,

    /// Working directory for the command
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Model request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Config file (default: <config_dir>/terminal-ai/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn mode(&self) -> ExecutionMode {
        ExecutionMode::from_flags(self.accept, self.no_exec)
    }

    /// Config file, then environment, then flags
    pub fn resolve_config<F>(&self, env: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Config::load(self.config.as_deref())?;
        self.apply_to(base, env)
    }

    /// Layer environment and flags over `base`, then validate
    pub fn apply_to<F>(&self, mut config: Config, env: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        config.apply_env(env);

        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(key) = &self.api_key {
            config.api_key = Some(key.clone());
        }
        if let Some(url) = &self.base_url {
            config.api_url = url.clone();
        }
        if let Some(dir) = &self.prompt_dir {
            config.prompt_dir = Some(dir.clone());
        }
        if let Some(name) = &self.prompt {
            config.template_name = name.clone();
        }
        if let Some(shell) = &self.shell {
            config.shell = shell.clone();
        }
        if let Some(cwd) = &self.cwd {
            config.cwd = Some(cwd.clone());
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Initialise tracing on stderr; `RUST_LOG` overrides the verbosity flag
pub fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "terminal_ai=warn",
        1 => "terminal_ai=info",
        _ => "terminal_ai=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Prompt for a task on `output` and read one line from `input`
pub fn read_task<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Task> {
    write!(output, "Describe the task> ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Task::new(line)
}

/// Render a translation the way it is shown to the operator
pub fn render(result: &TranslationResult) -> String {
    if result.rationale.is_empty() {
        format!("Command: {}", result.command)
    } else {
        format!("Command: {}\nWhy: {}", result.command, result.rationale)
    }
}

/// Translate `task`, show the result, and apply `mode`
///
/// The command and rationale go to `out`; advisory warnings go to `err`.
pub fn execute<C, L, K>(
    agent: &TranslateAgent<C>,
    runner: &mut CommandRunner<L, K>,
    task: &Task,
    mode: ExecutionMode,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<ExecutionOutcome>
where
    C: ModelClient,
    L: Launcher,
    K: Confirmer,
{
    let result = agent.translate(task)?;
    writeln!(out, "{}", render(&result))?;
    out.flush()?;

    // Confirm mode shows the warning in its own prompt
    if mode != ExecutionMode::Confirm {
        if let Some(hazard) = hazard::assess(&result.command) {
            writeln!(err, "Warning: {}", hazard)?;
        }
    }

    let outcome = runner.run(&result, mode)?;
    if outcome == ExecutionOutcome::Declined {
        writeln!(out, "Aborted.")?;
    }
    Ok(outcome)
}
