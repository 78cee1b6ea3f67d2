//! Terminal AI - Entry Point
//!
//! Translates the task given on the command line into a shell command,
//! prints it with its rationale, and runs it according to the chosen mode.

use clap::Parser;
use terminal_ai::agent::TranslateAgent;
use terminal_ai::cli::{self, Args};
use terminal_ai::command::{CommandRunner, PromptConfirmer, ShellLauncher};
use terminal_ai::core::error::Result;
use terminal_ai::core::task::Task;
use terminal_ai::llm::client::LlmClient;
use terminal_ai::llm::prompt::PromptBuilder;

use std::io;

fn main() {
    let args = Args::parse();
    cli::init_logging(args.verbose);

    let code = match run(&args) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!("Invocation failed: {:?}", e);
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run(args: &Args) -> Result<i32> {
    let config = args.resolve_config(|key| std::env::var(key).ok())?;
    let mode = args.mode();

    let task = if args.task.iter().all(|word| word.trim().is_empty()) {
        cli::read_task(&mut io::stdin().lock(), &mut io::stderr())?
    } else {
        Task::from_words(args.task.as_slice())?
    };

    let client = LlmClient::from_config(&config)?;
    let agent = TranslateAgent::new(PromptBuilder::from_config(&config), client);
    let mut runner = CommandRunner::new(
        ShellLauncher::new(config.shell.clone(), config.cwd.clone()),
        PromptConfirmer::stdio(),
    );

    tracing::info!("Translating task in {:?} mode with {}", mode, config.model);
    let outcome = cli::execute(
        &agent,
        &mut runner,
        &task,
        mode,
        &mut io::stdout(),
        &mut io::stderr(),
    )?;

    Ok(outcome.process_exit_code())
}
