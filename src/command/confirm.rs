//! Yes/no confirmation before a command runs

use crate::command::hazard::Hazard;
use crate::core::error::Result;
use crate::llm::parser::TranslationResult;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Asks the operator whether a command should run
pub trait Confirmer {
    fn confirm(&mut self, result: &TranslationResult, hazard: Option<&Hazard>) -> Result<bool>;
}

impl<T: Confirmer + ?Sized> Confirmer for &mut T {
    fn confirm(&mut self, result: &TranslationResult, hazard: Option<&Hazard>) -> Result<bool> {
        (**self).confirm(result, hazard)
    }
}

/// Line-oriented prompt: `y` or `yes` runs, anything else (or EOF) declines
pub struct PromptConfirmer<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirmer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptConfirmer<io::StdinLock<'static>, io::Stderr> {
    /// Read answers from stdin, write prompts to stderr
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Confirmer for PromptConfirmer<R, W> {
    fn confirm(&mut self, result: &TranslationResult, hazard: Option<&Hazard>) -> Result<bool> {
        if let Some(hazard) = hazard {
            writeln!(self.output, "Warning: {}", hazard)?;
        }
        if result.rationale.is_empty() {
            write!(self.output, "Execute `{}`? [y/N]: ", result.command)?;
        } else {
            write!(
                self.output,
                "Execute `{}` ({})? [y/N]: ",
                result.command, result.rationale
            )?;
        }
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            writeln!(self.output)?;
            return Ok(false);
        }
        Ok(is_affirmative(&answer))
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Answers from a fixed script, then declines once the script runs out
///
/// Used for non-interactive runs and tests. Records every command it was
/// asked about.
#[derive(Debug, Default)]
pub struct ScriptedConfirmer {
    answers: VecDeque<bool>,
    asked: Vec<String>,
    hazards_seen: usize,
}

impl ScriptedConfirmer {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: Vec::new(),
            hazards_seen: 0,
        }
    }

    /// Commands presented so far, in order
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn hazards_seen(&self) -> usize {
        self.hazards_seen
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&mut self, result: &TranslationResult, hazard: Option<&Hazard>) -> Result<bool> {
        self.asked.push(result.command.clone());
        if hazard.is_some() {
            self.hazards_seen += 1;
        }
        Ok(self.answers.pop_front().unwrap_or(false))
    }
}
