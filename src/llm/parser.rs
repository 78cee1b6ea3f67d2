//! Parse model output into a command and its rationale
//!
//! The model is instructed to answer with two labelled lines:
//!
//! ```text
//! Command: <shell command>
//! Why: <one-line rationale>
//! ```
//!
//! Lines are trimmed, may appear in either order, and unlabelled lines are
//! ignored. The first occurrence of each label wins. A missing `Why:` line
//! yields an empty rationale; a missing (or empty) `Command:` line is a
//! parse failure. The command text itself is opaque here.

use crate::core::error::{Result, TaiError};

pub const COMMAND_LABEL: &str = "Command:";
pub const RATIONALE_LABEL: &str = "Why:";

/// A command suggested by the model and why it fits the task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    /// Shell command, never empty
    pub command: String,
    /// Short explanation, possibly empty
    pub rationale: String,
}

impl TranslationResult {
    pub fn new(command: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            rationale: rationale.into(),
        }
    }
}

/// Tagged result of reading a model response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(TranslationResult),
    MissingCommand,
}

impl ParseOutcome {
    pub fn into_result(self) -> Result<TranslationResult> {
        match self {
            ParseOutcome::Parsed(result) => Ok(result),
            ParseOutcome::MissingCommand => Err(TaiError::Parse("missing command".into())),
        }
    }
}

/// Read the labelled lines out of a raw model response
pub fn parse_response(raw: &str) -> ParseOutcome {
    let mut command: Option<&str> = None;
    let mut rationale: Option<&str> = None;

    for line in raw.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix(COMMAND_LABEL) {
            command.get_or_insert(value.trim());
        } else if let Some(value) = line.strip_prefix(RATIONALE_LABEL) {
            rationale.get_or_insert(value.trim());
        }
    }

    match command {
        Some(cmd) if !cmd.is_empty() => ParseOutcome::Parsed(TranslationResult::new(
            cmd,
            rationale.unwrap_or_default(),
        )),
        _ => ParseOutcome::MissingCommand,
    }
}

/// `parse_response` with the missing-command case mapped to an error
pub fn parse(raw: &str) -> Result<TranslationResult> {
    parse_response(raw).into_result()
}
