//! Command execution pipeline
//!
//! TranslationResult -> ExecutionMode gate (Confirmer) -> Launcher -> ExecutionOutcome

pub mod confirm;
pub mod executor;
pub mod hazard;

pub use confirm::{Confirmer, PromptConfirmer, ScriptedConfirmer};
pub use executor::{CommandRunner, ExecutionMode, ExecutionOutcome, Launcher, ShellLauncher};
pub use hazard::{assess, Hazard};
