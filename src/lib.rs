//! Terminal AI - natural language to shell commands

pub mod agent;
pub mod cli;
pub mod command;
pub mod core;
pub mod llm;
