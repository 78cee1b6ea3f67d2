use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaiError {
    #[error("Template error: {0}")]
    Template(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No task provided")]
    EmptyTask,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Response body that is not the JSON the endpoint promises
    #[error("Invalid response body: {0}")]
    Serde(#[from] serde_json::Error),
}

impl TaiError {
    /// Process exit code reported by the CLI for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            TaiError::Config(_) | TaiError::EmptyTask | TaiError::IoError(_) => 1,
            TaiError::Parse(_) => 2,
            TaiError::Transport(_) | TaiError::Serde(_) => 3,
            TaiError::Auth(_) => 4,
            TaiError::Template(_) => 5,
            TaiError::Execution(_) => 6,
        }
    }
}

pub type Result<T> = std::result::Result<T, TaiError>;
