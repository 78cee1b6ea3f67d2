pub mod config;
pub mod error;
pub mod task;

pub use config::Config;
pub use error::{Result, TaiError};
pub use task::Task;
