//! The user's natural-language task

use crate::core::error::{Result, TaiError};
use std::fmt;

/// A natural-language description of an intended shell action
///
/// Always non-empty after trimming; surrounding whitespace is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task(String);

impl Task {
    pub fn new(input: impl AsRef<str>) -> Result<Self> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TaiError::EmptyTask);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Build a task from CLI words joined by single spaces
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Result<Self> {
        let joined = words
            .iter()
            .map(|w| w.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        Self::new(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_is_trimmed() {
        let task = Task::new("  list files \n").unwrap();
        assert_eq!(task.as_str(), "list files");
    }

    #[test]
    fn test_blank_task_rejected() {
        assert!(matches!(Task::new("   \t"), Err(TaiError::EmptyTask)));
        assert!(matches!(Task::new(""), Err(TaiError::EmptyTask)));
    }

    #[test]
    fn test_from_words() {
        let task = Task::from_words(&["kill", "anything", "on", "port", "3000"]).unwrap();
        assert_eq!(task.to_string(), "kill anything on port 3000");

        let empty: [&str; 0] = [];
        assert!(Task::from_words(&empty).is_err());
    }
}
