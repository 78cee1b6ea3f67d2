//! Advisory detection of destructive commands
//!
//! A match only produces a warning for the operator. It never blocks a
//! command or changes the execution mode.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A destructive pattern found in a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hazard {
    /// What the matched pattern does
    pub description: &'static str,
    /// The command text that matched
    pub matched: String,
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command looks destructive ({}: `{}`)", self.description, self.matched)
    }
}

const PATTERNS: &[(&str, &str)] = &[
    (r"\brm\s+-[a-zA-Z]*(rf|fr|Rf|fR)[a-zA-Z]*\b", "recursive forced delete"),
    (r"\bmkfs(\.[a-z0-9]+)?\b", "filesystem format"),
    (r"(?i)\bdd\s+if=", "raw disk copy"),
    (r"\bshutdown\b", "system shutdown"),
    (r"\breboot\b", "system reboot"),
    (r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:", "fork bomb"),
    (r">\s*/dev/(sd[a-z]|hd[a-z]|nvme\d|disk\d|mmcblk\d)", "write to block device"),
];

fn compiled() -> &'static [(Regex, &'static str)] {
    static COMPILED: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        PATTERNS
            .iter()
            .filter_map(|(pattern, description)| {
                Regex::new(pattern).ok().map(|re| (re, *description))
            })
            .collect()
    })
}

/// First destructive pattern found in `command`, if any
pub fn assess(command: &str) -> Option<Hazard> {
    compiled().iter().find_map(|(re, description)| {
        re.find(command).map(|m| Hazard {
            description: *description,
            matched: m.as_str().to_string(),
        })
    })
}
