//! Build the instruction prompt sent to the model
//!
//! The template is either the embedded default or an override file found in
//! the configured prompt directory. A missing or unreadable override is not
//! an error: the embedded template is used instead. The template must carry
//! a `{task}` placeholder; `{shell}` and `{cwd}` are optional.

use crate::core::config::Config;
use crate::core::error::{Result, TaiError};
use crate::core::task::Task;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

pub const TASK_PLACEHOLDER: &str = "{task}";

/// Embedded template; its output contract matches `llm::parser`
pub const EMBEDDED_TEMPLATE: &str = r#"You are TerminalAI, an expert macOS and Linux shell assistant.
Convert the user's request into a single shell command that can be run from an
interactive terminal session.

Constraints:
- Assume the shell is {shell}.
- Assume the current working directory is {cwd}.
- Prefer concise commands built from standard tooling that is already installed.
- Never permanently delete data, reformat disks, or escalate privileges unless
  the request explicitly asks for it.
- Keep the explanation to a single line under 160 characters.

Answer with exactly these two lines and nothing else (no markdown, no code fences):
Command: <the shell command>
Why: <one-line explanation of what the command does>

Example:
Command: lsof -i :3000 | awk 'NR>1 { print $2 }' | xargs kill -9
Why: Terminate processes listening on port 3000

Request: {task}
"#;

/// Where the template text came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Embedded,
    Override(PathBuf),
}

/// Template text plus its origin
#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    pub text: Cow<'static, str>,
    pub source: TemplateSource,
}

/// Assembles prompts from a template and a task
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    prompt_dir: Option<PathBuf>,
    template_name: String,
    shell: String,
    cwd: String,
}

impl PromptBuilder {
    pub fn new(prompt_dir: Option<PathBuf>, template_name: impl Into<String>) -> Self {
        Self {
            prompt_dir,
            template_name: template_name.into(),
            shell: crate::core::config::DEFAULT_SHELL.into(),
            cwd: "~".into(),
        }
    }

    /// Builder wired from the invocation config
    pub fn from_config(config: &Config) -> Self {
        let cwd = config
            .cwd
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~".into());

        Self::new(config.prompt_dir.clone(), config.template_name.clone())
            .with_shell(config.shell.clone())
            .with_cwd(cwd)
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Path of the override file, if a prompt directory is configured
    pub fn override_path(&self) -> Option<PathBuf> {
        self.prompt_dir
            .as_deref()
            .map(|dir| dir.join(&self.template_name))
    }

    /// Load the override template, falling back to the embedded one
    pub fn load_template(&self) -> LoadedTemplate {
        if let Some(path) = self.override_path() {
            match read_override(&path) {
                Ok(text) => {
                    tracing::debug!("Using prompt template {}", path.display());
                    return LoadedTemplate {
                        text: Cow::Owned(text),
                        source: TemplateSource::Override(path),
                    };
                }
                Err(e) => {
                    tracing::debug!(
                        "Prompt override {} unavailable ({}), using embedded template",
                        path.display(),
                        e
                    );
                }
            }
        }
        LoadedTemplate {
            text: Cow::Borrowed(EMBEDDED_TEMPLATE),
            source: TemplateSource::Embedded,
        }
    }

    /// Render the prompt for `task`
    pub fn build(&self, task: &Task) -> Result<String> {
        let template = self.load_template();
        if !template.text.contains(TASK_PLACEHOLDER) {
            let origin = match &template.source {
                TemplateSource::Embedded => "embedded template".to_string(),
                TemplateSource::Override(path) => path.display().to_string(),
            };
            return Err(TaiError::Template(format!(
                "{} has no {} placeholder",
                origin, TASK_PLACEHOLDER
            )));
        }

        Ok(render(
            &template.text,
            &[
                ("task", task.as_str()),
                ("shell", self.shell.as_str()),
                ("cwd", self.cwd.as_str()),
            ],
        ))
    }
}

fn read_override(path: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(path)
}

/// Single-pass `{name}` substitution
///
/// Substituted values are never rescanned, and braces that do not name a
/// known variable are copied through untouched.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
