/// Terminal configuration: canned text, placeholders and feature toggles.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::host::PromptKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Text and behavior switches for a narrative terminal run.
///
/// Every field has a default, so a config file only needs to list what it
/// overrides. Templates use `{label}`, `{description}` and `{name}`
/// placeholders where noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Shown when the scene has no name prompt.
    pub default_name_prompt: String,
    /// Shown when a present secret question has a blank prompt.
    pub default_secret_prompt: String,
    /// Closing line after the exit line; also the default exit beat text.
    pub closing_line: String,

    pub thread_placeholder: String,
    pub story_choice_placeholder: String,
    pub freeform_placeholder: String,
    pub name_placeholder: String,
    pub secret_placeholder: String,

    pub invalid_thread_warning: String,
    pub invalid_choice_warning: String,
    pub blank_name_warning: String,

    /// Narration after a thread is locked. `{label}`, `{description}`.
    pub thread_locked_template: String,
    /// Narration after the name is accepted. `{name}`.
    pub identity_confirmed_template: String,
    pub secret_recorded_line: String,

    /// Ask the content provider (when one is attached) before falling back
    /// to static content.
    pub use_dynamic_narrative: bool,
    /// Prefix for keys forwarded to the game-state sink, e.g. "scene1_narrative."
    pub response_key_prefix: Option<String>,
    /// Affinity granted to the thread chosen at the initial prompt.
    pub thread_lock_affinity: i32,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            default_name_prompt: "What name should the terminal record?".to_string(),
            default_secret_prompt: "Can you face what hides in the dark?".to_string(),
            closing_line: "Moving to the next part of your journey...".to_string(),
            thread_placeholder: "Choose your story thread (ex: 1 or hero)".to_string(),
            story_choice_placeholder: "Select an option (number or text)".to_string(),
            freeform_placeholder: "Enter your response".to_string(),
            name_placeholder: "Enter your name".to_string(),
            secret_placeholder: "Share your secret (number or text)".to_string(),
            invalid_thread_warning:
                "Please choose a valid thread (number or hero/shadow/ambition).".to_string(),
            invalid_choice_warning:
                "That option is unavailable. Try the listed number or text.".to_string(),
            blank_name_warning: "Please provide a name for the archives.".to_string(),
            thread_locked_template: "You lean toward the {label} path: {description}".to_string(),
            identity_confirmed_template: "Identity confirmed: {name}.".to_string(),
            secret_recorded_line: "A fragment has been secured in the archive.".to_string(),
            use_dynamic_narrative: false,
            response_key_prefix: None,
            thread_lock_affinity: 1,
        }
    }
}

impl TerminalConfig {
    /// Load a config from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<TerminalConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<TerminalConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }

    /// The key under which a scene response is forwarded to the game state.
    pub fn sink_key(&self, key: &str) -> String {
        match &self.response_key_prefix {
            Some(prefix) => format!("{}{}", prefix, key),
            None => key.to_string(),
        }
    }

    /// Input-field placeholder for a prompt kind.
    pub fn placeholder_for(&self, kind: PromptKind) -> &str {
        match kind {
            PromptKind::InitialChoice => &self.thread_placeholder,
            PromptKind::StoryChoice => &self.story_choice_placeholder,
            PromptKind::Freeform => &self.freeform_placeholder,
            PromptKind::PlayerName => &self.name_placeholder,
            PromptKind::Secret => &self.secret_placeholder,
            PromptKind::None => "",
        }
    }

    pub fn thread_locked_line(&self, label: &str, description: &str) -> String {
        self.thread_locked_template
            .replace("{label}", label)
            .replace("{description}", description)
    }

    pub fn identity_confirmed_line(&self, name: &str) -> String {
        self.identity_confirmed_template.replace("{name}", name)
    }
}
