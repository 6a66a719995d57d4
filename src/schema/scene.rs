use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::thread::Thread;

/// Scene-type discriminator used when content does not declare one.
pub const DEFAULT_SCENE_TYPE: &str = "narrative_terminal";

/// A single selectable option, used both for the initial thread choice and
/// for story-block choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChoiceOption {
    /// Stable key. May be empty, in which case the option cannot be picked by id.
    pub id: String,
    pub text: Option<String>,
    pub label: Option<String>,
    pub description: String,
    /// Index of the story block to jump to when selected. Not range-checked here.
    pub next_block: i32,
    /// Only meaningful for initial-choice options; derived from `id`.
    pub thread: Thread,
    /// Alignment deltas keyed by persona key ("hero", "light", "shadow", ...).
    pub scores: Option<FxHashMap<String, i32>>,
}

impl ChoiceOption {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_next_block(mut self, next_block: i32) -> Self {
        self.next_block = next_block;
        self
    }

    pub fn with_score(mut self, persona: impl Into<String>, points: i32) -> Self {
        self.scores
            .get_or_insert_with(FxHashMap::default)
            .insert(persona.into(), points);
        self
    }

    /// Display label. Fallback order: `label`, then `text`, then empty.
    pub fn label(&self) -> &str {
        self.label
            .as_deref()
            .or(self.text.as_deref())
            .unwrap_or_default()
    }

    /// The option text, or empty when absent. Story-choice text matching
    /// compares against this.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// How a story block hands control back after its paragraphs are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockGate {
    /// No question: fall through to the next block.
    PassThrough,
    /// Question with an option list.
    Choice,
    /// Question without options: free text expected.
    Freeform,
}

/// A narrative unit: paragraphs plus an optional question gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryBlock {
    pub paragraphs: Vec<String>,
    pub question: Option<String>,
    pub choices: Vec<ChoiceOption>,
}

impl StoryBlock {
    /// The question, if present and not blank.
    pub fn question_text(&self) -> Option<&str> {
        self.question
            .as_deref()
            .filter(|question| !question.trim().is_empty())
    }

    pub fn gate(&self) -> BlockGate {
        match (self.question_text(), self.choices.is_empty()) {
            (None, _) => BlockGate::PassThrough,
            (Some(_), false) => BlockGate::Choice,
            (Some(_), true) => BlockGate::Freeform,
        }
    }
}

/// The persona/thread selection prompt shown after the opening lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitialChoice {
    pub prompt: String,
    pub options: Vec<ChoiceOption>,
}

/// The closing secret prompt. Options are plain strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecretQuestion {
    pub prompt: String,
    pub options: Vec<String>,
}

impl SecretQuestion {
    /// A secret question with neither a prompt nor options stands for
    /// "no secret question".
    pub fn is_blank(&self) -> bool {
        self.prompt.trim().is_empty() && self.options.is_empty()
    }
}

/// Canonical, normalized scene content for one persona/thread source.
///
/// Built by [`crate::core::normalizer`]; read-only for the rest of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NarrativeSceneData {
    #[serde(rename = "type")]
    pub scene_type: String,
    pub opening_lines: Vec<String>,
    pub initial_choice: Option<InitialChoice>,
    pub story_blocks: Vec<StoryBlock>,
    pub name_prompt: Option<String>,
    pub secret_question: SecretQuestion,
    pub exit_line: Option<String>,
}

impl Default for NarrativeSceneData {
    fn default() -> Self {
        Self {
            scene_type: DEFAULT_SCENE_TYPE.to_string(),
            opening_lines: Vec::new(),
            initial_choice: None,
            story_blocks: Vec::new(),
            name_prompt: None,
            secret_question: SecretQuestion::default(),
            exit_line: None,
        }
    }
}

impl NarrativeSceneData {
    /// The thread options offered by the initial choice, or empty when the
    /// scene has no initial choice.
    pub fn thread_choices(&self) -> &[ChoiceOption] {
        self.initial_choice
            .as_ref()
            .map(|choice| choice.options.as_slice())
            .unwrap_or_default()
    }

    /// The secret question, unless it is blank.
    pub fn secret(&self) -> Option<&SecretQuestion> {
        Some(&self.secret_question).filter(|secret| !secret.is_blank())
    }

    /// The name prompt, if present and not blank.
    pub fn name_prompt_text(&self) -> Option<&str> {
        self.name_prompt
            .as_deref()
            .filter(|prompt| !prompt.trim().is_empty())
    }

    /// The exit line, if present and not blank.
    pub fn exit_line_text(&self) -> Option<&str> {
        self.exit_line
            .as_deref()
            .filter(|line| !line.trim().is_empty())
    }
}
