/// Collaborator contracts: the renderer, game state, scene transition and
/// optional dynamic-content provider a narrative run talks to.
///
/// Every call is synchronous. Returning from a call is the completion
/// signal; the controller does not advance until it has returned, however
/// long the host takes to animate a line.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::scene::ChoiceOption;
use crate::schema::thread::Thread;

/// Which kind of input the run is currently waiting for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromptKind {
    #[default]
    None,
    InitialChoice,
    StoryChoice,
    Freeform,
    PlayerName,
    Secret,
}

/// A choice as shown to the player: resolved id and label plus description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionView {
    pub id: String,
    pub label: String,
    pub description: String,
}

impl OptionView {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: description.into(),
        }
    }
}

impl From<&ChoiceOption> for OptionView {
    fn from(option: &ChoiceOption) -> Self {
        Self::new(option.id.clone(), option.label(), option.description.clone())
    }
}

/// Renders narration and prompts.
pub trait Presenter {
    /// Show one narrative line. Hosts may animate it.
    fn display_line(&mut self, text: &str);

    /// Show a system line immediately (warnings, confirmations).
    fn display_notice(&mut self, text: &str) {
        self.display_line(text);
    }

    /// Show a prompt and its enumerated options.
    fn display_choices(&mut self, prompt: &str, options: &[OptionView]);

    /// Open the input field for `kind`.
    fn prompt_for_input(&mut self, kind: PromptKind, placeholder: &str);
}

/// Receives run results. Fire-and-forget: nothing is read back.
pub trait GameStateSink {
    fn set_selected_thread(&mut self, thread: Thread);
    fn set_player_name(&mut self, name: &str);
    fn record_scene_response(&mut self, key: &str, value: &str);
}

/// Told once when the run reaches its end.
pub trait SceneTransition {
    fn on_sequence_complete(&mut self);
}

/// Everything a controller needs from its host in one bound.
pub trait NarrativeHost: Presenter + GameStateSink + SceneTransition {}

impl<T: Presenter + GameStateSink + SceneTransition> NarrativeHost for T {}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("generation failed for {persona}: {message}")]
    Generation { persona: String, message: String },
}

/// Optional source of generated narration. Any error or empty result is
/// treated exactly like "no provider" and static content is used.
pub trait ContentProvider {
    /// Opening line for `persona` (uppercase persona id, e.g. "HERO").
    fn opening_line(&mut self, persona: &str) -> Result<String, ProviderError>;

    /// Choices for `persona` in the given context, e.g. "initial choice".
    fn generate_choices(
        &mut self,
        persona: &str,
        context: &str,
    ) -> Result<Vec<ChoiceOption>, ProviderError>;
}

/// A host that records every call, for tests and headless runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingHost {
    pub lines: Vec<String>,
    pub notices: Vec<String>,
    pub choice_sets: Vec<(String, Vec<OptionView>)>,
    pub prompts: Vec<(PromptKind, String)>,
    pub selected_thread: Option<Thread>,
    pub player_name: Option<String>,
    pub responses: Vec<(String, String)>,
    pub completions: usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent prompt, if any.
    pub fn last_prompt(&self) -> Option<&(PromptKind, String)> {
        self.prompts.last()
    }
}

impl Presenter for RecordingHost {
    fn display_line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn display_notice(&mut self, text: &str) {
        self.notices.push(text.to_string());
    }

    fn display_choices(&mut self, prompt: &str, options: &[OptionView]) {
        self.choice_sets.push((prompt.to_string(), options.to_vec()));
    }

    fn prompt_for_input(&mut self, kind: PromptKind, placeholder: &str) {
        self.prompts.push((kind, placeholder.to_string()));
    }
}

impl GameStateSink for RecordingHost {
    fn set_selected_thread(&mut self, thread: Thread) {
        self.selected_thread = Some(thread);
    }

    fn set_player_name(&mut self, name: &str) {
        self.player_name = Some(name.to_string());
    }

    fn record_scene_response(&mut self, key: &str, value: &str) {
        self.responses.push((key.to_string(), value.to_string()));
    }
}

impl SceneTransition for RecordingHost {
    fn on_sequence_complete(&mut self) {
        self.completions += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LineOnly(Vec<String>);

    impl Presenter for LineOnly {
        fn display_line(&mut self, text: &str) {
            self.0.push(text.to_string());
        }
        fn display_choices(&mut self, _prompt: &str, _options: &[OptionView]) {}
        fn prompt_for_input(&mut self, _kind: PromptKind, _placeholder: &str) {}
    }

    #[test]
    fn notice_defaults_to_display_line() {
        let mut presenter = LineOnly(Vec::new());
        presenter.display_notice("Careful.");
        assert_eq!(presenter.0, vec!["Careful."]);
    }

    #[test]
    fn option_view_uses_label_fallback() {
        let option = ChoiceOption::new("hero", "The Hero").with_description("Bright.");
        let view = OptionView::from(&option);
        assert_eq!(view, OptionView::new("hero", "The Hero", "Bright."));
    }

    #[test]
    fn recording_host_is_a_narrative_host() {
        fn drive(host: &mut dyn NarrativeHost) {
            host.display_line("hello");
            host.set_player_name("Ada");
            host.on_sequence_complete();
        }
        let mut host = RecordingHost::new();
        drive(&mut host);
        assert_eq!(host.lines, vec!["hello"]);
        assert_eq!(host.player_name.as_deref(), Some("Ada"));
        assert_eq!(host.completions, 1);
    }
}
