/// Narrative progression controller: the state machine that walks a player
/// through one terminal run.
///
/// A run is opening lines, an optional thread choice, the story blocks, a
/// name prompt, an optional secret prompt and the exit. The controller owns
/// all progression state; the host only renders and receives results.
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::core::affinity::{AffinityError, AffinityTracker};
use crate::core::config::TerminalConfig;
use crate::core::host::{ContentProvider, NarrativeHost, OptionView, PromptKind};
use crate::core::normalizer::{normalize, normalize_thread_option};
use crate::core::resolver::{parse_index, resolve_choice_option, resolve_thread_choice};
use crate::schema::scene::{BlockGate, ChoiceOption, NarrativeSceneData};
use crate::schema::thread::{AffinityChange, Thread};

/// Context string passed to the provider when generating thread choices.
const INITIAL_CHOICE_CONTEXT: &str = "initial choice";

/// Caller bugs. Bad player input is never an error; it re-prompts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressionError {
    #[error("narrative run already started")]
    AlreadyStarted,
    #[error("narrative run has not been started")]
    NotStarted,
    #[error("no prompt is pending")]
    NoPendingPrompt,
    #[error("narrative run is already complete")]
    Complete,
    #[error("affinity error: {0}")]
    Affinity(#[from] AffinityError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeState {
    Idle,
    OpeningDisplay,
    InitialChoicePending,
    StoryBlockDisplay(usize),
    StoryChoicePending(usize),
    FreeformPending(usize),
    NamePending,
    SecretPending,
    Complete,
}

impl fmt::Display for NarrativeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::OpeningDisplay => f.write_str("opening"),
            Self::InitialChoicePending => f.write_str("initial-choice"),
            Self::StoryBlockDisplay(i) => write!(f, "block-{}", i),
            Self::StoryChoicePending(i) => write!(f, "block-{}-choice", i),
            Self::FreeformPending(i) => write!(f, "block-{}-freeform", i),
            Self::NamePending => f.write_str("name"),
            Self::SecretPending => f.write_str("secret"),
            Self::Complete => f.write_str("complete"),
        }
    }
}

/// Outcome of a `start` or `submit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// A new prompt is open.
    Awaiting(PromptKind),
    /// Blank input; nothing happened.
    Ignored(PromptKind),
    /// Input did not resolve. The same prompt is still open.
    Rejected(PromptKind),
    Complete,
}

/// Drives one narrative run. Built via `NarrativeController::builder()`.
pub struct NarrativeController {
    scene: NarrativeSceneData,
    config: TerminalConfig,
    provider: Option<Box<dyn ContentProvider>>,
    affinity: AffinityTracker,
    state: NarrativeState,
    prompt_kind: PromptKind,
    current_block: Option<usize>,
    thread_choices: Vec<ChoiceOption>,
    active_choices: Vec<ChoiceOption>,
    scene_responses: BTreeMap<String, String>,
    player_name: Option<String>,
}

/// Builder for constructing a `NarrativeController`.
#[derive(Default)]
pub struct NarrativeControllerBuilder {
    config: Option<TerminalConfig>,
    provider: Option<Box<dyn ContentProvider>>,
    persona: Option<Thread>,
    affinity: Option<AffinityTracker>,
}

impl NarrativeController {
    pub fn builder() -> NarrativeControllerBuilder {
        NarrativeControllerBuilder::default()
    }

    /// A controller with default config and no provider.
    pub fn new(scene: NarrativeSceneData) -> Self {
        Self::builder().build(scene)
    }

    /// Begin the run: opening lines, then the thread choice or the first block.
    pub fn start<H>(&mut self, host: &mut H) -> Result<Progress, ProgressionError>
    where
        H: NarrativeHost + ?Sized,
    {
        if self.state != NarrativeState::Idle {
            return Err(violation(ProgressionError::AlreadyStarted));
        }

        tracing::info!(
            scene_type = %self.scene.scene_type,
            blocks = self.scene.story_blocks.len(),
            persona = %self.affinity.current(),
            "narrative run started"
        );
        self.state = NarrativeState::OpeningDisplay;
        self.display_opening(host);
        Ok(self.present_initial_choice(host))
    }

    /// Feed one player submission to the pending prompt.
    pub fn submit<H>(&mut self, input: &str, host: &mut H) -> Result<Progress, ProgressionError>
    where
        H: NarrativeHost + ?Sized,
    {
        match self.state {
            NarrativeState::Idle => return Err(violation(ProgressionError::NotStarted)),
            NarrativeState::Complete => return Err(violation(ProgressionError::Complete)),
            _ => {}
        }
        if self.prompt_kind == PromptKind::None {
            return Err(violation(ProgressionError::NoPendingPrompt));
        }

        let input = input.trim();
        if input.is_empty() {
            if self.prompt_kind == PromptKind::PlayerName {
                host.display_notice(&self.config.blank_name_warning);
                return Ok(Progress::Rejected(PromptKind::PlayerName));
            }
            tracing::debug!(state = %self.state, "ignoring blank submission");
            return Ok(Progress::Ignored(self.prompt_kind));
        }

        match self.state {
            NarrativeState::InitialChoicePending => self.handle_thread_selection(input, host),
            NarrativeState::StoryChoicePending(index) => Ok(self.handle_story_choice(index, input, host)),
            NarrativeState::FreeformPending(index) => Ok(self.handle_freeform(index, input, host)),
            NarrativeState::NamePending => Ok(self.handle_player_name(input, host)),
            NarrativeState::SecretPending => Ok(self.handle_secret(input, host)),
            _ => Err(violation(ProgressionError::NoPendingPrompt)),
        }
    }

    pub fn state(&self) -> NarrativeState {
        self.state
    }

    pub fn prompt_kind(&self) -> PromptKind {
        self.prompt_kind
    }

    /// `None` until the story blocks are reached.
    pub fn current_block(&self) -> Option<usize> {
        self.current_block
    }

    /// The story choices awaiting resolution. Empty for every other prompt.
    pub fn active_choices(&self) -> &[ChoiceOption] {
        &self.active_choices
    }

    /// Thread options offered at the initial prompt, after any provider override.
    pub fn thread_choices(&self) -> &[ChoiceOption] {
        &self.thread_choices
    }

    pub fn selected_thread(&self) -> Option<Thread> {
        self.affinity.selected()
    }

    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    /// Free-form and secret answers, keyed without the sink prefix.
    pub fn scene_responses(&self) -> &BTreeMap<String, String> {
        &self.scene_responses
    }

    pub fn affinity(&self) -> &AffinityTracker {
        &self.affinity
    }

    pub fn scene(&self) -> &NarrativeSceneData {
        &self.scene
    }

    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    pub fn is_complete(&self) -> bool {
        self.state == NarrativeState::Complete
    }

    /// Hand back the tracker, e.g. to carry it into the next scene.
    pub fn into_affinity(self) -> AffinityTracker {
        self.affinity
    }

    fn display_opening<H>(&mut self, host: &mut H)
    where
        H: NarrativeHost + ?Sized,
    {
        if let Some(line) = self.dynamic_opening_line() {
            host.display_line(&line);
            return;
        }
        for line in &self.scene.opening_lines {
            host.display_line(line);
        }
    }

    fn present_initial_choice<H>(&mut self, host: &mut H) -> Progress
    where
        H: NarrativeHost + ?Sized,
    {
        if self.thread_choices.is_empty() {
            self.current_block = Some(0);
            return self.present_block(host);
        }

        if let Some(generated) = self.dynamic_thread_choices() {
            self.thread_choices = generated;
        }

        let prompt = self
            .scene
            .initial_choice
            .as_ref()
            .map(|choice| choice.prompt.as_str())
            .unwrap_or_default();
        let views: Vec<OptionView> = self.thread_choices.iter().map(OptionView::from).collect();
        host.display_choices(prompt, &views);
        self.active_choices.clear();
        self.await_input(host, NarrativeState::InitialChoicePending, PromptKind::InitialChoice)
    }

    /// Show blocks from `current_block` on, passing through question-less
    /// blocks, until one asks for input or the blocks run out.
    fn present_block<H>(&mut self, host: &mut H) -> Progress
    where
        H: NarrativeHost + ?Sized,
    {
        loop {
            let index = self.current_block.unwrap_or(0);
            if index >= self.scene.story_blocks.len() {
                return self.prompt_for_name(host);
            }

            self.state = NarrativeState::StoryBlockDisplay(index);
            tracing::debug!(block = index, "presenting story block");

            let block = &self.scene.story_blocks[index];
            for paragraph in &block.paragraphs {
                host.display_line(paragraph);
            }
            let question = block.question_text().unwrap_or_default().to_string();

            match block.gate() {
                BlockGate::PassThrough => {
                    self.current_block = Some(index + 1);
                }
                BlockGate::Choice => {
                    self.active_choices = block.choices.clone();
                    let views: Vec<OptionView> =
                        self.active_choices.iter().map(OptionView::from).collect();
                    host.display_choices(&question, &views);
                    return self.await_input(
                        host,
                        NarrativeState::StoryChoicePending(index),
                        PromptKind::StoryChoice,
                    );
                }
                BlockGate::Freeform => {
                    self.active_choices.clear();
                    host.display_choices(&question, &[]);
                    return self.await_input(
                        host,
                        NarrativeState::FreeformPending(index),
                        PromptKind::Freeform,
                    );
                }
            }
        }
    }

    fn prompt_for_name<H>(&mut self, host: &mut H) -> Progress
    where
        H: NarrativeHost + ?Sized,
    {
        self.active_choices.clear();
        let prompt = self
            .scene
            .name_prompt_text()
            .unwrap_or(self.config.default_name_prompt.as_str());
        host.display_choices(prompt, &[]);
        self.await_input(host, NarrativeState::NamePending, PromptKind::PlayerName)
    }

    fn prompt_for_secret<H>(&mut self, host: &mut H) -> Progress
    where
        H: NarrativeHost + ?Sized,
    {
        let Some(secret) = self.scene.secret() else {
            return self.complete(host);
        };

        let prompt = if secret.prompt.trim().is_empty() {
            self.config.default_secret_prompt.as_str()
        } else {
            secret.prompt.as_str()
        };
        let views: Vec<OptionView> = secret
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| OptionView::new((i + 1).to_string(), option.as_str(), ""))
            .collect();
        host.display_choices(prompt, &views);
        self.await_input(host, NarrativeState::SecretPending, PromptKind::Secret)
    }

    fn handle_thread_selection<H>(
        &mut self,
        input: &str,
        host: &mut H,
    ) -> Result<Progress, ProgressionError>
    where
        H: NarrativeHost + ?Sized,
    {
        let Some(choice) = resolve_thread_choice(input, &self.thread_choices).cloned() else {
            host.display_notice(&self.config.invalid_thread_warning);
            return Ok(Progress::Rejected(PromptKind::InitialChoice));
        };

        self.affinity.select(choice.thread).map_err(|err| {
            tracing::warn!(%err, "thread re-selection refused");
            err
        })?;
        host.set_selected_thread(choice.thread);
        host.display_notice(
            &self
                .config
                .thread_locked_line(choice.label(), &choice.description),
        );
        if self.config.thread_lock_affinity != 0 {
            self.affinity.apply_change(
                choice.thread,
                AffinityChange::new(self.config.thread_lock_affinity, "thread locked"),
            );
        }
        tracing::info!(thread = %choice.thread, id = %choice.id, "thread locked");

        self.clear_prompt();
        self.current_block = Some(0);
        Ok(self.present_block(host))
    }

    fn handle_story_choice<H>(&mut self, index: usize, input: &str, host: &mut H) -> Progress
    where
        H: NarrativeHost + ?Sized,
    {
        let Some(selection) = resolve_choice_option(input, &self.active_choices).cloned() else {
            host.display_notice(&self.config.invalid_choice_warning);
            return Progress::Rejected(PromptKind::StoryChoice);
        };

        if let Some(scores) = &selection.scores {
            let reason = format!("block-{} choice {}", index, selection.id);
            self.affinity.apply_scores(scores, &reason);
        }

        let block_count = self.scene.story_blocks.len();
        let target = usize::try_from(selection.next_block)
            .unwrap_or(0)
            .min(block_count);
        // A choice pointing back at its own block advances instead of looping.
        let next = if target == index { index + 1 } else { target };
        tracing::debug!(
            from = index,
            next_block = selection.next_block,
            to = next,
            "story choice resolved"
        );

        self.active_choices.clear();
        self.clear_prompt();
        self.current_block = Some(next);
        self.present_block(host)
    }

    fn handle_freeform<H>(&mut self, index: usize, input: &str, host: &mut H) -> Progress
    where
        H: NarrativeHost + ?Sized,
    {
        self.record_response(&format!("block-{}-response", index), input, host);
        self.clear_prompt();
        self.current_block = Some(index + 1);
        self.present_block(host)
    }

    fn handle_player_name<H>(&mut self, input: &str, host: &mut H) -> Progress
    where
        H: NarrativeHost + ?Sized,
    {
        host.set_player_name(input);
        host.display_notice(&self.config.identity_confirmed_line(input));
        self.player_name = Some(input.to_string());
        tracing::debug!("player name recorded");

        self.clear_prompt();
        self.prompt_for_secret(host)
    }

    fn handle_secret<H>(&mut self, input: &str, host: &mut H) -> Progress
    where
        H: NarrativeHost + ?Sized,
    {
        let options = &self.scene.secret_question.options;
        let answer = parse_index(input, options.len())
            .map(|i| options[i].clone())
            .unwrap_or_else(|| input.to_string());

        self.record_response("secret", &answer, host);
        host.display_notice(&self.config.secret_recorded_line);
        self.clear_prompt();
        self.complete(host)
    }

    fn complete<H>(&mut self, host: &mut H) -> Progress
    where
        H: NarrativeHost + ?Sized,
    {
        if let Some(exit_line) = self.scene.exit_line_text() {
            host.display_line(exit_line);
        }
        host.display_line(&self.config.closing_line);

        self.state = NarrativeState::Complete;
        self.prompt_kind = PromptKind::None;
        self.active_choices.clear();
        tracing::info!(
            thread = ?self.affinity.selected(),
            responses = self.scene_responses.len(),
            alignment = %self.affinity.dominant(),
            "narrative run complete"
        );
        host.on_sequence_complete();
        Progress::Complete
    }

    fn await_input<H>(&mut self, host: &mut H, state: NarrativeState, kind: PromptKind) -> Progress
    where
        H: NarrativeHost + ?Sized,
    {
        self.state = state;
        self.prompt_kind = kind;
        tracing::debug!(%state, ?kind, "awaiting input");
        host.prompt_for_input(kind, self.config.placeholder_for(kind));
        Progress::Awaiting(kind)
    }

    fn clear_prompt(&mut self) {
        self.prompt_kind = PromptKind::None;
    }

    /// Later answers to the same key overwrite earlier ones (a block can be
    /// revisited through `nextBlock`).
    fn record_response<H>(&mut self, key: &str, value: &str, host: &mut H)
    where
        H: NarrativeHost + ?Sized,
    {
        self.scene_responses
            .insert(key.to_string(), value.to_string());
        host.record_scene_response(&self.config.sink_key(key), value);
    }

    fn dynamic_opening_line(&mut self) -> Option<String> {
        if !self.config.use_dynamic_narrative {
            return None;
        }
        let persona = self.affinity.current().persona_id();
        let provider = self.provider.as_mut()?;
        match provider.opening_line(persona) {
            Ok(line) if !line.trim().is_empty() => Some(line),
            Ok(_) => {
                tracing::debug!(persona, "provider returned no opening line, using static content");
                None
            }
            Err(err) => {
                tracing::warn!(persona, %err, "provider failed, using static opening lines");
                None
            }
        }
    }

    fn dynamic_thread_choices(&mut self) -> Option<Vec<ChoiceOption>> {
        if !self.config.use_dynamic_narrative {
            return None;
        }
        let persona = self.affinity.current().persona_id();
        let provider = self.provider.as_mut()?;
        match provider.generate_choices(persona, INITIAL_CHOICE_CONTEXT) {
            Ok(mut choices) if !choices.is_empty() => {
                for choice in &mut choices {
                    normalize_thread_option(choice);
                }
                Some(choices)
            }
            Ok(_) => {
                tracing::debug!(persona, "provider returned no choices, using static content");
                None
            }
            Err(err) => {
                tracing::warn!(persona, %err, "provider failed, using static thread choices");
                None
            }
        }
    }
}

fn violation(err: ProgressionError) -> ProgressionError {
    tracing::warn!(%err, "narrative protocol violation");
    err
}

impl NarrativeControllerBuilder {
    pub fn config(mut self, config: TerminalConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Attach a dynamic-content provider. Only consulted when the config
    /// enables `use_dynamic_narrative`.
    pub fn provider(mut self, provider: impl ContentProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    /// Persona reported before a thread is selected. Ignored when an
    /// existing tracker is supplied.
    pub fn persona(mut self, persona: Thread) -> Self {
        self.persona = Some(persona);
        self
    }

    /// Continue with an existing tracker, e.g. one carried over from an
    /// earlier scene.
    pub fn affinity(mut self, tracker: AffinityTracker) -> Self {
        self.affinity = Some(tracker);
        self
    }

    /// Build a controller for `scene`. The scene is normalized on the way in.
    pub fn build(self, scene: NarrativeSceneData) -> NarrativeController {
        let scene = normalize(scene);
        let affinity = self.affinity.unwrap_or_else(|| {
            AffinityTracker::with_persona(self.persona.unwrap_or_default())
        });
        let thread_choices = scene.thread_choices().to_vec();

        NarrativeController {
            scene,
            config: self.config.unwrap_or_default(),
            provider: self.provider,
            affinity,
            state: NarrativeState::Idle,
            prompt_kind: PromptKind::None,
            current_block: None,
            thread_choices,
            active_choices: Vec::new(),
            scene_responses: BTreeMap::new(),
            player_name: None,
        }
    }
}
