/// Scene data normalizer: the boundary between authored content and the
/// typed scene model.
///
/// Authored content is externally written and may omit any optional field,
/// carry unknown thread ids, or hold values of the wrong type. Nothing here
/// fails: every defect degrades to a safe default.
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::schema::scene::{
    ChoiceOption, InitialChoice, NarrativeSceneData, SecretQuestion, StoryBlock,
    DEFAULT_SCENE_TYPE,
};
use crate::schema::thread::Thread;

// Raw mirror types. Authored content uses a looser shape than the scene
// model (every field optional, list entries of any type), so it is read into
// these first and mapped field by field.

/// A value that is kept when it has the expected type and dropped otherwise.
/// Missing fields land in `Invalid`. `Valid` holds an `Option` so that RON's
/// explicit `Some(..)`/`None` are unwrapped; JSON values and nulls go through
/// the same path.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(Option<T>),
    Invalid(serde::de::IgnoredAny),
}

impl<T> Default for Lenient<T> {
    fn default() -> Self {
        Self::Invalid(serde::de::IgnoredAny)
    }
}

impl<T> Lenient<T> {
    fn into_option(self) -> Option<T> {
        match self {
            Self::Valid(value) => value,
            Self::Invalid(_) => None,
        }
    }
}

fn valid<T>(value: Lenient<T>) -> Option<T> {
    value.into_option()
}

fn valid_list<T>(values: Lenient<Vec<Lenient<T>>>) -> Vec<T> {
    valid(values)
        .unwrap_or_default()
        .into_iter()
        .filter_map(Lenient::into_option)
        .collect()
}

/// Scene content as authored, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSceneData {
    #[serde(rename = "type", alias = "scene_type")]
    scene_type: Lenient<String>,
    #[serde(rename = "openingLines", alias = "opening_lines")]
    opening_lines: Lenient<Vec<Lenient<String>>>,
    #[serde(rename = "initialChoice", alias = "initial_choice")]
    initial_choice: Lenient<RawInitialChoice>,
    #[serde(rename = "storyBlocks", alias = "story_blocks")]
    story_blocks: Lenient<Vec<Lenient<RawStoryBlock>>>,
    #[serde(rename = "namePrompt", alias = "name_prompt")]
    name_prompt: Lenient<String>,
    #[serde(rename = "secretQuestion", alias = "secret_question")]
    secret_question: Lenient<RawSecretQuestion>,
    #[serde(rename = "exitLine", alias = "exit_line")]
    exit_line: Lenient<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawInitialChoice {
    prompt: Lenient<String>,
    options: Lenient<Vec<Lenient<RawChoiceOption>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawStoryBlock {
    paragraphs: Lenient<Vec<Lenient<String>>>,
    question: Lenient<String>,
    choices: Lenient<Vec<Lenient<RawChoiceOption>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawChoiceOption {
    id: Lenient<String>,
    text: Lenient<String>,
    label: Lenient<String>,
    description: Lenient<String>,
    #[serde(rename = "nextBlock", alias = "next_block")]
    next_block: Lenient<i32>,
    scores: Lenient<FxHashMap<String, Lenient<i32>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawSecretQuestion {
    prompt: Lenient<String>,
    options: Lenient<Vec<Lenient<String>>>,
}

/// Map authored content into the scene model and normalize it.
pub fn normalize_raw(raw: RawSceneData) -> NarrativeSceneData {
    let scene = NarrativeSceneData {
        scene_type: valid(raw.scene_type).unwrap_or_else(|| DEFAULT_SCENE_TYPE.to_string()),
        opening_lines: valid_list(raw.opening_lines),
        initial_choice: valid(raw.initial_choice).map(map_initial_choice),
        story_blocks: valid_list(raw.story_blocks)
            .into_iter()
            .map(map_story_block)
            .collect(),
        name_prompt: valid(raw.name_prompt),
        secret_question: valid(raw.secret_question)
            .map(map_secret_question)
            .unwrap_or_default(),
        exit_line: valid(raw.exit_line),
    };
    normalize(scene)
}

fn map_initial_choice(raw: RawInitialChoice) -> InitialChoice {
    InitialChoice {
        prompt: valid(raw.prompt).unwrap_or_default(),
        options: valid_list(raw.options)
            .into_iter()
            .map(map_choice_option)
            .collect(),
    }
}

fn map_story_block(raw: RawStoryBlock) -> StoryBlock {
    StoryBlock {
        paragraphs: valid_list(raw.paragraphs),
        question: valid(raw.question),
        choices: valid_list(raw.choices)
            .into_iter()
            .map(map_choice_option)
            .collect(),
    }
}

fn map_choice_option(raw: RawChoiceOption) -> ChoiceOption {
    let scores = valid(raw.scores).map(|scores| {
        scores
            .into_iter()
            .filter_map(|(persona, points)| points.into_option().map(|points| (persona, points)))
            .collect()
    });
    ChoiceOption {
        id: valid(raw.id).unwrap_or_default(),
        text: valid(raw.text),
        label: valid(raw.label),
        description: valid(raw.description).unwrap_or_default(),
        next_block: valid(raw.next_block).unwrap_or_default(),
        thread: Thread::default(),
        scores,
    }
}

fn map_secret_question(raw: RawSecretQuestion) -> SecretQuestion {
    SecretQuestion {
        prompt: valid(raw.prompt).unwrap_or_default(),
        options: valid_list(raw.options),
    }
}

/// Normalize scene data. Idempotent: normalizing normalized data is a no-op.
pub fn normalize(mut scene: NarrativeSceneData) -> NarrativeSceneData {
    scene.normalize();
    scene
}

impl NarrativeSceneData {
    /// Normalize in place. See [`normalize`].
    pub fn normalize(&mut self) {
        if self.scene_type.trim().is_empty() {
            self.scene_type = DEFAULT_SCENE_TYPE.to_string();
        }

        if let Some(initial) = self.initial_choice.as_mut() {
            for option in &mut initial.options {
                normalize_thread_option(option);
            }
        }
    }
}

pub(crate) fn normalize_thread_option(option: &mut ChoiceOption) {
    let thread = Thread::parse(&option.id);
    if thread.is_none() {
        tracing::debug!(id = %option.id, "thread option id not recognised, defaulting to hero");
    }
    option.thread = thread.unwrap_or_default();

    if option.text.is_none() {
        option.text = Some(option.id.clone());
    }
}
