//! WASM bindings for narrative-terminal: powers the browser terminal demo.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use narrative_terminal::core::config::TerminalConfig;
use narrative_terminal::core::content::{parse_scene_json, parse_scene_ron};
use narrative_terminal::core::controller::{NarrativeController, Progress};
use narrative_terminal::core::host::{
    GameStateSink, OptionView, Presenter, PromptKind, SceneTransition,
};
use narrative_terminal::core::plan::CinematicPlan;
use narrative_terminal::schema::scene::NarrativeSceneData;
use narrative_terminal::schema::thread::Thread;

// ---------------------------------------------------------------------------
// Embedded sample content, compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const HERO_SCENE: &str = include_str!("../../content/hero.json");
    pub const SHADOW_SCENE: &str = include_str!("../../content/shadow.json");
    pub const AMBITION_SCENE: &str = include_str!("../../content/ambition.ron");
}

fn sample_scene(thread: Thread) -> Result<NarrativeSceneData, JsError> {
    let parsed = match thread {
        Thread::Hero => parse_scene_json(data::HERO_SCENE),
        Thread::Shadow => parse_scene_json(data::SHADOW_SCENE),
        Thread::Ambition => parse_scene_ron(data::AMBITION_SCENE),
    };
    parsed.map_err(|e| JsError::new(&format!("Sample content error: {e}")))
}

fn parse_thread(name: &str) -> Result<Thread, JsError> {
    Thread::parse(name).ok_or_else(|| JsError::new(&format!("Unknown thread: {name}")))
}

fn parse_config(config_ron: Option<String>) -> Result<TerminalConfig, JsError> {
    match config_ron {
        Some(src) => TerminalConfig::parse_ron(&src)
            .map_err(|e| JsError::new(&format!("Config parse error: {e}"))),
        None => Ok(TerminalConfig::default()),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

// ---------------------------------------------------------------------------
// Buffered host: every collaborator call becomes an event for the page
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TerminalEvent {
    Line { text: String },
    Notice { text: String },
    Choices { prompt: String, options: Vec<OptionView> },
    Prompt { kind: PromptKind, placeholder: String },
    Thread { thread: String },
    PlayerName { name: String },
    Response { key: String, value: String },
    Complete,
}

#[derive(Default)]
struct BufferHost {
    events: Vec<TerminalEvent>,
}

impl BufferHost {
    fn drain_json(&mut self) -> Result<String, JsError> {
        let json = to_json(&self.events)?;
        self.events.clear();
        Ok(json)
    }
}

impl Presenter for BufferHost {
    fn display_line(&mut self, text: &str) {
        self.events.push(TerminalEvent::Line {
            text: text.to_string(),
        });
    }

    fn display_notice(&mut self, text: &str) {
        self.events.push(TerminalEvent::Notice {
            text: text.to_string(),
        });
    }

    fn display_choices(&mut self, prompt: &str, options: &[OptionView]) {
        self.events.push(TerminalEvent::Choices {
            prompt: prompt.to_string(),
            options: options.to_vec(),
        });
    }

    fn prompt_for_input(&mut self, kind: PromptKind, placeholder: &str) {
        self.events.push(TerminalEvent::Prompt {
            kind,
            placeholder: placeholder.to_string(),
        });
    }
}

impl GameStateSink for BufferHost {
    fn set_selected_thread(&mut self, thread: Thread) {
        self.events.push(TerminalEvent::Thread {
            thread: thread.key().to_string(),
        });
    }

    fn set_player_name(&mut self, name: &str) {
        self.events.push(TerminalEvent::PlayerName {
            name: name.to_string(),
        });
    }

    fn record_scene_response(&mut self, key: &str, value: &str) {
        self.events.push(TerminalEvent::Response {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
}

impl SceneTransition for BufferHost {
    fn on_sequence_complete(&mut self) {
        self.events.push(TerminalEvent::Complete);
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Build the cinematic plan for a scene given as JSON. Returns the plan as JSON.
#[wasm_bindgen]
pub fn build_plan_json(scene_json: &str) -> Result<String, JsError> {
    let scene = parse_scene_json(scene_json)
        .map_err(|e| JsError::new(&format!("Invalid scene JSON: {e}")))?;
    to_json(&CinematicPlan::build(&scene))
}

/// Plan for one of the embedded sample scenes.
#[wasm_bindgen]
pub fn sample_plan_json(thread: &str) -> Result<String, JsError> {
    let scene = sample_scene(parse_thread(thread)?)?;
    to_json(&CinematicPlan::build(&scene))
}

/// Return JSON array of thread keys.
#[wasm_bindgen]
pub fn available_threads() -> String {
    let keys: Vec<&str> = Thread::ALL.iter().map(|thread| thread.key()).collect();
    serde_json::to_string(&keys).unwrap_or_else(|_| "[]".to_string())
}

// ---------------------------------------------------------------------------
// TerminalSession: one narrative run driven from the page
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct TerminalSession {
    controller: NarrativeController,
    host: BufferHost,
}

#[wasm_bindgen]
impl TerminalSession {
    /// Create a session for a scene given as JSON, with an optional RON config.
    #[wasm_bindgen(constructor)]
    pub fn new(scene_json: &str, config_ron: Option<String>) -> Result<TerminalSession, JsError> {
        let scene = parse_scene_json(scene_json)
            .map_err(|e| JsError::new(&format!("Invalid scene JSON: {e}")))?;
        Ok(Self::with_scene(scene, parse_config(config_ron)?))
    }

    /// Create a session for one of the embedded sample scenes.
    pub fn sample(thread: &str) -> Result<TerminalSession, JsError> {
        let thread = parse_thread(thread)?;
        let scene = sample_scene(thread)?;
        let controller = NarrativeController::builder().persona(thread).build(scene);
        Ok(TerminalSession {
            controller,
            host: BufferHost::default(),
        })
    }

    /// Start the run. Returns the JSON array of events it produced.
    pub fn start(&mut self) -> Result<String, JsError> {
        self.controller
            .start(&mut self.host)
            .map_err(|e| JsError::new(&e.to_string()))?;
        self.host.drain_json()
    }

    /// Submit player input. Returns the JSON array of events it produced.
    pub fn submit(&mut self, input: &str) -> Result<String, JsError> {
        let progress = self
            .controller
            .submit(input, &mut self.host)
            .map_err(|e| JsError::new(&e.to_string()))?;
        if let Progress::Ignored(kind) | Progress::Rejected(kind) = progress {
            // The page clears its input on submit; reopen the same prompt.
            self.host.prompt_for_input(kind, self.controller.config().placeholder_for(kind));
        }
        self.host.drain_json()
    }

    pub fn is_complete(&self) -> bool {
        self.controller.is_complete()
    }

    /// Current state as a short label, e.g. "block-2-choice".
    pub fn state(&self) -> String {
        self.controller.state().to_string()
    }

    /// Return JSON object of recorded scene responses.
    pub fn responses(&self) -> Result<String, JsError> {
        to_json(self.controller.scene_responses())
    }

    pub fn affinity_summary(&self) -> String {
        self.controller.affinity().summary()
    }
}

impl TerminalSession {
    fn with_scene(scene: NarrativeSceneData, config: TerminalConfig) -> Self {
        TerminalSession {
            controller: NarrativeController::builder().config(config).build(scene),
            host: BufferHost::default(),
        }
    }
}
