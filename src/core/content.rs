/// Content source: loads one scene per thread from JSON or RON files.
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::normalizer::{normalize, normalize_raw, RawSceneData};
use crate::schema::scene::NarrativeSceneData;
use crate::schema::thread::Thread;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported content format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("no scene content found in {0}")]
    NoScenes(PathBuf),
    #[error("no scene available for thread {0}")]
    NoSceneFor(Thread),
}

/// Parse and normalize a scene authored as JSON (camelCase keys).
pub fn parse_scene_json(input: &str) -> Result<NarrativeSceneData, ContentError> {
    let raw: RawSceneData = serde_json::from_str(input)?;
    Ok(normalize_raw(raw))
}

/// Parse and normalize a scene authored as RON (snake_case or camelCase keys).
pub fn parse_scene_ron(input: &str) -> Result<NarrativeSceneData, ContentError> {
    let raw: RawSceneData = ron::from_str(input)?;
    Ok(normalize_raw(raw))
}

/// Load a scene file, picking the parser from the extension.
pub fn load_scene(path: &Path) -> Result<NarrativeSceneData, ContentError> {
    let contents = std::fs::read_to_string(path)?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_scene_json(&contents),
        Some("ron") => parse_scene_ron(&contents),
        _ => Err(ContentError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Scenes keyed by thread.
#[derive(Debug, Clone, Default)]
pub struct ContentLibrary {
    scenes: FxHashMap<Thread, NarrativeSceneData>,
}

impl ContentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `<thread>.json` or `<thread>.ron` for each thread found in `dir`.
    /// Missing threads are skipped; a directory with none is an error.
    pub fn load_from_dir(dir: &Path) -> Result<ContentLibrary, ContentError> {
        let mut library = ContentLibrary::new();
        for thread in Thread::ALL {
            let candidates = ["json", "ron"].map(|ext| dir.join(format!("{}.{}", thread.key(), ext)));
            let Some(path) = candidates.iter().find(|path| path.exists()) else {
                tracing::debug!(%thread, dir = %dir.display(), "no scene file for thread");
                continue;
            };
            let scene = load_scene(path)?;
            tracing::debug!(%thread, path = %path.display(), blocks = scene.story_blocks.len(), "scene loaded");
            library.insert(thread, scene);
        }

        if library.is_empty() {
            return Err(ContentError::NoScenes(dir.to_path_buf()));
        }
        Ok(library)
    }

    /// Add or replace the scene for `thread`. The scene is normalized.
    pub fn insert(&mut self, thread: Thread, scene: NarrativeSceneData) {
        self.scenes.insert(thread, normalize(scene));
    }

    pub fn get(&self, thread: Thread) -> Option<&NarrativeSceneData> {
        self.scenes.get(&thread)
    }

    /// The scene for `thread`, falling back to hero, then shadow, then ambition.
    pub fn scene_for(&self, thread: Thread) -> Option<&NarrativeSceneData> {
        std::iter::once(thread)
            .chain(Thread::ALL)
            .find_map(|candidate| self.scenes.get(&candidate))
    }

    pub fn require_scene_for(&self, thread: Thread) -> Result<&NarrativeSceneData, ContentError> {
        self.scene_for(thread)
            .ok_or(ContentError::NoSceneFor(thread))
    }

    pub fn threads(&self) -> Vec<Thread> {
        let mut threads: Vec<Thread> = self.scenes.keys().copied().collect();
        threads.sort();
        threads
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}
