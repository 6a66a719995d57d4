/// Authoring checks for scene content. Nothing here affects playback; the
/// controller tolerates every issue reported, usually by silently
/// defaulting. The linter makes those defaults visible to authors.
use rustc_hash::FxHashSet;
use std::fmt;

use crate::schema::scene::{ChoiceOption, NarrativeSceneData};
use crate::schema::thread::Thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Note => f.write_str("NOTE"),
            Self::Warning => f.write_str("WARNING"),
            Self::Error => f.write_str("ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    pub severity: Severity,
    /// Where in the scene, e.g. "storyBlocks[2].choices[0]".
    pub location: String,
    pub message: String,
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.location, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub issues: Vec<LintIssue>,
}

impl LintReport {
    fn push(&mut self, severity: Severity, location: impl Into<String>, message: impl Into<String>) {
        self.issues.push(LintIssue {
            severity,
            location: location.into(),
            message: message.into(),
        });
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check a normalized scene for authoring hazards.
pub fn lint_scene(scene: &NarrativeSceneData) -> LintReport {
    let mut report = LintReport::default();

    if scene.opening_lines.is_empty() && scene.story_blocks.is_empty() {
        report.push(Severity::Warning, "scene", "no opening lines and no story blocks");
    }

    check_thread_options(scene, &mut report);

    let block_count = scene.story_blocks.len();
    for (i, block) in scene.story_blocks.iter().enumerate() {
        let location = format!("storyBlocks[{}]", i);

        if block.question_text().is_none() && !block.choices.is_empty() {
            report.push(
                Severity::Error,
                &location,
                "choices without a question are never offered; the block passes through",
            );
            continue;
        }
        if block.question_text().is_some() && block.paragraphs.is_empty() {
            report.push(Severity::Note, &location, "question has no lead-in paragraphs");
        }

        for (j, choice) in block.choices.iter().enumerate() {
            let location = format!("{}.choices[{}]", location, j);
            check_story_choice(i, block_count, choice, &location, &mut report);
        }
        check_duplicate_texts(&block.choices, &location, &mut report);
    }

    if let Some(secret) = scene.secret() {
        if secret.prompt.trim().is_empty() {
            report.push(
                Severity::Note,
                "secretQuestion",
                "blank prompt; the default secret prompt will be shown",
            );
        }
    }

    report
}

fn check_thread_options(scene: &NarrativeSceneData, report: &mut LintReport) {
    let Some(initial) = scene.initial_choice.as_ref() else {
        return;
    };
    if initial.options.is_empty() {
        report.push(
            Severity::Warning,
            "initialChoice",
            "no options; the thread choice is skipped",
        );
        return;
    }

    let mut seen = FxHashSet::default();
    for (i, option) in initial.options.iter().enumerate() {
        let location = format!("initialChoice.options[{}]", i);
        if Thread::parse(&option.id).is_none() {
            report.push(
                Severity::Warning,
                &location,
                format!("id '{}' is not a thread; it will lock the hero thread", option.id),
            );
        }
        if !seen.insert(option.thread) {
            report.push(
                Severity::Note,
                &location,
                format!("thread {} is offered more than once", option.thread),
            );
        }
    }
}

fn check_story_choice(
    block: usize,
    block_count: usize,
    choice: &ChoiceOption,
    location: &str,
    report: &mut LintReport,
) {
    if choice.text().trim().is_empty() {
        report.push(
            Severity::Warning,
            location,
            "no text; the option can only be picked by number",
        );
    }

    let next = choice.next_block;
    if usize::try_from(next).is_ok_and(|next| next == block) {
        report.push(
            Severity::Warning,
            location,
            format!("nextBlock {} points at its own block; playback advances to {}", next, block + 1),
        );
    } else if next < 0 || usize::try_from(next).is_ok_and(|next| next > block_count) {
        let clamped = usize::try_from(next).unwrap_or(0).min(block_count);
        report.push(
            Severity::Warning,
            location,
            format!("nextBlock {} is out of range; clamped to {}", next, clamped),
        );
    }

    if let Some(scores) = &choice.scores {
        let mut unknown: Vec<&str> = scores
            .keys()
            .filter(|key| Thread::from_persona_key(key).is_none())
            .map(String::as_str)
            .collect();
        unknown.sort_unstable();
        for key in unknown {
            report.push(
                Severity::Warning,
                location,
                format!("score key '{}' is not a persona and is ignored", key),
            );
        }
    }
}

fn check_duplicate_texts(choices: &[ChoiceOption], location: &str, report: &mut LintReport) {
    let mut seen = FxHashSet::default();
    for choice in choices {
        let text = choice.text().trim().to_lowercase();
        if text.is_empty() {
            continue;
        }
        if !seen.insert(text) {
            report.push(
                Severity::Warning,
                location,
                format!("duplicate choice text '{}'; only the first can be picked by text", choice.text()),
            );
        }
    }
}
