/// Persona/affinity tracking: the selected Dreamweaver thread plus a score
/// ledger fed by the choices made during a run.
use rustc_hash::FxHashMap;
use std::fmt;
use thiserror::Error;

use crate::schema::thread::{AffinityChange, Thread};

/// Share of the total score a thread needs to count as dominant.
pub const DOMINANCE_THRESHOLD: f32 = 0.6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AffinityError {
    #[error("thread already selected as {current}, cannot switch to {requested}")]
    AlreadySelected { current: Thread, requested: Thread },
}

/// The overall alignment read off the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Dominant(Thread),
    /// No thread holds a dominant share, or nothing has been scored yet.
    Balance,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dominant(thread) => write!(f, "{}", thread),
            Self::Balance => f.write_str("balance"),
        }
    }
}

/// One applied change, kept for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffinityRecord {
    pub owner: Thread,
    pub change: AffinityChange,
}

/// Tracks the thread selected for a run and accumulates affinity deltas.
///
/// The tracker does not persist anything; whoever owns the run's game state
/// is responsible for durability.
#[derive(Debug, Clone, Default)]
pub struct AffinityTracker {
    /// Persona reported by `current()` until a thread is selected.
    fallback: Thread,
    selected: Option<Thread>,
    scores: FxHashMap<Thread, i32>,
    history: Vec<AffinityRecord>,
}

impl AffinityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tracker whose `current()` reports `persona` until a selection is made.
    pub fn with_persona(persona: Thread) -> Self {
        Self {
            fallback: persona,
            ..Self::default()
        }
    }

    /// Lock in the run's thread. Selecting the same thread again is a no-op;
    /// switching to a different one is refused.
    pub fn select(&mut self, thread: Thread) -> Result<(), AffinityError> {
        match self.selected {
            Some(current) if current != thread => Err(AffinityError::AlreadySelected {
                current,
                requested: thread,
            }),
            Some(_) => Ok(()),
            None => {
                tracing::info!(%thread, "dreamweaver thread selected");
                self.selected = Some(thread);
                Ok(())
            }
        }
    }

    pub fn selected(&self) -> Option<Thread> {
        self.selected
    }

    /// The persona that should color downstream content right now.
    pub fn current(&self) -> Thread {
        self.selected.unwrap_or(self.fallback)
    }

    pub fn apply_change(&mut self, owner: Thread, change: AffinityChange) {
        let score = self.scores.entry(owner).or_insert(0);
        *score = score.saturating_add(change.amount);
        tracing::debug!(
            %owner,
            amount = change.amount,
            reason = %change.reason,
            total = self.score(owner),
            "affinity changed"
        );
        self.history.push(AffinityRecord { owner, change });
    }

    /// Apply a choice's score map. Unknown persona keys are skipped.
    pub fn apply_scores<'a, I>(&mut self, scores: I, reason: &str)
    where
        I: IntoIterator<Item = (&'a String, &'a i32)>,
    {
        let mut entries: Vec<(Thread, i32)> = Vec::new();
        for (key, points) in scores {
            match Thread::from_persona_key(key) {
                Some(owner) => entries.push((owner, *points)),
                None => tracing::debug!(key = %key, "ignoring score for unknown persona"),
            }
        }
        // Score maps are unordered; apply in thread order so history is stable.
        entries.sort_by_key(|(owner, _)| *owner);
        for (owner, points) in entries {
            self.apply_change(owner, AffinityChange::new(points, reason));
        }
    }

    pub fn score(&self, thread: Thread) -> i32 {
        self.scores.get(&thread).copied().unwrap_or(0)
    }

    /// Sum of all thread scores, saturating at the `i32` bounds.
    pub fn total(&self) -> i32 {
        Thread::ALL
            .iter()
            .fold(0i32, |total, thread| total.saturating_add(self.score(*thread)))
    }

    /// The dominant thread if one holds at least [`DOMINANCE_THRESHOLD`] of
    /// the total; ties go Hero, then Shadow, then Ambition.
    pub fn dominant(&self) -> Alignment {
        let total = self.total();
        if total <= 0 {
            return Alignment::Balance;
        }

        let mut best: Option<(Thread, i32)> = None;
        for thread in Thread::ALL {
            let score = self.score(thread);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((thread, score));
            }
        }

        match best {
            Some((thread, score)) if score as f32 / total as f32 >= DOMINANCE_THRESHOLD => {
                Alignment::Dominant(thread)
            }
            _ => Alignment::Balance,
        }
    }

    /// Human-readable point distribution.
    pub fn summary(&self) -> String {
        let total = self.total();
        if total == 0 {
            return "No choices recorded yet.".to_string();
        }

        let parts: Vec<String> = Thread::ALL
            .iter()
            .map(|thread| {
                let score = self.score(*thread);
                let percent = score as f32 / total as f32 * 100.0;
                format!("{}: {} ({:.1}%)", thread.key(), score, percent)
            })
            .collect();
        format!("{} | total: {}", parts.join(" | "), total)
    }

    pub fn history(&self) -> &[AffinityRecord] {
        &self.history
    }
}
