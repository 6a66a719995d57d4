use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three Dreamweaver narrative threads a player can lock in.
///
/// Threads double as persona keys: content sources are keyed by
/// [`Thread::key`], and affinity scores are tracked per thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Thread {
    Hero,
    Shadow,
    Ambition,
}

impl Default for Thread {
    fn default() -> Self {
        Self::Hero
    }
}

impl Thread {
    /// All threads in tiebreak order.
    pub const ALL: [Thread; 3] = [Thread::Hero, Thread::Shadow, Thread::Ambition];

    /// Lowercase content key: "hero", "shadow", "ambition".
    pub fn key(&self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Shadow => "shadow",
            Self::Ambition => "ambition",
        }
    }

    /// Uppercase persona id handed to dynamic content providers.
    pub fn persona_id(&self) -> &'static str {
        match self {
            Self::Hero => "HERO",
            Self::Shadow => "SHADOW",
            Self::Ambition => "AMBITION",
        }
    }

    /// Case-insensitive parse of a thread name. Surrounding whitespace is ignored.
    pub fn parse(name: &str) -> Option<Thread> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|thread| thread.key().eq_ignore_ascii_case(name))
    }

    /// Parse a thread name, falling back to [`Thread::Hero`] for blank or
    /// unknown names.
    pub fn parse_or_default(name: &str) -> Thread {
        Self::parse(name).unwrap_or_default()
    }

    /// Resolve a persona key used in score maps.
    ///
    /// Accepts the thread names plus the alignment names used by score
    /// tables ("light" for the hero thread).
    pub fn from_persona_key(key: &str) -> Option<Thread> {
        if key.trim().eq_ignore_ascii_case("light") {
            return Some(Self::Hero);
        }
        Self::parse(key)
    }
}

impl fmt::Display for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A signed affinity delta attributed to a Dreamweaver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffinityChange {
    pub amount: i32,
    /// Where the change came from (a choice id, "thread-locked", ...).
    pub reason: String,
}

impl AffinityChange {
    pub fn new(amount: i32, reason: impl Into<String>) -> Self {
        Self {
            amount,
            reason: reason.into(),
        }
    }
}
