//! Speech mannerism rules
//!
//! A mannerism is a short literal text an actor's dialogue must contain,
//! begin with, or end with. Rules live in the actor's flags under the
//! module namespace and are read through [`MannerismRule::from_flags`].

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod extract;
pub mod pattern;

/// Flag namespace owned by this module
pub const MODULE_ID: &str = "eventide-speech-mannerisms";

/// Flag key holding the mannerism text
pub const FLAG_MANNERISM: &str = "mannerism";

/// Flag key holding the position mode
pub const FLAG_POSITION: &str = "position";

/// Where in the message the mannerism must appear
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Start,
    #[default]
    Middle,
    End,
}

impl Position {
    /// Parse a stored position flag. Unknown or missing values mean `Middle`.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("start") => Self::Start,
            Some("end") => Self::End,
            _ => Self::Middle,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An active mannerism rule. The pattern is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MannerismRule {
    pattern: String,
    position: Position,
}

impl MannerismRule {
    /// Build a rule; an empty pattern means the feature is disabled.
    pub fn new(pattern: impl Into<String>, position: Position) -> Option<Self> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return None;
        }
        Some(Self { pattern, position })
    }

    /// Build a rule from the raw `mannerism` and `position` flag values
    pub fn from_flags(mannerism: Option<&str>, position: Option<&str>) -> Option<Self> {
        Self::new(mannerism?, Position::parse_lenient(position))
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn position(&self) -> Position {
        self.position
    }
}
