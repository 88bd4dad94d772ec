//! User-visible notifications
//!
//! Notifications carry a localization key plus substitution values; the
//! `Localizer` renders them with `{name}` placeholders.

use colored::*;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;

pub const KEY_INIT: &str = "esm.init";
pub const KEY_VALIDATION_ERROR: &str = "esm.notifications.validationError";
pub const KEY_MANNERISM_SET: &str = "esm.notifications.mannerismSet";
pub const KEY_MANNERISM_CLEARED: &str = "esm.notifications.mannerismCleared";
pub const KEY_UNKNOWN_POSITION: &str = "esm.notifications.unknownPosition";

/// Built-in English templates
const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    (KEY_INIT, "Eventide Speech Mannerisms initialized"),
    (
        KEY_VALIDATION_ERROR,
        "{actor} must use the mannerism \"{mannerism}\" ({position}) in this message.",
    ),
    (KEY_MANNERISM_SET, "Set mannerism \"{mannerism}\" ({position}) for {actor}."),
    (KEY_MANNERISM_CLEARED, "Cleared mannerism for {actor}."),
    (KEY_UNKNOWN_POSITION, "Unknown position \"{position}\", using middle."),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// A transient user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub key: String,
    pub values: IndexMap<String, String>,
}

impl Notification {
    pub fn new(level: Level, key: &str) -> Self {
        Self {
            level,
            key: key.to_string(),
            values: IndexMap::new(),
        }
    }

    pub fn info(key: &str) -> Self {
        Self::new(Level::Info, key)
    }

    pub fn warn(key: &str) -> Self {
        Self::new(Level::Warn, key)
    }

    pub fn error(key: &str) -> Self {
        Self::new(Level::Error, key)
    }

    /// Add a substitution value
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }
}

/// Renders notification keys into text
#[derive(Debug, Clone)]
pub struct Localizer {
    templates: HashMap<String, String>,
}

impl Default for Localizer {
    fn default() -> Self {
        Self {
            templates: DEFAULT_TEMPLATES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl Localizer {
    /// Built-in templates with user overrides on top
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut localizer = Self::default();
        localizer
            .templates
            .extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        localizer
    }

    /// Look up a key without substitution; unknown keys render as themselves
    pub fn localize(&self, key: &str) -> String {
        self.templates.get(key).cloned().unwrap_or_else(|| key.to_string())
    }

    /// Render a template, replacing `{name}` with its value
    pub fn format(&self, key: &str, values: &IndexMap<String, String>) -> String {
        let mut text = self.localize(key);
        for (name, value) in values {
            text = text.replace(&format!("{{{}}}", name), value);
        }
        text
    }

    pub fn render(&self, notification: &Notification) -> String {
        self.format(&notification.key, &notification.values)
    }
}

/// Displays notifications to the user
pub trait Notifier {
    fn notify(&mut self, notification: &Notification);
}

/// Prints notifications to stderr
pub struct ConsoleNotifier {
    localizer: Localizer,
}

impl ConsoleNotifier {
    pub fn new(localizer: Localizer) -> Self {
        Self { localizer }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, notification: &Notification) {
        let text = self.localizer.render(notification);
        match notification.level {
            Level::Info => {
                log::info!("{}", text);
                eprintln!("{} {}", "✓".green(), text);
            }
            Level::Warn => {
                log::warn!("{}", text);
                eprintln!("{} {}", "⚠".yellow(), text);
            }
            Level::Error => {
                log::error!("{}", text);
                eprintln!("{} {}", "✗".red(), text.red());
            }
        }
    }
}
