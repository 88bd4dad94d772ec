//! Speech mannerism gate
//!
//! Runs before a chat message is created and vetoes in-character lines that
//! do not follow the speaking actor's mannerism. Every condition other than
//! a failed match lets the message through.

use super::deferred::{DeferredAction, DeferredQueue};
use super::message::PreCreateRequest;
use super::{HookEvent, HookHandler, HookResult};
use crate::mannerism::extract::extract_text;
use crate::mannerism::pattern::MannerismMatcher;
use crate::notify::{KEY_VALIDATION_ERROR, Notification};
use crate::store::{ActorDirectory, FlagStore, load_rule};

/// Mannerism gate hook handler
pub struct MannerismGate<'a> {
    actors: &'a dyn ActorDirectory,
    flags: &'a dyn FlagStore,
    local_user: Option<String>,
    validate_all_styles: bool,
}

impl<'a> MannerismGate<'a> {
    pub fn new(actors: &'a dyn ActorDirectory, flags: &'a dyn FlagStore) -> Self {
        Self {
            actors,
            flags,
            local_user: None,
            validate_all_styles: false,
        }
    }

    /// Only submissions from this user are evaluated. Without one nothing is.
    pub fn with_local_user(mut self, user_id: Option<String>) -> Self {
        self.local_user = user_id;
        self
    }

    /// Also validate OOC, emote, whisper and roll messages
    pub fn with_validate_all_styles(mut self, enabled: bool) -> Self {
        self.validate_all_styles = enabled;
        self
    }

    /// Decide whether the message may be created
    pub fn evaluate(&self, request: &PreCreateRequest) -> HookResult {
        let Some(local) = &self.local_user else {
            log::warn!("No local user configured, allowing message from {}", request.user_id);
            return HookResult::Allow;
        };
        if request.user_id != *local {
            log::debug!("Ignoring message from user {} (local user is {})", request.user_id, local);
            return HookResult::Allow;
        }

        let message = &request.message;
        if !self.validate_all_styles && !message.is_in_character() {
            log::debug!("Not an in-character message ({:?}), skipping", message.style);
            return HookResult::Allow;
        }

        let Some(actor_id) = message.speaker.actor.as_deref() else {
            log::debug!("Message from {:?} has no speaking actor", message.speaker.alias);
            return HookResult::Allow;
        };
        let Some(actor) = self.actors.resolve(actor_id) else {
            log::debug!("Speaker actor {} not found", actor_id);
            return HookResult::Allow;
        };
        let Some(rule) = load_rule(self.flags, &actor.id) else {
            return HookResult::Allow;
        };

        let matcher = match MannerismMatcher::compile(&rule) {
            Ok(m) => m,
            Err(e) => {
                return HookResult::Error {
                    message: format!("{:#}", e),
                };
            }
        };

        let text = extract_text(&message.content);
        if matcher.is_match(&text) {
            log::debug!("{} followed mannerism '{}'", actor.name, rule.pattern());
            return HookResult::Allow;
        }

        log::info!(
            "Vetoed message from {}: missing mannerism '{}' ({})",
            actor.name,
            rule.pattern(),
            rule.position()
        );

        let notification = Notification::error(KEY_VALIDATION_ERROR)
            .with("actor", &actor.name)
            .with("mannerism", rule.pattern())
            .with("position", rule.position().as_str());

        let mut deferred = DeferredQueue::default();
        deferred.push(DeferredAction::restore_chat_input(&message.content));

        HookResult::Block { notification, deferred }
    }
}

impl HookHandler for MannerismGate<'_> {
    fn name(&self) -> &'static str {
        "mannerism"
    }

    fn handles(&self, event: HookEvent) -> bool {
        event == HookEvent::PreCreateChatMessage
    }

    fn handle(&self, _event: HookEvent, payload: &serde_json::Value) -> HookResult {
        match serde_json::from_value::<PreCreateRequest>(payload.clone()) {
            Ok(request) => self.evaluate(&request),
            Err(e) => HookResult::Error {
                message: format!("Unreadable preCreateChatMessage payload: {}", e),
            },
        }
    }
}
