//! Deferred side effects
//!
//! When the gate vetoes a message the host still tears down its input field
//! as part of the same submission. Actions queued here must run after that
//! handling has completed, never inside the hook itself.

use serde::Serialize;

/// Element id of the host's chat input box
pub const CHAT_INPUT_ID: &str = "chat-message";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DeferredAction {
    /// Put unsent text back into an input element
    RestoreInput { element_id: String, value: String },
}

impl DeferredAction {
    pub fn restore_chat_input(value: &str) -> Self {
        Self::RestoreInput {
            element_id: CHAT_INPUT_ID.to_string(),
            value: value.to_string(),
        }
    }
}

/// Host input surface the restore action writes to
// Used by in-process hosts; the CLI emits the queue as JSON instead
#[allow(dead_code)]
pub trait ChatInput {
    /// Set an element's value. Returns false when the element does not exist.
    fn set_value(&mut self, element_id: &str, value: &str) -> bool;
}

/// Actions to run after the host finishes the current submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeferredQueue {
    actions: Vec<DeferredAction>,
}

impl DeferredQueue {
    pub fn push(&mut self, action: DeferredAction) {
        self.actions.push(action);
    }

    // read by in-process hosts; the CLI serializes the queue
    #[allow(dead_code)]
    pub fn actions(&self) -> &[DeferredAction] {
        &self.actions
    }

    /// Run every action in order; missing elements are skipped. Returns the
    /// number of actions applied.
    // Used by in-process hosts; the CLI emits the queue as JSON instead
    #[allow(dead_code)]
    pub fn run(self, input: &mut dyn ChatInput) -> usize {
        let mut applied = 0;
        for action in self.actions {
            match action {
                DeferredAction::RestoreInput { element_id, value } => {
                    if input.set_value(&element_id, &value) {
                        applied += 1;
                    } else {
                        log::debug!("Input element '{}' not found, nothing restored", element_id);
                    }
                }
            }
        }
        applied
    }
}
