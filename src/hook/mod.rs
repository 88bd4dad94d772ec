//! Hook event handling
//!
//! The host fires events before it commits a chat message. Handlers inspect
//! the event payload and either let the message through or block it.

use serde::{Deserialize, Serialize};

use crate::notify::Notification;

pub mod deferred;
pub mod dispatch;
pub mod gate;
pub mod message;

use deferred::DeferredQueue;

/// Hook event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HookEvent {
    PreCreateChatMessage,
}

impl HookEvent {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "precreatechatmessage" | "beforemessagecreate" => Some(Self::PreCreateChatMessage),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreCreateChatMessage => "preCreateChatMessage",
        }
    }
}

/// Result of a hook handler
#[derive(Debug, Clone)]
pub enum HookResult {
    /// Allow the message to be created
    Allow,
    /// Veto creation, tell the user why, and run `deferred` once the host
    /// has finished its own handling
    Block {
        notification: Notification,
        deferred: DeferredQueue,
    },
    /// Error occurred (logged but allows the message)
    Error { message: String },
}

impl HookResult {
    pub fn exit_code(&self) -> i32 {
        match self {
            HookResult::Allow => 0,
            HookResult::Block { .. } => 2,
            HookResult::Error { .. } => 0, // Errors don't block
        }
    }

    // the CLI adapter reads the variant directly
    #[allow(dead_code)]
    pub fn allows(&self) -> bool {
        !matches!(self, HookResult::Block { .. })
    }
}

/// A hook handler
pub trait HookHandler {
    fn name(&self) -> &'static str;
    fn handles(&self, event: HookEvent) -> bool;
    fn handle(&self, event: HookEvent, payload: &serde_json::Value) -> HookResult;
}
