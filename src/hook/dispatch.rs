//! Hook event dispatching

use super::{HookEvent, HookHandler, HookResult};

/// Dispatch a hook event to all registered handlers; the first block wins
pub fn dispatch(event: HookEvent, payload: &serde_json::Value, handlers: &[Box<dyn HookHandler + '_>]) -> HookResult {
    for handler in handlers {
        if handler.handles(event) {
            let result = handler.handle(event, payload);
            match &result {
                HookResult::Block { notification, .. } => {
                    log::info!("Hook blocked by {}: {}", handler.name(), notification.key);
                    return result;
                }
                HookResult::Error { message } => {
                    log::error!("Hook error in {}: {}", handler.name(), message);
                    // Continue to next handler
                }
                HookResult::Allow => {
                    // Continue to next handler
                }
            }
        }
    }

    HookResult::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::deferred::DeferredQueue;
    use crate::notify::Notification;

    struct Fixed {
        result: fn() -> HookResult,
    }

    impl HookHandler for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn handles(&self, _event: HookEvent) -> bool {
            true
        }

        fn handle(&self, _event: HookEvent, _payload: &serde_json::Value) -> HookResult {
            (self.result)()
        }
    }

    fn block() -> HookResult {
        HookResult::Block {
            notification: Notification::error("blocked"),
            deferred: DeferredQueue::default(),
        }
    }

    fn error() -> HookResult {
        HookResult::Error {
            message: "broken".to_string(),
        }
    }

    #[test]
    fn test_no_handlers_allows() {
        let result = dispatch(HookEvent::PreCreateChatMessage, &serde_json::json!({}), &[]);
        assert!(matches!(result, HookResult::Allow));
    }

    #[test]
    fn test_error_does_not_block() {
        let handlers: Vec<Box<dyn HookHandler>> = vec![Box::new(Fixed { result: error })];
        let result = dispatch(HookEvent::PreCreateChatMessage, &serde_json::json!({}), &handlers);
        assert!(matches!(result, HookResult::Allow));
    }

    #[test]
    fn test_block_after_error() {
        let handlers: Vec<Box<dyn HookHandler>> =
            vec![Box::new(Fixed { result: error }), Box::new(Fixed { result: block })];
        let result = dispatch(HookEvent::PreCreateChatMessage, &serde_json::json!({}), &handlers);
        assert!(matches!(result, HookResult::Block { .. }));
    }
}
