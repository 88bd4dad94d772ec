use colored::*;
use eyre::{Context, Result};
use serde::Serialize;
use std::io::{self, Read, Write};

use crate::cli::HookAction;
use crate::config::Config;
use crate::hook::deferred::DeferredQueue;
use crate::hook::dispatch::dispatch as dispatch_event;
use crate::hook::gate::MannerismGate;
use crate::hook::{HookEvent, HookHandler, HookResult};
use crate::notify::{ConsoleNotifier, Localizer, Notification, Notifier};
use crate::store::YamlStore;

/// Exit codes for hook dispatch
pub const EXIT_ALLOW: i32 = 0;
pub const EXIT_BLOCK: i32 = 2;

pub fn run(action: HookAction, config: &Config) -> Result<()> {
    match action {
        HookAction::Dispatch { event, payload, user } => dispatch(&event, payload.as_deref(), user, config),
        HookAction::List { event } => list(event.as_deref()),
    }
}

#[derive(Debug, Serialize)]
struct RenderedNotification {
    #[serde(flatten)]
    notification: Notification,
    text: String,
}

/// What the host adapter reads back on stdout
#[derive(Debug, Serialize)]
struct HookResponse {
    allow: bool,
    notifications: Vec<RenderedNotification>,
    /// Run by the host after it finishes the current submission
    deferred: DeferredQueue,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl HookResponse {
    fn allow() -> Self {
        Self {
            allow: true,
            notifications: Vec::new(),
            deferred: DeferredQueue::default(),
            error: None,
        }
    }

    fn from_result(result: HookResult, localizer: &Localizer) -> Self {
        match result {
            HookResult::Allow => Self::allow(),
            HookResult::Block { notification, deferred } => Self {
                allow: false,
                notifications: vec![RenderedNotification {
                    text: localizer.render(&notification),
                    notification,
                }],
                deferred,
                error: None,
            },
            HookResult::Error { message } => Self {
                error: Some(message),
                ..Self::allow()
            },
        }
    }

    fn exit_code(&self) -> i32 {
        if self.allow { EXIT_ALLOW } else { EXIT_BLOCK }
    }
}

fn read_payload(payload: Option<&str>) -> Result<serde_json::Value> {
    let payload_str = match payload {
        Some(p) => p.to_string(),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read payload from stdin")?;
            buffer
        }
    };

    serde_json::from_str(&payload_str).context("Failed to parse payload JSON")
}

/// Evaluate one event. Failures of the adapter itself never block the message.
fn evaluate(event: &str, payload: Option<&str>, user: Option<String>, config: &Config) -> HookResponse {
    let Some(event) = HookEvent::from_str(event) else {
        log::warn!("No handlers for hook event '{}'", event);
        return HookResponse::allow();
    };

    let payload = match read_payload(payload) {
        Ok(p) => p,
        Err(e) => {
            log::error!("{:#}", e);
            return HookResponse {
                error: Some(format!("{:#}", e)),
                ..HookResponse::allow()
            };
        }
    };

    log::info!("Dispatching hook event: {}", event.as_str());
    log::debug!("Payload: {}", payload);

    let store = match YamlStore::open(config.store_path()) {
        Ok(s) => s,
        Err(e) => {
            log::error!("{:#}", e);
            return HookResponse {
                error: Some(format!("{:#}", e)),
                ..HookResponse::allow()
            };
        }
    };

    let local_user = user.or_else(|| config.gate.local_user.clone());

    let gate = MannerismGate::new(&store, &store)
        .with_local_user(local_user)
        .with_validate_all_styles(config.gate.validate_all_styles);
    let handlers: Vec<Box<dyn HookHandler + '_>> = vec![Box::new(gate)];

    let result = dispatch_event(event, &payload, &handlers);
    HookResponse::from_result(result, &Localizer::with_overrides(&config.messages))
}

fn dispatch(event: &str, payload: Option<&str>, user: Option<String>, config: &Config) -> Result<()> {
    let response = evaluate(event, payload, user, config);

    let mut notifier = ConsoleNotifier::new(Localizer::with_overrides(&config.messages));
    for rendered in &response.notifications {
        notifier.notify(&rendered.notification);
    }

    let mut stdout = io::stdout();
    writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
    stdout.flush()?;

    // EXIT_ALLOW (0) = create the message
    // EXIT_BLOCK (2) = veto it
    std::process::exit(response.exit_code());
}

fn list(event_filter: Option<&str>) -> Result<()> {
    println!("{}", "Registered hook handlers:".bold());
    println!();

    let events = match event_filter {
        Some(name) => match HookEvent::from_str(name) {
            Some(event) => vec![event],
            None => {
                println!("  {} Unknown event: {}", "⚠".yellow(), name);
                return Ok(());
            }
        },
        None => vec![HookEvent::PreCreateChatMessage],
    };

    for event in events {
        println!("  {}", event.as_str().cyan());
        println!("    {} mannerism", "•".green());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mannerism::Position;
    use crate::store::save_rule;
    use serde_json::json;
    use tempfile::TempDir;

    fn config_with_store(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.store = dir.path().join("actors.yaml");

        let mut store = YamlStore::open(&config.paths.store).unwrap();
        store.upsert_actor("a1", "Gus");
        save_rule(&mut store, "a1", "heh", Position::End).unwrap();
        store.save().unwrap();
        config
    }

    fn payload(content: &str, user: &str) -> String {
        json!({
            "message": {"content": content, "style": "ic", "speaker": {"actor": "a1"}},
            "user_id": user,
        })
        .to_string()
    }

    #[test]
    fn test_veto_response() {
        let dir = TempDir::new().unwrap();
        let config = config_with_store(&dir);
        let response = evaluate(
            "preCreateChatMessage",
            Some(&payload("heh, no", "u1")),
            Some("u1".to_string()),
            &config,
        );

        assert!(!response.allow);
        assert_eq!(response.exit_code(), EXIT_BLOCK);
        assert_eq!(
            response.notifications[0].text,
            "Gus must use the mannerism \"heh\" (end) in this message."
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["deferred"][0]["action"], "restore_input");
        assert_eq!(json["deferred"][0]["value"], "heh, no");
        assert_eq!(json["notifications"][0]["level"], "error");
    }

    #[test]
    fn test_allow_response() {
        let dir = TempDir::new().unwrap();
        let config = config_with_store(&dir);
        let response = evaluate(
            "beforeMessageCreate",
            Some(&payload("no, heh", "u1")),
            Some("u1".to_string()),
            &config,
        );
        assert!(response.allow);
        assert_eq!(response.exit_code(), EXIT_ALLOW);
        assert!(response.deferred.actions().is_empty());
    }

    #[test]
    fn test_other_user_is_allowed() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_store(&dir);
        config.gate.local_user = Some("u1".to_string());
        let response = evaluate("preCreateChatMessage", Some(&payload("heh, no", "u2")), None, &config);
        assert!(response.allow);
    }

    #[test]
    fn test_missing_local_user_allows() {
        let dir = TempDir::new().unwrap();
        let config = config_with_store(&dir);
        let response = evaluate("preCreateChatMessage", Some(&payload("heh, no", "u2")), None, &config);
        assert!(response.allow);
        assert_eq!(response.exit_code(), EXIT_ALLOW);
    }

    #[test]
    fn test_bad_payload_fails_open() {
        let dir = TempDir::new().unwrap();
        let config = config_with_store(&dir);
        let response = evaluate("preCreateChatMessage", Some("{not json"), None, &config);
        assert!(response.allow);
        assert!(response.error.is_some());
    }

    #[test]
    fn test_unknown_event_allows() {
        let dir = TempDir::new().unwrap();
        let config = config_with_store(&dir);
        let response = evaluate("renderChatMessage", Some("{}"), None, &config);
        assert!(response.allow);
        assert!(response.error.is_none());
    }

    #[test]
    fn test_corrupt_store_fails_open() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.store = dir.path().join("actors.yaml");
        std::fs::write(&config.paths.store, "actors: [unclosed").unwrap();

        let response = evaluate("preCreateChatMessage", Some(&payload("x", "u1")), None, &config);
        assert!(response.allow);
        assert!(response.error.is_some());
    }
}
