//! Actor mannerism management

use colored::*;
use eyre::Result;
use serde::Serialize;

use crate::cli::{OutputFormat, RuleAction};
use crate::config::Config;
use crate::mannerism::{FLAG_MANNERISM, FLAG_POSITION, MODULE_ID, Position};
use crate::notify::{
    ConsoleNotifier, KEY_MANNERISM_CLEARED, KEY_MANNERISM_SET, KEY_UNKNOWN_POSITION, Localizer, Notification, Notifier,
};
use crate::store::{ActorDirectory, FlagStore, YamlStore, clear_rule, load_rule, save_rule};

pub fn run(action: RuleAction, config: &Config) -> Result<()> {
    let mut store = YamlStore::open(config.store_path())?;
    let mut notifier = ConsoleNotifier::new(Localizer::with_overrides(&config.messages));

    match action {
        RuleAction::Set {
            actor,
            mannerism,
            position,
            name,
        } => {
            for n in set(&mut store, &actor, &mannerism, &position, name.as_deref())? {
                notifier.notify(&n);
            }
            Ok(())
        }
        RuleAction::Clear { actor } => {
            let n = clear(&mut store, &actor)?;
            notifier.notify(&n);
            Ok(())
        }
        RuleAction::Show { actor, format } => show(&store, &actor, OutputFormat::resolve(format)),
        RuleAction::List { format } => list(&store, OutputFormat::resolve(format)),
    }
}

/// One actor's raw flags, as displayed
#[derive(Debug, Serialize)]
struct RuleView {
    actor: String,
    name: String,
    mannerism: Option<String>,
    position: Option<String>,
}

impl RuleView {
    fn load(store: &YamlStore, actor_id: &str, name: &str) -> Self {
        Self {
            actor: actor_id.to_string(),
            name: name.to_string(),
            mannerism: store.get_flag(actor_id, MODULE_ID, FLAG_MANNERISM),
            position: store.get_flag(actor_id, MODULE_ID, FLAG_POSITION),
        }
    }
}

fn is_known_position(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "start" | "middle" | "end")
}

/// Store a mannerism and save; returns the notifications to show
fn set(
    store: &mut YamlStore,
    actor_id: &str,
    mannerism: &str,
    position: &str,
    name: Option<&str>,
) -> Result<Vec<Notification>> {
    if let Some(name) = name {
        store.upsert_actor(actor_id, name);
    }
    let Some(actor) = store.resolve(actor_id) else {
        eyre::bail!("Unknown actor: {} (pass --name to add it)", actor_id);
    };

    let mut notifications = Vec::new();
    if !is_known_position(position) {
        notifications.push(Notification::warn(KEY_UNKNOWN_POSITION).with("position", position));
    }
    let position = Position::parse_lenient(Some(position));

    save_rule(store, actor_id, mannerism, position)?;
    store.save()?;

    if mannerism.is_empty() {
        log::info!("Cleared mannerism for {}", actor_id);
        notifications.push(Notification::info(KEY_MANNERISM_CLEARED).with("actor", &actor.name));
    } else {
        log::info!("Set mannerism '{}' ({}) for {}", mannerism, position, actor_id);
        notifications.push(
            Notification::info(KEY_MANNERISM_SET)
                .with("actor", &actor.name)
                .with("mannerism", mannerism)
                .with("position", position.as_str()),
        );
    }
    Ok(notifications)
}

fn clear(store: &mut YamlStore, actor_id: &str) -> Result<Notification> {
    let Some(actor) = store.resolve(actor_id) else {
        eyre::bail!("Unknown actor: {}", actor_id);
    };

    clear_rule(store, actor_id)?;
    store.save()?;

    log::info!("Cleared mannerism for {}", actor_id);
    Ok(Notification::info(KEY_MANNERISM_CLEARED).with("actor", &actor.name))
}

fn print_views(views: &[RuleView], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(views)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(views)?),
        OutputFormat::Text => {
            if views.is_empty() {
                println!("{}", "No actors in store".dimmed());
                return Ok(());
            }
            for view in views {
                match (&view.mannerism, &view.position) {
                    (Some(m), position) if !m.is_empty() => {
                        let position = Position::parse_lenient(position.as_deref());
                        println!("  {} {} \"{}\" ({})", view.name.bold(), view.actor.dimmed(), m.cyan(), position);
                    }
                    _ => println!("  {} {} {}", view.name.bold(), view.actor.dimmed(), "no mannerism".dimmed()),
                }
            }
        }
    }
    Ok(())
}

fn show(store: &YamlStore, actor_id: &str, format: OutputFormat) -> Result<()> {
    let Some(actor) = store.resolve(actor_id) else {
        eyre::bail!("Unknown actor: {}", actor_id);
    };
    let view = RuleView::load(store, &actor.id, &actor.name);
    match format {
        OutputFormat::Text => print_views(std::slice::from_ref(&view), format)?,
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&view)?),
    }
    Ok(())
}

fn list(store: &YamlStore, format: OutputFormat) -> Result<()> {
    let views: Vec<RuleView> = store
        .actors()
        .map(|(id, record)| RuleView::load(store, id, &record.name))
        .collect();

    if format == OutputFormat::Text {
        println!("{}", "Actor mannerisms:".bold());
        println!();
        let active = store.actors().filter(|(id, _)| load_rule(store, id).is_some()).count();
        print_views(&views, format)?;
        println!();
        println!("  {} of {} actors have a mannerism", active, views.len());
        println!("  Store: {}", store.path().display().to_string().dimmed());
        return Ok(());
    }

    print_views(&views, format)
}
