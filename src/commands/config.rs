use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "Mannerisms Configuration".bold());
            println!();

            println!("{}:", "paths".cyan());
            println!("  store: {}", config.store_path().display());
            println!();

            println!("{}:", "gate".cyan());
            println!(
                "  local_user: {}",
                config.gate.local_user.as_deref().unwrap_or("(unset, nothing is checked)")
            );
            println!("  validate_all_styles: {}", config.gate.validate_all_styles);
            println!();

            println!("log_level: {}", config.log_level.as_filter());
            if !config.messages.is_empty() {
                println!("{}: {} overrides", "messages".cyan(), config.messages.len());
            }
        }
    }

    Ok(())
}

fn value_of(key: &str, config: &Config) -> Option<String> {
    match key {
        "paths.store" => Some(config.store_path().display().to_string()),
        "gate.local_user" => Some(config.gate.local_user.clone().unwrap_or_default()),
        "gate.validate_all_styles" => Some(config.gate.validate_all_styles.to_string()),
        "log_level" | "log-level" => Some(config.log_level.as_filter().to_string()),
        _ => key
            .strip_prefix("messages.")
            .and_then(|k| config.messages.get(k).cloned()),
    }
}

fn get(key: &str, config: &Config) -> Result<()> {
    match value_of(key, config) {
        Some(v) => println!("{}", v),
        None => {
            eprintln!("{} Unknown config key: {}", "✗".red(), key);
            std::process::exit(1);
        }
    }

    Ok(())
}
