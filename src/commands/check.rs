use colored::*;
use eyre::{Context, Result};
use std::io::{self, Read};

use crate::cli::PositionArg;
use crate::mannerism::extract::extract_text;
use crate::mannerism::pattern::MannerismMatcher;
use crate::mannerism::{MannerismRule, Position};

pub fn run(pattern: &str, position: PositionArg, text: Option<&str>, verbose: bool) -> Result<()> {
    let body = match text {
        Some(t) => t.to_string(),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read message from stdin")?;
            buffer
        }
    };

    let Some(rule) = MannerismRule::new(pattern, Position::from(position)) else {
        println!("{} Empty mannerism, nothing to check", "⚠".yellow());
        return Ok(());
    };

    let matcher = MannerismMatcher::compile(&rule)?;
    let plain = extract_text(&body);

    if verbose {
        println!("Regex: /{}/i", matcher.as_str().dimmed());
        println!("Text:  {}", plain.dimmed());
        println!();
    }

    if matcher.is_match(&plain) {
        println!(
            "{} Follows mannerism \"{}\" ({})",
            "✓".green(),
            matcher.rule().pattern().cyan(),
            matcher.rule().position()
        );
        Ok(())
    } else {
        println!(
            "{} Missing mannerism \"{}\" ({})",
            "✗".red(),
            matcher.rule().pattern().cyan(),
            matcher.rule().position()
        );
        std::process::exit(2);
    }
}
