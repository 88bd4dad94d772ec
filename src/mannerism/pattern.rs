//! Mannerism pattern compiler
//!
//! Turns a literal mannerism into a tolerant, case-insensitive matcher:
//! every character may be drawn out (`d` accepts `ddd`) and consecutive
//! characters may be split by hyphens, periods, commas or whitespace
//! (`d-d, don't`).

use eyre::{Context, Result};
use regex::{Regex, RegexBuilder};

use super::{MannerismRule, Position};

/// Allowed between two required characters
const SEPARATOR: &str = r"[-.,\s]*";

/// Allowed before a `start` mannerism
const LEADING: &str = r"^\s*";

/// Allowed after an `end` mannerism: whitespace, `. , ! ? …` and closing quotes
const TRAILING: &str = r#"[\s.,!?…"'”’]*$"#;

/// A compiled mannerism rule
#[derive(Debug, Clone)]
pub struct MannerismMatcher {
    rule: MannerismRule,
    regex: Regex,
}

impl MannerismMatcher {
    /// Compile a rule. Metacharacters in the pattern are matched literally.
    pub fn compile(rule: &MannerismRule) -> Result<Self> {
        let source = build_source(rule.pattern(), rule.position());
        log::debug!("Compiled mannerism '{}' ({}) to /{}/i", rule.pattern(), rule.position(), source);

        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .context(format!("Failed to compile mannerism '{}'", rule.pattern()))?;

        Ok(Self {
            rule: rule.clone(),
            regex,
        })
    }

    /// Test candidate plain text against the rule
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn rule(&self) -> &MannerismRule {
        &self.rule
    }

    /// The generated regular expression source
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

fn build_source(pattern: &str, position: Position) -> String {
    let body = pattern
        .chars()
        .map(|c| {
            let mut buf = [0u8; 4];
            format!("{}+", regex::escape(c.encode_utf8(&mut buf)))
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR);

    match position {
        Position::Start => format!("{}{}", LEADING, body),
        Position::End => format!("{}{}", body, TRAILING),
        Position::Middle => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSITIONS: [Position; 3] = [Position::Start, Position::Middle, Position::End];

    fn matcher(pattern: &str, position: Position) -> MannerismMatcher {
        let rule = MannerismRule::new(pattern, position).unwrap();
        MannerismMatcher::compile(&rule).unwrap()
    }

    #[test]
    fn test_pattern_matches_itself_in_every_position() {
        for pattern in ["d", "heh", "nyan~", "a.b", "(ok)", "[x]", "$5", "c++", "Ja wohl", "ünd"] {
            for position in POSITIONS {
                let m = matcher(pattern, position);
                assert!(m.is_match(pattern), "{pattern} / {position}");
                assert!(m.is_match(&pattern.to_uppercase()), "{pattern} upper / {position}");
            }
        }
    }

    #[test]
    fn test_single_doubled_characters_match() {
        let pattern = "heh";
        for position in POSITIONS {
            let m = matcher(pattern, position);
            for (i, c) in pattern.char_indices() {
                let mut text = pattern.to_string();
                text.insert(i, c);
                assert!(m.is_match(&text), "{text} / {position}");
            }
        }
    }

    #[test]
    fn test_combined_repetitions_match() {
        let m = matcher("heh", Position::Middle);
        assert!(m.is_match("hheeh"));
        assert!(m.is_match("hhheeeehhh"));
        assert!(m.is_match("HHeEH"));
    }

    #[test]
    fn test_separators_between_characters_match() {
        let m = matcher("dont", Position::Start);
        for text in ["d-o-n-t", "d, o. n t", "d--o ,. n\tt", "d\no\nn\nt", "DDDont"] {
            assert!(m.is_match(text), "{text}");
        }
    }

    #[test]
    fn test_stutter_matches_single_letter() {
        let m = matcher("d", Position::Start);
        assert!(m.is_match("d-d-d-don't do that"));
        assert!(m.is_match("d, d, don't"));
    }

    #[test]
    fn test_start_rejects_leading_content() {
        let m = matcher("heh", Position::Start);
        assert!(m.is_match("heh, you really think that?"));
        assert!(m.is_match("   \theh there"));
        assert!(!m.is_match("well heh"));
        assert!(!m.is_match("x heh"));
        assert!(!m.is_match("1heh"));
    }

    #[test]
    fn test_start_rejects_opening_punctuation() {
        let m = matcher("d", Position::Start);
        for text in ["(d", "\"d", "\"D-d-don't\"", "«don't", "¿don't", "[don't"] {
            assert!(!m.is_match(text), "{text}");
        }
        assert!(m.is_match(" \n d"));
    }

    #[test]
    fn test_end_rejects_trailing_content() {
        let m = matcher("heh", Position::End);
        assert!(m.is_match("that is funny heh"));
        assert!(m.is_match("that is funny heh  \n"));
        assert!(!m.is_match("heh that is funny"));
        assert!(!m.is_match("heh x"));
        assert!(!m.is_match("hehe2"));
    }

    #[test]
    fn test_end_allows_closing_punctuation() {
        let m = matcher("heh", Position::End);
        assert!(m.is_match("You really think that, heh heh?"));
        assert!(m.is_match("Sure... heh!"));
        assert!(m.is_match("\"So it goes, heh.\""));
        assert!(!m.is_match("heh, you really think that?"));
        assert!(!m.is_match("so, heh;"));
        assert!(!m.is_match("(so, heh)"));
    }

    #[test]
    fn test_middle_matches_anywhere() {
        let m = matcher("nya", Position::Middle);
        assert!(m.is_match("I think nya that is fine"));
        assert!(m.is_match("prefix-nyaaa-suffix"));
        assert!(m.is_match("nya"));
        assert!(!m.is_match("nothing here"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let m = matcher("a.b", Position::Middle);
        assert!(!m.is_match("axb"));
        assert!(m.is_match("a.b"));
        assert!(m.is_match("aa..bb"));

        let m = matcher("(x|y)", Position::Middle);
        assert!(!m.is_match("x"));
        assert!(m.is_match("(x|y)"));

        let m = matcher("^$", Position::Middle);
        assert!(!m.is_match(""));
        assert!(m.is_match("costs ^$ today"));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let a = matcher("heh", Position::End);
        let b = matcher("heh", Position::End);
        assert_eq!(a.as_str(), b.as_str());
        assert_eq!(a.rule(), b.rule());
    }

    #[test]
    fn test_generated_source_shape() {
        assert_eq!(build_source("ab", Position::Middle), r"a+[-.,\s]*b+");
        assert!(build_source("ab", Position::Start).starts_with('^'));
        assert!(build_source("ab", Position::End).ends_with('$'));
        assert_eq!(build_source("?", Position::Middle), r"\?+");
    }
}
