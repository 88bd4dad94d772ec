//! Message text extraction
//!
//! Reduces a markup-bearing chat body to its text content, the way a DOM
//! `textContent` read would: tags are dropped, text and CDATA are kept in
//! document order, character references are decoded. Nothing is evaluated.

use lazy_regex::regex;
use quick_xml::Reader;
use quick_xml::escape::{resolve_html5_entity, resolve_predefined_entity, unescape_with};
use quick_xml::events::Event;

/// Extract plain text from a message body
pub fn extract_text(body: &str) -> String {
    if !body.contains('<') && !body.contains('&') {
        return body.to_string();
    }

    // A bare `<` would be read as a nameless tag
    if regex!(r"<(?:[^A-Za-z!?/]|$)").is_match(body) {
        return strip_tags(body);
    }

    match extract_markup(body) {
        Some(text) => text,
        None => {
            log::debug!("Message body is not well-formed markup, stripping tags by pattern");
            strip_tags(body)
        }
    }
}

fn resolve_entity(entity: &str) -> Option<&'static str> {
    resolve_predefined_entity(entity).or_else(|| resolve_html5_entity(entity))
}

/// Walk the body as a markup event stream. `None` when it cannot be parsed.
fn extract_markup(body: &str) -> Option<String> {
    let mut reader = Reader::from_str(body);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.check_comments = false;

    let mut out = String::with_capacity(body.len());
    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => match e.unescape_with(resolve_entity) {
                Ok(text) => out.push_str(&text),
                Err(_) => out.push_str(&decode_references(&String::from_utf8_lossy(&e))),
            },
            Ok(Event::CData(e)) => out.push_str(&String::from_utf8_lossy(&e)),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                log::debug!("Markup parse stopped at {}: {}", reader.buffer_position(), e);
                return None;
            }
        }
    }

    Some(out)
}

/// Decode each well-formed reference on its own, leaving stray `&` as is
fn decode_references(text: &str) -> String {
    regex!(r"&(#[0-9]+|#[xX][0-9A-Fa-f]+|[A-Za-z][A-Za-z0-9]*);")
        .replace_all(text, |caps: &lazy_regex::Captures| {
            let reference = &caps[0];
            match unescape_with(reference, resolve_entity) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => reference.to_string(),
            }
        })
        .into_owned()
}

fn strip_tags(body: &str) -> String {
    let stripped = regex!(r"(?s)<!--.*?-->|</?[A-Za-z!?/][^>]*>").replace_all(body, "");
    match unescape_with(&stripped, resolve_entity) {
        Ok(text) => text.into_owned(),
        Err(_) => decode_references(&stripped),
    }
}
