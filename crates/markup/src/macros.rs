//! Inline `{@tag payload}` macro expansion.
//!
//! Two families of tags are understood:
//! - formatting tags (`bold`, `b`, `italic`, `i`) wrap the payload in markdown emphasis
//! - reference tags (`creature`, `item`, `filter`, `spell`, `condition`) reduce a pipe-delimited
//!   payload such as `fireball|phb` to its display name
//!
//! Unknown tags are logged and their payload passed through bare. Expansion repeats until no
//! macro remains, which handles macros nested inside other payloads.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static MACRO_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{@(\w+) (.+?)\}").expect("macro pattern is a valid regex"));

/// Known macro tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MacroTag {
    Bold,
    Italic,
    Creature,
    Item,
    Filter,
    Spell,
    Condition,
}

impl MacroTag {
    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "bold" | "b" => Some(MacroTag::Bold),
            "italic" | "i" => Some(MacroTag::Italic),
            "creature" => Some(MacroTag::Creature),
            "item" => Some(MacroTag::Item),
            "filter" => Some(MacroTag::Filter),
            "spell" => Some(MacroTag::Spell),
            "condition" => Some(MacroTag::Condition),
            _ => None,
        }
    }

    fn apply(self, payload: &str) -> String {
        match self {
            MacroTag::Bold => format!("**{payload}**"),
            MacroTag::Italic => format!("*{payload}*"),
            MacroTag::Creature => last_segment(payload).to_owned(),
            MacroTag::Item | MacroTag::Filter | MacroTag::Spell => {
                first_segment(payload).to_owned()
            }
            MacroTag::Condition => payload.to_owned(),
        }
    }
}

/// Expands every `{@tag payload}` macro in `text`.
///
/// The result contains no macro spans, so `expand(&expand(s)) == expand(s)`.
pub fn expand(text: &str) -> String {
    let mut current = text.to_owned();

    // Each pass removes at least one `{` and never adds one, so this many passes always settle.
    let max_passes = text.matches('{').count() + 1;

    for _ in 0..max_passes {
        if !MACRO_PATTERN.is_match(&current) {
            return current;
        }
        current = MACRO_PATTERN
            .replace_all(&current, |caps: &Captures<'_>| expand_span(&caps[1], &caps[2]))
            .into_owned();
    }

    if MACRO_PATTERN.is_match(&current) {
        tracing::warn!(
            "macro expansion did not settle after {} passes: {}",
            max_passes,
            current
        );
    }
    current
}

fn expand_span(tag: &str, payload: &str) -> String {
    match MacroTag::parse(tag) {
        Some(known) => known.apply(payload),
        None => {
            tracing::warn!("unknown macro tag: {}", tag);
            payload.to_owned()
        }
    }
}

fn first_segment(payload: &str) -> &str {
    payload.split('|').next().unwrap_or(payload)
}

fn last_segment(payload: &str) -> &str {
    payload.rsplit('|').next().unwrap_or(payload)
}
