//! Entry tree to markdown rendering.
//!
//! Each top-level entry renders to one chunk; chunks are joined by `"\n"`, or by the markdown
//! hard break `"  \n"` when requested, and the joined text is macro-expanded. Nested containers
//! always join their children with a plain newline.

use crate::constants::ability_name;
use crate::entry::{Die, Entry, Table};
use crate::macros::expand;
use serde_json::Value;

const LINE_BREAK: &str = "\n";
const MARKDOWN_LINE_BREAK: &str = "  \n";
const CELL_SEPARATOR: &str = " - ";

/// Renders a sequence of entries to markdown.
///
/// Order is preserved. Suppressed and unknown entries contribute nothing (unknown ones are logged
/// as warnings).
pub fn render(entries: &[Entry], markdown_line_breaks: bool) -> String {
    let joiner = if markdown_line_breaks {
        MARKDOWN_LINE_BREAK
    } else {
        LINE_BREAK
    };

    let chunks: Vec<String> = entries.iter().filter_map(render_entry).collect();
    expand(&chunks.join(joiner))
}

/// Renders raw JSON. Arrays are rendered as entry sequences; anything else is coerced to its
/// string form and macro-expanded.
pub fn render_value(value: &Value, markdown_line_breaks: bool) -> String {
    match value {
        Value::Array(_) => render(&Entry::sequence(value.clone()), markdown_line_breaks),
        Value::String(text) => expand(text),
        other => expand(&other.to_string()),
    }
}

fn render_entry(entry: &Entry) -> Option<String> {
    match entry {
        Entry::Text(text) => Some(text.clone()),
        Entry::Titled { title, text } => Some(format!("**{}**: {}", title, render(text, false))),
        Entry::Table(table) => Some(render_table(table)),
        Entry::Section { name, entries } => Some(named(name.as_deref(), entries)),
        Entry::Item { name, entry } => Some(named(name.as_deref(), entry)),
        Entry::List { items } => Some(
            items
                .iter()
                .map(|item| format!("- {}", render(std::slice::from_ref(item), false)))
                .collect::<Vec<_>>()
                .join(LINE_BREAK),
        ),
        Entry::AbilityAttackMod { name, attributes } => Some(format!(
            "`{} Attack Bonus = {} modifier + Proficiency Bonus`",
            name,
            ability_list(attributes)
        )),
        Entry::AbilityDc { name, attributes } => Some(format!(
            "`{} Save DC = 8 + {} modifier + Proficiency Bonus`",
            name,
            ability_list(attributes)
        )),
        Entry::Bonus(value) => Some(format!("{value:+}")),
        Entry::Dice(groups) => Some(dice_notation(groups)),
        Entry::BonusSpeed(value) => Some(format!("{value} feet")),
        Entry::Options(_) | Entry::Invocation => None,
        Entry::Unknown(raw) => {
            tracing::warn!("missing entry type parse: {}", raw);
            None
        }
    }
}

fn named(name: Option<&str>, children: &[Entry]) -> String {
    match name {
        Some(name) => format!("**{}**: {}", name, render(children, false)),
        None => render(children, false),
    }
}

fn render_table(table: &Table) -> String {
    let mut lines = Vec::with_capacity(table.rows.len() + 2);

    if let Some(caption) = &table.caption {
        lines.push(format!("**{caption}**"));
    }
    lines.push(
        table
            .columns
            .iter()
            .map(|label| format!("**{}**", cell(label)))
            .collect::<Vec<_>>()
            .join(CELL_SEPARATOR),
    );
    for row in &table.rows {
        lines.push(row.iter().map(cell).collect::<Vec<_>>().join(CELL_SEPARATOR));
    }

    lines.join(LINE_BREAK).trim().to_owned()
}

fn cell(entry: &Entry) -> String {
    render(std::slice::from_ref(entry), false)
}

fn ability_list(codes: &[String]) -> String {
    codes
        .iter()
        .map(|code| ability_name(code).unwrap_or(code.as_str()))
        .collect::<Vec<_>>()
        .join(" or ")
}

fn dice_notation(groups: &[Die]) -> String {
    groups
        .iter()
        .map(|d| format!("{}d{}", d.number, d.faces))
        .collect::<Vec<_>>()
        .join(" + ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(value: Value) -> Vec<Entry> {
        Entry::sequence(value)
    }

    #[test]
    fn joins_top_level_entries_in_order() {
        let tree = entries(json!(["A", "B", "C"]));
        assert_eq!(render(&tree, false), "A\nB\nC");
        assert_eq!(render(&tree, true), "A  \nB  \nC");
    }

    #[test]
    fn order_matches_individual_renders() {
        let tree = entries(json!([
            {"type": "entries", "name": "One", "entries": ["first"]},
            {"type": "bonus", "value": 3},
            {"type": "list", "items": ["x", "y"]}
        ]));
        let joined = tree
            .iter()
            .map(|e| render(std::slice::from_ref(e), false))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(render(&tree, false), joined);
    }

    #[test]
    fn titled_block() {
        let tree = entries(json!([{"title": "Size", "text": "Medium"}]));
        assert_eq!(render(&tree, false), "**Size**: Medium");
    }

    #[test]
    fn named_and_unnamed_sections() {
        let tree = entries(json!([
            {"type": "entries", "name": "Trance", "entries": ["You meditate.", "Four hours."]},
            {"type": "entries", "entries": ["Anonymous."]}
        ]));
        assert_eq!(
            render(&tree, false),
            "**Trance**: You meditate.\nFour hours.\nAnonymous."
        );
    }

    #[test]
    fn item_renders_like_section() {
        let tree = entries(json!([{"type": "item", "name": "Light", "entry": "Bright light."}]));
        assert_eq!(render(&tree, false), "**Light**: Bright light.");
    }

    #[test]
    fn list_renders_bullets() {
        let tree = entries(json!([{"type": "list", "items": ["one", {"type": "bonus", "value": 1}]}]));
        assert_eq!(render(&tree, false), "- one\n- +1");
    }

    #[test]
    fn table_renders_caption_header_and_rows() {
        let tree = entries(json!([{
            "type": "table",
            "caption": "Trinkets",
            "colLabels": ["d4", "Trinket"],
            "rows": [["1", "A bone"], ["2", "{@item rope|phb}"]]
        }]));
        assert_eq!(
            render(&tree, false),
            "**Trinkets**\n**d4** - **Trinket**\n1 - A bone\n2 - rope"
        );
    }

    #[test]
    fn istable_without_caption() {
        let tree = entries(json!([{"istable": true, "thead": ["A"], "tbody": [["1"]]}]));
        assert_eq!(render(&tree, false), "**A**\n1");
    }

    #[test]
    fn formula_variants() {
        let tree = entries(json!([
            {"type": "abilityAttackMod", "name": "Spell", "attributes": ["int", "wis"]},
            {"type": "abilityDc", "name": "Spell", "attributes": ["cha"]},
            {"type": "bonus", "value": -1},
            {"type": "bonusSpeed", "value": 10},
            {"type": "dice", "number": 2, "faces": 6},
            {"type": "dice", "toRoll": [{"number": 1, "faces": 8}, {"number": 2, "faces": 4}]}
        ]));
        assert_eq!(
            render(&tree, false),
            "`Spell Attack Bonus = Intelligence or Wisdom modifier + Proficiency Bonus`\n\
             `Spell Save DC = 8 + Charisma modifier + Proficiency Bonus`\n\
             -1\n\
             10 feet\n\
             2d6\n\
             1d8 + 2d4"
        );
    }

    #[test]
    fn suppressed_and_unknown_entries_are_silent() {
        let tree = entries(json!([
            "before",
            {"type": "options", "entries": ["hidden"]},
            {"type": "invocation", "name": "Agonizing Blast"},
            {"type": "mystery", "payload": [1, 2, 3]},
            "after"
        ]));
        assert_eq!(render(&tree, false), "before\nafter");
    }

    #[test]
    fn macros_are_expanded_after_join() {
        let tree = entries(json!(["You learn {@spell light|phb}.", "{@b Note}"]));
        assert_eq!(render(&tree, false), "You learn light.\n**Note**");
    }

    #[test]
    fn render_value_coerces_scalars() {
        assert_eq!(render_value(&json!(42), false), "42");
        assert_eq!(render_value(&json!("{@i soft}"), false), "*soft*");
        assert_eq!(render_value(&json!(["a", "b"]), true), "a  \nb");
    }

    #[test]
    fn empty_sequence_renders_empty() {
        assert_eq!(render(&[], false), "");
    }
}
