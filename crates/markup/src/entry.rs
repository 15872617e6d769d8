//! Entry tree model.
//!
//! Rules documents are JSON trees whose nodes are discriminated partly by a `type` key and partly
//! by which keys are present. [`Entry`] lifts that into an explicit sum type at the boundary so
//! the renderer can match exhaustively instead of probing keys.
//!
//! Parsing never fails: any node that does not fit a known shape becomes [`Entry::Unknown`] and
//! keeps its raw JSON for diagnostics.

use serde_json::{Map, Value};

/// One node of an authored rules document.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    /// A bare string or number, rendered as-is.
    Text(String),

    /// An untyped block with `title` and `text`.
    Titled { title: String, text: Vec<Entry> },

    /// A `type=table` block, or an untyped block flagged with `istable`.
    Table(Table),

    /// A `type=entries` block, or an untyped block with a name and nested entries.
    Section {
        name: Option<String>,
        entries: Vec<Entry>,
    },

    /// A `type=item` block holding a single nested entry.
    Item { name: Option<String>, entry: Vec<Entry> },

    /// A `type=list` block; one bullet per item.
    List { items: Vec<Entry> },

    /// Spell or feature attack bonus formula.
    AbilityAttackMod { name: String, attributes: Vec<String> },

    /// Spell or feature save DC formula.
    AbilityDc { name: String, attributes: Vec<String> },

    /// A signed numeric bonus.
    Bonus(i64),

    /// One or more groups of dice.
    Dice(Vec<Die>),

    /// A speed bonus in feet.
    BonusSpeed(i64),

    /// Option groups. Compiled by dedicated paths, never by the generic renderer.
    Options(Vec<Entry>),

    /// Invocation bodies, which only appear inside option groups.
    Invocation,

    /// Anything not recognised above, kept verbatim for logging.
    Unknown(Value),
}

/// Caption, header row and body rows of a table entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub caption: Option<String>,
    pub columns: Vec<Entry>,
    pub rows: Vec<Vec<Entry>>,
}

/// A single `NdF` dice group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Die {
    pub number: u32,
    pub faces: u32,
}

impl Entry {
    /// Converts a raw JSON value into an entry, degrading to [`Entry::Unknown`] on any shape
    /// mismatch.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => Entry::Text(text),
            Value::Number(number) => Entry::Text(number.to_string()),
            Value::Bool(true) => Entry::Text("True".into()),
            Value::Bool(false) => Entry::Text("False".into()),
            Value::Object(map) => Self::from_object(map),
            other => Entry::Unknown(other),
        }
    }

    /// Converts a JSON array into entries. A lone scalar is treated as a one-element sequence.
    pub fn sequence(value: Value) -> Vec<Entry> {
        match value {
            Value::Array(items) => items.into_iter().map(Entry::from_value).collect(),
            Value::Null => Vec::new(),
            other => vec![Entry::from_value(other)],
        }
    }

    fn from_object(map: Map<String, Value>) -> Self {
        let parsed = match map.get("type").and_then(Value::as_str) {
            None => untyped(&map),
            Some("entries") => Some(Entry::Section {
                name: text_field(&map, "name"),
                entries: children(&map, "entries"),
            }),
            Some("item") => Some(Entry::Item {
                name: text_field(&map, "name"),
                entry: if map.contains_key("entry") {
                    children(&map, "entry")
                } else {
                    children(&map, "entries")
                },
            }),
            Some("list") => map.get("items").map(|items| Entry::List {
                items: Entry::sequence(items.clone()),
            }),
            Some("table") => table(&map, "colLabels", "rows"),
            Some("options") => Some(Entry::Options(children(&map, "entries"))),
            Some("invocation") => Some(Entry::Invocation),
            Some("abilityAttackMod") => formula(&map).map(|(name, attributes)| {
                Entry::AbilityAttackMod { name, attributes }
            }),
            Some("abilityDc") => {
                formula(&map).map(|(name, attributes)| Entry::AbilityDc { name, attributes })
            }
            Some("bonus") => map.get("value").and_then(Value::as_i64).map(Entry::Bonus),
            Some("dice") => dice(&map),
            Some("bonusSpeed") => map.get("value").and_then(Value::as_i64).map(Entry::BonusSpeed),
            Some(_) => None,
        };

        parsed.unwrap_or(Entry::Unknown(Value::Object(map)))
    }
}

impl<'de> serde::Deserialize<'de> for Entry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Entry::from_value(value))
    }
}

fn untyped(map: &Map<String, Value>) -> Option<Entry> {
    if let Some(title) = map.get("title") {
        return Some(Entry::Titled {
            title: scalar_text(title),
            text: children(map, "text"),
        });
    }
    if map.contains_key("istable") {
        return table(map, "thead", "tbody");
    }
    if map.contains_key("entries") || map.contains_key("name") {
        return Some(Entry::Section {
            name: text_field(map, "name"),
            entries: children(map, "entries"),
        });
    }
    None
}

fn table(map: &Map<String, Value>, columns_key: &str, rows_key: &str) -> Option<Entry> {
    let rows = map.get(rows_key)?.as_array()?;
    let rows = rows
        .iter()
        .map(|row| Entry::sequence(row.clone()))
        .collect();

    Some(Entry::Table(Table {
        caption: text_field(map, "caption"),
        columns: children(map, columns_key),
        rows,
    }))
}

fn formula(map: &Map<String, Value>) -> Option<(String, Vec<String>)> {
    let name = text_field(map, "name")?;
    let attributes = map
        .get("attributes")?
        .as_array()?
        .iter()
        .map(scalar_text)
        .collect();
    Some((name, attributes))
}

fn dice(map: &Map<String, Value>) -> Option<Entry> {
    if let Some(groups) = map.get("toRoll") {
        let dice = groups
            .as_array()?
            .iter()
            .map(|group| group.as_object().and_then(die))
            .collect::<Option<Vec<_>>>()?;
        return Some(Entry::Dice(dice));
    }
    die(map).map(|d| Entry::Dice(vec![d]))
}

fn die(map: &Map<String, Value>) -> Option<Die> {
    let number = map.get("number")?.as_u64()?;
    let faces = map.get("faces")?.as_u64()?;
    Some(Die {
        number: u32::try_from(number).ok()?,
        faces: u32::try_from(faces).ok()?,
    })
}

fn children(map: &Map<String, Value>, key: &str) -> Vec<Entry> {
    map.get(key)
        .cloned()
        .map(Entry::sequence)
        .unwrap_or_default()
}

fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).filter(|v| !v.is_null()).map(scalar_text)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
