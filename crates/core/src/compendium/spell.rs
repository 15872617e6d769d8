//! Spell view over raw rules data.
//!
//! Spells are read through a wire struct and normalised on the way in: class lists may arrive as
//! comma-separated strings, and a concentration spell's duration is rewritten to say so.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const CONCENTRATION_PREFIX: &str = "Concentration, up to ";

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Concentration, up to )?(\d+) (\w+)").expect("duration pattern is a valid regex")
});

static MATERIAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]+)\)").expect("material pattern is a valid regex"));

/// A spell in the compendium.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "SpellWire")]
pub struct Spell {
    pub name: String,
    pub level: u8,
    /// One-letter school code (`"V"` for evocation).
    pub school: String,
    pub casting_time: String,
    pub range: String,
    pub components: String,
    pub duration: String,
    pub description: String,
    pub classes: Vec<String>,
    pub subclasses: Vec<String>,
    pub ritual: bool,
    pub higher_levels: Option<String>,
    pub source: String,
    pub page: Option<u32>,
    pub concentration: bool,
    pub srd: bool,
    pub image: Option<String>,
}

#[derive(Deserialize)]
struct SpellWire {
    name: String,
    #[serde(default)]
    level: u8,
    #[serde(default)]
    school: String,
    #[serde(default, alias = "time")]
    casttime: String,
    #[serde(default)]
    range: String,
    #[serde(default)]
    components: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    classes: NameList,
    #[serde(default)]
    subclasses: NameList,
    #[serde(default)]
    ritual: bool,
    #[serde(default)]
    higherlevels: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    concentration: bool,
    #[serde(default)]
    srd: bool,
    #[serde(default)]
    image: Option<String>,
}

/// A list of names given either as a JSON array or a comma-separated string.
#[derive(Default, Deserialize)]
#[serde(untagged)]
enum NameList {
    #[default]
    Missing,
    Joined(String),
    Listed(Vec<String>),
}

impl NameList {
    fn into_names(self) -> Vec<String> {
        match self {
            NameList::Missing => Vec::new(),
            NameList::Joined(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
            NameList::Listed(names) => names,
        }
    }
}

impl From<SpellWire> for Spell {
    fn from(wire: SpellWire) -> Self {
        let duration = if wire.concentration && !wire.duration.starts_with(CONCENTRATION_PREFIX) {
            format!("{CONCENTRATION_PREFIX}{}", wire.duration)
        } else {
            wire.duration
        };

        Spell {
            name: wire.name,
            level: wire.level,
            school: wire.school,
            casting_time: wire.casttime,
            range: wire.range,
            components: wire.components,
            duration,
            description: wire.description,
            classes: wire.classes.into_names(),
            subclasses: wire.subclasses.into_names(),
            ritual: wire.ritual,
            higher_levels: wire.higherlevels,
            source: wire.source.unwrap_or_else(|| "homebrew".into()),
            page: wire.page,
            concentration: wire.concentration,
            srd: wire.srd,
            image: wire.image,
        }
    }
}

/// Spell in the shape the character-sheet service stores in a spell list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellRecord {
    pub name: String,
    pub description: String,
    pub casting_time: String,
    pub range: String,
    pub duration: String,
    pub components: SpellComponents,
    pub ritual: bool,
    pub level: u8,
    pub school: String,
    pub prepared: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SpellComponents {
    pub verbal: bool,
    pub somatic: bool,
    pub concentration: bool,
    pub material: Option<String>,
}

impl Spell {
    pub fn school_name(&self) -> &str {
        match self.school.as_str() {
            "A" => "Abjuration",
            "V" => "Evocation",
            "E" => "Enchantment",
            "I" => "Illusion",
            "D" => "Divination",
            "N" => "Necromancy",
            "T" => "Transmutation",
            "C" => "Conjuration",
            other => other,
        }
    }

    pub fn level_label(&self) -> String {
        match self.level {
            0 => "cantrip".into(),
            1 => "1st level".into(),
            2 => "2nd level".into(),
            3 => "3rd level".into(),
            n => format!("{n}th level"),
        }
    }

    /// Duration in combat rounds.
    ///
    /// `"N rounds"` lasts N rounds and `"1 minute"` lasts 10. Longer or non-numeric durations
    /// outlast any combat and return `None`.
    pub fn combat_duration(&self) -> Option<u32> {
        let caps = DURATION_PATTERN.captures(&self.duration)?;
        let count: u32 = caps[1].parse().ok()?;
        let unit = &caps[2];

        if unit.contains("round") {
            Some(count)
        } else if unit.contains("minute") && count == 1 {
            Some(10)
        } else {
            None
        }
    }

    pub fn to_sheet_record(&self) -> SpellRecord {
        let material = MATERIAL_PATTERN
            .captures(&self.components)
            .map(|caps| caps[1].to_owned());

        let mut description = self.description.replace('\n', "\n  ");
        if let Some(higher) = &self.higher_levels {
            description.push_str(&format!("\n\n**At Higher Levels**: {higher}"));
        }

        SpellRecord {
            name: self.name.clone(),
            description,
            casting_time: self.casting_time.clone(),
            range: self.range.clone(),
            duration: self.duration.clone(),
            components: SpellComponents {
                verbal: self.components.contains('V'),
                somatic: self.components.contains('S'),
                concentration: self.concentration,
                material,
            },
            ritual: self.ritual,
            level: self.level,
            school: self.school_name().to_owned(),
            prepared: "prepared",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spell(overrides: serde_json::Value) -> Spell {
        let mut base = json!({
            "name": "Bless",
            "level": 1,
            "school": "E",
            "casttime": "1 action",
            "range": "30 feet",
            "components": "V, S, M (a sprinkling of holy water)",
            "duration": "1 minute",
            "description": "You bless up to three creatures.",
            "classes": "Cleric, Paladin",
            "concentration": true
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn concentration_rewrites_duration() {
        assert_eq!(spell(json!({})).duration, "Concentration, up to 1 minute");
    }

    #[test]
    fn concentration_prefix_is_not_doubled() {
        let s = spell(json!({"duration": "Concentration, up to 10 minutes"}));
        assert_eq!(s.duration, "Concentration, up to 10 minutes");
    }

    #[test]
    fn non_concentration_duration_is_untouched() {
        let s = spell(json!({"concentration": false, "duration": "Instantaneous"}));
        assert_eq!(s.duration, "Instantaneous");
    }

    #[test]
    fn classes_accept_string_or_list() {
        assert_eq!(spell(json!({})).classes, vec!["Cleric", "Paladin"]);
        let s = spell(json!({"classes": ["Wizard"], "subclasses": "Lore, , Oath"}));
        assert_eq!(s.classes, vec!["Wizard"]);
        assert_eq!(s.subclasses, vec!["Lore", "Oath"]);
    }

    #[test]
    fn school_and_level_labels() {
        let s = spell(json!({}));
        assert_eq!(s.school_name(), "Enchantment");
        assert_eq!(s.level_label(), "1st level");
        assert_eq!(spell(json!({"level": 0})).level_label(), "cantrip");
        assert_eq!(spell(json!({"level": 3})).level_label(), "3rd level");
        assert_eq!(spell(json!({"level": 7})).level_label(), "7th level");
        assert_eq!(spell(json!({"school": "X"})).school_name(), "X");
    }

    #[test]
    fn combat_duration() {
        assert_eq!(spell(json!({})).combat_duration(), Some(10));
        let s = spell(json!({"concentration": false, "duration": "6 rounds"}));
        assert_eq!(s.combat_duration(), Some(6));
        let s = spell(json!({"duration": "10 minutes"}));
        assert_eq!(s.combat_duration(), None);
        let s = spell(json!({"concentration": false, "duration": "Instantaneous"}));
        assert_eq!(s.combat_duration(), None);
    }

    #[test]
    fn sheet_record_splits_components() {
        let record = spell(json!({"higherlevels": "One more target per slot."})).to_sheet_record();
        assert!(record.components.verbal);
        assert!(record.components.somatic);
        assert!(record.components.concentration);
        assert_eq!(
            record.components.material.as_deref(),
            Some("a sprinkling of holy water")
        );
        assert_eq!(record.school, "Enchantment");
        assert!(record
            .description
            .ends_with("\n\n**At Higher Levels**: One more target per slot."));

        let wire = serde_json::to_value(&record).unwrap();
        assert_eq!(wire["castingTime"], "1 action");
        assert_eq!(wire["prepared"], "prepared");
    }

    #[test]
    fn source_defaults_to_homebrew() {
        assert_eq!(spell(json!({})).source, "homebrew");
    }
}
