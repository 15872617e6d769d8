//! Race view over raw rules data.

use crate::records::Feature;
use markup::{render, Entry};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A playable race as authored in the compendium.
#[derive(Clone, Debug, Deserialize)]
pub struct Race {
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub speed: Option<Speed>,
    #[serde(default)]
    pub ability: AbilityBonuses,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub srd: bool,
    #[serde(default)]
    pub darkvision: u32,
}

/// Movement speed: a single walking number or a per-mode table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Speed {
    Walk(i64),
    ByMode(BTreeMap<String, Value>),
}

/// Fixed ability bonuses (`{"dex": 2}`) plus any free-choice bonuses.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AbilityBonuses {
    #[serde(default)]
    pub choose: Vec<AbilityChoice>,
    #[serde(flatten)]
    pub fixed: BTreeMap<String, i64>,
}

/// "Choose `count` of `from`, each gaining `amount`."
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AbilityChoice {
    #[serde(default = "one")]
    pub count: u32,
    #[serde(default)]
    pub from: Vec<String>,
    #[serde(default = "one_i64")]
    pub amount: i64,
}

fn one() -> u32 {
    1
}

fn one_i64() -> i64 {
    1
}

impl Race {
    pub fn size_name(&self) -> &'static str {
        match self.size.as_deref() {
            Some("T") => "Tiny",
            Some("S") => "Small",
            Some("M") => "Medium",
            Some("L") => "Large",
            Some("H") => "Huge",
            _ => "Unknown",
        }
    }

    /// Walking speed in feet, if the race defines one.
    pub fn walking_speed(&self) -> Option<i64> {
        match self.speed.as_ref()? {
            Speed::Walk(feet) => Some(*feet),
            Speed::ByMode(modes) => modes.get("walk").and_then(Value::as_i64),
        }
    }

    /// Human-readable speed, e.g. `"30 ft."` or `"fly 50 ft., walk 25 ft."`.
    pub fn speed_text(&self) -> String {
        match &self.speed {
            None => String::new(),
            Some(Speed::Walk(feet)) => format!("{feet} ft."),
            Some(Speed::ByMode(modes)) => modes
                .iter()
                .map(|(mode, feet)| match feet {
                    Value::Number(n) => format!("{mode} {n} ft."),
                    other => format!("{mode} {other} ft."),
                })
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    pub fn ability_text(&self) -> String {
        let fixed = self
            .ability
            .fixed
            .iter()
            .map(|(code, bonus)| format!("{code} {bonus}"));
        let chosen = self.ability.choose.iter().map(|choice| {
            format!(
                "Choose {} from {} {}",
                choice.count,
                choice.from.join(", "),
                choice.amount
            )
        });
        fixed.chain(chosen).collect::<Vec<_>>().join(", ")
    }

    /// Named entries of the race, each rendered into a feature.
    pub fn traits(&self) -> Vec<Feature> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Section {
                    name: Some(name),
                    entries,
                } => Some(Feature::new(name.as_str(), render(entries, false))),
                Entry::Item {
                    name: Some(name),
                    entry,
                } => Some(Feature::new(name.as_str(), render(entry, false))),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn elf() -> Race {
        serde_json::from_value(json!({
            "name": "Elf",
            "size": "M",
            "speed": 30,
            "ability": {"dex": 2},
            "entries": [
                "Elves are a magical people.",
                {"type": "entries", "name": "Darkvision", "entries": ["You can see in dim light."]},
                {"type": "entries", "name": "Trance", "entries": ["You don't sleep."]}
            ],
            "srd": true
        }))
        .unwrap()
    }

    #[test]
    fn parses_flat_speed_and_fixed_bonus() {
        let race = elf();
        assert_eq!(race.walking_speed(), Some(30));
        assert_eq!(race.speed_text(), "30 ft.");
        assert_eq!(race.ability.fixed.get("dex"), Some(&2));
        assert!(race.ability.choose.is_empty());
        assert_eq!(race.size_name(), "Medium");
    }

    #[test]
    fn speed_by_mode_uses_walk() {
        let race: Race = serde_json::from_value(json!({
            "name": "Aarakocra",
            "speed": {"walk": 25, "fly": 50}
        }))
        .unwrap();
        assert_eq!(race.walking_speed(), Some(25));
        assert_eq!(race.speed_text(), "fly 50 ft., walk 25 ft.");
    }

    #[test]
    fn speed_without_walk_has_no_walking_speed() {
        let race: Race =
            serde_json::from_value(json!({"name": "Merfolk", "speed": {"swim": 40}})).unwrap();
        assert_eq!(race.walking_speed(), None);

        let race: Race = serde_json::from_value(json!({"name": "Blob"})).unwrap();
        assert_eq!(race.walking_speed(), None);
        assert_eq!(race.size_name(), "Unknown");
    }

    #[test]
    fn parses_ability_choice() {
        let race: Race = serde_json::from_value(json!({
            "name": "Half-Elf",
            "speed": 30,
            "ability": {"cha": 2, "choose": [{"count": 2, "from": ["str", "dex", "con"]}]}
        }))
        .unwrap();
        assert_eq!(race.ability.fixed.len(), 1);
        assert_eq!(race.ability.choose[0].count, 2);
        assert_eq!(race.ability.choose[0].amount, 1);
        assert_eq!(
            race.ability_text(),
            "cha 2, Choose 2 from str, dex, con 1"
        );
    }

    #[test]
    fn traits_are_named_entries_only() {
        let traits = elf().traits();
        assert_eq!(traits.len(), 2);
        assert_eq!(traits[0], Feature::new("Darkvision", "You can see in dim light."));
        assert_eq!(traits[1].name, "Trance");
    }
}
