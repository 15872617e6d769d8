//! Compendium data context.
//!
//! A [`Compendium`] is an explicitly constructed, read-only collection of parsed rules data. It
//! is built once (usually at startup from the rules JSON files) and passed by reference to
//! whatever needs it, so tests can construct small fixtures without touching shared state.
//!
//! Reading the files from disk is the caller's concern; this module only parses JSON text.

pub mod background;
pub mod class;
pub mod race;
pub mod spell;

pub use background::{Background, BackgroundProficiencies, BackgroundTrait};
pub use class::{
    Class, ClassFeature, ClassTableGroup, HitDie, SkillChoice, StartingEquipment,
    StartingProficiencies, Subclass, SubclassFeature,
};
pub use race::{AbilityBonuses, AbilityChoice, Race, Speed};
pub use spell::{Spell, SpellComponents, SpellRecord};

use crate::records::Feature;
use crate::{CoreError, CoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Parsed rules data shared by every compile call.
#[derive(Clone, Debug, Default)]
pub struct Compendium {
    pub races: Vec<Race>,
    pub classes: Vec<Class>,
    pub backgrounds: Vec<Background>,
    pub spells: Vec<Spell>,
}

/// Selectable names, as offered by a character-creation picker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CharacterOptions {
    pub races: Vec<String>,
    pub classes: Vec<ClassOption>,
    pub backgrounds: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassOption {
    pub name: String,
    pub subclasses: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SpellOption {
    pub name: String,
    /// Class names concatenated and lower-cased, for substring filtering.
    pub classes: String,
    pub level: u8,
    pub index: usize,
}

impl Compendium {
    pub fn new(
        races: Vec<Race>,
        classes: Vec<Class>,
        backgrounds: Vec<Background>,
        spells: Vec<Spell>,
    ) -> Self {
        Self {
            races,
            classes,
            backgrounds,
            spells,
        }
    }

    /// Parses each collection from JSON array text. Spells are optional.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Schema` naming the collection and the path of the first field that
    /// does not match the expected shape.
    pub fn from_json(
        races: &str,
        classes: &str,
        backgrounds: &str,
        spells: Option<&str>,
    ) -> CoreResult<Self> {
        let compendium = Self {
            races: parse_json("races", races)?,
            classes: parse_json("classes", classes)?,
            backgrounds: parse_json("backgrounds", backgrounds)?,
            spells: spells
                .map(|text| parse_json("spells", text))
                .transpose()?
                .unwrap_or_default(),
        };

        tracing::info!(
            "loaded compendium: {} races, {} classes, {} backgrounds, {} spells",
            compendium.races.len(),
            compendium.classes.len(),
            compendium.backgrounds.len(),
            compendium.spells.len()
        );
        Ok(compendium)
    }

    pub fn race(&self, name: &str) -> CoreResult<&Race> {
        find(&self.races, "race", name, |r| &r.name)
    }

    pub fn class(&self, name: &str) -> CoreResult<&Class> {
        find(&self.classes, "class", name, |c| &c.name)
    }

    pub fn subclass(&self, class: &str, name: &str) -> CoreResult<&Subclass> {
        self.class(class)?
            .subclass(name)
            .ok_or_else(|| CoreError::NotFound {
                kind: "subclass",
                name: format!("{class}: {name}"),
            })
    }

    pub fn background(&self, name: &str) -> CoreResult<&Background> {
        find(&self.backgrounds, "background", name, |b| &b.name)
    }

    pub fn spell(&self, name: &str) -> CoreResult<&Spell> {
        find(&self.spells, "spell", name, |s| &s.name)
    }

    /// Spell at a position in the compendium, as listed by [`Compendium::spell_options`].
    pub fn spell_at(&self, index: usize) -> CoreResult<&Spell> {
        self.spells.get(index).ok_or_else(|| CoreError::NotFound {
            kind: "spell",
            name: format!("index {index}"),
        })
    }

    /// Every named race entry as a feature titled `"<Race>: <entry>"`.
    pub fn race_features(&self) -> Vec<Feature> {
        self.races
            .iter()
            .flat_map(|race| {
                race.traits()
                    .into_iter()
                    .map(move |t| Feature::new(format!("{}: {}", race.name, t.name), t.text))
            })
            .collect()
    }

    /// Subclass labels qualified by their class, e.g. `"Fighter: Champion"`.
    pub fn subclass_names(&self) -> Vec<String> {
        self.classes
            .iter()
            .flat_map(|class| {
                class
                    .subclasses
                    .iter()
                    .map(move |sc| format!("{}: {}", class.name, sc.name))
            })
            .collect()
    }

    pub fn options(&self) -> CharacterOptions {
        CharacterOptions {
            races: self.races.iter().map(|r| r.name.clone()).collect(),
            classes: self
                .classes
                .iter()
                .map(|c| ClassOption {
                    name: c.name.clone(),
                    subclasses: c.subclasses.iter().map(|s| s.name.clone()).collect(),
                })
                .collect(),
            backgrounds: self.backgrounds.iter().map(|b| b.name.clone()).collect(),
        }
    }

    pub fn spell_options(&self) -> Vec<SpellOption> {
        self.spells
            .iter()
            .enumerate()
            .map(|(index, spell)| SpellOption {
                name: spell.name.clone(),
                classes: spell.classes.concat().to_lowercase(),
                level: spell.level,
                index,
            })
            .collect()
    }
}

fn find<'a, T>(
    items: &'a [T],
    kind: &'static str,
    name: &str,
    name_of: impl Fn(&T) -> &String,
) -> CoreResult<&'a T> {
    let wanted = name.trim();
    items
        .iter()
        .find(|item| name_of(item).eq_ignore_ascii_case(wanted))
        .ok_or_else(|| CoreError::NotFound {
            kind,
            name: wanted.to_owned(),
        })
}

/// Deserializes JSON text, reporting the path of the first mismatching field.
pub(crate) fn parse_json<T: DeserializeOwned>(label: &str, json: &str) -> CoreResult<T> {
    let mut deserializer = serde_json::Deserializer::from_str(json);

    match serde_path_to_error::deserialize::<_, T>(&mut deserializer) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(CoreError::Schema(format!(
                "{label} schema mismatch at {path}: {source}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RACES: &str = r#"[
        {"name": "Elf", "speed": 30, "ability": {"dex": 2},
         "entries": [{"type": "entries", "name": "Trance", "entries": ["No sleep."]}]},
        {"name": "Dwarf", "speed": 25, "ability": {"con": 2}, "entries": []}
    ]"#;
    const CLASSES: &str = r#"[
        {"name": "Fighter", "hitDie": {"faces": 10}, "proficiency": ["str", "con"],
         "startingProficiencies": {"skills": {"choose": 2, "from": ["Athletics"]}},
         "startingEquipment": {"default": ["chain mail"]},
         "subclasses": [{"name": "Champion"}, {"name": "Battle Master"}]}
    ]"#;
    const BACKGROUNDS: &str = r#"[{"name": "Sage", "traits": []}]"#;
    const SPELLS: &str = r#"[
        {"name": "Light", "level": 0, "school": "V", "classes": "Bard, Cleric"},
        {"name": "Shield", "level": 1, "school": "A", "classes": ["Wizard"]}
    ]"#;

    fn compendium() -> Compendium {
        Compendium::from_json(RACES, CLASSES, BACKGROUNDS, Some(SPELLS)).unwrap()
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let c = compendium();
        assert_eq!(c.race("elf").unwrap().name, "Elf");
        assert_eq!(c.class(" FIGHTER ").unwrap().name, "Fighter");
        assert_eq!(c.subclass("fighter", "battle master").unwrap().name, "Battle Master");
        assert_eq!(c.background("sage").unwrap().name, "Sage");
        assert_eq!(c.spell("shield").unwrap().level, 1);
    }

    #[test]
    fn missing_entries_report_not_found() {
        let c = compendium();
        assert!(matches!(
            c.race("Orc"),
            Err(CoreError::NotFound { kind: "race", ref name }) if name == "Orc"
        ));
        assert!(matches!(
            c.subclass("Fighter", "Eldritch Knight"),
            Err(CoreError::NotFound { kind: "subclass", .. })
        ));
    }

    #[test]
    fn spells_are_optional() {
        let c = Compendium::from_json(RACES, CLASSES, BACKGROUNDS, None).unwrap();
        assert!(c.spells.is_empty());
    }

    #[test]
    fn schema_errors_carry_path() {
        let err = Compendium::from_json(
            r#"[{"name": "Elf"}, {"speed": 30}]"#,
            CLASSES,
            BACKGROUNDS,
            None,
        )
        .expect_err("second race has no name");
        assert!(
            matches!(err, CoreError::Schema(ref msg) if msg.starts_with("races schema mismatch at") && msg.contains("name"))
        );
    }

    #[test]
    fn class_without_starting_proficiencies_is_a_schema_error() {
        let err = Compendium::from_json(
            RACES,
            r#"[{"name": "Fighter", "hitDie": {"faces": 10}, "proficiency": ["str"],
                 "startingEquipment": {"default": []},
                 "classFeatures": [[{"name": "Second Wind", "entries": []}]]}]"#,
            BACKGROUNDS,
            None,
        )
        .expect_err("startingProficiencies is required");
        assert!(matches!(
            err,
            CoreError::Schema(ref msg)
                if msg.starts_with("classes schema mismatch at") && msg.contains("startingProficiencies")
        ));
    }

    #[test]
    fn race_features_are_qualified() {
        let features = compendium().race_features();
        assert_eq!(features, vec![Feature::new("Elf: Trance", "No sleep.")]);
    }

    #[test]
    fn options_list_names() {
        let c = compendium();
        let options = c.options();
        assert_eq!(options.races, vec!["Elf", "Dwarf"]);
        assert_eq!(options.classes[0].subclasses, vec!["Champion", "Battle Master"]);
        assert_eq!(options.backgrounds, vec!["Sage"]);
        assert_eq!(
            c.subclass_names(),
            vec!["Fighter: Champion", "Fighter: Battle Master"]
        );
    }

    #[test]
    fn spell_options_concatenate_classes() {
        let options = compendium().spell_options();
        assert_eq!(options[0].classes, "bardcleric");
        assert_eq!(options[1].index, 1);
    }

    #[test]
    fn spell_at_follows_option_index() {
        let c = compendium();
        let index = c.spell_options()[1].index;
        assert_eq!(c.spell_at(index).unwrap().name, "Shield");
        assert!(matches!(
            c.spell_at(2),
            Err(CoreError::NotFound { kind: "spell", ref name }) if name == "index 2"
        ));
    }
}
