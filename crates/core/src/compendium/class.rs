//! Class and subclass views over raw rules data.

use markup::Entry;
use serde::Deserialize;

/// A character class.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub name: String,
    #[serde(alias = "hd")]
    pub hit_die: HitDie,
    /// Saving throw proficiencies as ability codes.
    pub proficiency: Vec<String>,
    pub starting_proficiencies: StartingProficiencies,
    pub starting_equipment: StartingEquipment,
    #[serde(default)]
    pub class_table_groups: Vec<ClassTableGroup>,
    /// Features per level; index 0 is level 1.
    #[serde(default)]
    pub class_features: Vec<Vec<ClassFeature>>,
    #[serde(default)]
    pub subclasses: Vec<Subclass>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct HitDie {
    pub faces: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct StartingProficiencies {
    #[serde(default)]
    pub armor: Vec<String>,
    #[serde(default)]
    pub weapons: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    pub skills: SkillChoice,
}

/// "Choose `choose` skills from `from`."
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SkillChoice {
    pub choose: u32,
    pub from: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartingEquipment {
    pub default: Vec<String>,
    #[serde(default)]
    pub gold_alternative: Option<Entry>,
}

/// One block of the class progression table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassTableGroup {
    #[serde(default)]
    pub title: Option<String>,
    pub col_labels: Vec<String>,
    /// One row per level; index 0 is level 1.
    pub rows: Vec<Vec<Entry>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassFeature {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub gain_subclass_feature: bool,
}

/// A subclass (archetype, domain, circle, ...).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subclass {
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
    /// Feature groups in grant order.
    #[serde(default)]
    pub subclass_features: Vec<Vec<SubclassFeature>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SubclassFeature {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl Class {
    /// Sheet variable holding this class's level, e.g. `FighterLevel`.
    pub fn level_variable(&self) -> String {
        let compact: String = self.name.split_whitespace().collect();
        format!("{compact}Level")
    }

    /// Features gained exactly at `level`.
    pub fn features_at(&self, level: u8) -> Option<&[ClassFeature]> {
        let index = usize::from(level).checked_sub(1)?;
        self.class_features.get(index).map(Vec::as_slice)
    }

    pub fn subclass(&self, name: &str) -> Option<&Subclass> {
        let wanted = name.trim();
        self.subclasses
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(wanted))
    }
}

impl ClassTableGroup {
    pub fn row_at(&self, level: u8) -> Option<&[Entry]> {
        let index = usize::from(level).checked_sub(1)?;
        self.rows.get(index).map(Vec::as_slice)
    }
}
