//! Compiled character records.
//!
//! These are the immutable values handed to the character-sheet service. Each record serializes
//! to the flat shape the service accepts; the owning entity (race, class or background) is
//! carried as a `parent` reference.

use serde::ser::{Serialize, Serializer};

/// Which part of the character a record belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OriginKind {
    Race,
    Class,
    Background,
}

/// Owning entity of an effect or proficiency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Origin {
    pub kind: OriginKind,
    /// Sheet id of the owner: the character for race and background, the class entry otherwise.
    pub id: String,
}

impl Origin {
    pub fn race(character_id: impl Into<String>) -> Self {
        Self {
            kind: OriginKind::Race,
            id: character_id.into(),
        }
    }

    pub fn class(class_id: impl Into<String>) -> Self {
        Self {
            kind: OriginKind::Class,
            id: class_id.into(),
        }
    }

    pub fn background(character_id: impl Into<String>) -> Self {
        Self {
            kind: OriginKind::Background,
            id: character_id.into(),
        }
    }
}

#[derive(serde::Serialize)]
struct ParentWire<'a> {
    collection: &'static str,
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'static str>,
}

impl Serialize for Origin {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let (collection, group) = match self.kind {
            OriginKind::Race => ("Characters", Some("racial")),
            OriginKind::Class => ("Classes", None),
            OriginKind::Background => ("Characters", Some("background")),
        };
        ParentWire {
            collection,
            id: &self.id,
            group,
        }
        .serialize(serializer)
    }
}

/// How an effect combines with the stat it targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Base,
    Add,
}

/// A fixed number or a formula evaluated by the sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EffectAmount {
    Value(i64),
    Calculation(String),
}

/// A mechanical adjustment to one stat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Effect {
    pub origin: Origin,
    pub operation: Operation,
    /// Target stat. `None` when the user still has to pick it on the sheet.
    pub stat: Option<String>,
    pub amount: EffectAmount,
}

impl Effect {
    pub fn value(origin: Origin, operation: Operation, stat: Option<&str>, value: i64) -> Self {
        Self {
            origin,
            operation,
            stat: stat.map(str::to_owned),
            amount: EffectAmount::Value(value),
        }
    }

    pub fn calculation(
        origin: Origin,
        operation: Operation,
        stat: &str,
        calculation: impl Into<String>,
    ) -> Self {
        Self {
            origin,
            operation,
            stat: Some(stat.to_owned()),
            amount: EffectAmount::Calculation(calculation.into()),
        }
    }
}

#[derive(serde::Serialize)]
struct EffectWire<'a> {
    parent: &'a Origin,
    operation: Operation,
    #[serde(skip_serializing_if = "Option::is_none")]
    stat: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    calculation: Option<&'a str>,
    enabled: bool,
}

impl Serialize for Effect {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let (value, calculation) = match &self.amount {
            EffectAmount::Value(v) => (Some(*v), None),
            EffectAmount::Calculation(c) => (None, Some(c.as_str())),
        };
        EffectWire {
            parent: &self.origin,
            operation: self.operation,
            stat: self.stat.as_deref(),
            value,
            calculation,
            enabled: true,
        }
        .serialize(serializer)
    }
}

/// A narrative feature: a title and a markdown body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub text: String,
}

impl Feature {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct FeatureWire<'a> {
    name: &'a str,
    description: &'a str,
    enabled: bool,
    always_enabled: bool,
}

impl Serialize for Feature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        FeatureWire {
            name: &self.name,
            description: &self.text,
            enabled: true,
            always_enabled: true,
        }
        .serialize(serializer)
    }
}

/// Proficiency categories understood by the sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyCategory {
    Save,
    Armor,
    Weapon,
    Tool,
    Skill,
    Language,
}

/// A granted competency, or a placeholder the user fills in when `key` is `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proficiency {
    pub origin: Origin,
    pub key: Option<String>,
    pub category: ProficiencyCategory,
}

impl Proficiency {
    pub fn new(origin: Origin, key: impl Into<String>, category: ProficiencyCategory) -> Self {
        Self {
            origin,
            key: Some(key.into()),
            category,
        }
    }

    pub fn placeholder(origin: Origin, category: ProficiencyCategory) -> Self {
        Self {
            origin,
            key: None,
            category,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.key.is_none()
    }
}

#[derive(serde::Serialize)]
struct ProficiencyWire<'a> {
    parent: &'a Origin,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    value: u8,
    #[serde(rename = "type")]
    category: ProficiencyCategory,
}

impl Serialize for Proficiency {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ProficiencyWire {
            parent: &self.origin,
            name: self.key.as_deref(),
            value: 1,
            category: self.category,
        }
        .serialize(serializer)
    }
}

/// Everything one compilation run produces.
///
/// `features` always ends with the synthetic caveat feature.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CompiledCharacter {
    pub effects: Vec<Effect>,
    pub features: Vec<Feature>,
    pub proficiencies: Vec<Proficiency>,
    pub caveats: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn race_effect_serializes_with_racial_parent() {
        let effect = Effect::value(Origin::race("char1"), Operation::Base, Some("speed"), 30);
        assert_eq!(
            serde_json::to_value(&effect).unwrap(),
            json!({
                "parent": {"collection": "Characters", "id": "char1", "group": "racial"},
                "operation": "base",
                "stat": "speed",
                "value": 30,
                "enabled": true
            })
        );
    }

    #[test]
    fn calculated_effect_omits_value() {
        let effect = Effect::calculation(
            Origin::class("class1"),
            Operation::Add,
            "hitPoints",
            "5*FighterLevel+3",
        );
        let wire = serde_json::to_value(&effect).unwrap();
        assert_eq!(wire["parent"], json!({"collection": "Classes", "id": "class1"}));
        assert_eq!(wire["calculation"], "5*FighterLevel+3");
        assert!(wire.get("value").is_none());
    }

    #[test]
    fn unattributed_effect_omits_stat() {
        let effect = Effect::value(Origin::race("c"), Operation::Add, None, 1);
        let wire = serde_json::to_value(&effect).unwrap();
        assert!(wire.get("stat").is_none());
        assert_eq!(wire["value"], 1);
    }

    #[test]
    fn feature_serializes_description() {
        let wire = serde_json::to_value(Feature::new("Trance", "You meditate.")).unwrap();
        assert_eq!(
            wire,
            json!({
                "name": "Trance",
                "description": "You meditate.",
                "enabled": true,
                "alwaysEnabled": true
            })
        );
    }

    #[test]
    fn placeholder_proficiency_has_no_name() {
        let prof = Proficiency::placeholder(Origin::background("c"), ProficiencyCategory::Skill);
        assert!(prof.is_placeholder());
        let wire = serde_json::to_value(&prof).unwrap();
        assert!(wire.get("name").is_none());
        assert_eq!(wire["type"], "skill");
        assert_eq!(wire["value"], 1);
        assert_eq!(wire["parent"]["group"], "background");
    }
}
