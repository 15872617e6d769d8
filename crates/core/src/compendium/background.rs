//! Background view over raw rules data.

use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Background {
    pub name: String,
    #[serde(default)]
    pub traits: Vec<BackgroundTrait>,
    #[serde(default)]
    pub proficiencies: BackgroundProficiencies,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub srd: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BackgroundTrait {
    pub name: String,
    #[serde(default)]
    pub text: String,
}

/// Proficiencies granted by a background, grouped by kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct BackgroundProficiencies {
    #[serde(default)]
    pub tool: Vec<String>,
    #[serde(default)]
    pub skill: Vec<String>,
    #[serde(default)]
    pub language: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_traits_and_proficiencies() {
        let background: Background = serde_json::from_value(json!({
            "name": "Acolyte",
            "traits": [
                {"name": "Skill Proficiencies", "text": "Insight, Religion"},
                {"name": "Feature: Shelter of the Faithful", "text": "You command respect."}
            ],
            "proficiencies": {"skill": ["Insight", "Religion"], "language": ["Any"]},
            "source": "PHB",
            "page": 127,
            "srd": true
        }))
        .unwrap();

        assert_eq!(background.traits.len(), 2);
        assert!(background.proficiencies.tool.is_empty());
        assert_eq!(background.proficiencies.skill, vec!["Insight", "Religion"]);
        assert_eq!(background.page, Some(127));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let background: Background = serde_json::from_value(json!({"name": "Hermit"})).unwrap();
        assert!(background.traits.is_empty());
        assert_eq!(background.proficiencies, BackgroundProficiencies::default());
    }
}
