//! Shared lookup tables for rules markup.

/// Ability score codes as they appear in rules data, paired with their display names.
pub const ABILITIES: [(&str, &str); 6] = [
    ("str", "Strength"),
    ("dex", "Dexterity"),
    ("con", "Constitution"),
    ("int", "Intelligence"),
    ("wis", "Wisdom"),
    ("cha", "Charisma"),
];

/// Returns the display name for a three-letter ability code (`"dex"` -> `"Dexterity"`).
pub fn ability_name(code: &str) -> Option<&'static str> {
    ABILITIES
        .iter()
        .find(|(abbrev, _)| *abbrev == code)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_codes() {
        assert_eq!(ability_name("str"), Some("Strength"));
        assert_eq!(ability_name("cha"), Some("Charisma"));
    }

    #[test]
    fn rejects_unknown_codes() {
        assert_eq!(ability_name("luck"), None);
        assert_eq!(ability_name("STR"), None);
    }
}
