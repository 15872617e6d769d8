//! Constants used throughout the autochar core crate.
//!
//! Stat and proficiency keys here are the identifiers the character-sheet service expects.

/// Highest character level supported by default.
pub const DEFAULT_MAX_LEVEL: u8 = 20;

/// Title of the synthetic feature that carries every caveat.
pub const DEFAULT_CAVEAT_TITLE: &str = "!!! Caveats !!!";

/// Lower-cased skill names mapped to sheet skill keys.
pub const SKILL_KEYS: [(&str, &str); 19] = [
    ("acrobatics", "acrobatics"),
    ("animal handling", "animalHandling"),
    ("arcana", "arcana"),
    ("athletics", "athletics"),
    ("deception", "deception"),
    ("history", "history"),
    ("initiative", "initiative"),
    ("insight", "insight"),
    ("intimidation", "intimidation"),
    ("investigation", "investigation"),
    ("medicine", "medicine"),
    ("nature", "nature"),
    ("perception", "perception"),
    ("performance", "performance"),
    ("persuasion", "persuasion"),
    ("religion", "religion"),
    ("sleight of hand", "sleightOfHand"),
    ("stealth", "stealth"),
    ("survival", "survival"),
];

/// Class table column labels mapped to the sheet stat each one sets.
pub const CLASS_RESOURCE_STATS: [(&str, &str); 14] = [
    ("Ki Points", "ki"),
    ("Rage Damage", "rageDamage"),
    ("Rages", "rages"),
    ("Sorcery Points", "sorceryPoints"),
    ("Superiority Dice", "superiorityDice"),
    ("1st", "level1SpellSlots"),
    ("2nd", "level2SpellSlots"),
    ("3rd", "level3SpellSlots"),
    ("4th", "level4SpellSlots"),
    ("5th", "level5SpellSlots"),
    ("6th", "level6SpellSlots"),
    ("7th", "level7SpellSlots"),
    ("8th", "level8SpellSlots"),
    ("9th", "level9SpellSlots"),
];

/// Sheet skill key for a skill name, matched case-insensitively.
pub fn skill_key(name: &str) -> Option<&'static str> {
    let wanted = name.trim().to_lowercase();
    SKILL_KEYS
        .iter()
        .find(|(skill, _)| *skill == wanted)
        .map(|(_, key)| *key)
}

/// Sheet stat for a class table column label.
pub fn resource_stat(label: &str) -> Option<&'static str> {
    CLASS_RESOURCE_STATS
        .iter()
        .find(|(column, _)| *column == label)
        .map(|(_, stat)| *stat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_lookup_ignores_case_and_padding() {
        assert_eq!(skill_key("Sleight of Hand"), Some("sleightOfHand"));
        assert_eq!(skill_key("  perception "), Some("perception"));
        assert_eq!(skill_key("Insight or Religion"), None);
    }

    #[test]
    fn resource_lookup_is_exact() {
        assert_eq!(resource_stat("Ki Points"), Some("ki"));
        assert_eq!(resource_stat("9th"), Some("level9SpellSlots"));
        assert_eq!(resource_stat("Cantrips Known"), None);
        assert_eq!(resource_stat("rages"), None);
    }
}
