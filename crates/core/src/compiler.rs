//! # Rules compiler
//!
//! Turns a race, class, optional subclass and background plus a target level into the records a
//! character sheet needs: stat effects, narrative features and proficiencies. Anything the
//! compiler cannot settle on its own (choices the player has to make, equipment to add by hand)
//! is collected as a caveat, and all caveats are bundled into one final feature.
//!
//! Compilation is pure: the sheet ids are supplied by the caller and nothing is read from the
//! environment. Malformed narrative entries degrade through the renderer; structurally missing
//! data (a level with no feature list, an unknown ability code) fails the whole run.

use crate::compendium::{Background, Class, Compendium, Race, Subclass, SubclassFeature};
use crate::config::CompilerConfig;
use crate::constants::{resource_stat, skill_key};
use crate::records::{
    CompiledCharacter, Effect, Feature, Operation, Origin, Proficiency, ProficiencyCategory,
};
use crate::{CoreError, CoreResult};
use markup::{ability_name, expand, render, Entry};

const BASE_SCORES_CAVEAT: &str = "**Base Ability Scores**: Enter your base ability scores \
(without modifiers) in the feature titled Base Ability Scores.";

const RACIAL_FEATURES_CAVEAT: &str = "**Racial Features**: Check that the number of uses for each \
feature is correct, and apply any effects they grant.";

const HP_CAVEAT: &str = "**HP**: HP is currently calculated using class average; change the value \
in the Journal tab under your class if you wish to change it.";

const CLASS_FEATURES_CAVEAT: &str = "**Class Features**: Check that the number of uses for each \
feature is correct, and apply any effects they grant.";

const SPELLCASTING_CAVEAT: &str = "**Spellcasting**: If your class can cast spells, be sure to set \
your number of known spells, max prepared, DC, attack bonus, and what spells you know in the \
Spells tab. You can add a spell to your spellbook by using the spellbook tool.";

const LANGUAGES_CAVEAT: &str = "**Languages**: Some backgrounds' languages may ask you to choose \
one or more. Fill this out in the Background section of the Persona tab.";

const CAVEAT_PREAMBLE: &str = "**__Caveats__**  \nNot everything is automagical! Here are some \
things you still have to do manually:  \n";

/// The player's picks for one character.
#[derive(Clone, Copy, Debug)]
pub struct Selection<'a> {
    pub race: &'a Race,
    pub class: &'a Class,
    pub subclass: Option<&'a Subclass>,
    pub background: &'a Background,
    pub level: u8,
}

impl<'a> Selection<'a> {
    /// Resolves a selection by name against a compendium.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` for any name the compendium does not know.
    pub fn from_compendium(
        compendium: &'a Compendium,
        race: &str,
        class: &str,
        subclass: Option<&str>,
        background: &str,
        level: u8,
    ) -> CoreResult<Self> {
        Ok(Self {
            race: compendium.race(race)?,
            class: compendium.class(class)?,
            subclass: subclass
                .map(|name| compendium.subclass(class, name))
                .transpose()?,
            background: compendium.background(background)?,
            level,
        })
    }
}

/// Sheet ids the compiled records point back to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetIds {
    pub character_id: String,
    pub class_id: String,
}

impl SheetIds {
    pub fn new(character_id: impl Into<String>, class_id: impl Into<String>) -> Self {
        Self {
            character_id: character_id.into(),
            class_id: class_id.into(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RulesCompiler {
    config: CompilerConfig,
}

impl RulesCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles a selection into sheet records.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidLevel` when the level is outside the configured range, and the
    /// `Missing*` / `UnknownAbility` variants when the rules data lacks something the level needs.
    pub fn compile(
        &self,
        selection: &Selection<'_>,
        ids: &SheetIds,
    ) -> CoreResult<CompiledCharacter> {
        self.config.check_level(selection.level)?;
        tracing::debug!(
            "compiling {} {} level {} ({})",
            selection.race.name,
            selection.class.name,
            selection.level,
            selection.background.name
        );

        let mut run = Compilation::new(ids);
        run.caveats.push(BASE_SCORES_CAVEAT.to_owned());
        run.race(selection.race)?;
        run.class_hit_points(selection.class);
        run.class_proficiencies(selection.class)?;
        run.class_equipment(selection.class);
        run.class_resources(selection.class, selection.level)?;
        run.class_features(selection.class, selection.subclass, selection.level)?;
        run.background(selection.background);

        Ok(run.finish(self.config.caveat_title()))
    }
}

/// Returns the subclass feature groups earned by `count` subclass grant points.
///
/// Groups are taken in index order: the n-th grant point in the class progression is assumed to
/// unlock the n-th feature group of the subclass, regardless of the level it lists.
pub fn earned_subclass_feature_groups(
    subclass: &Subclass,
    count: usize,
) -> CoreResult<&[Vec<SubclassFeature>]> {
    subclass
        .subclass_features
        .get(..count)
        .ok_or_else(|| CoreError::MissingSubclassFeatures {
            subclass: subclass.name.clone(),
            wanted: count,
            available: subclass.subclass_features.len(),
        })
}

/// Hit point formula assuming the average roll per level and the maximum at first level.
pub fn hit_point_formula(class: &Class) -> String {
    let faces = i64::from(class.hit_die.faces);
    let per_level = faces / 2 + 1;
    let first_level_bonus = faces - per_level;
    format!(
        "{per_level}*{}+{first_level_bonus}",
        class.level_variable()
    )
}

fn ability_stat(code: &str) -> CoreResult<String> {
    ability_name(code)
        .map(str::to_lowercase)
        .ok_or_else(|| CoreError::UnknownAbility(code.to_owned()))
}

/// Accumulates records for one compile call.
struct Compilation<'a> {
    ids: &'a SheetIds,
    effects: Vec<Effect>,
    features: Vec<Feature>,
    proficiencies: Vec<Proficiency>,
    caveats: Vec<String>,
}

impl<'a> Compilation<'a> {
    fn new(ids: &'a SheetIds) -> Self {
        Self {
            ids,
            effects: Vec::new(),
            features: Vec::new(),
            proficiencies: Vec::new(),
            caveats: Vec::new(),
        }
    }

    fn race_origin(&self) -> Origin {
        Origin::race(self.ids.character_id.as_str())
    }

    fn class_origin(&self) -> Origin {
        Origin::class(self.ids.class_id.as_str())
    }

    fn background_origin(&self) -> Origin {
        Origin::background(self.ids.character_id.as_str())
    }

    fn race(&mut self, race: &Race) -> CoreResult<()> {
        if let Some(speed) = race.walking_speed() {
            self.effects.push(Effect::value(
                self.race_origin(),
                Operation::Base,
                Some("speed"),
                speed,
            ));
        }

        for (code, bonus) in &race.ability.fixed {
            let stat = ability_stat(code)?;
            self.effects.push(Effect::value(
                self.race_origin(),
                Operation::Add,
                Some(stat.as_str()),
                *bonus,
            ));
        }

        for choice in &race.ability.choose {
            self.effects.push(Effect::value(
                self.race_origin(),
                Operation::Add,
                None,
                choice.amount,
            ));
            self.caveats.push(format!(
                "**Racial Ability Bonus ({:+})**: In your race (Journal tab), select the score you \
                 want a bonus to (choose {} from {}).",
                choice.amount,
                choice.count,
                choice.from.join(", ")
            ));
        }

        self.features.extend(race.traits());
        self.caveats.push(RACIAL_FEATURES_CAVEAT.to_owned());
        Ok(())
    }

    fn class_hit_points(&mut self, class: &Class) {
        self.effects.push(Effect::calculation(
            self.class_origin(),
            Operation::Add,
            &format!("d{}HitDice", class.hit_die.faces),
            class.level_variable(),
        ));
        self.effects.push(Effect::calculation(
            self.class_origin(),
            Operation::Add,
            "hitPoints",
            hit_point_formula(class),
        ));
        self.caveats.push(HP_CAVEAT.to_owned());
    }

    fn class_proficiencies(&mut self, class: &Class) -> CoreResult<()> {
        for code in &class.proficiency {
            let key = format!("{}Save", ability_stat(code)?);
            self.proficiencies.push(Proficiency::new(
                self.class_origin(),
                key,
                ProficiencyCategory::Save,
            ));
        }

        let starting = &class.starting_proficiencies;
        let listed = [
            (&starting.armor, ProficiencyCategory::Armor),
            (&starting.weapons, ProficiencyCategory::Weapon),
            (&starting.tools, ProficiencyCategory::Tool),
        ];
        for (names, category) in listed {
            for name in names {
                self.proficiencies
                    .push(Proficiency::new(self.class_origin(), expand(name), category));
            }
        }

        let skills = &starting.skills;
        for _ in 0..skills.choose {
            self.proficiencies.push(Proficiency::placeholder(
                self.class_origin(),
                ProficiencyCategory::Skill,
            ));
        }
        self.caveats.push(format!(
            "**Skill Proficiencies**: You get to choose your skill proficiencies. Under your \
             class in the Journal tab, you may select {} skills from {}.",
            skills.choose,
            skills.from.join(", ")
        ));
        Ok(())
    }

    fn class_equipment(&mut self, class: &Class) {
        let equipment = &class.starting_equipment;
        let items = equipment
            .default
            .iter()
            .map(|item| format!("• {}", expand(item)))
            .collect::<Vec<_>>()
            .join("\n");
        let gold = equipment
            .gold_alternative
            .as_ref()
            .map(|gold| {
                format!(
                    "Alternatively, you may start with {} gp to buy your own equipment.",
                    render(std::slice::from_ref(gold), false)
                )
            })
            .unwrap_or_default();

        self.caveats.push(format!(
            "**Starting Class Equipment**: You start with the following items, plus anything \
             provided by your background.  \n{items}  \n{gold}"
        ));
    }

    fn class_resources(&mut self, class: &Class, level: u8) -> CoreResult<()> {
        // Later tables overwrite earlier values for the same label, keeping first-seen order.
        let mut resources: Vec<(String, String)> = Vec::new();
        for (table, group) in class.class_table_groups.iter().enumerate() {
            let row = group.row_at(level).ok_or_else(|| CoreError::MissingTableRow {
                class: class.name.clone(),
                table,
                level,
            })?;
            for (label, cell) in group.col_labels.iter().zip(row) {
                let label = expand(label);
                let value = render(std::slice::from_ref(cell), false);
                match resources.iter_mut().find(|(seen, _)| *seen == label) {
                    Some(slot) => slot.1 = value,
                    None => resources.push((label, value)),
                }
            }
        }

        for (label, value) in resources {
            let Some(stat) = resource_stat(&label) else {
                continue;
            };
            match value.trim().parse::<i64>() {
                Ok(amount) => self.effects.push(Effect::value(
                    self.class_origin(),
                    Operation::Base,
                    Some(stat),
                    amount,
                )),
                Err(_) => {
                    tracing::debug!("skipping non-numeric {label} value {value:?} for {stat}");
                }
            }
        }
        Ok(())
    }

    fn class_features(
        &mut self,
        class: &Class,
        subclass: Option<&Subclass>,
        level: u8,
    ) -> CoreResult<()> {
        let mut subclass_grants = 0usize;
        for current in 1..=level {
            let features =
                class
                    .features_at(current)
                    .ok_or_else(|| CoreError::MissingClassFeatures {
                        class: class.name.clone(),
                        level: current,
                    })?;
            for feature in features {
                if feature.gain_subclass_feature {
                    subclass_grants += 1;
                }
                self.features
                    .push(Feature::new(feature.name.as_str(), render(&feature.entries, true)));
            }
        }

        if subclass_grants > 0 {
            let subclass = subclass.ok_or_else(|| {
                CoreError::InvalidInput(format!(
                    "{} at level {level} grants subclass features but no subclass was selected",
                    class.name
                ))
            })?;
            for group in earned_subclass_feature_groups(subclass, subclass_grants)? {
                for feature in group {
                    self.subclass_feature(feature);
                }
            }
        }

        self.caveats.push(CLASS_FEATURES_CAVEAT.to_owned());
        self.caveats.push(SPELLCASTING_CAVEAT.to_owned());
        Ok(())
    }

    fn subclass_feature(&mut self, feature: &SubclassFeature) {
        for entry in &feature.entries {
            if let Entry::Section {
                name: Some(name),
                entries,
            } = entry
            {
                self.features
                    .push(Feature::new(name.as_str(), render(entries, true)));
            }
        }
    }

    fn background(&mut self, background: &Background) {
        for t in &background.traits {
            let lowered = t.name.to_lowercase();
            if lowered.contains("proficienc") || lowered.contains("language") {
                continue;
            }

            let text = expand(&t.text);
            if lowered.starts_with("equipment") {
                self.caveats.push(format!(
                    "**Background Equipment**: Your background grants you {text}"
                ));
            } else if lowered.starts_with("feature") {
                let title = t
                    .name
                    .get("feature".len()..)
                    .unwrap_or_default()
                    .trim_start_matches(|c: char| c == ':' || c == '-' || c.is_whitespace());
                self.features.push(Feature::new(title, text));
            } else {
                self.features.push(Feature::new(t.name.as_str(), text));
            }
        }

        let granted = &background.proficiencies;
        for tool in &granted.tool {
            self.proficiencies.push(Proficiency::new(
                self.background_origin(),
                expand(tool),
                ProficiencyCategory::Tool,
            ));
        }

        for skill in &granted.skill {
            let skill = expand(skill);
            match skill_key(&skill) {
                Some(key) => self.proficiencies.push(Proficiency::new(
                    self.background_origin(),
                    key,
                    ProficiencyCategory::Skill,
                )),
                None => {
                    self.proficiencies.push(Proficiency::placeholder(
                        self.background_origin(),
                        ProficiencyCategory::Skill,
                    ));
                    self.caveats.push(format!(
                        "**Choose Skill**: Your background gives you proficiency in either \
                         {skill}. Choose this in the Background section of the Persona tab."
                    ));
                }
            }
        }

        if !granted.language.is_empty() {
            for language in &granted.language {
                self.proficiencies.push(Proficiency::new(
                    self.background_origin(),
                    expand(language),
                    ProficiencyCategory::Language,
                ));
            }
            self.caveats.push(LANGUAGES_CAVEAT.to_owned());
        }
    }

    fn finish(mut self, caveat_title: &str) -> CompiledCharacter {
        let body = format!("{CAVEAT_PREAMBLE}{}", self.caveats.join("\n\n"));
        self.features.push(Feature::new(caveat_title, body));

        CompiledCharacter {
            effects: self.effects,
            features: self.features,
            proficiencies: self.proficiencies,
            caveats: self.caveats,
        }
    }
}
