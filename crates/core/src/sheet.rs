//! Character-sheet service boundary.
//!
//! [`SheetClient`] is the interface to the external service that stores characters. This crate
//! ships no network implementation; callers plug in their own client. [`create_character`]
//! drives one full run: create the character, attach the class, compile, then submit the records.
//! [`add_spells`] copies compendium spells into an existing character's spell list.

use crate::compendium::{Compendium, SpellRecord};
use crate::compiler::{RulesCompiler, Selection, SheetIds};
use crate::error::SheetError;
use crate::records::{CompiledCharacter, Effect, Feature, Proficiency};
use crate::{CoreError, CoreResult};
use serde::Serialize;

/// New character header as the sheet service accepts it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewCharacter {
    pub name: String,
    pub race: String,
    pub backstory: String,
}

/// A class entry attached to a character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassLevel {
    pub name: String,
    pub level: u8,
}

pub trait SheetClient {
    /// Creates a character and returns its id.
    fn create_character(&mut self, character: &NewCharacter) -> Result<String, SheetError>;

    /// Attaches a class to a character and returns the class entry id.
    fn insert_class(&mut self, character_id: &str, class: &ClassLevel)
        -> Result<String, SheetError>;

    fn insert_features(&mut self, character_id: &str, features: &[Feature])
        -> Result<(), SheetError>;

    fn insert_effects(&mut self, character_id: &str, effects: &[Effect]) -> Result<(), SheetError>;

    fn insert_proficiencies(
        &mut self,
        character_id: &str,
        proficiencies: &[Proficiency],
    ) -> Result<(), SheetError>;

    /// Appends spells to the character's default spell list.
    fn insert_spells(&mut self, character_id: &str, spells: &[SpellRecord])
        -> Result<(), SheetError>;
}

/// Creates a character on the sheet service from a selection.
///
/// The level is checked before anything is sent, so an invalid request leaves no partial
/// character behind. Returns the new character id.
///
/// # Errors
///
/// Returns any compile error, or `CoreError::Sheet` when the client fails.
pub fn create_character<C: SheetClient>(
    client: &mut C,
    compiler: &RulesCompiler,
    name: &str,
    selection: &Selection<'_>,
) -> CoreResult<String> {
    compiler.config().check_level(selection.level)?;

    let character_id = client
        .create_character(&NewCharacter {
            name: name.to_owned(),
            race: selection.race.name.clone(),
            backstory: selection.background.name.clone(),
        })
        .map_err(CoreError::Sheet)?;
    tracing::info!("created character {character_id} ({name})");

    let class_id = client
        .insert_class(
            &character_id,
            &ClassLevel {
                name: selection.class.name.clone(),
                level: selection.level,
            },
        )
        .map_err(CoreError::Sheet)?;

    let ids = SheetIds::new(character_id.as_str(), class_id);
    let compiled = compiler.compile(selection, &ids)?;
    submit(client, &character_id, &compiled)?;

    tracing::info!(
        "submitted {} features, {} effects, {} proficiencies for {character_id}",
        compiled.features.len(),
        compiled.effects.len(),
        compiled.proficiencies.len()
    );
    Ok(character_id)
}

/// Adds the spells at `indices` (positions in [`Compendium::spells`]) to a character.
///
/// `character` may be a bare id or a sheet URL containing `/character/<id>`. Returns the number
/// of spells inserted.
///
/// # Errors
///
/// Returns `CoreError::InvalidInput` for an empty selection or character reference,
/// `CoreError::NotFound` for an index outside the compendium, and `CoreError::Sheet` when the
/// client fails.
pub fn add_spells<C: SheetClient>(
    client: &mut C,
    compendium: &Compendium,
    character: &str,
    indices: &[usize],
) -> CoreResult<usize> {
    if indices.is_empty() {
        return Err(CoreError::InvalidInput(
            "you are not inserting any spells".into(),
        ));
    }
    let character_id = character_id_from_reference(character)?;

    let records = indices
        .iter()
        .map(|&index| compendium.spell_at(index).map(|spell| spell.to_sheet_record()))
        .collect::<CoreResult<Vec<_>>>()?;

    client
        .insert_spells(character_id, &records)
        .map_err(CoreError::Sheet)?;
    tracing::info!("inserted {} spells for {character_id}", records.len());
    Ok(records.len())
}

/// Extracts a character id from a bare id or a sheet URL.
pub fn character_id_from_reference(reference: &str) -> CoreResult<&str> {
    let reference = reference.trim();
    let id = match reference.split_once("/character/") {
        Some((_, rest)) => rest.split('/').next().unwrap_or_default(),
        None => reference,
    };
    if id.is_empty() {
        return Err(CoreError::InvalidInput(format!(
            "no character id in '{reference}'"
        )));
    }
    Ok(id)
}

fn submit<C: SheetClient>(
    client: &mut C,
    character_id: &str,
    compiled: &CompiledCharacter,
) -> CoreResult<()> {
    client
        .insert_features(character_id, &compiled.features)
        .map_err(CoreError::Sheet)?;
    client
        .insert_effects(character_id, &compiled.effects)
        .map_err(CoreError::Sheet)?;
    client
        .insert_proficiencies(character_id, &compiled.proficiencies)
        .map_err(CoreError::Sheet)?;
    Ok(())
}
