//! # Autochar Core
//!
//! Rules data model and character compiler.
//!
//! This crate contains pure data operations over parsed rules content:
//! - Race, class, subclass, background and spell views, held in a [`Compendium`]
//! - The [`RulesCompiler`], which turns a selection and level into sheet records
//! - The [`SheetClient`] interface and the create-character orchestration
//!
//! **No I/O**: reading rules files and talking to the sheet service belong to the caller
//! (see the `autochar` CLI). Rendering of entry trees lives in the `markup` crate.

pub mod compendium;
pub mod compiler;
pub mod config;
pub mod constants;
pub mod error;
pub mod records;
pub mod sheet;

pub use compendium::Compendium;
pub use compiler::{RulesCompiler, Selection, SheetIds};
pub use config::CompilerConfig;
pub use error::{CoreError, CoreResult};
pub use records::{CompiledCharacter, Effect, Feature, Proficiency};
pub use sheet::{add_spells, create_character, SheetClient};
