//! # Autochar Markup
//!
//! Rendering support for the semi-structured JSON document dialect used by open rules compendia.
//!
//! Rules text is authored as nested "entries": bare strings, titled blocks, tables, lists and a
//! handful of formula nodes, with `{@tag payload}` macros embedded inline. This crate provides:
//! - [`Entry`]: a closed sum type over the known entry shapes, with an `Unknown` fallback
//! - [`render`]: entry tree to flat markdown
//! - [`expand`]: inline macro expansion, usable on its own
//!
//! Rendering is total. Unknown shapes and unknown macro tags are logged with `tracing` and then
//! dropped or passed through, so a single malformed node never aborts a whole document.

pub mod constants;
pub mod entry;
pub mod macros;
pub mod render;

pub use constants::ability_name;
pub use entry::{Die, Entry, Table};
pub use macros::expand;
pub use render::{render, render_value};
