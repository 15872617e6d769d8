/// Boxed error returned by a [`crate::sheet::SheetClient`] implementation.
pub type SheetError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("level {level} is outside the supported range 1..={max}")]
    InvalidLevel { level: u8, max: u8 },
    #[error("unknown ability code: {0}")]
    UnknownAbility(String),
    #[error("class {class} has no feature list for level {level}")]
    MissingClassFeatures { class: String, level: u8 },
    #[error("class {class} table {table} has no row for level {level}")]
    MissingTableRow {
        class: String,
        table: usize,
        level: u8,
    },
    #[error(
        "subclass {subclass} grants {available} feature groups but {wanted} were earned"
    )]
    MissingSubclassFeatures {
        subclass: String,
        wanted: usize,
        available: usize,
    },
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("schema mismatch: {0}")]
    Schema(String),

    #[error("character sheet service error: {0}")]
    Sheet(#[source] SheetError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
