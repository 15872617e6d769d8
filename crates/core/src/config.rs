//! Compiler configuration.
//!
//! Configuration is resolved once at process startup and passed into the compiler. Compilation
//! itself never reads environment variables, so repeated runs over the same inputs produce the
//! same records.

use crate::constants::{DEFAULT_CAVEAT_TITLE, DEFAULT_MAX_LEVEL};
use crate::{CoreError, CoreResult};

/// Compiler configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CompilerConfig {
    max_level: u8,
    caveat_title: String,
}

impl CompilerConfig {
    /// Create a new `CompilerConfig`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` if `max_level` is zero or `caveat_title` is blank.
    pub fn new(max_level: u8, caveat_title: impl Into<String>) -> CoreResult<Self> {
        if max_level == 0 {
            return Err(CoreError::InvalidInput("max_level must be at least 1".into()));
        }

        let caveat_title = caveat_title.into();
        if caveat_title.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "caveat_title cannot be empty".into(),
            ));
        }

        Ok(Self {
            max_level,
            caveat_title,
        })
    }

    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    pub fn caveat_title(&self) -> &str {
        &self.caveat_title
    }

    /// Checks that `level` lies in `1..=max_level`.
    pub fn check_level(&self, level: u8) -> CoreResult<()> {
        if level == 0 || level > self.max_level {
            return Err(CoreError::InvalidLevel {
                level,
                max: self.max_level,
            });
        }
        Ok(())
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            caveat_title: DEFAULT_CAVEAT_TITLE.to_owned(),
        }
    }
}

/// Parse the maximum supported level from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_MAX_LEVEL`].
pub fn max_level_from_env_value(value: Option<String>) -> CoreResult<u8> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value
        .map(|v| {
            v.parse::<u8>()
                .map_err(|e| CoreError::InvalidInput(format!("invalid max level '{v}': {e}")))
        })
        .transpose()?;

    Ok(parsed.unwrap_or(DEFAULT_MAX_LEVEL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_levels_one_to_twenty() {
        let config = CompilerConfig::default();
        assert!(config.check_level(1).is_ok());
        assert!(config.check_level(20).is_ok());
        assert!(matches!(
            config.check_level(0),
            Err(CoreError::InvalidLevel { level: 0, max: 20 })
        ));
        assert!(matches!(
            config.check_level(21),
            Err(CoreError::InvalidLevel { level: 21, max: 20 })
        ));
    }

    #[test]
    fn new_rejects_zero_max_level() {
        let err = CompilerConfig::new(0, "Caveats").expect_err("should reject zero");
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains("max_level")));
    }

    #[test]
    fn new_rejects_blank_caveat_title() {
        let err = CompilerConfig::new(20, "  ").expect_err("should reject blank title");
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains("caveat_title")));
    }

    #[test]
    fn max_level_env_value_defaults_when_blank() {
        assert_eq!(max_level_from_env_value(None).unwrap(), DEFAULT_MAX_LEVEL);
        assert_eq!(
            max_level_from_env_value(Some("   ".into())).unwrap(),
            DEFAULT_MAX_LEVEL
        );
        assert_eq!(max_level_from_env_value(Some(" 30 ".into())).unwrap(), 30);
    }

    #[test]
    fn max_level_env_value_rejects_garbage() {
        let err = max_level_from_env_value(Some("twenty".into())).expect_err("should reject");
        assert!(matches!(err, CoreError::InvalidInput(msg) if msg.contains("twenty")));
    }
}
