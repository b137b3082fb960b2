//! Reader and writer settings.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StepError};

/// Parsing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderSettings {
    /// Run the keyword and attribute passes on the rayon pool.
    pub parallel: bool,
    /// Number of worker threads; `0` uses the global pool.
    pub threads: usize,
    /// Treat extra trailing arguments as arity errors instead of warnings.
    pub strict_arity: bool,
    /// Log and skip records whose keyword the schema does not know.
    pub skip_unknown_entities: bool,
    /// Populate inverse attributes after a successful parse.
    pub wire_inverses: bool,
    /// Warn when FILE_SCHEMA names a different schema.
    pub check_schema_name: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: 0,
            strict_arity: false,
            skip_unknown_entities: true,
            wire_inverses: true,
            check_schema_name: true,
        }
    }
}

impl ReaderSettings {
    /// Single-threaded reading with otherwise default behavior.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.threads > 0 && !self.parallel {
            return Err(StepError::InvalidSettings(
                "threads requires parallel reading".into(),
            ));
        }
        Ok(())
    }
}

/// Output parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterSettings {
    /// Emit the ISO-10303-21 envelope and HEADER section.
    pub include_header: bool,
    /// Line terminator, `"\n"` or `"\r\n"`.
    pub line_ending: String,
}

impl Default for WriterSettings {
    fn default() -> Self {
        Self {
            include_header: true,
            line_ending: "\n".into(),
        }
    }
}

impl WriterSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.line_ending != "\n" && self.line_ending != "\r\n" {
            return Err(StepError::InvalidSettings(format!(
                "line_ending must be \\n or \\r\\n, got {:?}",
                self.line_ending
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ReaderSettings::default().validate().is_ok());
        assert!(ReaderSettings::sequential().validate().is_ok());
        assert!(WriterSettings::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let reader = ReaderSettings {
            parallel: false,
            threads: 4,
            ..ReaderSettings::default()
        };
        assert!(matches!(reader.validate(), Err(StepError::InvalidSettings(_))));

        let writer = WriterSettings {
            line_ending: ";".into(),
            ..WriterSettings::default()
        };
        assert!(writer.validate().is_err());
    }

    #[test]
    fn test_partial_json() {
        let settings: ReaderSettings = serde_json::from_str(r#"{"strict_arity": true}"#).unwrap();
        assert!(settings.strict_arity);
        assert!(settings.parallel);
        assert!(settings.skip_unknown_entities);

        let json = serde_json::to_string(&WriterSettings::default()).unwrap();
        let back: WriterSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, WriterSettings::default());
    }
}
