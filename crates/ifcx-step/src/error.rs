//! Error types for STEP reading, resolving and writing.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StepError>;

/// Errors that can occur during STEP operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    /// File-level structure error: unterminated string or comment, missing delimiter.
    #[error("Lexer error at line {line}, column {col}: {message}")]
    Lexer {
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        col: usize,
        /// Error message.
        message: String,
    },

    /// Malformed argument text: unbalanced parentheses, bad escape, bad literal.
    #[error("Syntax error{}: {message} in `{text}`", fmt_entity(*entity_id))]
    Syntax {
        /// Entity ID where the error occurred, if known.
        entity_id: Option<u64>,
        /// Error message.
        message: String,
        /// The offending text.
        text: String,
    },

    /// Argument count below the number of attributes the type declares.
    #[error("#{entity_id}={type_name}: expected {expected} arguments, got {actual}")]
    Arity {
        /// Entity ID.
        entity_id: u64,
        /// Entity type name.
        type_name: String,
        /// Declared attribute count.
        expected: usize,
        /// Parsed argument count.
        actual: usize,
    },

    /// One or more `#id` references with no record behind them.
    #[error("Unresolved reference{}: object with id {} not found", fmt_entity(*entity_id), fmt_ids(missing))]
    UnresolvedReference {
        /// Entity whose attribute holds the references, if known.
        entity_id: Option<u64>,
        /// Every missing id found in that attribute.
        missing: Vec<u64>,
    },

    /// Inline `KEYWORD(...)` naming no type of the schema.
    #[error("Unknown keyword{} `{keyword}` while reading {context}", fmt_entity(*entity_id))]
    UnknownKeyword {
        /// Entity ID where the error occurred, if known.
        entity_id: Option<u64>,
        /// The upper-cased keyword.
        keyword: String,
        /// What was being read (select or attribute name).
        context: String,
    },

    /// Record keyword naming no entity of the schema.
    #[error("#{entity_id}: unknown entity type {keyword}")]
    UnknownEntity {
        /// Entity ID.
        entity_id: u64,
        /// The record keyword.
        keyword: String,
    },

    /// Record instantiating an abstract entity type.
    #[error("#{entity_id}: entity type {type_name} is abstract")]
    AbstractEntity {
        /// Entity ID.
        entity_id: u64,
        /// Entity type name.
        type_name: String,
    },

    /// Two records with the same id.
    #[error("Duplicate entity id: #{0}")]
    DuplicateId(u64),

    /// Instance id outside the positive range.
    #[error("Invalid entity id: #{0}")]
    InvalidId(u64),

    /// No id above the highest one in use is left to assign.
    #[error("No entity id left above #{0}")]
    IdSpaceExhausted(u64),

    /// Missing entity reference.
    #[error("Missing entity reference: #{0}")]
    MissingEntity(u64),

    /// Key of an entity that is no longer in the model.
    #[error("Reference to an entity that is no longer in the model")]
    StaleReference,

    /// Type mismatch (e.g., take-over between unrelated entity types).
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type name.
        expected: String,
        /// Actual type name.
        actual: String,
    },

    /// Several independent failures for one attribute.
    #[error("{}", join_errors(.0, "; "))]
    Batch(Vec<StepError>),

    /// Inconsistent schema declaration.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Rejected settings value.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl StepError {
    /// Create a lexer error.
    pub fn lexer(line: usize, col: usize, message: impl Into<String>) -> Self {
        Self::Lexer {
            line,
            col,
            message: message.into(),
        }
    }

    /// Create a syntax error with no entity context yet.
    pub fn syntax(message: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Syntax {
            entity_id: None,
            message: message.into(),
            text: text.into(),
        }
    }

    /// Create an unresolved-reference error with no entity context yet.
    pub fn unresolved(missing: Vec<u64>) -> Self {
        Self::UnresolvedReference {
            entity_id: None,
            missing,
        }
    }

    /// Create an unknown-keyword error with no entity context yet.
    pub fn unknown_keyword(keyword: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownKeyword {
            entity_id: None,
            keyword: keyword.into(),
            context: context.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Attach the id of the record being parsed where none is set yet.
    pub fn at_entity(self, id: u64) -> Self {
        match self {
            Self::Syntax {
                entity_id: None,
                message,
                text,
            } => Self::Syntax {
                entity_id: Some(id),
                message,
                text,
            },
            Self::UnresolvedReference {
                entity_id: None,
                missing,
            } => Self::UnresolvedReference {
                entity_id: Some(id),
                missing,
            },
            Self::UnknownKeyword {
                entity_id: None,
                keyword,
                context,
            } => Self::UnknownKeyword {
                entity_id: Some(id),
                keyword,
                context,
            },
            Self::Batch(errors) => Self::Batch(errors.into_iter().map(|e| e.at_entity(id)).collect()),
            other => other,
        }
    }

    /// Fold a list of failures into one error.
    ///
    /// Unresolved references are merged into a single error listing every
    /// missing id in order of appearance. Returns `None` for an empty list.
    pub fn merge(errors: Vec<StepError>) -> Option<StepError> {
        let mut missing = Vec::new();
        let mut others = Vec::new();
        for error in errors {
            match error {
                Self::UnresolvedReference {
                    entity_id: None,
                    missing: ids,
                } => {
                    for id in ids {
                        if !missing.contains(&id) {
                            missing.push(id);
                        }
                    }
                }
                Self::Batch(inner) => others.extend(inner),
                other => others.push(other),
            }
        }
        if !missing.is_empty() {
            others.insert(0, Self::unresolved(missing));
        }
        match others.len() {
            0 => None,
            1 => others.pop(),
            _ => Some(Self::Batch(others)),
        }
    }

    /// Flatten nested batches into a list of independent failures.
    pub fn into_flat(self) -> Vec<StepError> {
        match self {
            Self::Batch(errors) => errors.into_iter().flat_map(Self::into_flat).collect(),
            other => vec![other],
        }
    }
}

/// Every independent failure found while parsing one file.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct StepErrors(pub Vec<StepError>);

impl StepErrors {
    /// The collected failures.
    pub fn errors(&self) -> &[StepError] {
        &self.0
    }

    /// Number of failures.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StepErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s) while reading STEP data", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}

impl From<StepError> for StepErrors {
    fn from(error: StepError) -> Self {
        Self(error.into_flat())
    }
}

fn fmt_entity(id: Option<u64>) -> String {
    id.map(|id| format!(" at entity #{id}")).unwrap_or_default()
}

fn fmt_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_errors(errors: &[StepError], sep: &str) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}
