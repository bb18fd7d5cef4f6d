//! Index error types
//!
//! Error codes:
//! - MULTIRANGE_INDEX_ALREADY_DEFINED (ERROR)
//! - MULTIRANGE_UNKNOWN_INDEX (ERROR)
//! - MULTIRANGE_MISSING_CRITERION (WARN)
//! - MULTIRANGE_ARITY_MISMATCH (ERROR)
//!
//! An inverted range (`left > right`) is not an error; reads return 0.

use std::fmt;

/// Severity levels for index errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The element is excluded from one index, the call can be retried with
    /// different input
    Warn,
    /// The call is rejected; the catalog is unchanged
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warn => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexErrorCode {
    /// An index with the same identifier already exists
    AlreadyDefined,
    /// No index with the given identifier exists
    UnknownIndex,
    /// A generated key sequence contains a missing criterion
    MissingCriterion,
    /// A key sequence does not match the arity of its index
    ArityMismatch,
}

impl IndexErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::AlreadyDefined => "MULTIRANGE_INDEX_ALREADY_DEFINED",
            IndexErrorCode::UnknownIndex => "MULTIRANGE_UNKNOWN_INDEX",
            IndexErrorCode::MissingCriterion => "MULTIRANGE_MISSING_CRITERION",
            IndexErrorCode::ArityMismatch => "MULTIRANGE_ARITY_MISMATCH",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            IndexErrorCode::MissingCriterion => Severity::Warn,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexError {
    /// Error code
    code: IndexErrorCode,
    /// Human-readable message
    message: String,
    /// Index identifier if known
    index_id: Option<String>,
}

impl IndexError {
    /// An index with this identifier was already defined
    pub fn already_defined(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            code: IndexErrorCode::AlreadyDefined,
            message: format!("An index with identifier '{}' has already been defined", id),
            index_id: Some(id),
        }
    }

    /// No index with this identifier exists
    pub fn unknown_index(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            code: IndexErrorCode::UnknownIndex,
            message: format!("There is no index with identifier '{}'", id),
            index_id: Some(id),
        }
    }

    /// The key sequence contains a missing criterion
    pub fn missing_criterion() -> Self {
        Self {
            code: IndexErrorCode::MissingCriterion,
            message: "Key sequence contains a missing criterion".to_string(),
            index_id: None,
        }
    }

    /// The key sequence arity differs from the index arity
    pub fn arity_mismatch(expected: usize, found: usize) -> Self {
        let message = if found == 0 {
            "Key sequence is empty".to_string()
        } else {
            format!("Expected {} criteria, found {}", expected, found)
        };
        Self {
            code: IndexErrorCode::ArityMismatch,
            message,
            index_id: None,
        }
    }

    /// Attach the identifier of the index the error occurred in
    pub fn with_index(mut self, id: impl Into<String>) -> Self {
        self.index_id = Some(id.into());
        self
    }

    /// Returns the error code
    pub fn code(&self) -> IndexErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the index identifier if known
    pub fn index_id(&self) -> Option<&str> {
        self.index_id.as_deref()
    }

    /// Returns whether the whole call was rejected
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity(), self.code.code(), self.message)?;
        if let Some(ref id) = self.index_id {
            write!(f, " [index {}]", id)?;
        }
        Ok(())
    }
}

impl std::error::Error for IndexError {}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
