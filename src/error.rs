/// Unified error type for the foreign-table refresh subsystem
/// Provides structured error handling with categories for different failure modes
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    /// Catalog lookup failures: the table does not exist
    #[error("Table not found: {table}")]
    NotFound { table: String },

    /// Precondition violation: the table exists but is not a foreign table
    #[error("{table} is not a foreign table. Refreshes are applicable to only foreign tables.")]
    NotForeignTable { table: String },

    /// External source failures: connection loss, malformed payloads, timeouts
    #[error("Fetch error: {message}")]
    Fetch {
        message: String,
        source_name: Option<String>,
    },

    /// Internal errors: should never happen, indicates bug
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        context: Option<String>,
    },
}

impl RefreshError {
    pub fn not_found(table: impl Into<String>) -> Self {
        Self::NotFound {
            table: table.into(),
        }
    }

    pub fn not_foreign_table(table: impl Into<String>) -> Self {
        Self::NotForeignTable {
            table: table.into(),
        }
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
            source_name: None,
        }
    }

    pub fn fetch_with_source(message: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
            source_name: Some(source_name.into()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: None,
        }
    }

    /// Add context to an error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        if let Self::Internal { context: ctx, .. } = &mut self {
            *ctx = Some(context.into());
        }
        self
    }
}

impl From<anyhow::Error> for RefreshError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal {
            message: err.to_string(),
            context: None,
        }
    }
}

/// Result type alias for refresh operations
pub type RefreshResult<T> = Result<T, RefreshError>;
