//! Error types for catalog queries and URL recognition.

use thiserror::Error;

/// Errors from query construction and direct-document-URL parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The query carried an out-of-range field.
    ///
    /// Fails fast at construction: no network call is ever attempted for
    /// an invalid query.
    #[error("invalid query: {reason}")]
    InvalidQuery {
        /// What was wrong with the query.
        reason: String,
    },

    /// The URL does not point at the catalog's file-serving endpoint.
    #[error("not a direct document URL: {url}")]
    NotADirectDocumentUrl {
        /// The rejected URL string.
        url: String,
    },
}

impl CatalogError {
    /// Creates an invalid-query error.
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
        }
    }

    /// Creates a not-a-direct-document-URL error.
    pub fn not_a_direct_document_url(url: impl Into<String>) -> Self {
        Self::NotADirectDocumentUrl { url: url.into() }
    }
}
