use thiserror::Error;

/// Result type for relevance evaluation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for relevance evaluation operations
///
/// Every variant is fatal for the query being evaluated: the engine never
/// hands out a partially aligned relevance vector.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input tagged with a source format the consumer does not accept
    #[error("Format mismatch: expected {expected}, found '{found}'")]
    FormatMismatch { expected: String, found: String },

    /// The same docno was retrieved twice for one query
    #[error("Duplicate retrieved document '{docno}' for query '{query_id}'")]
    DuplicateIdentifier { query_id: String, docno: String },

    /// The same docno was judged twice within one judgment group
    #[error("Duplicate judgment for document '{docno}' in judgment group '{group}'")]
    DuplicateJudgment { group: String, docno: String },

    /// Scratch storage could not grow to the required size
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A `level=gain` override could not be interpreted
    #[error("Malformed gain override: {0}")]
    MalformedGainOverride(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a format mismatch error
    pub fn format_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::FormatMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates a duplicate retrieved document error
    pub fn duplicate_identifier(query_id: impl Into<String>, docno: impl Into<String>) -> Self {
        Self::DuplicateIdentifier {
            query_id: query_id.into(),
            docno: docno.into(),
        }
    }

    /// Creates a duplicate judgment error
    pub fn duplicate_judgment(group: impl Into<String>, docno: impl Into<String>) -> Self {
        Self::DuplicateJudgment {
            group: group.into(),
            docno: docno.into(),
        }
    }

    /// Creates a resource exhaustion error
    pub fn resource_exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    /// Creates a malformed gain override error
    pub fn malformed_gain_override(msg: impl Into<String>) -> Self {
        Self::MalformedGainOverride(msg.into())
    }

    /// Creates an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Adds context to any error
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::with_context(context, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_identifier_message_names_query_and_docno() {
        let err = Error::duplicate_identifier("301", "FT911-3");
        assert_eq!(
            err.to_string(),
            "Duplicate retrieved document 'FT911-3' for query '301'"
        );
    }

    #[test]
    fn test_context_wraps_source_error() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "qrels missing",
        ));
        let err = io.context("Failed to read judgments").unwrap_err();

        assert_eq!(err.to_string(), "Failed to read judgments: qrels missing");
        assert!(std::error::Error::source(&err).is_some());
        assert!(matches!(err, Error::WithContext { .. }));
    }
}
