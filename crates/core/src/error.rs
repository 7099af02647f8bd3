use thiserror::Error;

/// Result type for evaluation operations
pub type Result<T> = std::result::Result<T, Error>;

/// How far an error reaches once raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Aborts the whole evaluation; no results are exposed
    Fatal,
    /// Logged at the call site; completed results stay available
    Recoverable,
}

/// Main error type for evaluation operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed relevance judgment input
    #[error("Collection import error in {source_name}{}: {message}", line_suffix(.line))]
    CollectionImport {
        source_name: String,
        line: Option<usize>,
        message: String,
    },

    /// Malformed retrieved-lines input
    #[error("Run import error in {source_name}{}: {message}", line_suffix(.line))]
    RunImport {
        source_name: String,
        line: Option<usize>,
        message: String,
    },

    /// A relevance type could not interpret a raw token
    #[error("Invalid relevance token '{token}': expected {expected}")]
    InvalidRelevanceToken { token: String, expected: String },

    /// Failure while writing or displaying results
    #[error("Export error: {0}")]
    Export(String),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

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

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|l| format!(" (line {l})")).unwrap_or_default()
}

impl Error {
    /// Creates a collection import error
    pub fn collection_import(
        source_name: impl Into<String>,
        line: Option<usize>,
        message: impl Into<String>,
    ) -> Self {
        Self::CollectionImport {
            source_name: source_name.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates a run import error
    pub fn run_import(
        source_name: impl Into<String>,
        line: Option<usize>,
        message: impl Into<String>,
    ) -> Self {
        Self::RunImport {
            source_name: source_name.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates an invalid relevance token error
    pub fn invalid_token(token: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidRelevanceToken {
            token: token.into(),
            expected: expected.into(),
        }
    }

    /// Creates an export error
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
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

    /// Classifies the error as fatal to an evaluation or recoverable
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CollectionImport { .. }
            | Self::RunImport { .. }
            | Self::InvalidRelevanceToken { .. }
            | Self::Config(_) => ErrorKind::Fatal,
            Self::Export(_) | Self::Io(_) => ErrorKind::Recoverable,
            Self::WithContext { source, .. } => match source.downcast_ref::<Error>() {
                Some(inner) => inner.kind(),
                None => ErrorKind::Fatal,
            },
            Self::Other(_) => ErrorKind::Fatal,
        }
    }

    /// True for errors raised while importing judgments or runs
    pub fn is_import(&self) -> bool {
        matches!(
            self,
            Self::CollectionImport { .. }
                | Self::RunImport { .. }
                | Self::InvalidRelevanceToken { .. }
        )
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
