//! Error types for quarry

use thiserror::Error;

/// Result type alias for quarry operations
pub type QuarryResult<T> = Result<T, QuarryError>;

/// Boxed driver error passed through unchanged.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for building, binding and executing queries
#[derive(Debug, Error)]
pub enum QuarryError {
    /// `raw` placeholder count did not match the number of args
    #[error("Bad Statement: has {placeholders} placeholders but {args} args: {clause}")]
    RawArgCount {
        placeholders: usize,
        args: usize,
        clause: String,
    },

    /// VALUES rendered with no rows
    #[error("must have at least one value expression")]
    EmptyValues,

    /// UNION / INTERSECT / EXCEPT without a strategy
    #[error("Combination strategy must be set")]
    NoCombinationStrategy,

    /// CASE without any WHEN branch
    #[error("case must have at least one when expression")]
    EmptyCase,

    /// SET clause without assignments
    #[error("SET clause must have at least one assignment expression")]
    EmptySet,

    /// Window frame that cannot be rendered
    #[error("invalid window frame: {0}")]
    InvalidFrame(String),

    /// A named placeholder reached a dialect that cannot write one
    #[error("dialect does not support named arguments")]
    NoNamedArgs,

    /// A pre-rendered query was replayed at a different start index
    #[error("expected to start at {expected}, started at {got}")]
    WrongStart { expected: usize, got: usize },

    /// A named arg could not be resolved against the bind target
    #[error("missing arg {name}")]
    MissingArg { name: String },

    /// The bind target has an unsupported shape
    #[error("several named args need a record or a string-keyed map to bind from")]
    BadArgType,

    /// Named and positional args were mixed where only one kind is allowed
    #[error("cannot mix named and non-named arguments")]
    MixedArgs,

    /// Arg count differs from the placeholder count
    #[error("expected {expected} args, got {got}")]
    MismatchedArgs { expected: usize, got: usize },

    /// A named arg sentinel reached the executor without rebinding
    #[error("raw named arg {name:?} used without rebinding")]
    RawNamedArg { name: String },

    /// Query returned no rows where one was required
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database error passed through from the executor
    #[error("Database error: {0}")]
    Database(#[source] BoxError),

    /// Row mapping error, tagged with meta for comparison
    #[error("Mapping error [{}]: {message}", meta.join(", "))]
    Mapping { meta: Vec<String>, message: String },

    /// A hook aborted the operation
    #[error("Hook error: {0}")]
    Hook(String),

    /// A loader failed
    #[error("Loader {loader} failed: {source}")]
    Loader {
        loader: String,
        #[source]
        source: Box<QuarryError>,
    },

    /// A typed hook or loader saw a value of an unexpected type
    #[error("hookable type mismatch: expected {expected}")]
    HookableTypeMismatch { expected: &'static str },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl QuarryError {
    /// Create a mapping error tagged with `meta`
    pub fn mapping<I, S>(meta: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Mapping {
            meta: meta.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Wrap a driver error
    pub fn database(err: impl Into<BoxError>) -> Self {
        Self::Database(err.into())
    }

    /// Wrap a loader failure with the loader's name
    pub fn loader(loader: impl Into<String>, source: QuarryError) -> Self {
        Self::Loader {
            loader: loader.into(),
            source: Box::new(source),
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error happened while rendering SQL
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::RawArgCount { .. }
                | Self::EmptyValues
                | Self::NoCombinationStrategy
                | Self::EmptyCase
                | Self::EmptySet
                | Self::InvalidFrame(_)
                | Self::NoNamedArgs
                | Self::WrongStart { .. }
        )
    }

    /// Check if this error happened while binding named args
    pub fn is_bind_error(&self) -> bool {
        matches!(
            self,
            Self::MissingArg { .. }
                | Self::BadArgType
                | Self::MixedArgs
                | Self::MismatchedArgs { .. }
                | Self::RawNamedArg { .. }
        )
    }

    /// Meta tags of a mapping error, empty for other kinds
    pub fn meta(&self) -> &[String] {
        match self {
            Self::Mapping { meta, .. } => meta,
            _ => &[],
        }
    }
}

impl From<serde_json::Error> for QuarryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
