use thiserror::Error;

/// Fatal problems with the input corpus or engine settings. Not retried; the
/// caller has to fix the data or configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("corpus has {found} usable documents, at least 2 are required")]
    TooFewDocuments { found: usize },

    #[error("every feature string reduced to stop words or nothing after tokenization")]
    EmptyVocabulary,

    #[error("max_features must be at least 1")]
    ZeroMaxFeatures,

    #[error("input is missing required column `{0}`")]
    MissingColumn(&'static str),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
