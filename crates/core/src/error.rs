use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The dataset payload is not the expected nested node shape.
    #[error("malformed dataset: {0}")]
    MalformedInput(#[source] serde_json::Error),

    #[error("invalid treemap config: {0}")]
    Config(#[source] serde_json::Error),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("pdf export failed: {0}")]
    Pdf(String),

    #[error("git history: {0}")]
    Git(#[from] git2::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
