//! Fatal (configuration-class) errors. Per-item problems never surface here:
//! a response that fails validation is retried by the dispatcher, and a
//! response that fails extraction becomes a sentinel value, not an error.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required input column is absent (or null) in the loaded record set.
    /// This is a per-run configuration error, raised before any dispatch.
    #[error("missing required column '{column}' in input records")]
    MissingColumn { column: String },

    #[error("invalid client kind '{0}' (expected one of: openai, next, local)")]
    UnknownClient(String),

    #[error("invalid mode '{0}' (expected one of: gen, normal)")]
    UnknownMode(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config(detail.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
