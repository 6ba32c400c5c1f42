use std::path::PathBuf;
use thiserror::Error;

pub type VarlabelResult<T> = std::result::Result<T, VarlabelError>;

#[derive(Debug, Error)]
pub enum VarlabelError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Failed to persist output file: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("Invalid gzip header: {}", path.display())]
    InvalidGzipHeader { path: PathBuf },
    #[error("Precondition failed: {message}")]
    Precondition { message: String },
    #[error("Schema error: {message}")]
    Schema { message: String },
    #[error("Parse error: {message}")]
    Parse { message: String },
    #[error("Invalid chromosome '{value}' in row {row}")]
    InvalidChromosome { value: String, row: usize },
}

impl VarlabelError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// True for errors raised while touching the filesystem or a compressed stream.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Persist(_) | Self::InvalidGzipHeader { .. }
        )
    }
}

#[macro_export]
macro_rules! varlabel_error {
    ($($arg:tt)*) => {
        $crate::error::VarlabelError::message(format!($($arg)*))
    };
}
