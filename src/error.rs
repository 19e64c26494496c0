use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the dataset or computing a view from it.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive {path} could not be read: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive entry escapes the extraction directory: {0}")]
    UnsafeEntry(String),

    #[error("Archive {0} does not contain a .csv file")]
    NoCsvInArchive(PathBuf),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column '{0}' is missing from the dataset")]
    MissingColumn(&'static str),

    #[error("Row {row}: age '{value}' is not a number")]
    BadAge { row: usize, value: String },

    #[error("Row {row}: last_online '{value}' has no valid hour field")]
    MalformedLastOnline { row: usize, value: String },
}

impl DataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DataError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
