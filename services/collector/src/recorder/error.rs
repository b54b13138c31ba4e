use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("batch output file does not exist: {0}")]
    OutputMissing(PathBuf),

    #[error("failed to write batch output file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid batch payload: {0}")]
    InvalidBatch(String),
}
