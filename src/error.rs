use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // Dimensions disagree somewhere in the numeric pipeline
    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("network model has no layers")]
    EmptyModel,

    #[error("label {0} is not a digit class")]
    InvalidLabel(usize),

    #[error("pixel {index} has value {value}, expected 0-255")]
    InvalidPixel { index: usize, value: String },

    #[error("bad magic number: expected {expected}, got {actual}")]
    BadMagic { expected: u32, actual: u32 },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn shape(context: &'static str, expected: usize, actual: usize) -> Self {
        Error::ShapeMismatch {
            context,
            expected,
            actual,
        }
    }
}

// Fail with a shape mismatch unless the two dimensions agree
pub(crate) fn ensure_len(context: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::shape(context, expected, actual))
    }
}
