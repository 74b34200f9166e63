//! Mesh import and export.

#[cfg(feature = "stl-io")]
mod stl;

/// Errors raised while reading or writing mesh files.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("std::io::Error: {0}")]
    StdIo(#[from] std::io::Error),
    #[error("Input is malformed: {0}")]
    MalformedInput(String),
}
