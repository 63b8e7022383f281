//! Resource error types.

use thiserror::Error;

/// Error produced by a hardware resource refresh or persist.
///
/// Bindings translate these into status codes on the result envelope;
/// nothing at this layer terminates the process.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// I/O failure on the backing file.
    #[error("hardware I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The sensor produced a reading that could not be parsed.
    #[error("cannot parse sensor reading: {0}")]
    Parse(String),

    /// The value could not be allocated.
    #[error("out of memory")]
    OutOfMemory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResourceError::Parse("bad token".to_string());
        assert!(err.to_string().contains("bad token"));

        let err = ResourceError::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(err.to_string().contains("hardware I/O error"));
    }
}
