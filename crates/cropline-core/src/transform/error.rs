//! Errors raised by the transform engine.

use thiserror::Error;

use crate::encode::EncodeError;

/// Error types for crop, resize and preview operations.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A geometry value is non-finite or out of range.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Proportional resize needs a finite factor greater than zero.
    #[error("Invalid scale factor {0}: must be greater than 0")]
    InvalidScaleFactor(f64),

    /// The requested surface is empty or beyond the memory ceiling.
    #[error("Cannot allocate a {width}x{height} surface")]
    SurfaceAllocation { width: i64, height: i64 },

    /// The lossless intermediate encode failed.
    #[error("Intermediate surface encoding failed: {0}")]
    Intermediate(#[from] EncodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_error_display() {
        let err = TransformError::InvalidScaleFactor(0.0);
        assert_eq!(err.to_string(), "Invalid scale factor 0: must be greater than 0");

        let err = TransformError::SurfaceAllocation {
            width: 0,
            height: -4,
        };
        assert_eq!(err.to_string(), "Cannot allocate a 0x-4 surface");
    }
}
