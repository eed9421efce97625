//! Error types for the codec.

/// Errors that can occur while encoding, decoding or transporting a blob.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown type tag: {0}")]
    UnknownType(u64),

    #[error("unknown number subtype: {0}")]
    UnknownNumberType(u64),

    #[error("malformed stream: {0}")]
    MalformedStream(String),

    #[error("varint does not fit in 64 bits")]
    Overflow,

    #[error("nesting depth exceeds limit of {0}")]
    DepthLimit(usize),

    #[error("{0} trailing code units after value")]
    TrailingData(usize),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Shorthand for a [`CodecError::MalformedStream`] with a formatted message.
    pub fn malformed(msg: impl std::fmt::Display) -> Self {
        Self::MalformedStream(msg.to_string())
    }

    /// Returns true for errors caused by corrupt or truncated input.
    pub fn is_corrupt_stream(&self) -> bool {
        matches!(
            self,
            Self::UnknownType(_)
                | Self::UnknownNumberType(_)
                | Self::MalformedStream(_)
                | Self::Overflow
                | Self::TrailingData(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_stream_classification() {
        assert!(CodecError::UnknownType(99).is_corrupt_stream());
        assert!(CodecError::malformed("short").is_corrupt_stream());
        assert!(!CodecError::InvalidArgument("-1".into()).is_corrupt_stream());
        assert!(!CodecError::DepthLimit(8).is_corrupt_stream());
    }

    #[test]
    fn display_messages() {
        assert_eq!(CodecError::UnknownType(42).to_string(), "unknown type tag: 42");
        assert_eq!(
            CodecError::malformed("need 3 units").to_string(),
            "malformed stream: need 3 units"
        );
    }
}
