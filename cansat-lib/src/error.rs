use crate::telemetry::FieldIndex;

/// Reasons a buffer is rejected before it is tokenized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FrameError {
    #[error("empty frame")]
    Empty,
    #[error("frame does not start with header code {expected:?}")]
    MissingHeader { expected: String },
    #[error("frame does not end with {expected:?}")]
    MissingTrailer { expected: char },
    /// Frame body is not valid text.
    #[error("frame is not valid UTF-8 at byte {valid_up_to}")]
    Encoding { valid_up_to: usize },
}

/// A single packet failed to decode. The decoder state is never touched when one of
/// these is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("expected {expected} fields, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    #[error("checksum field {0:?} is not a valid u32")]
    ChecksumParse(String),

    #[error("checksum mismatch: computed {computed}, received {received}")]
    ChecksumMismatch { computed: u32, received: u32 },

    /// Only produced by [crate::CoercionPolicy::Strict].
    #[error("invalid value {token:?} for field {field}")]
    FieldParse { field: FieldIndex, token: String },
}

impl DecodeError {
    /// Short, stable name for the error kind, suitable for counting or as a log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::Frame(_) => "frame",
            DecodeError::FieldCount { .. } => "field_count",
            DecodeError::ChecksumParse(_) => "checksum_parse",
            DecodeError::ChecksumMismatch { .. } => "checksum_mismatch",
            DecodeError::FieldParse { .. } => "field_parse",
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid frame format: {0}")]
    FrameFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;
