use thiserror::Error;

pub type TimelineResult<T> = Result<T, TimelineError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    #[error("invalid viewport: width={width}, pixels_per_ms={pixels_per_ms}")]
    InvalidViewport { width: f64, pixels_per_ms: f64 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unparsable date: `{input}`")]
    InvalidDate { input: String },

    #[error("invalid hot zone: {reason}")]
    InvalidHotZone { reason: String },

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown band: `{0}`")]
    UnknownBand(String),

    #[error("duplicate band: `{0}`")]
    DuplicateBand(String),
}
