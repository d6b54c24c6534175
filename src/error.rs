#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("truncated buffer reading {field} at offset {offset}: need {need} bytes, have {have}")]
    TruncatedBuffer { field: &'static str, offset: usize, need: usize, have: usize },

    #[error("missing field: {field}")]
    MissingField { field: &'static str },

    #[error("value {value} does not fit field {field}")]
    FieldOverflow { field: &'static str, value: String },

    #[error("building {index}: parameter length mismatch (parameter_count {expected}, got {actual})")]
    ParameterCountMismatch { index: u32, expected: usize, actual: usize },

    #[error("data length is {len} but {consumed} bytes deserialized")]
    TrailingData { consumed: usize, len: usize },

    #[error("unknown item: {0}")]
    UnknownItem(String),

    #[error("unknown recipe: {0}")]
    UnknownRecipe(String),

    #[error("invalid blueprint envelope: {0}")]
    InvalidEnvelope(String),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("base64 error: {0}")]
    Base64(String),

    #[error("json error: {0}")]
    Json(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Self::Base64(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
