/// Result alias that carries the custom [`VizError`] type.
pub type Result<T> = std::result::Result<T, VizError>;

/// Common error type for the core crate.
///
/// Expected absences (a missing microphone, an unknown audio id, an
/// out-of-range scene index) are not errors and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum VizError {
    /// Free-form message for failures without a dedicated variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration files that fail to parse.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// Caller supplied arguments that can never be valid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A process-wide service was constructed twice.
    #[error("{0} has already been initialised and cannot be constructed again")]
    AlreadyInitialised(&'static str),
    /// A service required to start the animator was never provided.
    #[error("{0} must be provided before the animator can start")]
    MissingService(&'static str),
    /// Config write against a name that is not in the schema.
    #[error("unknown config option `{0}`")]
    UnknownOption(String),
    /// Config write with a value of the wrong kind.
    #[error("config option `{name}` expects a {expected} value")]
    OptionType {
        name: &'static str,
        expected: &'static str,
    },
    /// Numeric config write outside the declared bounds.
    #[error("config option `{name}` must lie within [{min}, {max}], got {value}")]
    OptionRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl VizError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for VizError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for VizError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<realfft::FftError> for VizError {
    fn from(value: realfft::FftError) -> Self {
        Self::Message(format!("spectrum analysis failed: {value}"))
    }
}
