/// Result alias that carries the custom [`EyesError`] type.
pub type Result<T> = std::result::Result<T, EyesError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum EyesError {
    /// Free-form failure that does not belong to a more specific variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Config or script files that are not valid JSON for the expected shape.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    /// A trigger command string that could not be understood. The driver logs
    /// and drops these; they never reach the animation controller.
    #[error("bad command `{input}`: {reason}")]
    Command { input: String, reason: String },
    /// Configuration values that parse but make no sense (zero tick rate,
    /// inverted intervals and the like).
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Failure reported by the rendering backend. Fatal to the driver loop.
    #[error("render backend failed: {0}")]
    Render(String),
}

impl EyesError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn command(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Command {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    pub fn render<T: Into<String>>(msg: T) -> Self {
        Self::Render(msg.into())
    }
}

impl From<&str> for EyesError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for EyesError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
