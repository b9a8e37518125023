//! Domain error types.

/// A parse error with position information for expression parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for stratbuilder.
#[derive(Debug, thiserror::Error)]
pub enum StratError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("store error: {reason}")]
    Store { reason: String },

    #[error("store query error: {reason}")]
    StoreQuery { reason: String },

    #[error(transparent)]
    ExpressionParse(#[from] ParseError),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StratError> for std::process::ExitCode {
    fn from(err: &StratError) -> Self {
        let code: u8 = match err {
            StratError::Io(_) => 1,
            StratError::ConfigParse { .. }
            | StratError::ConfigMissing { .. }
            | StratError::ConfigInvalid { .. } => 2,
            StratError::Store { .. } | StratError::StoreQuery { .. } => 3,
            StratError::ExpressionParse(_) => 4,
            StratError::Serialize(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
