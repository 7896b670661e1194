//! Diagnostic error types for the tutor-viz core.
//!
//! Only invalid *calls* surface as errors here. A problem with no recognisable
//! diagram, or a diagram rejected by the validator, is an `Option::None`
//! outcome and is logged instead of returned.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the crate.
#[derive(Debug, Error, Diagnostic)]
pub enum TutorError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Division(#[from] DivisionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Diagram(#[from] DiagramError),
}

// ---------------------------------------------------------------------------
// Division errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum DivisionError {
    #[error("cannot simulate long division of {dividend} by zero")]
    #[diagnostic(
        code(tutor::division::zero_divisor),
        help(
            "The divisor must be a positive integer. The extractor never yields \
             a zero divisor, so this usually means operands were built by hand."
        )
    )]
    ZeroDivisor { dividend: u64 },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(tutor::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(tutor::config::parse),
        help("Check the TOML syntax. Every key is optional and falls back to its default.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(tutor::config::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Diagram errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum DiagramError {
    #[error("diagram payload is not valid JSON: {message}")]
    #[diagnostic(
        code(tutor::diagram::json),
        help(
            "The diagram must be a JSON object with at least `type` and `data`. \
             Check the payload emitted by the dialogue service."
        )
    )]
    Json { message: String },
}

impl From<serde_json::Error> for DiagramError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json {
            message: e.to_string(),
        }
    }
}

/// Convenience alias for fallible operations in this crate.
pub type TutorResult<T> = std::result::Result<T, TutorError>;
