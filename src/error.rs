/// Crate-level error types for jot.
use std::path::PathBuf;

/// All errors in jot carry enough context to produce a useful diagnostic
/// without a debugger. Structural failures (classification, wrapping,
/// parsing) abort a whole run; evaluation-level problems are data on the
/// unit's result and never appear here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The execution backend misbehaved: broken pipe, malformed response,
    /// or a command that could not be spawned.
    #[error("backend: {reason}")]
    Backend {
        /// Description of the backend failure.
        reason: String,
    },

    /// Raw text could not be split into units.
    #[error("classification failed for {}: {reason}", path.display())]
    ClassifyFailed {
        /// File whose contents could not be classified.
        path: PathBuf,
        /// Description of the classification failure.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// The synthetic compilation unit failed to structurally parse.
    #[error("parse failed: {reason}")]
    ParseFailed {
        /// Description of the parse failure.
        reason: String,
    },

    /// TOML deserialization failed while loading configuration.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// A code unit could not be packaged into the synthetic compilation
    /// unit, most often because its source never became complete.
    #[error("cannot wrap code in lines [{start}, {end}] of {}: {reason}", path.display())]
    WrapFailed {
        /// End line (exclusive) of the offending unit.
        end: usize,
        /// File containing the offending unit.
        path: PathBuf,
        /// Description of the wrap failure.
        reason: String,
        /// Start line (1-based, for humans) of the offending unit.
        start: usize,
    },
}
