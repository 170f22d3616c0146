//! Error types for the ionvcf library.

use thiserror::Error;

/// Errors that can occur while reading, annotating or filtering variant calls.
#[derive(Error, Debug)]
pub enum IonVcfError {
    /// Failed to parse the VCF header.
    #[error("Header parse error: {0}")]
    HeaderParseError(String),

    /// Failed to parse a VCF data row.
    #[error("Row parse error: {0}")]
    RowParseError(String),

    /// The FUNC annotation block could not be decoded.
    #[error("Annotation parse error: {0}")]
    AnnotationParseError(String),

    /// Failed to parse a filter expression.
    #[error("Filter parse error: {0}")]
    FilterParseError(String),

    /// Error during filter evaluation.
    #[error("Evaluation error: {0}")]
    EvaluationError(String),

    /// Type mismatch during comparison.
    #[error("Type mismatch: cannot compare {left} with {right}")]
    TypeMismatch { left: String, right: String },

    /// A `chr:pos` style coordinate could not be read.
    #[error("Invalid coordinate '{0}' (expected chr:pos)")]
    InvalidCoordinate(String),

    /// A query (codon, amino acid, HGVS string) could not be interpreted.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A chain file section or alignment block is malformed.
    #[error("Chain parse error at line {line}: {message}")]
    ChainParseError { line: usize, message: String },

    /// A required external binary is not on PATH.
    #[error("Can not find `{0}` in $PATH; it must be installed to run this command")]
    MissingTool(String),

    /// An external binary ran but exited unsuccessfully.
    #[error("`{tool}` failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Result type alias for ionvcf operations.
pub type Result<T> = std::result::Result<T, IonVcfError>;
