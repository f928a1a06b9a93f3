//! Error types for the MPC-in-the-Head signature engine.
//!
//! Verification never surfaces these to callers: every failure collapses to a
//! plain `false`, and the variant is only recorded through `tracing`.

use thiserror::Error;

/// Errors that can occur during key handling, signing or verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MpcithError {
    /// The provided key is malformed or has the wrong length.
    #[error("malformed key: {reason}")]
    MalformedKey {
        /// Description of the key issue.
        reason: &'static str,
    },

    /// The signature has the wrong length, an out-of-range field element, or
    /// non-zero padding in an implicit party slot.
    #[error("malformed signature: {reason}")]
    MalformedSignature {
        /// Description of the encoding issue.
        reason: &'static str,
    },

    /// The witness does not satisfy the public relation.
    #[error("witness does not satisfy the relation")]
    RelationViolation,

    /// An encoded value needed more bytes than its fixed slot.
    #[error("encoding overflow in {context}")]
    EncodingOverflow {
        /// What was being encoded.
        context: &'static str,
    },

    /// A recomputed transcript hash did not match the signature.
    #[error("transcript mismatch at {stage}")]
    TranscriptMismatch {
        /// Which hash disagreed ("h1" or "h2").
        stage: &'static str,
    },

    /// Signing ran out of retries.
    #[error("signing failed after {attempts} attempts")]
    SigningFailed {
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// Invalid parameter set specified.
    #[error("invalid parameters: {reason}")]
    InvalidParams {
        /// Description of why the parameters are invalid.
        reason: &'static str,
    },

    /// Invalid input was provided to a function.
    #[error("invalid input for '{field}': {reason}")]
    InvalidInput {
        /// The name of the invalid field/parameter.
        field: &'static str,
        /// Description of why the input is invalid.
        reason: &'static str,
    },
}

/// Result type alias for MPC-in-the-Head operations.
pub type Result<T> = std::result::Result<T, MpcithError>;
