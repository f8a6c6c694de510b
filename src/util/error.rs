//! Error types for detpost.

use thiserror::Error;

/// Result alias for detpost operations.
pub type DetPostResult<T> = std::result::Result<T, DetPostError>;

/// Errors that can occur when configuring or running the post-processing
/// engines.
///
/// Configuration and shape errors are fatal to the call and surface before
/// any output is produced; numeric degeneracies in the input (zero-area
/// boxes, non-finite deltas) are handled locally by the pipeline and never
/// appear here.
#[derive(Debug, Error, PartialEq)]
pub enum DetPostError {
    /// A threshold parameter lies outside `[0, 1]` or is not finite.
    #[error("invalid {name}: {value} (must be finite and within [0, 1])")]
    InvalidThreshold {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A count parameter that must be positive is zero.
    #[error("invalid {name}: must be positive")]
    InvalidCount {
        /// Parameter name.
        name: &'static str,
    },
    /// The background class index does not address a configured class.
    #[error("background class {index} out of range for {num_classes} classes")]
    BackgroundOutOfRange {
        /// Configured background index.
        index: usize,
        /// Configured class count.
        num_classes: usize,
    },
    /// Score-bit truncation outside the representable mantissa range.
    #[error("invalid score bits: {bits} (valid range is 0..=22)")]
    InvalidScoreBits {
        /// Requested retained mantissa bits.
        bits: u8,
    },
    /// A regression weight is zero or non-finite and cannot scale deltas.
    #[error("invalid regression weight at coordinate {coord}: {value}")]
    InvalidRegWeight {
        /// Coordinate index (0..4).
        coord: usize,
        /// Offending value.
        value: f32,
    },
    /// A prior buffer whose length is not a multiple of four coordinates.
    #[error("prior buffer length {len} is not a multiple of 4")]
    RaggedPriors {
        /// Provided element count.
        len: usize,
    },
    /// A provided tensor does not have the length implied by the
    /// configuration and candidate count.
    #[error("shape mismatch for {context}: expected {expected} elements, got {got}")]
    ShapeMismatch {
        /// Which tensor failed validation.
        context: &'static str,
        /// Expected element count.
        expected: usize,
        /// Provided element count.
        got: usize,
    },
    /// The caller-provided workspace is smaller than the sized requirement.
    #[error("workspace too small: needed {needed} bytes, got {got}")]
    WorkspaceTooSmall {
        /// Required byte count.
        needed: usize,
        /// Provided byte count.
        got: usize,
    },
    /// A serialized configuration buffer ended before all fields were read.
    #[error("serialized config truncated: needed {needed} bytes, got {got}")]
    TruncatedBuffer {
        /// Required byte count.
        needed: usize,
        /// Provided byte count.
        got: usize,
    },
    /// A serialized configuration contains an unknown enum tag.
    #[error("unknown {context} tag in serialized config: {tag}")]
    UnknownTag {
        /// Which field carried the tag.
        context: &'static str,
        /// The unrecognized byte.
        tag: u8,
    },
}
