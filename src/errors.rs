//! Error Types
//!
//! This module defines the error type returned by the construction paths of
//! the runtime.
//!
//! # Overview
//!
//! [`AnimaError`] only ever surfaces while sequence data is being built or
//! acquired:
//! - Unknown sequence identities
//! - Malformed frame/key windows
//! - Keyframe count mismatches
//! - JSON decoding of authored sequences
//!
//! Per-tick operations (`update`, `play`, `resume`, ...) never return errors.
//! They silently no-op when a precondition is missing, and parts fall back to
//! `Playback::Halt` when their sequence data cannot be sampled.
//!
//! # Usage
//!
//! ```rust,ignore
//! use anima::errors::Result;
//!
//! fn load(repository: &SequenceRepository) -> Result<()> {
//!     let core = repository.acquire("Seq_Core_active")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the animation runtime.
#[derive(Error, Debug)]
pub enum AnimaError {
    // ========================================================================
    // Repository Errors
    // ========================================================================
    /// No construction routine is registered under this identity.
    #[error("Unknown sequence: {0}")]
    UnknownSequence(String),

    // ========================================================================
    // Sequence Construction Errors
    // ========================================================================
    /// `frame_end` precedes `frame_start`.
    #[error("Invalid frame range for '{name}': {start}..={end}")]
    InvalidFrameRange {
        /// Sequence name
        name: String,
        /// First frame
        start: i32,
        /// Last frame
        end: i32,
    },

    /// The key window and the frame window cover a different number of frames.
    #[error("Key window of '{name}' spans {keys} frames but its frame window spans {frames}")]
    WindowMismatch {
        /// Sequence name
        name: String,
        /// Length of `[key_start, key_end]`
        keys: i32,
        /// Length of `[frame_start, frame_end]`
        frames: i32,
    },

    /// The number of declared keyframes does not fill the key window.
    #[error("Sequence '{name}' expects {expected} keyframes, got {actual}")]
    KeyframeCount {
        /// Sequence name
        name: String,
        /// `key_end - key_start + 1`
        expected: usize,
        /// Keyframes supplied by the construction routine
        actual: usize,
    },

    /// A sequence was built without any keyframe.
    #[error("Sequence '{0}' has no keyframes")]
    EmptySequence(String),

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Alias for `Result<T, AnimaError>`.
pub type Result<T> = std::result::Result<T, AnimaError>;
