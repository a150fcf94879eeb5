// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for hole and course operations.

/// Result type alias for course operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or sequencing holes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Authored descriptor data is missing or out of range.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// Mesh synthesis failed.
    #[error("geometry synthesis failed: {0}")]
    Geometry(#[from] putt_lite_geometry::Error),

    /// Operation called in the wrong lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Requested hole index is past the end of the course.
    #[error("hole index {index} out of range for a course of {count} holes")]
    HoleIndexOutOfRange { index: usize, count: usize },

    /// The hole has no authored start position to reset the ball to.
    #[error("hole {0} has no start position")]
    MissingStartPosition(usize),

    /// Course JSON could not be parsed.
    #[error("course json error: {0}")]
    Json(#[from] serde_json::Error),
}
