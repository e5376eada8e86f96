// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for drawing resolution.

use crate::label::Label;

/// Result type alias for drawing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of a failure, shared with downstream crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input is incomplete or out of range.
    Validation,
    /// The drawing cannot be resolved into a usable facet model.
    Geometry,
    /// A reference points at an id the model does not know.
    Lookup,
}

/// Errors that can occur while building a roof model from a drawing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A primitive has non-finite coordinates or a non-positive radius.
    #[error("primitive {id} is invalid: {reason}")]
    InvalidPrimitive { id: Label, reason: String },

    /// The drawing exceeds the configured primitive cap.
    #[error("drawing has {count} primitives, the limit is {max}")]
    TooManyPrimitives { count: usize, max: usize },

    /// Polygonization produced no closed facets.
    #[error("polygonization produced no facets")]
    NoFacets,

    /// A facet has no segment on its boundary.
    #[error("facet {0} has no boundary segments")]
    EmptyFacet(Label),

    /// A segment is claimed by more facets than a planar drawing allows,
    /// or by a single facet while both of its sides are covered.
    #[error("segment of line {line} is claimed by {facets} facet(s), expected {expected}")]
    UnbalancedSegment {
        line: Label,
        facets: usize,
        expected: usize,
    },

    /// Drawing JSON could not be decoded.
    #[error("drawing decode error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Classifies the error for callers that only care about the family.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidPrimitive { .. } | Error::TooManyPrimitives { .. } | Error::Json(_) => {
                ErrorKind::Validation
            }
            Error::NoFacets | Error::EmptyFacet(_) | Error::UnbalancedSegment { .. } => {
                ErrorKind::Geometry
            }
        }
    }
}
