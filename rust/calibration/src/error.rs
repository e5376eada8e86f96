// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for projection, calibration and assembly.

use pitchline_drawing::{ErrorKind, Label};

/// Result type alias for calibration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a calibration run. Nothing is written when one occurs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The roof model could not be built.
    #[error(transparent)]
    Drawing(#[from] pitchline_drawing::Error),

    /// Fewer than two surveyed lengths are available to fit the scale.
    #[error("calibration needs at least 2 surveyed lengths, found {found}")]
    InsufficientData { found: usize },

    /// A facet has no pitch in the measurement table.
    #[error("facet {0} has no pitch")]
    MissingPitch(Label),

    /// A facet pitch is outside 0-12.
    #[error("facet {facet} has pitch {pitch}, expected 0-12")]
    PitchOutOfRange { facet: Label, pitch: u8 },

    /// A line has no type in the measurement table.
    #[error("line {0} has no type")]
    MissingLineType(Label),

    /// A surveyed length is negative or not finite.
    #[error("line {line} has invalid surveyed length {length}")]
    InvalidLength { line: Label, length: f64 },

    /// The table still contains unknowns where complete data is required.
    #[error("measurement table is incomplete: {0}")]
    Incomplete(String),

    /// A table row references a line the drawing does not contain.
    #[error("measurement table references unknown line {0}")]
    UnknownLine(Label),

    /// A table row references a facet the drawing does not contain.
    #[error("measurement table references unknown facet {0}")]
    UnknownFacet(Label),

    /// A sloped line lies on a facet without an eave or ridge.
    #[error("facet {facet} has no eave or ridge to project line {line} against")]
    NoReferenceLine { facet: Label, line: Label },

    /// A sloped segment is not on the boundary of any facet.
    #[error("sloped line {0} does not lie on any facet")]
    OrphanSegment(Label),

    /// The chosen projection is undefined for this segment.
    #[error("line {line} runs parallel to the reference line of facet {facet}; projection is undefined")]
    DegenerateProjection { line: Label, facet: Label },

    /// All surveyed samples have zero projected length.
    #[error("surveyed lines have zero projected length; scale cannot be fitted")]
    DegenerateRegression,

    /// No facet has a boundary line with a usable scale factor.
    #[error("no facet has a usable scale factor")]
    NoScaleFactor,

    /// Table or summary JSON could not be encoded or decoded.
    #[error("measurement table decode error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Classifies the error into validation, geometry or lookup failures.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Drawing(e) => e.kind(),
            Error::InsufficientData { .. }
            | Error::MissingPitch(_)
            | Error::PitchOutOfRange { .. }
            | Error::MissingLineType(_)
            | Error::InvalidLength { .. }
            | Error::Incomplete(_)
            | Error::Json(_) => ErrorKind::Validation,
            Error::UnknownLine(_) | Error::UnknownFacet(_) => ErrorKind::Lookup,
            Error::NoReferenceLine { .. }
            | Error::OrphanSegment(_)
            | Error::DegenerateProjection { .. }
            | Error::DegenerateRegression
            | Error::NoScaleFactor => ErrorKind::Geometry,
        }
    }
}
