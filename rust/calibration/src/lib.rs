// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roof measurement calibration
//!
//! Fills in a surveyor's partial measurement table against a resolved roof
//! drawing:
//! 1. Sloped lines are lifted onto their facet planes using the facet pitch
//! 2. A single drawing scale is fitted over the surveyed lines
//! 3. Unknown lengths are predicted and unknown facet areas computed
//! 4. The complete table is rolled up into per-type and per-pitch totals
//!
//! # Usage
//!
//! ```rust,ignore
//! use pitchline_calibration::{resolve, EngineConfig, MeasurementTable};
//! use pitchline_drawing::Drawing;
//!
//! let drawing = Drawing::from_json(&drawing_json)?;
//! let mut table = MeasurementTable::from_json(&sheet_json)?;
//! let resolution = resolve(&drawing, &mut table, &EngineConfig::default())?;
//! println!("{:.0} sq ft", resolution.summary.total_area);
//! ```

pub mod assembler;
pub mod config;
pub mod error;
pub mod projector;
pub mod regressor;
pub mod table;

pub use assembler::{summarize, LengthTotal, MeasurementSummary, PitchArea, WasteRow};
pub use config::{CalibrationConfig, EngineConfig, ProjectionModel};
pub use error::{Error, Result};
pub use projector::{incidence_angle, slope_angle, PitchProjector};
pub use regressor::{CalibrationReport, Calibrator, Sample};
pub use table::{FacetRecord, LineRecord, LineType, MeasurementTable};

use pitchline_drawing::{Drawing, RoofModel};
use serde::Serialize;

/// Everything one engine run produces besides the filled table
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    #[serde(skip)]
    pub model: RoofModel,
    pub calibration: CalibrationReport,
    pub summary: MeasurementSummary,
}

/// Runs the full pipeline on a drawing and a partial table.
///
/// Resolves the drawing, calibrates `table` in place and assembles the
/// summary. On error `table` is left as it was.
pub fn resolve(drawing: &Drawing, table: &mut MeasurementTable, config: &EngineConfig) -> Result<Resolution> {
    let model = RoofModel::build(drawing.to_primitives(), &config.drawing)?;

    let mut working = table.clone();
    let calibration = Calibrator::new(&model, &config.calibration).run(&mut working)?;
    let summary = summarize(&model, &working)?;
    *table = working;

    Ok(Resolution {
        model,
        calibration,
        summary,
    })
}

/// Builds the model for `drawing` and an all-unknown table for it.
pub fn blank_sheet(drawing: &Drawing, config: &EngineConfig) -> Result<(RoofModel, MeasurementTable)> {
    let model = RoofModel::build(drawing.to_primitives(), &config.drawing)?;
    let table = MeasurementTable::blank(&model);
    tracing::debug!(
        lines = table.lines.len(),
        facets = table.facets.len(),
        "created blank measurement sheet"
    );
    Ok((model, table))
}
