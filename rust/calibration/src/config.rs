// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Calibration settings and static measurement tables.

use pitchline_drawing::DrawingConfig;
use serde::{Deserialize, Serialize};

use crate::table::LineType;

/// Overlap/waste allowance applied to every computed facet area.
pub const DEFAULT_WASTE_FACTOR: f64 = 1.13;

/// Waste allowances listed in the summary's waste table.
pub const WASTE_PERCENTAGES: [f64; 7] = [1.00, 1.10, 1.12, 1.15, 1.17, 1.20, 1.22];

/// Area of one roofing square.
pub const SQUARE_AREA: f64 = 100.0;

/// Legend colour per line type, as drawn on the length diagram.
pub const LINE_TYPE_COLORS: [(LineType, &str); 5] = [
    (LineType::Eave, "black"),
    (LineType::Ridge, "red"),
    (LineType::Valley, "blue"),
    (LineType::Hip, "orange"),
    (LineType::Rake, "green"),
];

/// Looks up the legend colour of a line type.
pub fn line_type_color(line_type: LineType) -> &'static str {
    LINE_TYPE_COLORS
        .iter()
        .find(|(t, _)| *t == line_type)
        .map(|(_, c)| *c)
        .unwrap_or("black")
}

/// How a sloped segment's drawing length is lifted onto its facet plane.
///
/// `θ` is the angle between the segment and the facet's flat reference line,
/// `φ` the facet's slope angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionModel {
    /// `d · sqrt(cos²θ + sin²θ / cos²φ)`: only the component running down
    /// the fall line is stretched by the slope.
    #[default]
    InclinedPlane,
    /// `d / (cos φ · |sin θ|)`; undefined for segments parallel to the
    /// reference line.
    FallLine,
}

impl std::str::FromStr for ProjectionModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "inclined_plane" => Ok(Self::InclinedPlane),
            "fall_line" => Ok(Self::FallLine),
            other => Err(format!("unknown projection model {other:?}")),
        }
    }
}

/// Configuration for projection, regression and area computation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Multiplier applied to every computed facet area
    pub waste_factor: f64,
    /// Sloped-length projection
    pub projection: ProjectionModel,
    /// Predicted lengths never go below this
    pub min_predicted_length: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            waste_factor: DEFAULT_WASTE_FACTOR,
            projection: ProjectionModel::default(),
            min_predicted_length: 1.0,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub drawing: DrawingConfig,
    pub calibration: CalibrationConfig,
}
