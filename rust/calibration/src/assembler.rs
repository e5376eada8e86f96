// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roll-up of a complete measurement table into report totals.

use std::collections::BTreeMap;

use pitchline_drawing::RoofModel;
use serde::{Deserialize, Serialize};

use crate::config::{line_type_color, SQUARE_AREA, WASTE_PERCENTAGES};
use crate::error::{Error, Result};
use crate::table::{LineType, MeasurementTable};

/// Total length of one line type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthTotal {
    #[serde(rename = "type")]
    pub line_type: LineType,
    pub total: f64,
    /// Legend colour used on the length diagram
    pub color: String,
}

/// Area share of one pitch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchArea {
    pub pitch: u8,
    pub area: f64,
    /// Fraction of the total roof area, 0-1
    pub share: f64,
}

/// One row of the waste table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteRow {
    pub factor: f64,
    pub area: f64,
    pub squares: f64,
}

/// Aggregated roof measurements handed to report collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementSummary {
    pub total_area: f64,
    pub facet_count: usize,
    /// Pitch covering the most area
    pub dominant_pitch: u8,
    /// Ridge, hip, valley, rake, eave
    pub lengths: Vec<LengthTotal>,
    /// Ascending by pitch
    pub pitch_areas: Vec<PitchArea>,
    pub waste: Vec<WasteRow>,
}

impl MeasurementSummary {
    pub fn length_of(&self, line_type: LineType) -> f64 {
        self.lengths
            .iter()
            .find(|l| l.line_type == line_type)
            .map_or(0.0, |l| l.total)
    }
}

/// Assembles totals from a table with no unknowns left.
pub fn summarize(model: &RoofModel, table: &MeasurementTable) -> Result<MeasurementSummary> {
    let (lines, facets) = table.unknowns();
    if !lines.is_empty() || !facets.is_empty() {
        let names: Vec<String> = lines
            .iter()
            .map(|l| format!("line {l}"))
            .chain(facets.iter().map(|f| format!("facet {f}")))
            .collect();
        return Err(Error::Incomplete(names.join(", ")));
    }

    let mut by_type: BTreeMap<LineType, f64> = BTreeMap::new();
    for (id, record) in &table.lines {
        let line_type = record.line_type.ok_or(Error::MissingLineType(*id))?;
        *by_type.entry(line_type).or_default() += record.real_length.unwrap_or(0.0);
    }

    let mut by_pitch: BTreeMap<u8, f64> = BTreeMap::new();
    for (id, record) in &table.facets {
        let pitch = record.pitch.ok_or(Error::MissingPitch(*id))?;
        *by_pitch.entry(pitch).or_default() += record.area.unwrap_or(0.0);
    }

    let total_area: f64 = by_pitch.values().sum();

    // BTreeMap order makes ties resolve to the lowest pitch.
    let dominant_pitch = by_pitch
        .iter()
        .fold(None, |best: Option<(u8, f64)>, (&pitch, &area)| match best {
            Some((_, best_area)) if best_area >= area => best,
            _ => Some((pitch, area)),
        })
        .map(|(pitch, _)| pitch)
        .ok_or_else(|| Error::Incomplete("no facets".into()))?;

    let lengths = LineType::ALL
        .iter()
        .map(|&t| LengthTotal {
            line_type: t,
            total: by_type.get(&t).copied().unwrap_or(0.0),
            color: line_type_color(t).to_string(),
        })
        .collect();

    let pitch_areas = by_pitch
        .iter()
        .map(|(&pitch, &area)| PitchArea {
            pitch,
            area,
            share: if total_area > 0.0 { area / total_area } else { 0.0 },
        })
        .collect();

    let waste = WASTE_PERCENTAGES
        .iter()
        .map(|&factor| {
            let area = total_area * factor;
            WasteRow {
                factor,
                area,
                squares: area / SQUARE_AREA,
            }
        })
        .collect();

    Ok(MeasurementSummary {
        total_area,
        facet_count: model.facets.len(),
        dominant_pitch,
        lengths,
        pitch_areas,
        waste,
    })
}
