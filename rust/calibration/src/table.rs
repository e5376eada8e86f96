// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The measurement table exchanged with surveyors.
//!
//! Rows are keyed by line and facet label. `None` marks an unknown value that
//! calibration is expected to fill.

use std::collections::BTreeMap;

use pitchline_drawing::{Label, RoofModel};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Roof line classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LineType {
    #[serde(rename = "E", alias = "e")]
    Eave,
    #[serde(rename = "R", alias = "r")]
    Ridge,
    #[serde(rename = "H", alias = "h")]
    Hip,
    #[serde(rename = "V", alias = "v")]
    Valley,
    #[serde(rename = "K", alias = "k")]
    Rake,
}

impl LineType {
    /// Report order: ridges, hips, valleys, rakes, eaves.
    pub const ALL: [LineType; 5] = [
        LineType::Ridge,
        LineType::Hip,
        LineType::Valley,
        LineType::Rake,
        LineType::Eave,
    ];

    /// Eaves and ridges are level and serve as projection references.
    pub fn is_flat(self) -> bool {
        matches!(self, LineType::Eave | LineType::Ridge)
    }
}

/// Survey data for one drawn line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub line_type: Option<LineType>,
    #[serde(default)]
    pub real_length: Option<f64>,
}

/// Survey data for one facet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetRecord {
    /// Rise per 12 units of run
    #[serde(default)]
    pub pitch: Option<u8>,
    #[serde(default)]
    pub area: Option<f64>,
}

/// Line and facet records keyed by label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementTable {
    #[serde(default)]
    pub lines: BTreeMap<Label, LineRecord>,
    #[serde(default)]
    pub facets: BTreeMap<Label, FacetRecord>,
}

impl MeasurementTable {
    /// An all-unknown table with one row per primitive and facet.
    pub fn blank(model: &RoofModel) -> Self {
        Self {
            lines: model
                .primitives
                .iter()
                .map(|p| (p.id, LineRecord::default()))
                .collect(),
            facets: model
                .facets
                .iter()
                .map(|f| (f.id, FacetRecord::default()))
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn line(&self, id: Label) -> Option<&LineRecord> {
        self.lines.get(&id)
    }

    pub fn facet(&self, id: Label) -> Option<&FacetRecord> {
        self.facets.get(&id)
    }

    pub fn line_type(&self, id: Label) -> Option<LineType> {
        self.lines.get(&id).and_then(|r| r.line_type)
    }

    pub fn pitch(&self, id: Label) -> Option<u8> {
        self.facets.get(&id).and_then(|r| r.pitch)
    }

    /// Checks that every row refers to something in `model` and adds
    /// unknown rows for primitives and facets the table does not mention.
    pub fn reconcile(&mut self, model: &RoofModel) -> Result<()> {
        if let Some(id) = self.lines.keys().find(|id| model.primitive(**id).is_none()) {
            return Err(Error::UnknownLine(*id));
        }
        if let Some(id) = self.facets.keys().find(|id| model.facet(**id).is_none()) {
            return Err(Error::UnknownFacet(*id));
        }

        for prim in &model.primitives {
            self.lines.entry(prim.id).or_default();
        }
        for facet in &model.facets {
            self.facets.entry(facet.id).or_default();
        }
        Ok(())
    }

    /// Checks the inputs calibration cannot run without: every line typed,
    /// every facet pitched within 0-12, every surveyed length usable.
    pub fn validate(&self) -> Result<()> {
        for (id, record) in &self.lines {
            if record.line_type.is_none() {
                return Err(Error::MissingLineType(*id));
            }
            if let Some(length) = record.real_length {
                if !length.is_finite() || length < 0.0 {
                    return Err(Error::InvalidLength { line: *id, length });
                }
            }
        }
        for (id, record) in &self.facets {
            match record.pitch {
                None => return Err(Error::MissingPitch(*id)),
                Some(pitch) if pitch > 12 => {
                    return Err(Error::PitchOutOfRange { facet: *id, pitch })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Labels of lines and facets still unknown.
    pub fn unknowns(&self) -> (Vec<Label>, Vec<Label>) {
        let lines = self
            .lines
            .iter()
            .filter(|(_, r)| r.real_length.is_none())
            .map(|(id, _)| *id)
            .collect();
        let facets = self
            .facets
            .iter()
            .filter(|(_, r)| r.area.is_none())
            .map(|(id, _)| *id)
            .collect();
        (lines, facets)
    }

    pub fn is_complete(&self) -> bool {
        let (lines, facets) = self.unknowns();
        lines.is_empty() && facets.is_empty()
    }
}
