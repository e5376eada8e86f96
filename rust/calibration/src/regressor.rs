// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Survey-based calibration of drawing lengths and areas.
//!
//! The run works in four steps:
//! 1. Fit one scale `k` through the origin over the surveyed lines
//! 2. Predict every unknown length from its nearest surveyed anchor
//! 3. Derive per-facet scale factors and their median as the area scale
//! 4. Compute every unknown facet area from drawing area, slope and scale

use std::collections::BTreeMap;

use pitchline_drawing::{Label, RoofModel};
use serde::{Deserialize, Serialize};

use crate::config::CalibrationConfig;
use crate::error::{Error, Result};
use crate::projector::{slope_angle, PitchProjector};
use crate::table::MeasurementTable;

/// Slack for float noise when rounding areas up or truncating lengths.
const ROUNDING_SLACK: f64 = 1e-9;

/// A (projected length, surveyed length) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub projected: f64,
    pub real: f64,
}

/// Least-squares slope of `real ≈ k · projected` forced through the origin.
pub fn fit_through_origin(samples: &[Sample]) -> Result<f64> {
    if samples.len() < 2 {
        return Err(Error::InsufficientData {
            found: samples.len(),
        });
    }
    let sxy: f64 = samples.iter().map(|s| s.projected * s.real).sum();
    let sxx: f64 = samples.iter().map(|s| s.projected * s.projected).sum();
    if sxx <= f64::EPSILON {
        return Err(Error::DegenerateRegression);
    }
    Ok(sxy / sxx)
}

/// Sample whose projected length is closest to `x`. Ties keep the first.
pub fn nearest_sample(x: f64, samples: &[Sample]) -> Option<Sample> {
    let mut best: Option<(Sample, f64)> = None;
    for &s in samples {
        let dist = (x - s.projected).abs();
        if best.map_or(true, |(_, d)| dist < d) {
            best = Some((s, dist));
        }
    }
    best.map(|(s, _)| s)
}

/// Linear correction around an anchor: `y₀ + (x − x₀)·k`.
pub fn predict(x: f64, anchor: Sample, slope: f64) -> f64 {
    anchor.real + (x - anchor.projected) * slope
}

/// Median of `values`; `None` when empty. Even counts average the middle pair.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Smallest even integer not below `x`.
pub fn round_up_even(x: f64) -> f64 {
    let n = (x - ROUNDING_SLACK).ceil();
    if n % 2.0 != 0.0 {
        n + 1.0
    } else {
        n
    }
}

/// Real facet area: `waste · round_up_even(drawing_area / cos φ · scale²)`.
///
/// `scale` is real units per projected drawing unit.
pub fn facet_area(drawing_area: f64, pitch: u8, scale: f64, waste_factor: f64) -> f64 {
    let sloped = drawing_area / slope_angle(pitch).cos();
    waste_factor * round_up_even(sloped * scale * scale)
}

/// What a calibration run derived, alongside the filled table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationReport {
    /// Fitted real-per-projected slope
    pub slope: f64,
    /// Projected drawing length of every line
    pub projected_lengths: BTreeMap<Label, f64>,
    /// Median real/projected ratio of each facet's boundary lines
    pub facet_scale_factors: BTreeMap<Label, f64>,
    /// Median of the facet scale factors
    pub area_scale_factor: f64,
    /// Lines whose length was predicted in this run
    pub predicted_lines: Vec<Label>,
    /// Facets whose area was computed in this run
    pub computed_facets: Vec<Label>,
}

/// Fills a measurement table from a partial survey.
pub struct Calibrator<'a> {
    model: &'a RoofModel,
    config: &'a CalibrationConfig,
}

impl<'a> Calibrator<'a> {
    pub fn new(model: &'a RoofModel, config: &'a CalibrationConfig) -> Self {
        Self { model, config }
    }

    /// Calibrates `table` against the model.
    ///
    /// Works on a copy; `table` is only replaced when every step succeeded.
    /// Surveyed values are never overwritten.
    pub fn run(&self, table: &mut MeasurementTable) -> Result<CalibrationReport> {
        let mut working = table.clone();
        working.reconcile(self.model)?;
        working.validate()?;

        let projected_lengths = self.project_all(&working)?;

        let samples: Vec<Sample> = working
            .lines
            .iter()
            .filter_map(|(id, r)| {
                r.real_length.map(|real| Sample {
                    projected: projected_lengths[id],
                    real,
                })
            })
            .collect();

        let slope = fit_through_origin(&samples)?;
        tracing::debug!(samples = samples.len(), slope, "fitted drawing scale");

        let mut predicted_lines = Vec::new();
        for (id, record) in working.lines.iter_mut() {
            if record.real_length.is_some() {
                continue;
            }
            let x = projected_lengths[id];
            let anchor = nearest_sample(x, &samples).ok_or(Error::InsufficientData { found: 0 })?;
            let value = (predict(x, anchor, slope) + ROUNDING_SLACK)
                .trunc()
                .max(self.config.min_predicted_length);
            tracing::trace!(line = %id, projected = x, predicted = value, "predicted length");
            record.real_length = Some(value);
            predicted_lines.push(*id);
        }

        let facet_scale_factors = self.facet_scale_factors(&working, &projected_lengths);
        let factors: Vec<f64> = facet_scale_factors.values().copied().collect();
        let area_scale_factor = median(&factors).ok_or(Error::NoScaleFactor)?;
        tracing::debug!(
            facets = facet_scale_factors.len(),
            area_scale_factor,
            "derived area scale"
        );

        let mut computed_facets = Vec::new();
        for facet in &self.model.facets {
            let record = working
                .facets
                .get_mut(&facet.id)
                .ok_or(Error::UnknownFacet(facet.id))?;
            if record.area.is_some() {
                continue;
            }
            let pitch = record.pitch.ok_or(Error::MissingPitch(facet.id))?;
            record.area = Some(facet_area(
                facet.drawing_area(),
                pitch,
                area_scale_factor,
                self.config.waste_factor,
            ));
            computed_facets.push(facet.id);
        }

        *table = working;

        Ok(CalibrationReport {
            slope,
            projected_lengths,
            facet_scale_factors,
            area_scale_factor,
            predicted_lines,
            computed_facets,
        })
    }

    fn project_all(&self, table: &MeasurementTable) -> Result<BTreeMap<Label, f64>> {
        let projector = PitchProjector::new(self.model, table, self.config.projection);
        self.model
            .primitives
            .iter()
            .map(|p| -> Result<(Label, f64)> { Ok((p.id, projector.projected_length(p.id)?)) })
            .collect()
    }

    /// Per facet, the median of `real / projected` over its boundary lines.
    /// Facets without a usable line are left out.
    fn facet_scale_factors(
        &self,
        table: &MeasurementTable,
        projected: &BTreeMap<Label, f64>,
    ) -> BTreeMap<Label, f64> {
        let mut factors = BTreeMap::new();
        for facet in &self.model.facets {
            let ratios: Vec<f64> = self
                .model
                .facet_line_ids(facet)
                .into_iter()
                .filter_map(|id| {
                    let real = table.line(id)?.real_length?;
                    let x = *projected.get(&id)?;
                    (x > f64::EPSILON).then(|| real / x)
                })
                .collect();

            match median(&ratios) {
                Some(factor) => {
                    factors.insert(facet.id, factor);
                }
                None => tracing::warn!(facet = %facet.id, "facet has no usable scale factor"),
            }
        }
        factors
    }
}
