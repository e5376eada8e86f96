// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lifting drawing lengths onto pitched facet planes.
//!
//! A top-down sketch foreshortens every line that climbs the roof. Level
//! lines (eaves and ridges) keep their drawing length. A sloped line is
//! measured against the facet's flat reference line, the longest eave or
//! ridge on that facet: the closer it runs to the fall line (perpendicular
//! to the reference), the more of its length is hidden by the slope.

use std::cell::RefCell;

use nalgebra::Vector2;
use pitchline_drawing::{Facet, Label, RoofModel};
use rustc_hash::FxHashMap;

use crate::config::ProjectionModel;
use crate::error::{Error, Result};
use crate::table::MeasurementTable;

/// Slope angle `φ = atan(pitch / 12)` in radians.
pub fn slope_angle(pitch: u8) -> f64 {
    (f64::from(pitch) / 12.0).atan()
}

/// Smaller angle between two directions, in `[0, π/2]` radians.
pub fn incidence_angle(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    let theta = a.angle(b);
    theta.min(std::f64::consts::PI - theta)
}

impl ProjectionModel {
    /// True length of a segment of drawing length `length` at incidence
    /// `theta` to the reference line, on a plane sloped at `phi`.
    ///
    /// Returns `None` when the projection is undefined.
    pub fn project(self, length: f64, theta: f64, phi: f64) -> Option<f64> {
        let cos_phi = phi.cos();
        match self {
            ProjectionModel::InclinedPlane => {
                let (sin_t, cos_t) = theta.sin_cos();
                Some(length * (cos_t * cos_t + (sin_t * sin_t) / (cos_phi * cos_phi)).sqrt())
            }
            ProjectionModel::FallLine => {
                let denom = cos_phi * theta.sin().abs();
                if denom < 1e-12 {
                    None
                } else {
                    Some(length / denom)
                }
            }
        }
    }
}

/// Projects segments and lines of one model using one measurement table.
///
/// Reference lines are looked up once per facet.
pub struct PitchProjector<'a> {
    model: &'a RoofModel,
    table: &'a MeasurementTable,
    projection: ProjectionModel,
    references: RefCell<FxHashMap<Label, Option<usize>>>,
}

impl<'a> PitchProjector<'a> {
    pub fn new(model: &'a RoofModel, table: &'a MeasurementTable, projection: ProjectionModel) -> Self {
        Self {
            model,
            table,
            projection,
            references: RefCell::new(FxHashMap::default()),
        }
    }

    /// Index of the facet's flat reference segment: the longest boundary
    /// segment whose line is an eave or ridge. Ties keep the first segment.
    pub fn reference_segment(&self, facet: &Facet) -> Option<usize> {
        if let Some(cached) = self.references.borrow().get(&facet.id) {
            return *cached;
        }

        let mut best: Option<(usize, f64)> = None;
        for &idx in &facet.boundary_segments {
            let segment = &self.model.segments[idx];
            let flat = self
                .table
                .line_type(segment.id)
                .is_some_and(|t| t.is_flat());
            if !flat {
                continue;
            }
            let length = segment.drawing_length();
            if best.map_or(true, |(_, longest)| length > longest) {
                best = Some((idx, length));
            }
        }

        let reference = best.map(|(idx, _)| idx);
        self.references.borrow_mut().insert(facet.id, reference);
        reference
    }

    /// True length of segment `idx`.
    ///
    /// Flat segments keep their drawing length. Sloped segments are projected
    /// on the first facet (in label order) that claims them and has a
    /// reference line.
    pub fn project_segment(&self, idx: usize) -> Result<f64> {
        let segment = &self.model.segments[idx];
        let length = segment.drawing_length();

        let line_type = self
            .table
            .line_type(segment.id)
            .ok_or(Error::MissingLineType(segment.id))?;
        if line_type.is_flat() {
            return Ok(length);
        }

        let mut facets = self.model.facets_of_segment(idx).peekable();
        let first = *facets.peek().ok_or(Error::OrphanSegment(segment.id))?;
        let (facet, reference) = facets
            .find_map(|f| self.reference_segment(f).map(|r| (f, r)))
            .ok_or(Error::NoReferenceLine {
                facet: first.id,
                line: segment.id,
            })?;
        let pitch = self.table.pitch(facet.id).ok_or(Error::MissingPitch(facet.id))?;

        let theta = incidence_angle(
            &segment.direction(),
            &self.model.segments[reference].direction(),
        );
        let phi = slope_angle(pitch);

        self.projection
            .project(length, theta, phi)
            .ok_or(Error::DegenerateProjection {
                line: segment.id,
                facet: facet.id,
            })
    }

    /// Projected length of a whole line: the sum over its segments.
    pub fn projected_length(&self, line: Label) -> Result<f64> {
        self.model
            .segments_of(line)
            .map(|(idx, _)| self.project_segment(idx))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{FacetRecord, LineRecord, LineType};
    use approx::assert_relative_eq;
    use pitchline_drawing::{DrawingConfig, Point2D, Primitive};
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn slope_angle_of_six_twelve() {
        assert_relative_eq!(slope_angle(6).cos(), 2.0 / 5f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(slope_angle(0), 0.0);
        assert_relative_eq!(slope_angle(12), FRAC_PI_4, epsilon = 1e-12);
    }

    #[test]
    fn incidence_uses_the_smaller_supplementary_angle() {
        let a = Vector2::new(1.0, 0.0);
        assert_relative_eq!(incidence_angle(&a, &Vector2::new(-1.0, 1.0)), FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(incidence_angle(&a, &Vector2::new(0.0, -3.0)), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(incidence_angle(&a, &Vector2::new(-2.0, 0.0)), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn inclined_plane_matches_three_dimensional_length() {
        // Hip from (0,0) to (10,10) on a 6/12 roof rises 5: true length 15.
        let d = 200f64.sqrt();
        let len = ProjectionModel::InclinedPlane
            .project(d, FRAC_PI_4, slope_angle(6))
            .unwrap();
        assert_relative_eq!(len, 15.0, epsilon = 1e-9);
    }

    #[test]
    fn both_models_agree_on_the_fall_line() {
        let phi = slope_angle(8);
        let a = ProjectionModel::InclinedPlane.project(10.0, FRAC_PI_2, phi).unwrap();
        let b = ProjectionModel::FallLine.project(10.0, FRAC_PI_2, phi).unwrap();
        assert_relative_eq!(a, b, epsilon = 1e-12);
        assert_relative_eq!(a, 10.0 / phi.cos(), epsilon = 1e-12);
    }

    #[test]
    fn fall_line_is_undefined_parallel_to_reference() {
        assert!(ProjectionModel::FallLine.project(10.0, 0.0, slope_angle(6)).is_none());
        assert_relative_eq!(
            ProjectionModel::InclinedPlane.project(10.0, 0.0, slope_angle(6)).unwrap(),
            10.0
        );
    }

    /// Shed: a single 20x10 facet, eave along the bottom, rakes on the sides.
    fn shed(pitch: u8, with_eave: bool) -> (RoofModel, MeasurementTable) {
        let p = Point2D::new;
        let prims = vec![
            Primitive::line(Label::new(0), p(0.0, 0.0), p(20.0, 0.0)),
            Primitive::line(Label::new(1), p(20.0, 0.0), p(20.0, 10.0)),
            Primitive::line(Label::new(2), p(0.0, 10.0), p(20.0, 10.0)),
            Primitive::line(Label::new(3), p(0.0, 0.0), p(0.0, 10.0)),
        ];
        let model = RoofModel::build(prims, &DrawingConfig::default()).unwrap();

        let mut table = MeasurementTable::default();
        let types = [
            if with_eave { LineType::Eave } else { LineType::Rake },
            LineType::Rake,
            if with_eave { LineType::Eave } else { LineType::Rake },
            LineType::Rake,
        ];
        for (i, t) in types.into_iter().enumerate() {
            table.lines.insert(
                Label::new(i),
                LineRecord {
                    line_type: Some(t),
                    real_length: None,
                },
            );
        }
        table.facets.insert(
            Label::new(0),
            FacetRecord {
                pitch: Some(pitch),
                area: None,
            },
        );
        (model, table)
    }

    #[test]
    fn rake_on_a_shed_is_stretched_by_the_slope() {
        let (model, table) = shed(6, true);
        let projector = PitchProjector::new(&model, &table, ProjectionModel::InclinedPlane);

        assert_relative_eq!(projector.projected_length(Label::new(0)).unwrap(), 20.0);
        assert_relative_eq!(
            projector.projected_length(Label::new(1)).unwrap(),
            10.0 * 1.25f64.sqrt(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn reference_is_the_first_longest_flat_segment() {
        let (model, table) = shed(4, true);
        let projector = PitchProjector::new(&model, &table, ProjectionModel::InclinedPlane);
        let reference = projector.reference_segment(&model.facets[0]).unwrap();
        assert_eq!(model.segments[reference].id, Label::new(0));
    }

    #[test]
    fn facet_without_eave_or_ridge_fails() {
        let (model, table) = shed(6, false);
        let projector = PitchProjector::new(&model, &table, ProjectionModel::InclinedPlane);
        let err = projector.projected_length(Label::new(1)).unwrap_err();
        assert!(matches!(err, Error::NoReferenceLine { .. }));
    }

    #[test]
    fn shared_rake_uses_the_facet_with_a_reference() {
        // Two sheds side by side; only the right one has eaves.
        let p = Point2D::new;
        let prims = vec![
            Primitive::line(Label::new(0), p(0.0, 0.0), p(10.0, 0.0)),
            Primitive::line(Label::new(1), p(10.0, 0.0), p(30.0, 0.0)),
            Primitive::line(Label::new(2), p(0.0, 10.0), p(10.0, 10.0)),
            Primitive::line(Label::new(3), p(10.0, 10.0), p(30.0, 10.0)),
            Primitive::line(Label::new(4), p(0.0, 0.0), p(0.0, 10.0)),
            Primitive::line(Label::new(5), p(10.0, 0.0), p(10.0, 10.0)),
            Primitive::line(Label::new(6), p(30.0, 0.0), p(30.0, 10.0)),
        ];
        let model = RoofModel::build(prims, &DrawingConfig::default()).unwrap();
        assert_eq!(model.facets.len(), 2);

        let mut table = MeasurementTable::blank(&model);
        for (id, record) in table.lines.iter_mut() {
            let eave = matches!(id.index(), 1 | 3);
            record.line_type = Some(if eave { LineType::Eave } else { LineType::Rake });
        }
        for record in table.facets.values_mut() {
            record.pitch = Some(6);
        }

        let projector = PitchProjector::new(&model, &table, ProjectionModel::InclinedPlane);
        // Middle rake is shared; the left facet has no eave or ridge.
        assert_relative_eq!(
            projector.projected_length(Label::new(5)).unwrap(),
            10.0 * 1.25f64.sqrt(),
            epsilon = 1e-9
        );
        assert!(matches!(
            projector.projected_length(Label::new(4)),
            Err(Error::NoReferenceLine { .. })
        ));
    }

    #[test]
    fn flat_pitch_leaves_lengths_unchanged() {
        let (model, table) = shed(0, true);
        let projector = PitchProjector::new(&model, &table, ProjectionModel::FallLine);
        assert_relative_eq!(projector.projected_length(Label::new(3)).unwrap(), 10.0);
    }
}
