// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The resolved roof model: primitives, their segments and the facets they bound.

use serde::{Deserialize, Serialize};

use crate::config::DrawingConfig;
use crate::error::{Error, Result};
use crate::facets::{build_facets, check_shared_segments, Facet};
use crate::label::Label;
use crate::segmenter::split_primitives;
use crate::types::{Primitive, Segment};

/// Topological model of a roof drawing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoofModel {
    pub primitives: Vec<Primitive>,
    pub segments: Vec<Segment>,
    pub facets: Vec<Facet>,
}

impl RoofModel {
    /// Runs the segmenter and the facet builder over `primitives`.
    pub fn build(primitives: Vec<Primitive>, config: &DrawingConfig) -> Result<Self> {
        if primitives.len() > config.max_primitives {
            return Err(Error::TooManyPrimitives {
                count: primitives.len(),
                max: config.max_primitives,
            });
        }

        for prim in &primitives {
            if !prim.is_finite() {
                return Err(Error::InvalidPrimitive {
                    id: prim.id,
                    reason: "non-finite coordinate".into(),
                });
            }
            if let Some(arc) = prim.as_arc() {
                if arc.radius <= 0.0 {
                    return Err(Error::InvalidPrimitive {
                        id: prim.id,
                        reason: format!("arc radius {} is not positive", arc.radius),
                    });
                }
            }
        }

        let segments = split_primitives(&primitives, config);
        let facets = build_facets(&segments, config)?;

        let violations = check_shared_segments(&segments, &facets, config.epsilon);
        if let Some(first) = violations.first() {
            if config.strict_topology {
                return Err(first.into());
            }
            for v in &violations {
                tracing::warn!(
                    line = %v.line,
                    segment = v.segment,
                    claimed_by = v.claimed_by,
                    expected = v.expected,
                    "segment shared by an unexpected number of facets"
                );
            }
        }

        Ok(Self {
            primitives,
            segments,
            facets,
        })
    }

    pub fn primitive(&self, id: Label) -> Option<&Primitive> {
        self.primitives.iter().find(|p| p.id == id)
    }

    pub fn facet(&self, id: Label) -> Option<&Facet> {
        self.facets.iter().find(|f| f.id == id)
    }

    /// Segments split from primitive `id`, with their indices, in chain order.
    pub fn segments_of(&self, id: Label) -> impl Iterator<Item = (usize, &Segment)> + '_ {
        self.segments
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.id == id)
    }

    /// Facets whose boundary contains segment `segment`, in label order.
    pub fn facets_of_segment(&self, segment: usize) -> impl Iterator<Item = &Facet> + '_ {
        self.facets.iter().filter(move |f| f.has_segment(segment))
    }

    /// Distinct primitive labels on a facet's boundary, in label order.
    pub fn facet_line_ids(&self, facet: &Facet) -> Vec<Label> {
        let mut ids: Vec<Label> = facet
            .boundary_segments
            .iter()
            .map(|&idx| self.segments[idx].id)
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Arc, Point2D};
    use approx::assert_relative_eq;

    fn line(index: usize, a: (f64, f64), b: (f64, f64)) -> Primitive {
        Primitive::line(Label::new(index), Point2D::new(a.0, a.1), Point2D::new(b.0, b.1))
    }

    /// Rectangle with a ridge stopping short of a gable, split by a cross line.
    fn gable_with_cross_line() -> Vec<Primitive> {
        vec![
            line(0, (0.0, 0.0), (20.0, 0.0)),
            line(1, (20.0, 0.0), (20.0, 10.0)),
            line(2, (0.0, 10.0), (20.0, 10.0)),
            line(3, (0.0, 0.0), (0.0, 10.0)),
            line(4, (0.0, 5.0), (20.0, 5.0)),
        ]
    }

    #[test]
    fn cross_line_splits_gable_ends() {
        let model = RoofModel::build(gable_with_cross_line(), &DrawingConfig::default()).unwrap();

        assert_eq!(model.segments_of(Label::new(1)).count(), 2);
        assert_eq!(model.segments_of(Label::new(3)).count(), 2);
        assert_eq!(model.segments_of(Label::new(4)).count(), 1);
        assert_eq!(model.facets.len(), 2);

        let total: f64 = model.facets.iter().map(Facet::drawing_area).sum();
        assert_relative_eq!(total, 200.0, epsilon = 1e-9);

        let (ridge_idx, _) = model.segments_of(Label::new(4)).next().unwrap();
        assert_eq!(model.facets_of_segment(ridge_idx).count(), 2);
    }

    #[test]
    fn facet_line_ids_are_distinct_and_sorted() {
        let model = RoofModel::build(gable_with_cross_line(), &DrawingConfig::default()).unwrap();
        let ids = model.facet_line_ids(&model.facets[0]);
        assert_eq!(ids.len(), 4);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert!(ids.contains(&Label::new(4)));
    }

    #[test]
    fn too_many_primitives_is_rejected() {
        let config = DrawingConfig {
            max_primitives: 3,
            ..Default::default()
        };
        let err = RoofModel::build(gable_with_cross_line(), &config).unwrap_err();
        assert!(matches!(err, Error::TooManyPrimitives { count: 5, max: 3 }));
    }

    #[test]
    fn bad_arc_radius_is_rejected() {
        let prims = vec![Primitive::arc(
            Label::new(0),
            Arc {
                center: Point2D::new(0.0, 0.0),
                radius: 0.0,
                start_angle: 0.0,
                end_angle: 90.0,
            },
        )];
        let err = RoofModel::build(prims, &DrawingConfig::default()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[test]
    fn arc_closes_a_facet() {
        // half-disc: diameter line plus a semicircle
        let prims = vec![
            line(0, (-5.0, 0.0), (5.0, 0.0)),
            Primitive::arc(
                Label::new(1),
                Arc {
                    center: Point2D::new(0.0, 0.0),
                    radius: 5.0,
                    start_angle: 0.0,
                    end_angle: 180.0,
                },
            ),
        ];
        let model = RoofModel::build(prims, &DrawingConfig::default()).unwrap();
        assert_eq!(model.facets.len(), 1);
        let half_disc = std::f64::consts::PI * 25.0 / 2.0;
        assert_relative_eq!(model.facets[0].drawing_area(), half_disc, max_relative = 1e-3);
        assert_eq!(model.facet_line_ids(&model.facets[0]).len(), 2);

        let curve: f64 = model
            .segments_of(Label::new(1))
            .map(|(_, s)| s.drawing_length())
            .sum();
        assert_relative_eq!(curve, model.primitives[1].drawing_length(), epsilon = 1e-9);
    }

    /// Two squares overlapping without sharing a vertex: each one's edges
    /// cross the other's interior, so some edges have a facet on both sides
    /// but only one claim.
    fn overlapping_squares() -> Vec<Primitive> {
        vec![
            line(0, (0.0, 0.0), (10.0, 0.0)),
            line(1, (10.0, 0.0), (10.0, 10.0)),
            line(2, (0.0, 10.0), (10.0, 10.0)),
            line(3, (0.0, 0.0), (0.0, 10.0)),
            line(4, (5.0, 3.0), (15.0, 3.0)),
            line(5, (15.0, 3.0), (15.0, 13.0)),
            line(6, (5.0, 13.0), (15.0, 13.0)),
            line(7, (5.0, 3.0), (5.0, 13.0)),
        ]
    }

    #[test]
    fn unbalanced_segment_fails_strict_build() {
        let err = RoofModel::build(overlapping_squares(), &DrawingConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::UnbalancedSegment {
                facets: 1,
                expected: 2,
                ..
            }
        ));
        assert_eq!(err.kind(), crate::error::ErrorKind::Geometry);
    }

    #[test]
    fn unbalanced_segment_is_only_logged_when_lenient() {
        let config = DrawingConfig {
            strict_topology: false,
            ..Default::default()
        };
        let model = RoofModel::build(overlapping_squares(), &config).unwrap();
        assert_eq!(model.facets.len(), 2);
        assert_relative_eq!(model.facets[0].drawing_area(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(model.facets[1].drawing_area(), 100.0, epsilon = 1e-9);

        let violations = check_shared_segments(&model.segments, &model.facets, config.epsilon);
        assert!(!violations.is_empty());
        assert!(violations.iter().all(|v| v.claimed_by == 1 && v.expected == 2));
    }
}
