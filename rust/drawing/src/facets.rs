// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Facet extraction and facet-to-segment association.

use serde::{Deserialize, Serialize};

use crate::config::DrawingConfig;
use crate::error::{Error, Result};
use crate::label::Label;
use crate::polygonize::{polygonize, Polygon};
use crate::types::{Point2D, Segment};

/// A planar roof surface: a closed polygon of the drawing plus the
/// segments lying on its boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facet {
    pub id: Label,
    pub polygon: Polygon,
    /// Indices into the model's segment list
    pub boundary_segments: Vec<usize>,
}

impl Facet {
    /// Area on the flat drawing, before slope correction.
    pub fn drawing_area(&self) -> f64 {
        self.polygon.area()
    }

    pub fn centroid(&self) -> Point2D {
        self.polygon.centroid()
    }

    pub fn has_segment(&self, segment: usize) -> bool {
        self.boundary_segments.contains(&segment)
    }
}

/// Polygonizes `segments` and labels the resulting facets.
///
/// Facets are ordered by centroid (x, then y, snapped to the tolerance grid)
/// so labels do not depend on hash or traversal order. A segment belongs to
/// a facet when both its endpoints and its midpoint are within `epsilon` of
/// the facet boundary. Endpoints alone are not enough on a concave facet,
/// where a chord across a notch touches the boundary only at its ends.
pub fn build_facets(segments: &[Segment], config: &DrawingConfig) -> Result<Vec<Facet>> {
    let eps = config.epsilon;
    let edges: Vec<(Point2D, Point2D)> = segments.iter().map(|s| (s.start, s.end)).collect();

    let mut polygons = polygonize(&edges, eps);
    if polygons.is_empty() {
        return Err(Error::NoFacets);
    }

    let grid = eps.max(1e-9);
    polygons.sort_by_cached_key(|poly| {
        let c = poly.centroid();
        ((c.x / grid).round() as i64, (c.y / grid).round() as i64)
    });

    let facets = polygons
        .into_iter()
        .enumerate()
        .map(|(i, polygon)| {
            let boundary_segments: Vec<usize> = segments
                .iter()
                .enumerate()
                .filter(|(_, s)| {
                    polygon.boundary_distance(&s.start) < eps
                        && polygon.boundary_distance(&s.end) < eps
                        && polygon.boundary_distance(&s.midpoint()) < eps
                })
                .map(|(idx, _)| idx)
                .collect();

            let id = Label::new(i);
            if boundary_segments.is_empty() {
                return Err(Error::EmptyFacet(id));
            }
            Ok(Facet {
                id,
                polygon,
                boundary_segments,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(facets = facets.len(), "built facets");
    Ok(facets)
}

/// A segment claimed by an unexpected number of facets.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentViolation {
    pub segment: usize,
    pub line: Label,
    pub claimed_by: usize,
    pub expected: usize,
}

impl From<&SegmentViolation> for Error {
    fn from(v: &SegmentViolation) -> Self {
        Error::UnbalancedSegment {
            line: v.line,
            facets: v.claimed_by,
            expected: v.expected,
        }
    }
}

/// Checks that every claimed segment is shared by the right number of facets.
///
/// A segment with facets on both sides must be claimed by exactly two
/// facets; a perimeter segment by exactly one. Sides are sampled with points
/// just off the segment midpoint. Unclaimed segments are not reported.
pub fn check_shared_segments(
    segments: &[Segment],
    facets: &[Facet],
    epsilon: f64,
) -> Vec<SegmentViolation> {
    let mut violations = Vec::new();

    for (idx, segment) in segments.iter().enumerate() {
        let claimed_by = facets.iter().filter(|f| f.has_segment(idx)).count();
        if claimed_by == 0 {
            continue;
        }

        let chord = segment.direction();
        let length = chord.norm();
        if length <= epsilon {
            continue;
        }

        let dir = chord / length;
        let offset = (length * 1e-3).max(epsilon * 10.0);
        let mid = segment.midpoint();
        let left = Point2D::new(mid.x - dir.y * offset, mid.y + dir.x * offset);
        let right = Point2D::new(mid.x + dir.y * offset, mid.y - dir.x * offset);

        let covered = |p: &Point2D| facets.iter().any(|f| f.polygon.contains(p));
        let expected = if covered(&left) && covered(&right) { 2 } else { 1 };

        if claimed_by != expected {
            violations.push(SegmentViolation {
                segment: idx,
                line: segment.id,
                claimed_by,
                expected,
            });
        }
    }

    violations
}
