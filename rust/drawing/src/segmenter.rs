// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Splitting primitives where other primitives' endpoints land on them

use smallvec::SmallVec;

use crate::config::DrawingConfig;
use crate::label::Label;
use crate::types::{Arc, Line, Point2D, Primitive, Segment};

/// Returns true when `p` lies on `line` strictly between its endpoints.
///
/// Uses the colinearity identity `d(p, start) + d(p, end) == length`
/// within `epsilon`; points within `epsilon` of either endpoint are excluded.
pub fn lies_strictly_on(p: &Point2D, line: &Line, epsilon: f64) -> bool {
    let d1 = p.distance_to(&line.start);
    let d2 = p.distance_to(&line.end);
    d1 > epsilon && d2 > epsilon && (d1 + d2 - line.length()).abs() <= epsilon
}

/// Splits every primitive into segments.
///
/// Arcs are flattened to `arc_samples` points first so every primitive is a
/// chain of straight pieces. Each piece is cut at every endpoint of another
/// piece lying strictly inside it, sorted by distance from the piece start.
/// Output order follows primitive order, then position along the primitive.
///
/// Segments cut from an arc keep the arc, so the lengths of a primitive's
/// segments always add up to its drawing length.
pub fn split_primitives(primitives: &[Primitive], config: &DrawingConfig) -> Vec<Segment> {
    let eps = config.epsilon;

    let pieces: Vec<(Label, Line, Option<Arc>)> = primitives
        .iter()
        .flat_map(|p| {
            let arc = p.as_arc().copied();
            p.pieces(config.arc_samples)
                .into_iter()
                .map(move |line| (p.id, line, arc))
        })
        .collect();

    let mut segments = Vec::with_capacity(pieces.len());

    for (i, (id, piece, arc)) in pieces.iter().enumerate() {
        let mut cuts: SmallVec<[Point2D; 4]> = SmallVec::new();

        for (j, (_, other, _)) in pieces.iter().enumerate() {
            if i == j {
                continue;
            }
            for point in [other.start, other.end] {
                if lies_strictly_on(&point, piece, eps) {
                    cuts.push(point);
                }
            }
        }

        segments.extend(split_at(*id, piece, *arc, cuts, eps));
    }

    tracing::debug!(
        primitives = primitives.len(),
        pieces = pieces.len(),
        segments = segments.len(),
        "split primitives into segments"
    );

    segments
}

/// Emits the chain of segments of `piece` cut at `cuts`.
///
/// Cut points closer than `epsilon` to each other are merged, so a point
/// shared by several crossing lines cuts only once.
fn split_at(
    id: Label,
    piece: &Line,
    arc: Option<Arc>,
    mut cuts: SmallVec<[Point2D; 4]>,
    epsilon: f64,
) -> Vec<Segment> {
    cuts.sort_by(|a, b| {
        a.distance_to(&piece.start)
            .total_cmp(&b.distance_to(&piece.start))
    });
    cuts.dedup_by(|b, a| a.distance_to(b) <= epsilon);

    let mut points = Vec::with_capacity(cuts.len() + 2);
    points.push(piece.start);
    points.extend(cuts);
    points.push(piece.end);

    points
        .windows(2)
        .map(|w| match arc {
            Some(arc) => Segment::on_arc(id, w[0], w[1], arc),
            None => Segment::new(id, w[0], w[1]),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(index: usize, a: (f64, f64), b: (f64, f64)) -> Primitive {
        Primitive::line(Label::new(index), Point2D::new(a.0, a.1), Point2D::new(b.0, b.1))
    }

    fn segments_of(segments: &[Segment], index: usize) -> Vec<Segment> {
        segments
            .iter()
            .copied()
            .filter(|s| s.id == Label::new(index))
            .collect()
    }

    #[test]
    fn strictly_on_excludes_endpoints() {
        let l = Line::new(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0));
        assert!(lies_strictly_on(&Point2D::new(4.0, 0.0), &l, 1e-9));
        assert!(!lies_strictly_on(&Point2D::new(0.0, 0.0), &l, 1e-9));
        assert!(!lies_strictly_on(&Point2D::new(10.0, 0.0), &l, 1e-9));
        assert!(!lies_strictly_on(&Point2D::new(4.0, 1.0), &l, 1e-9));
        assert!(!lies_strictly_on(&Point2D::new(12.0, 0.0), &l, 1e-9));
    }

    #[test]
    fn t_junction_splits_the_crossbar_once() {
        let prims = vec![
            line(0, (0.0, 0.0), (10.0, 0.0)),
            line(1, (4.0, 0.0), (4.0, 5.0)),
        ];
        let segments = split_primitives(&prims, &DrawingConfig::default());

        let bar = segments_of(&segments, 0);
        assert_eq!(bar.len(), 2);
        assert_eq!(bar[0].end, Point2D::new(4.0, 0.0));
        assert_eq!(bar[1].start, Point2D::new(4.0, 0.0));

        // stem touches the bar only at its own endpoint
        assert_eq!(segments_of(&segments, 1).len(), 1);
    }

    #[test]
    fn cuts_are_ordered_from_start() {
        let prims = vec![
            line(0, (0.0, 0.0), (10.0, 0.0)),
            line(1, (7.0, 0.0), (7.0, 3.0)),
            line(2, (2.0, 0.0), (2.0, 3.0)),
            line(3, (5.0, -3.0), (5.0, 0.0)),
        ];
        let segments = split_primitives(&prims, &DrawingConfig::default());
        let bar = segments_of(&segments, 0);
        let xs: Vec<f64> = bar.iter().map(|s| s.end.x).collect();
        assert_eq!(xs, vec![2.0, 5.0, 7.0, 10.0]);
    }

    #[test]
    fn coincident_cut_points_merge() {
        let prims = vec![
            line(0, (0.0, 0.0), (10.0, 0.0)),
            line(1, (5.0, 0.0), (5.0, 4.0)),
            line(2, (5.0, 0.0), (8.0, 4.0)),
        ];
        let segments = split_primitives(&prims, &DrawingConfig::default());
        assert_eq!(segments_of(&segments, 0).len(), 2);
    }

    #[test]
    fn segment_chain_covers_parent() {
        let prims = vec![
            line(0, (0.0, 0.0), (9.0, 12.0)),
            line(1, (3.0, 4.0), (10.0, 0.0)),
            line(2, (6.0, 8.0), (0.0, 20.0)),
        ];
        let segments = split_primitives(&prims, &DrawingConfig::default());

        for prim in &prims {
            let chain = segments_of(&segments, prim.id.index());
            for pair in chain.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
            let total: f64 = chain.iter().map(Segment::drawing_length).sum();
            assert_relative_eq!(total, prim.drawing_length(), epsilon = 1e-9);
        }
        assert_eq!(segments_of(&segments, 0).len(), 3);
    }

    #[test]
    fn arc_keeps_its_label_on_every_piece() {
        let prims = vec![Primitive::arc(
            Label::new(0),
            Arc {
                center: Point2D::new(0.0, 0.0),
                radius: 3.0,
                start_angle: 0.0,
                end_angle: 180.0,
            },
        )];
        let config = DrawingConfig {
            arc_samples: 20,
            ..Default::default()
        };
        let segments = split_primitives(&prims, &config);
        assert_eq!(segments.len(), 19);
        assert!(segments.iter().all(|s| s.id == Label::new(0)));
    }

    #[test]
    fn split_arc_lengths_add_up_to_the_arc() {
        // Half disc of radius 5 closed by its diameter; a spoke from the
        // center ends on the first chord of the arc, cutting it.
        let arc = Arc {
            center: Point2D::new(0.0, 0.0),
            radius: 5.0,
            start_angle: 0.0,
            end_angle: 180.0,
        };
        let config = DrawingConfig::default();
        let step = 180.0 / (config.arc_samples - 1) as f64;
        let a = arc.point_at(0.0);
        let b = arc.point_at(step);
        let on_chord = Point2D::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        let prims = vec![
            line(0, (-5.0, 0.0), (5.0, 0.0)),
            Primitive::arc(Label::new(1), arc),
            line(2, (0.0, 0.0), (on_chord.x, on_chord.y)),
        ];
        let segments = split_primitives(&prims, &config);

        let arc_chain = segments_of(&segments, 1);
        assert_eq!(arc_chain.len(), config.arc_samples);
        let total: f64 = arc_chain.iter().map(Segment::drawing_length).sum();
        assert_relative_eq!(total, prims[1].drawing_length(), epsilon = config.epsilon);
        assert_relative_eq!(total, 5.0 * std::f64::consts::PI, epsilon = 1e-9);

        let diameter: f64 = segments_of(&segments, 0).iter().map(Segment::drawing_length).sum();
        assert_relative_eq!(diameter, 10.0, epsilon = 1e-9);
    }
}
