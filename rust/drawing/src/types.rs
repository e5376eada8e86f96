// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core geometric types for roof drawings

use std::f64::consts::PI;

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::label::Label;

/// A 2D point (simplified for serialization)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Distance from this point to the closed segment `a`-`b`.
    pub fn distance_to_segment(&self, a: &Point2D, b: &Point2D) -> f64 {
        let ab = b.to_nalgebra() - a.to_nalgebra();
        let ap = self.to_nalgebra() - a.to_nalgebra();
        let len_sq = ab.norm_squared();
        if len_sq < 1e-24 {
            return self.distance_to(a);
        }
        let t = (ap.dot(&ab) / len_sq).clamp(0.0, 1.0);
        let closest = a.to_nalgebra() + ab * t;
        (self.to_nalgebra() - closest).norm()
    }
}

/// A straight drawn line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Line {
    pub start: Point2D,
    pub end: Point2D,
}

impl Line {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        Self { start, end }
    }

    /// Builds a line with its endpoints in lexicographic `(x, y)` order, so
    /// the same drawn line always has the same orientation.
    pub fn canonical(a: Point2D, b: Point2D) -> Self {
        let a_first = a
            .x
            .total_cmp(&b.x)
            .then_with(|| a.y.total_cmp(&b.y))
            .is_le();
        if a_first {
            Self::new(a, b)
        } else {
            Self::new(b, a)
        }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }
}

/// A circular arc, swept counter-clockwise from `start_angle` to `end_angle`
/// (degrees). An end angle below the start angle wraps through 360.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Arc {
    pub center: Point2D,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl Arc {
    /// Swept angle in degrees, in `(0, 360]`.
    pub fn sweep(&self) -> f64 {
        let sweep = (self.end_angle - self.start_angle).rem_euclid(360.0);
        if sweep == 0.0 {
            360.0
        } else {
            sweep
        }
    }

    /// Arc length `2πr·Δangle/360`.
    pub fn length(&self) -> f64 {
        2.0 * PI * self.radius * self.sweep() / 360.0
    }

    pub fn point_at(&self, angle_deg: f64) -> Point2D {
        let rad = angle_deg.to_radians();
        Point2D::new(
            self.center.x + rad.cos() * self.radius,
            self.center.y + rad.sin() * self.radius,
        )
    }

    /// Samples the arc into `samples` evenly spaced points, endpoints included.
    pub fn flatten(&self, samples: usize) -> Vec<Point2D> {
        let samples = samples.max(2);
        let sweep = self.sweep();
        (0..samples)
            .map(|i| {
                let t = i as f64 / (samples - 1) as f64;
                self.point_at(self.start_angle + sweep * t)
            })
            .collect()
    }

    /// Length of the part of this arc running counter-clockwise from the
    /// direction of `from` to the direction of `to`, both seen from the center.
    pub fn length_between(&self, from: &Point2D, to: &Point2D) -> f64 {
        let angle = |p: &Point2D| (p.y - self.center.y).atan2(p.x - self.center.x);
        self.radius * (angle(to) - angle(from)).rem_euclid(2.0 * PI)
    }
}

/// Geometry of a drawn primitive
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Line(Line),
    Arc(Arc),
}

/// A primitive parsed from the drawing, with its stable label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Primitive {
    pub id: Label,
    pub shape: Shape,
}

impl Primitive {
    pub fn line(id: Label, a: Point2D, b: Point2D) -> Self {
        Self {
            id,
            shape: Shape::Line(Line::canonical(a, b)),
        }
    }

    pub fn arc(id: Label, arc: Arc) -> Self {
        Self {
            id,
            shape: Shape::Arc(arc),
        }
    }

    /// Length measured directly on the flat drawing. Always derived from the
    /// geometry, never cached.
    pub fn drawing_length(&self) -> f64 {
        match &self.shape {
            Shape::Line(line) => line.length(),
            Shape::Arc(arc) => arc.length(),
        }
    }

    /// Straight pieces this primitive is made of: the line itself, or the
    /// chords of a flattened arc in sweep order.
    pub fn pieces(&self, arc_samples: usize) -> Vec<Line> {
        match &self.shape {
            Shape::Line(line) => vec![*line],
            Shape::Arc(arc) => arc
                .flatten(arc_samples)
                .windows(2)
                .map(|w| Line::new(w[0], w[1]))
                .collect(),
        }
    }

    /// The arc this primitive was drawn as, if any.
    pub fn as_arc(&self) -> Option<&Arc> {
        match &self.shape {
            Shape::Arc(arc) => Some(arc),
            Shape::Line(_) => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        match &self.shape {
            Shape::Line(line) => line.start.is_finite() && line.end.is_finite(),
            Shape::Arc(arc) => {
                arc.center.is_finite()
                    && arc.radius.is_finite()
                    && arc.start_angle.is_finite()
                    && arc.end_angle.is_finite()
            }
        }
    }
}

/// A piece of a primitive between two consecutive split points.
///
/// Segments are not uniquely identified: every segment of a primitive
/// carries the primitive's label. Segments cut from an arc keep the arc,
/// so their length follows the curve rather than the chord.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub id: Label,
    pub start: Point2D,
    pub end: Point2D,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arc: Option<Arc>,
}

impl Segment {
    pub fn new(id: Label, start: Point2D, end: Point2D) -> Self {
        Self {
            id,
            start,
            end,
            arc: None,
        }
    }

    /// Segment of arc `arc`, running counter-clockwise from `start` to `end`.
    pub fn on_arc(id: Label, start: Point2D, end: Point2D, arc: Arc) -> Self {
        Self {
            id,
            start,
            end,
            arc: Some(arc),
        }
    }

    /// Chord length for line segments, sub-arc length for arc segments.
    pub fn drawing_length(&self) -> f64 {
        match &self.arc {
            Some(arc) => arc.length_between(&self.start, &self.end),
            None => self.start.distance_to(&self.end),
        }
    }

    pub fn direction(&self) -> Vector2<f64> {
        self.end.to_nalgebra() - self.start.to_nalgebra()
    }

    pub fn midpoint(&self) -> Point2D {
        Point2D::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }
}
