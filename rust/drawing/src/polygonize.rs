// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar polygonization of a set of line segments.
//!
//! Segments are treated as edges of a planar graph whose vertices are the
//! segment endpoints merged within a tolerance. Dangling chains are pruned,
//! then every face of the graph is traced over a half-edge structure:
//! - counter-clockwise cycles (positive area) are bounded faces
//! - clockwise cycles are the outer boundary of a connected component
//!
//! A component nested inside a bounded face of another component becomes a
//! hole of the smallest face that contains it.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::types::Point2D;

/// A simple polygon with optional holes. Rings are open (the first vertex
/// is not repeated); the exterior is counter-clockwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon {
    pub exterior: Vec<Point2D>,
    pub holes: Vec<Vec<Point2D>>,
}

impl Polygon {
    pub fn new(exterior: Vec<Point2D>) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    /// Area of the exterior minus the holes.
    pub fn area(&self) -> f64 {
        let outer = ring_signed_area(&self.exterior).abs();
        let holes: f64 = self.holes.iter().map(|h| ring_signed_area(h).abs()).sum();
        outer - holes
    }

    /// Area-weighted centroid, holes subtracted.
    pub fn centroid(&self) -> Point2D {
        let (outer_area, outer_c) = ring_centroid(&self.exterior);
        let mut area = outer_area.abs();
        let mut cx = outer_c.x * area;
        let mut cy = outer_c.y * area;

        for hole in &self.holes {
            let (hole_area, hole_c) = ring_centroid(hole);
            let hole_area = hole_area.abs();
            area -= hole_area;
            cx -= hole_c.x * hole_area;
            cy -= hole_c.y * hole_area;
        }

        if area.abs() < 1e-24 {
            return outer_c;
        }
        Point2D::new(cx / area, cy / area)
    }

    /// Point-in-polygon test (inside the exterior, outside every hole).
    pub fn contains(&self, p: &Point2D) -> bool {
        point_in_ring(p, &self.exterior) && !self.holes.iter().any(|h| point_in_ring(p, h))
    }

    /// Shortest distance from `p` to any ring of the polygon.
    pub fn boundary_distance(&self, p: &Point2D) -> f64 {
        std::iter::once(&self.exterior)
            .chain(self.holes.iter())
            .map(|ring| ring_distance(p, ring))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Signed shoelace area; positive for counter-clockwise rings.
pub fn ring_signed_area(ring: &[Point2D]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += ring[i].x * ring[j].y;
        area -= ring[j].x * ring[i].y;
    }
    area / 2.0
}

/// Signed area and centroid of a ring.
fn ring_centroid(ring: &[Point2D]) -> (f64, Point2D) {
    let n = ring.len();
    let area = ring_signed_area(ring);
    if n == 0 {
        return (0.0, Point2D::new(0.0, 0.0));
    }
    if area.abs() < 1e-24 {
        let cx = ring.iter().map(|p| p.x).sum::<f64>() / n as f64;
        let cy = ring.iter().map(|p| p.y).sum::<f64>() / n as f64;
        return (area, Point2D::new(cx, cy));
    }

    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let cross = ring[i].x * ring[j].y - ring[j].x * ring[i].y;
        cx += (ring[i].x + ring[j].x) * cross;
        cy += (ring[i].y + ring[j].y) * cross;
    }
    (area, Point2D::new(cx / (6.0 * area), cy / (6.0 * area)))
}

/// Even-odd ray casting.
fn point_in_ring(p: &Point2D, ring: &[Point2D]) -> bool {
    let n = ring.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (&ring[i], &ring[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn ring_distance(p: &Point2D, ring: &[Point2D]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| p.distance_to_segment(&ring[i], &ring[(i + 1) % n]))
        .fold(f64::INFINITY, f64::min)
}

/// Merges points that fall within `epsilon` of each other.
///
/// Points are bucketed on a grid of cell size `epsilon`; a lookup scans the
/// 3x3 neighbourhood of the query cell.
struct VertexIndex {
    epsilon: f64,
    cell: f64,
    grid: FxHashMap<(i64, i64), SmallVec<[usize; 2]>>,
    points: Vec<Point2D>,
}

impl VertexIndex {
    fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            cell: epsilon.max(1e-9),
            grid: FxHashMap::default(),
            points: Vec::new(),
        }
    }

    fn cell_of(&self, p: &Point2D) -> (i64, i64) {
        ((p.x / self.cell).floor() as i64, (p.y / self.cell).floor() as i64)
    }

    fn insert(&mut self, p: Point2D) -> usize {
        let (cx, cy) = self.cell_of(&p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(bucket) = self.grid.get(&(cx + dx, cy + dy)) {
                    if let Some(&idx) = bucket
                        .iter()
                        .find(|&&idx| self.points[idx].distance_to(&p) <= self.epsilon)
                    {
                        return idx;
                    }
                }
            }
        }
        let idx = self.points.len();
        self.points.push(p);
        self.grid.entry((cx, cy)).or_default().push(idx);
        idx
    }
}

/// Builds all polygons formed by `edges`.
///
/// Output order follows half-edge discovery; callers that need stable ids
/// should sort the result.
pub fn polygonize(edges: &[(Point2D, Point2D)], epsilon: f64) -> Vec<Polygon> {
    let mut index = VertexIndex::new(epsilon);
    let mut seen: FxHashSet<(usize, usize)> = FxHashSet::default();
    let mut graph_edges: Vec<(usize, usize)> = Vec::new();

    for (a, b) in edges {
        let u = index.insert(*a);
        let v = index.insert(*b);
        if u == v {
            continue;
        }
        let key = (u.min(v), u.max(v));
        if seen.insert(key) {
            graph_edges.push((u, v));
        }
    }

    let points = index.points;
    let alive = prune_dangles(points.len(), &graph_edges);

    // Half-edge 2e runs u->v, 2e+1 runs v->u.
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); points.len()];
    for (e, &(u, v)) in graph_edges.iter().enumerate() {
        if alive[e] {
            outgoing[u].push(2 * e);
            outgoing[v].push(2 * e + 1);
        }
    }

    let origin = |h: usize| {
        let (u, v) = graph_edges[h / 2];
        if h % 2 == 0 {
            u
        } else {
            v
        }
    };
    let target = |h: usize| origin(h ^ 1);

    let mut position: FxHashMap<usize, usize> = FxHashMap::default();
    for (vertex, halves) in outgoing.iter_mut().enumerate() {
        let from = points[vertex];
        halves.sort_by(|&a, &b| {
            let pa = points[target(a)];
            let pb = points[target(b)];
            let angle_a = (pa.y - from.y).atan2(pa.x - from.x);
            let angle_b = (pb.y - from.y).atan2(pb.x - from.x);
            angle_a.total_cmp(&angle_b)
        });
        for (i, &h) in halves.iter().enumerate() {
            position.insert(h, i);
        }
    }

    // The successor of u->v is the half-edge at v immediately clockwise of
    // v->u, which keeps the traced face on the left.
    let next = |h: usize| {
        let twin = h ^ 1;
        let at = &outgoing[origin(twin)];
        let i = position[&twin];
        at[(i + at.len() - 1) % at.len()]
    };

    let mut visited: FxHashSet<usize> = FxHashSet::default();
    let mut faces: Vec<Vec<Point2D>> = Vec::new();
    let mut shells: Vec<Vec<Point2D>> = Vec::new();
    let limit = 2 * graph_edges.len() + 1;

    for start in (0..2 * graph_edges.len()).filter(|h| alive[h / 2]) {
        if visited.contains(&start) {
            continue;
        }

        let mut ring = Vec::new();
        let mut h = start;
        for _ in 0..limit {
            if !visited.insert(h) {
                break;
            }
            ring.push(points[origin(h)]);
            h = next(h);
        }

        let area = ring_signed_area(&ring);
        if area > epsilon {
            faces.push(ring);
        } else if area < -epsilon {
            shells.push(ring);
        }
    }

    let mut polygons: Vec<Polygon> = faces.into_iter().map(Polygon::new).collect();
    assign_holes(&mut polygons, shells, epsilon);

    tracing::trace!(
        vertices = points.len(),
        edges = graph_edges.len(),
        polygons = polygons.len(),
        "polygonized segment graph"
    );

    polygons
}

/// Iteratively removes edges touching a degree-1 vertex.
fn prune_dangles(vertex_count: usize, edges: &[(usize, usize)]) -> Vec<bool> {
    let mut alive = vec![true; edges.len()];
    let mut degree = vec![0usize; vertex_count];
    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); vertex_count];

    for (e, &(u, v)) in edges.iter().enumerate() {
        degree[u] += 1;
        degree[v] += 1;
        incident[u].push(e);
        incident[v].push(e);
    }

    let mut queue: Vec<usize> = (0..vertex_count).filter(|&v| degree[v] == 1).collect();
    while let Some(v) = queue.pop() {
        for &e in &incident[v] {
            if !alive[e] {
                continue;
            }
            alive[e] = false;
            let (a, b) = edges[e];
            let other = if a == v { b } else { a };
            degree[v] -= 1;
            degree[other] -= 1;
            if degree[other] == 1 {
                queue.push(other);
            }
        }
    }

    alive
}

/// Attaches each clockwise component boundary to the smallest face of
/// another component that strictly contains it.
fn assign_holes(polygons: &mut [Polygon], shells: Vec<Vec<Point2D>>, epsilon: f64) {
    for shell in shells {
        let host = polygons
            .iter()
            .enumerate()
            .filter(|(_, poly)| {
                shell.iter().all(|p| {
                    point_in_ring(p, &poly.exterior) && ring_distance(p, &poly.exterior) > epsilon
                })
            })
            .min_by(|(_, a), (_, b)| {
                ring_signed_area(&a.exterior).total_cmp(&ring_signed_area(&b.exterior))
            })
            .map(|(i, _)| i);

        if let Some(i) = host {
            polygons[i].holes.push(shell);
        }
    }
}
