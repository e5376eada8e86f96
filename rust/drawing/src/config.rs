// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tolerances and limits for drawing resolution.

use serde::{Deserialize, Serialize};

/// Distance tolerance for point-on-line and point-on-boundary tests.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Number of points an arc is sampled into before splitting.
pub const DEFAULT_ARC_SAMPLES: usize = 100;

/// Upper bound on primitives accepted in one drawing.
pub const DEFAULT_MAX_PRIMITIVES: usize = 10_000;

/// Configuration for segment splitting and facet extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    /// Distance tolerance in drawing units
    pub epsilon: f64,
    /// Polyline sample count for arcs (at least 2)
    pub arc_samples: usize,
    /// Reject drawings with more primitives than this
    pub max_primitives: usize,
    /// Fail the build when a segment is claimed by an unexpected number of facets
    pub strict_topology: bool,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            arc_samples: DEFAULT_ARC_SAMPLES,
            max_primitives: DEFAULT_MAX_PRIMITIVES,
            strict_topology: true,
        }
    }
}
