// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roof drawing resolution
//!
//! Turns a flat top-down line/arc sketch of a roof into a topological model:
//! 1. Primitives are split wherever another primitive's endpoint lands on them
//! 2. The resulting segments are polygonized into closed facets
//! 3. Each facet learns which segments bound it
//!
//! # Usage
//!
//! ```rust,ignore
//! use pitchline_drawing::{Drawing, DrawingConfig, RoofModel};
//!
//! let drawing = Drawing::from_json(&json)?;
//! let model = RoofModel::build(drawing.to_primitives(), &DrawingConfig::default())?;
//! for facet in &model.facets {
//!     println!("{}: {:.1}", facet.id, facet.drawing_area());
//! }
//! ```

pub mod config;
pub mod drawing;
pub mod error;
pub mod facets;
pub mod label;
pub mod model;
pub mod polygonize;
pub mod segmenter;
pub mod types;

pub use config::DrawingConfig;
pub use drawing::{Drawing, PrimitiveRecord};
pub use error::{Error, ErrorKind, Result};
pub use facets::{build_facets, check_shared_segments, Facet, SegmentViolation};
pub use label::{Label, ParseLabelError};
pub use model::RoofModel;
pub use polygonize::{polygonize, Polygon};
pub use segmenter::split_primitives;
pub use types::{Arc, Line, Point2D, Primitive, Segment, Shape};
