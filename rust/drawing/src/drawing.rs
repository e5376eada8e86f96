// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON interchange for parsed drawings.
//!
//! CAD parsing happens upstream; this is the record format the parser hands
//! over. Primitive labels are assigned in array order.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::label::Label;
use crate::types::{Arc, Point2D, Primitive, Shape};

/// One raw primitive record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrimitiveRecord {
    Line {
        start: [f64; 2],
        end: [f64; 2],
    },
    Arc {
        center: [f64; 2],
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
}

/// A parsed drawing: the ordered primitive records of one roof sketch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Drawing {
    pub primitives: Vec<PrimitiveRecord>,
}

impl Drawing {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Labels the records in order and converts them to primitives.
    pub fn to_primitives(&self) -> Vec<Primitive> {
        self.primitives
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let id = Label::new(i);
                match *record {
                    PrimitiveRecord::Line { start, end } => Primitive::line(
                        id,
                        Point2D::new(start[0], start[1]),
                        Point2D::new(end[0], end[1]),
                    ),
                    PrimitiveRecord::Arc {
                        center,
                        radius,
                        start_angle,
                        end_angle,
                    } => Primitive::arc(
                        id,
                        Arc {
                            center: Point2D::new(center[0], center[1]),
                            radius,
                            start_angle,
                            end_angle,
                        },
                    ),
                }
            })
            .collect()
    }
}

impl From<&Primitive> for PrimitiveRecord {
    fn from(p: &Primitive) -> Self {
        match &p.shape {
            Shape::Line(line) => PrimitiveRecord::Line {
                start: [line.start.x, line.start.y],
                end: [line.end.x, line.end.y],
            },
            Shape::Arc(arc) => PrimitiveRecord::Arc {
                center: [arc.center.x, arc.center.y],
                radius: arc.radius,
                start_angle: arc.start_angle,
                end_angle: arc.end_angle,
            },
        }
    }
}
