// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A U-shaped facet with a square facet filling its notch.

use approx::assert_relative_eq;
use pitchline_drawing::{check_shared_segments, Drawing, DrawingConfig, Label, RoofModel};

// Lines A-H trace the U; I closes the notch along the top.
const U_WITH_NOTCH: &str = r#"{
    "primitives": [
        { "kind": "line", "start": [0.0, 0.0],   "end": [30.0, 0.0] },
        { "kind": "line", "start": [30.0, 0.0],  "end": [30.0, 20.0] },
        { "kind": "line", "start": [20.0, 20.0], "end": [30.0, 20.0] },
        { "kind": "line", "start": [20.0, 10.0], "end": [20.0, 20.0] },
        { "kind": "line", "start": [10.0, 10.0], "end": [20.0, 10.0] },
        { "kind": "line", "start": [10.0, 10.0], "end": [10.0, 20.0] },
        { "kind": "line", "start": [0.0, 20.0],  "end": [10.0, 20.0] },
        { "kind": "line", "start": [0.0, 0.0],   "end": [0.0, 20.0] },
        { "kind": "line", "start": [10.0, 20.0], "end": [20.0, 20.0] }
    ]
}"#;

fn labels(names: &[&str]) -> Vec<Label> {
    names.iter().map(|n| n.parse().unwrap()).collect()
}

fn model() -> RoofModel {
    let drawing = Drawing::from_json(U_WITH_NOTCH).unwrap();
    RoofModel::build(drawing.to_primitives(), &DrawingConfig::default()).unwrap()
}

#[test]
fn strict_build_accepts_the_notch() {
    let model = model();
    assert_eq!(model.facets.len(), 2);
    assert_relative_eq!(model.facets[0].drawing_area(), 500.0, epsilon = 1e-9);
    assert_relative_eq!(model.facets[1].drawing_area(), 100.0, epsilon = 1e-9);

    let eps = DrawingConfig::default().epsilon;
    assert!(check_shared_segments(&model.segments, &model.facets, eps).is_empty());
}

#[test]
fn chord_across_the_notch_does_not_bound_the_u() {
    let model = model();

    let u = model.facet_line_ids(&model.facets[0]);
    assert_eq!(u, labels(&["A", "B", "C", "D", "E", "F", "G", "H"]));

    let notch = model.facet_line_ids(&model.facets[1]);
    assert_eq!(notch, labels(&["D", "E", "F", "I"]));
}

#[test]
fn notch_sides_are_shared_and_its_top_is_not() {
    let model = model();
    let claims = |name: &str| {
        let (idx, _) = model.segments_of(name.parse().unwrap()).next().unwrap();
        model.facets_of_segment(idx).count()
    };

    for side in ["D", "E", "F"] {
        assert_eq!(claims(side), 2, "line {side}");
    }
    assert_eq!(claims("I"), 1);
    assert_eq!(claims("A"), 1);
}
