// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Saving and loading documents through JSON.

#![cfg(feature = "serde")]

use arbor_node::{
    Document, NodeTypeBuilder, Record, RecordValue, Rule, TypeRegistry, UpdatePolicy, Value,
};

fn types() -> TypeRegistry {
    let mut types = TypeRegistry::new();
    let camber_line = types.register(
        NodeTypeBuilder::new("CamberLine")
            .update_policy(UpdatePolicy::Derived)
            .shared_bounded("sample_rate", 0.0, 9999.0, 200)
            .shared("distribution", "chebyshev", Rule::Any),
    );
    types.register(
        NodeTypeBuilder::extends("CircularArc", &types[camber_line])
            .bounded("angle_of_inflow", 0.0, 180.0, 0),
    );
    types.register(
        NodeTypeBuilder::new("Profile")
            .update_policy(UpdatePolicy::Derived)
            .shared_bounded("sample_rate", 0.0, 9999.0, 200)
            .child_slot("camber_line"),
    );
    types
}

#[test]
fn document_survives_json() {
    let mut doc = Document::new(types());
    let p = doc.create_named("Profile").unwrap();
    let arc = doc.create_named("CircularArc").unwrap();
    doc.set(p, "name", "hub section").unwrap();
    doc.set(p, "sample_rate", 120).unwrap();
    doc.set(p, "camber_line", arc).unwrap();
    doc.set(arc, "angle_of_inflow", 32.5).unwrap();
    doc.set(arc, "distribution", "linear").unwrap();

    let saved = vec![doc.record(p).unwrap()];
    let json = serde_json::to_string(&saved).unwrap();
    let parsed: Vec<Record> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, saved);

    let mut fresh = Document::new(types());
    let roots = fresh.load(&parsed).unwrap();
    assert_eq!(roots.len(), 1);
    assert!(!fresh.can_undo());

    let q = roots[0];
    assert_eq!(fresh.get(q, "name").unwrap(), Value::from("hub section"));
    let child = fresh.get(q, "camber_line").unwrap().as_node().unwrap();
    assert_eq!(fresh.type_of(child).unwrap().name(), "CircularArc");
    assert_eq!(fresh.get(child, "angle_of_inflow").unwrap(), Value::from(32.5));
    assert_eq!(fresh.get(child, "sample_rate").unwrap(), Value::from(120));
    assert_eq!(fresh.get(child, "distribution").unwrap(), Value::from("linear"));
    assert_eq!(fresh.record(q).unwrap(), saved[0]);
}

#[test]
fn values_read_as_plain_json() {
    let record = Record {
        type_name: "CamberLine".into(),
        values: vec![
            ("name".into(), RecordValue::Text("mean line".into())),
            ("visible".into(), RecordValue::Bool(false)),
            ("sample_rate".into(), RecordValue::Int(64)),
            ("distribution".into(), RecordValue::None),
        ],
    };
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "type_name": "CamberLine",
            "values": [
                ["name", "mean line"],
                ["visible", false],
                ["sample_rate", 64],
                ["distribution", null],
            ],
        })
    );
}

#[test]
fn loaded_values_are_validated() {
    let json = r#"[{"type_name": "CircularArc", "values": [["angle_of_inflow", 400]]}]"#;
    let records: Vec<Record> = serde_json::from_str(json).unwrap();
    let mut doc = Document::new(types());
    assert!(doc.load(&records).is_err());
    assert!(doc.is_empty());
}
