//! Polymorphic Dispatch Tests
//!
//! - A value must match exactly one candidate record type
//! - Matching is by exact record type; `extends` shares fields only
//! - The plain form carries `__type_id`, and deserialization dispatches on it

use serde_json::json;
use strictrecord::{
    ConfigError, Descriptor, FieldOptions, RecordType, ValidationCode, Value, TYPE_ID_KEY,
};

// =============================================================================
// Helper Functions
// =============================================================================

struct Shapes {
    shape: RecordType,
    circle: RecordType,
    square: RecordType,
}

fn shapes() -> Shapes {
    let shape = RecordType::builder("Shape")
        .string("label", FieldOptions::new())
        .build()
        .unwrap();
    let circle = RecordType::builder("Circle")
        .extends(&shape)
        .float("radius", FieldOptions::new().positive())
        .build()
        .unwrap();
    let square = RecordType::builder("Square")
        .float("side", FieldOptions::new().positive())
        .build()
        .unwrap();
    Shapes { shape, circle, square }
}

fn drawing(candidates: Vec<(&str, RecordType)>) -> RecordType {
    RecordType::builder("Drawing")
        .polymorphic("figure", candidates, FieldOptions::new())
        .build()
        .unwrap()
}

// =============================================================================
// Matching Tests
// =============================================================================

#[test]
fn test_single_match_round_trips_with_type_id() {
    let s = shapes();
    let drawing = drawing(vec![("circle", s.circle.clone()), ("square", s.square.clone())]);

    let circle = s
        .circle
        .new([("label", Value::from("sun")), ("radius", Value::from(2.5))])
        .unwrap();
    let record = drawing.new([("figure", Value::from(circle))]).unwrap();

    let plain = record.serialize().unwrap();
    assert_eq!(
        plain,
        json!({"figure": {"__type_id": "circle", "label": "sun", "radius": 2.5}})
    );
    assert_eq!(drawing.deserialize(&plain).unwrap(), record);
}

#[test]
fn test_no_matching_type() {
    let s = shapes();
    let drawing = drawing(vec![("square", s.square.clone())]);

    let circle = s
        .circle
        .new([("label", Value::from("sun")), ("radius", Value::from(1.0))])
        .unwrap();
    let err = drawing.new([("figure", Value::from(circle))]).unwrap_err();
    assert_eq!(err.code(), ValidationCode::NoMatchingType);
    assert_eq!(err.path(), "figure");

    let err = drawing.new([("figure", Value::from("square"))]).unwrap_err();
    assert_eq!(err.code(), ValidationCode::NoMatchingType);
}

#[test]
fn test_parent_and_subtype_candidates_dispatch_exactly() {
    let s = shapes();
    let drawing = drawing(vec![("shape", s.shape.clone()), ("circle", s.circle.clone())]);

    let circle = s
        .circle
        .new([("label", Value::from("sun")), ("radius", Value::from(1.0))])
        .unwrap();
    let record = drawing.new([("figure", Value::from(circle))]).unwrap();
    let plain = record.serialize().unwrap();
    assert_eq!(plain["figure"][TYPE_ID_KEY], json!("circle"));
    assert_eq!(drawing.deserialize(&plain).unwrap(), record);

    let shape = s.shape.new([("label", Value::from("blob"))]).unwrap();
    let record = drawing.new([("figure", Value::from(shape))]).unwrap();
    let plain = record.serialize().unwrap();
    assert_eq!(plain["figure"][TYPE_ID_KEY], json!("shape"));
    assert_eq!(drawing.deserialize(&plain).unwrap(), record);
}

#[test]
fn test_subtype_does_not_match_parent_candidate() {
    let s = shapes();
    let drawing = drawing(vec![("shape", s.shape.clone())]);

    let circle = s
        .circle
        .new([("label", Value::from("sun")), ("radius", Value::from(1.0))])
        .unwrap();
    let err = drawing.new([("figure", Value::from(circle))]).unwrap_err();
    assert_eq!(err.code(), ValidationCode::NoMatchingType);
    assert_eq!(err.path(), "figure");
}

#[test]
fn test_subtype_does_not_fit_parent_structure() {
    let s = shapes();
    let frame = RecordType::builder("Frame")
        .structure("s", &s.shape, FieldOptions::new())
        .build()
        .unwrap();

    let circle = s
        .circle
        .new([("label", Value::from("sun")), ("radius", Value::from(1.0))])
        .unwrap();
    let err = frame.new([("s", Value::from(circle))]).unwrap_err();
    assert_eq!(err.code(), ValidationCode::TypeMismatch);

    let shape = s.shape.new([("label", Value::from("sun"))]).unwrap();
    let record = frame.new([("s", Value::from(shape))]).unwrap();
    assert_eq!(frame.deserialize(&record.serialize().unwrap()).unwrap(), record);
}

// =============================================================================
// Discriminant Tests
// =============================================================================

#[test]
fn test_unknown_or_missing_type_id() {
    let s = shapes();
    let drawing = drawing(vec![("circle", s.circle.clone()), ("square", s.square.clone())]);

    for figure in [
        json!({"__type_id": "triangle", "side": 1.0}),
        json!({"side": 1.0}),
        json!({"__type_id": 7, "side": 1.0}),
    ] {
        let err = drawing.deserialize(&json!({ "figure": figure })).unwrap_err();
        assert_eq!(err.code(), ValidationCode::UnknownTypeId);
        assert_eq!(err.path(), "figure");
    }
}

#[test]
fn test_payload_validated_after_dispatch() {
    let s = shapes();
    let drawing = drawing(vec![("square", s.square.clone())]);

    let err = drawing
        .deserialize(&json!({"figure": {"__type_id": "square", "side": -2.0}}))
        .unwrap_err();
    assert_eq!(err.code(), ValidationCode::ValidatorFailed);
    assert_eq!(err.path(), "figure.side");
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_candidate_configuration_errors() {
    let s = shapes();

    let none: Vec<(&str, RecordType)> = Vec::new();
    let err = Descriptor::polymorphic(none, FieldOptions::new()).unwrap_err();
    assert_eq!(err, ConfigError::NoCandidates);

    let err = Descriptor::polymorphic(
        [("a", s.circle.clone()), ("a", s.square.clone())],
        FieldOptions::new(),
    )
    .unwrap_err();
    assert_eq!(err, ConfigError::DuplicateCandidateId("a".into()));

    let err = Descriptor::polymorphic(
        [("a", s.circle.clone()), ("b", s.circle.clone())],
        FieldOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateCandidateType { .. }));

    let err = Descriptor::polymorphic([("", s.square.clone())], FieldOptions::new()).unwrap_err();
    assert_eq!(err, ConfigError::EmptyCandidateId);
}
