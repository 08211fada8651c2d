use super::*;

fn validation_message(text: &str) -> String {
    match Document::from_yaml_str(text) {
        Err(MotiongramError::Validation(msg)) => msg,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn rectangle_without_dimensions_gets_defaults() {
    let doc = Document::from_yaml_str(
        r#"
objects:
  - name: box
    startX: 10
    startY: 20
    shape:
      premade: rectangle
"#,
    )
    .unwrap();
    let el = doc.element_with_defaults("box").unwrap();
    assert_eq!(
        el.shape.kind,
        ShapeKind::Rectangle {
            width: 100.0,
            height: 50.0
        }
    );
    assert_eq!((el.x, el.y), (10.0, 20.0));
    assert_eq!(el.color, Rgba8::BLACK);
    assert_eq!(el.label, Label::default());
    assert!(doc.movements.is_empty());
}

#[test]
fn premade_and_custom_together_are_rejected() {
    let msg = validation_message(
        r#"
objects:
  - name: both
    startX: 0
    startY: 0
    shape:
      premade: rectangle
      custom:
        path: "M0 0 L10 10"
"#,
    );
    assert!(msg.contains("both 'premade' and 'custom'"), "{msg}");
}

#[test]
fn shape_needs_premade_or_custom() {
    let msg = validation_message(
        r#"
objects:
  - name: empty
    startX: 0
    startY: 0
    shape:
      width: 10
"#,
    );
    assert!(msg.contains("either 'premade' or 'custom'"), "{msg}");
}

#[test]
fn element_without_shape_is_rejected() {
    let msg = validation_message(
        r#"
objects:
  - name: ghost
    startX: 0
    startY: 0
"#,
    );
    assert!(msg.contains("'shape'"), "{msg}");
}

#[test]
fn unknown_premade_kind_is_rejected() {
    let msg = validation_message(
        r#"
objects:
  - name: h
    startX: 0
    startY: 0
    shape:
      premade: hexagon
"#,
    );
    assert!(msg.contains("hexagon"), "{msg}");
}

#[test]
fn fields_outside_whitelist_are_dropped() {
    let doc = Document::from_yaml_str(
        r#"
objects:
  - name: s
    startX: 0
    startY: 0
    shape:
      premade: star
      width: 999
      size: 20
"#,
    )
    .unwrap();
    assert_eq!(
        doc.elements[0].shape.kind,
        ShapeKind::Star { size: 20.0 }
    );
}

#[test]
fn line_family_and_animals_default() {
    let doc = Document::from_yaml_str(
        r#"
objects:
  - name: l
    startX: 0
    startY: 0
    shape: { premade: line-arrow, rotation: 45 }
  - name: c
    startX: 0
    startY: 0
    shape: { premade: cat }
  - name: d
    startX: 0
    startY: 0
    shape: { premade: dog, size: 30, outline: {} }
"#,
    )
    .unwrap();
    assert_eq!(
        doc.elements[0].shape.kind,
        ShapeKind::LineArrow(LineGeometry {
            length: 100.0,
            rotation: 45.0,
            width: 5.0
        })
    );
    assert_eq!(doc.elements[1].shape.kind, ShapeKind::Cat { size: 50.0 });
    assert_eq!(doc.elements[2].shape.kind, ShapeKind::Dog { size: 30.0 });
    assert_eq!(
        doc.elements[2].shape.outline,
        Some(Outline {
            thickness: 1.0,
            color: Rgba8::BLACK
        })
    );
}

#[test]
fn custom_path_is_parsed() {
    let doc = Document::from_yaml_str(
        r##"
objects:
  - name: tri
    startX: 5
    startY: 5
    color: "#ff0000"
    shape:
      custom:
        path: "M0 0 L20 0 L10 15 Z"
"##,
    )
    .unwrap();
    let ShapeKind::Custom(custom) = &doc.elements[0].shape.kind else {
        panic!("expected custom shape");
    };
    assert_eq!(custom.parsed.elements().len(), 4);
    assert_eq!(doc.elements[0].color, Rgba8::opaque(255, 0, 0));

    let msg = validation_message(
        r#"
objects:
  - name: bad
    startX: 0
    startY: 0
    shape:
      custom: {}
"#,
    );
    assert!(msg.contains("path"), "{msg}");
}

#[test]
fn label_defaults_merge_with_declared_fields() {
    let doc = Document::from_yaml_str(
        r#"
objects:
  - name: a
    startX: 0
    startY: 0
    shape: { premade: rectangle }
    label:
      value: Hello
      offsetY: 30
"#,
    )
    .unwrap();
    let label = &doc.elements[0].label;
    assert_eq!(label.value, "Hello");
    assert_eq!(label.offset_x, 10.0);
    assert_eq!(label.offset_y, 30.0);
    assert_eq!(label.font, "14px Arial");
    assert_eq!(label.style, "normal");
}

#[test]
fn duplicate_names_and_missing_fields_are_rejected() {
    let msg = validation_message(
        r#"
objects:
  - { name: a, startX: 0, startY: 0, shape: { premade: star } }
  - { name: a, startX: 1, startY: 1, shape: { premade: star } }
"#,
    );
    assert!(msg.contains("duplicate"), "{msg}");

    let msg = validation_message(
        r#"
objects:
  - { name: a, startY: 0, shape: { premade: star } }
"#,
    );
    assert!(msg.contains("startX"), "{msg}");
}

#[test]
fn movements_are_checked_and_kept_in_order() {
    let doc = Document::from_yaml_str(
        r#"
objects:
  - { name: a, startX: 0, startY: 0, shape: { premade: star } }
movements:
  - { name: a, timeStart: 0, timeEnd: 1000, endX: 100, strategy: linear }
  - { name: a, timeStart: 500, timeEnd: 1500, endX: 50, endY: 10, strategy: cosine }
"#,
    )
    .unwrap();
    assert_eq!(doc.movements.len(), 2);
    assert_eq!(doc.movements[1].strategy, "cosine");
    assert_eq!(doc.movements[1].end_y, Some(10.0));
    assert_eq!(doc.overlaps.len(), 1);

    let msg = validation_message(
        r#"
movements:
  - { name: a, timeStart: 100, timeEnd: 100, endX: 1, strategy: linear }
"#,
    );
    assert!(msg.contains("timeEnd"), "{msg}");
}

#[test]
fn unknown_strategy_is_accepted_at_load_time() {
    let doc = Document::from_yaml_str(
        r#"
movements:
  - { name: a, timeStart: 0, timeEnd: 100, endX: 1, strategy: bounce }
"#,
    )
    .unwrap();
    assert_eq!(doc.movements[0].strategy, "bounce");
}

#[test]
fn missing_strategy_is_accepted_at_load_time() {
    let doc = Document::from_yaml_str(
        r#"
movements:
  - { name: a, timeStart: 0, timeEnd: 100, endX: 1 }
"#,
    )
    .unwrap();
    assert_eq!(doc.movements[0].strategy, "");
}

#[test]
fn json_documents_load_too() {
    let doc = Document::from_json_str(
        r#"{"objects":[{"name":"j","startX":1,"startY":2,"shape":{"premade":"database"}}]}"#,
    )
    .unwrap();
    assert_eq!(
        doc.elements[0].shape.kind,
        ShapeKind::Database {
            width: 100.0,
            height: 50.0
        }
    );
    assert!(matches!(
        Document::from_json_str("{not json"),
        Err(MotiongramError::Serde(_))
    ));
}

#[test]
fn empty_document_has_nothing_to_draw() {
    let doc = Document::from_yaml_str("objects:\nmovements:\n").unwrap();
    assert!(doc.elements.is_empty());
    assert!(doc.movements.is_empty());
}

#[test]
fn describe_element_shows_defaults() {
    let doc = Document::from_yaml_str(
        r#"
objects:
  - { name: box, startX: 1, startY: 2, color: blue, shape: { premade: rectangle, width: 40 } }
"#,
    )
    .unwrap();
    let yaml = doc.describe_element("box").unwrap();
    let v: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(v["name"].as_str(), Some("box"));
    assert_eq!(v["color"].as_str(), Some("#0000ff"));
    assert_eq!(v["shape"]["premade"].as_str(), Some("rectangle"));
    assert_eq!(v["shape"]["width"].as_f64(), Some(40.0));
    assert_eq!(v["shape"]["height"].as_f64(), Some(50.0));
    assert_eq!(v["label"]["font"].as_str(), Some("14px Arial"));
    assert_eq!(v["label"]["offsetX"].as_f64(), Some(10.0));
    assert!(doc.describe_element("nope").is_err());
}

#[test]
fn format_follows_extension() {
    assert_eq!(
        DocumentFormat::from_path(Path::new("a/b.JSON")),
        DocumentFormat::Json
    );
    assert_eq!(
        DocumentFormat::from_path(Path::new("diagram.yaml")),
        DocumentFormat::Yaml
    );
}
