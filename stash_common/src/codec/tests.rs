use super::*;

fn obj(entries: &[(&str, Value)]) -> Value {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn roundtrip(value: &Value) -> Value {
    let config = CodecConfig::default();
    let raw = encode(value, &config).unwrap();
    decode(&raw, value, &config).unwrap()
}

fn rejecting() -> CodecConfig {
    CodecConfig {
        non_finite: NonFinitePolicy::Reject,
        ..CodecConfig::default()
    }
}

fn nested_arrays(levels: usize) -> Value {
    let mut value = Value::from(1);
    for _ in 0..levels {
        value = Value::Array(vec![value]);
    }
    value
}

#[test]
fn test_encode_scalars_as_json() {
    let config = CodecConfig::default();
    assert_eq!(encode(&Value::from(true), &config).unwrap(), "true");
    assert_eq!(encode(&Value::from(1.5), &config).unwrap(), "1.5");
    assert_eq!(encode(&Value::from("hi"), &config).unwrap(), "\"hi\"");
}

#[test]
fn test_encode_top_level_non_finite_as_bare_token() {
    let config = CodecConfig::default();
    assert_eq!(encode(&Value::from(f64::INFINITY), &config).unwrap(), "Infinity");
    assert_eq!(
        encode(&Value::from(f64::NEG_INFINITY), &config).unwrap(),
        "-Infinity"
    );
    assert_eq!(encode(&Value::from(f64::NAN), &config).unwrap(), "NaN");
}

#[test]
fn test_encode_nested_non_finite_as_string_token() {
    let config = CodecConfig::default();
    let value = obj(&[
        ("a", Value::from(vec![1.0, f64::INFINITY])),
        ("b", Value::from(f64::NAN)),
    ]);
    assert_eq!(
        encode(&value, &config).unwrap(),
        r#"{"a":[1.0,"Infinity"],"b":"NaN"}"#
    );
}

#[test]
fn test_roundtrip_scalars() {
    for value in [
        Value::from(false),
        Value::from(0),
        Value::from(-0.25),
        Value::from(1e300),
        Value::from(0.1 + 0.2),
        Value::from(""),
        Value::from("with \"quotes\" and \n newline"),
    ] {
        assert_eq!(roundtrip(&value), value);
    }
}

#[test]
fn test_roundtrip_non_finite() {
    for n in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
        let value = Value::from(n);
        assert_eq!(roundtrip(&value), value);
    }
}

#[test]
fn test_roundtrip_nested() {
    let value = obj(&[
        ("name", Value::from("stash")),
        ("flags", Value::from(vec![true, false])),
        (
            "limits",
            obj(&[
                ("low", Value::from(f64::NEG_INFINITY)),
                ("high", Value::from(f64::INFINITY)),
            ]),
        ),
        ("series", Value::from(vec![1.0, f64::NAN, 3.0])),
        ("grid", Value::from(vec![vec![1, 2], vec![3]])),
    ]);
    assert_eq!(roundtrip(&value), value);
}

#[test]
fn test_string_equal_to_token_stays_string() {
    let config = CodecConfig::default();
    let value = Value::from("Infinity");
    let raw = encode(&value, &config).unwrap();
    assert_eq!(raw, "\"Infinity\"");
    assert_eq!(decode(&raw, &Value::from(""), &config).unwrap(), value);

    let nested = obj(&[("label", Value::from("NaN")), ("n", Value::from(f64::NAN))]);
    assert_eq!(roundtrip(&nested), nested);
}

#[test]
fn test_bare_token_with_string_reference_is_not_json() {
    let config = CodecConfig::default();
    let err = decode("Infinity", &Value::from(""), &config).unwrap_err();
    assert!(matches!(err, CodecError::Parse(_)));
}

#[test]
fn test_quoted_top_level_token_is_a_string() {
    let config = CodecConfig::default();
    for raw in ["\"NaN\"", "\"Infinity\"", "\"-Infinity\""] {
        let err = decode(raw, &Value::from(0), &config).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Shape {
                expected: "number",
                found: "string",
                ..
            }
        ));
    }

    // Nested string tokens still decode as numbers.
    let decoded = decode(r#"["NaN"]"#, &Value::from(vec![0]), &config).unwrap();
    assert_eq!(decoded, Value::from(vec![f64::NAN]));
}

#[test]
fn test_decode_invalid_json() {
    let config = CodecConfig::default();
    let err = decode("{\"a\": [1, 2", &Value::from(0), &config).unwrap_err();
    assert!(matches!(err, CodecError::Parse(_)));
}

#[test]
fn test_decode_scalar_kind_mismatch() {
    let config = CodecConfig::default();
    let err = decode("\"5\"", &Value::from(42), &config).unwrap_err();
    match err {
        CodecError::Shape {
            path,
            expected,
            found,
        } => {
            assert_eq!(path, "");
            assert_eq!(expected, "number");
            assert_eq!(found, "string");
        }
        other => panic!("Expected shape error, got {other:?}"),
    }
}

#[test]
fn test_decode_null_is_never_storable() {
    let config = CodecConfig::default();
    assert!(matches!(
        decode("null", &Value::from(0), &config),
        Err(CodecError::Shape { .. })
    ));
    assert!(matches!(
        decode("[null]", &Value::Array(vec![]), &config),
        Err(CodecError::Shape { .. })
    ));
}

#[test]
fn test_decode_homogeneous_array() {
    let config = CodecConfig::default();
    let reference = Value::from(vec![0]);

    let decoded = decode("[1, 2, 3]", &reference, &config).unwrap();
    assert_eq!(decoded, Value::from(vec![1, 2, 3]));

    let err = decode("[1, \"two\", 3]", &reference, &config).unwrap_err();
    match err {
        CodecError::Shape { path, .. } => assert_eq!(path, "[1]"),
        other => panic!("Expected shape error, got {other:?}"),
    }
}

#[test]
fn test_decode_empty_reference_array_accepts_anything() {
    let config = CodecConfig::default();
    let decoded = decode("[1, \"two\", [true]]", &Value::Array(vec![]), &config).unwrap();
    assert_eq!(
        decoded,
        Value::Array(vec![
            Value::from(1),
            Value::from("two"),
            Value::from(vec![true]),
        ])
    );
}

#[test]
fn test_decode_object_requires_reference_keys() {
    let config = CodecConfig::default();
    let reference = obj(&[("a", Value::from(0)), ("b", Value::from(""))]);

    let err = decode(r#"{"a": 1}"#, &reference, &config).unwrap_err();
    match err {
        CodecError::Shape {
            path,
            expected,
            found,
        } => {
            assert_eq!(path, ".b");
            assert_eq!(expected, "string");
            assert_eq!(found, "nothing");
        }
        other => panic!("Expected shape error, got {other:?}"),
    }
}

#[test]
fn test_decode_object_keeps_extra_keys() {
    let config = CodecConfig::default();
    let reference = obj(&[("a", Value::from(0))]);
    let decoded = decode(r#"{"a": 1, "extra": "Infinity"}"#, &reference, &config).unwrap();
    assert_eq!(
        decoded,
        obj(&[("a", Value::from(1)), ("extra", Value::from("Infinity"))])
    );
}

#[test]
fn test_decode_nested_mismatch_reports_path() {
    let config = CodecConfig::default();
    let reference = obj(&[("items", Value::from(vec![obj(&[("on", Value::from(true))])]))]);
    let err = decode(
        r#"{"items": [{"on": true}, {"on": "yes"}]}"#,
        &reference,
        &config,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Expected boolean at $.items[1].on, found string"
    );
}

#[test]
fn test_decode_non_token_string_for_number() {
    let config = CodecConfig::default();
    let err = decode(r#"["Infinite"]"#, &Value::from(vec![0]), &config).unwrap_err();
    assert!(matches!(err, CodecError::Shape { .. }));
}

#[test]
fn test_reject_policy_refuses_non_finite() {
    let config = rejecting();
    assert!(matches!(
        encode(&Value::from(f64::INFINITY), &config),
        Err(CodecError::Range(_))
    ));
    let nested = obj(&[("a", Value::from(vec![1.0, f64::NAN]))]);
    assert!(matches!(encode(&nested, &config), Err(CodecError::Range(_))));
    assert_eq!(encode(&Value::from(2), &config).unwrap(), "2.0");
}

#[test]
fn test_reject_policy_does_not_decode_tokens() {
    let config = rejecting();
    assert!(matches!(
        decode("Infinity", &Value::from(0), &config),
        Err(CodecError::Parse(_))
    ));
    assert!(matches!(
        decode(r#"["NaN"]"#, &Value::from(vec![0]), &config),
        Err(CodecError::Shape { .. })
    ));
}

#[test]
fn test_encode_depth_limit() {
    let config = CodecConfig {
        max_depth: 3,
        ..CodecConfig::default()
    };
    assert!(encode(&nested_arrays(3), &config).is_ok());
    assert!(matches!(
        encode(&nested_arrays(4), &config),
        Err(CodecError::Serialize(_))
    ));
}

#[test]
fn test_default_depth_limit_stays_decodable() {
    let config = CodecConfig::default();
    let deepest = nested_arrays(DEFAULT_MAX_DEPTH);
    assert_eq!(roundtrip(&deepest), deepest);
    assert!(matches!(
        encode(&nested_arrays(DEFAULT_MAX_DEPTH + 1), &config),
        Err(CodecError::Serialize(_))
    ));
}

#[test]
fn test_config_from_json() {
    let config: CodecConfig = serde_json::from_str(r#"{"non_finite": "reject"}"#).unwrap();
    assert_eq!(config.non_finite, NonFinitePolicy::Reject);
    assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);

    let config: CodecConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, CodecConfig::default());
}
