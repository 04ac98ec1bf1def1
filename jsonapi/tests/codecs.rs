use jsonapi::{CodecError, Config, ErrorKind, JsonApi, Registry};
use serde_json::{Value, json};

/// Seconds since the epoch, written as `"@<seconds>"`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Stamp(u64);
jsonapi::opaque!(Stamp);

fn stamp_codecs(config: &mut Config) {
    config.register_marshaler(|stamp: &Stamp| Ok(json!(format!("@{}", stamp.0))));
    config.register_unmarshaler(|value: &Value| match value {
        Value::Null => Ok(Stamp::default()),
        Value::String(s) => s
            .strip_prefix('@')
            .and_then(|digits| digits.parse().ok())
            .map(Stamp)
            .ok_or_else(|| CodecError::new(format!("bad stamp `{s}`"))),
        other => Err(CodecError::new(format!("expected a string, got {other}"))),
    });
}

#[derive(JsonApi, Debug, Default, PartialEq)]
struct Event {
    #[jsonapi("primary,events")]
    id: String,
    #[jsonapi("attribute,at")]
    at: Stamp,
    #[jsonapi("attribute,ended")]
    ended: Option<Stamp>,
    #[jsonapi("meta,seen")]
    seen: Stamp,
}

fn configured() -> Config {
    let mut config = Config::new().with_indent(None);
    stamp_codecs(&mut config);
    config
}

#[jsonapi_testhelpers::test]
fn codecs_write_and_read_opaque_values() {
    let event = Event {
        id: "1".into(),
        at: Stamp(100),
        ended: Some(Stamp(160)),
        seen: Stamp(7),
    };
    let out = configured().marshal(&event).unwrap();
    assert_eq!(
        std::str::from_utf8(&out).unwrap(),
        r#"{"data":{"id":"1","type":"events","attributes":{"at":"@100","ended":"@160"},"meta":{"seen":"@7"}},"jsonapi":{"version":"1.0"}}"#
    );

    let mut back = Event::default();
    configured().unmarshal(&out, &mut back).unwrap();
    assert_eq!(back, event);
}

#[jsonapi_testhelpers::test]
fn none_skips_the_codec() {
    let event = Event {
        id: "1".into(),
        at: Stamp(1),
        ..Event::default()
    };
    let out = configured().marshal(&event).unwrap();
    let value: Value = serde_json::from_slice(&out).unwrap();
    assert!(value["data"]["attributes"].get("ended").is_none());
}

#[jsonapi_testhelpers::test]
fn null_reaches_exact_type_codecs_only() {
    let input = r#"{"data":{"type":"events","id":"1","attributes":{"at":null,"ended":null}}}"#;
    let mut event = Event {
        at: Stamp(5),
        ended: Some(Stamp(6)),
        ..Event::default()
    };
    configured().unmarshal(input.as_bytes(), &mut event).unwrap();
    // the `Stamp` codec maps null to the default; `Option<Stamp>` has none
    assert_eq!(event.at, Stamp(0));
    assert_eq!(event.ended, Some(Stamp(6)));
}

#[jsonapi_testhelpers::test]
fn codec_failures_carry_the_member_path() {
    let input = r#"{"data":{"type":"events","id":"1","attributes":{"at":"yesterday"}}}"#;
    let err = configured()
        .unmarshal(input.as_bytes(), &mut Event::default())
        .unwrap_err();
    match &err.kind {
        ErrorKind::Codec(e) => assert_eq!(e.message(), "bad stamp `yesterday`"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(err.path.as_deref(), Some("at"));
    assert_eq!(err.code(), "jsonapi::codec");
}

#[jsonapi_testhelpers::test]
fn opaque_values_need_a_codec() {
    let event = Event {
        id: "1".into(),
        ..Event::default()
    };
    let err = Config::new().marshal(&event).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnsupportedType { .. }));
    assert_eq!(err.path.as_deref(), Some("at"));

    let input = r#"{"data":{"type":"events","id":"1","attributes":{"at":"@1"}}}"#;
    let err = Config::new()
        .unmarshal(input.as_bytes(), &mut Event::default())
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnsupportedType { .. }));
}

/// Temperatures are sent in tenths of a degree.
#[derive(JsonApi, Debug, Default, PartialEq)]
struct Reading {
    #[jsonapi("primary,readings")]
    id: String,
    #[jsonapi("attribute,celsius")]
    celsius: f64,
}

#[jsonapi_testhelpers::test]
fn codecs_override_builtin_scalars() {
    let mut registry = Registry::new();
    registry.register_marshaler(|c: &f64| Ok(json!((c * 10.0).round() as i64)));
    registry.register_unmarshaler(|v: &Value| {
        v.as_i64()
            .map(|tenths| tenths as f64 / 10.0)
            .ok_or_else(|| CodecError::new("expected tenths of a degree"))
    });
    assert!(registry.has_marshaler(core::any::TypeId::of::<f64>()));
    assert!(!registry.has_unmarshaler(core::any::TypeId::of::<f32>()));
    let config = Config::new().with_indent(None).with_registry(registry);

    let reading = Reading {
        id: "r".into(),
        celsius: 21.5,
    };
    let out = config.marshal(&reading).unwrap();
    let value: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["data"]["attributes"], json!({"celsius": 215}));

    let mut back = Reading::default();
    config.unmarshal(&out, &mut back).unwrap();
    assert_eq!(back, reading);
}

#[jsonapi_testhelpers::test]
fn marshal_codec_errors_propagate() {
    let mut config = Config::new();
    config.register_marshaler(|_: &Stamp| Err(CodecError::new("clock unavailable")));
    let err = config
        .marshal(&Event {
            id: "1".into(),
            ..Event::default()
        })
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Codec(_)));
    assert_eq!(err.to_string(), "codec error: clock unavailable (at `at`)");
}
