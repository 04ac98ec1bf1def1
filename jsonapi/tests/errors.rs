use std::collections::BTreeMap;

use indoc::indoc;
use jsonapi::{Config, ErrorKind, ErrorObject, JsonApi, JsonApiError, Links, MarshalParams};

#[jsonapi_testhelpers::test]
fn errors_only_documents() {
    let mut source = BTreeMap::new();
    source.insert("pointer".to_string(), "/data/attributes/title".to_string());
    let errors = [
        ErrorObject {
            id: Some("1".into()),
            status: Some("422".into()),
            title: Some("Invalid Attribute".into()),
            detail: Some("title must not be empty".into()),
            source: Some(source),
            ..ErrorObject::default()
        },
        ErrorObject {
            status: Some("500".into()),
            code: Some("db".into()),
            ..ErrorObject::default()
        },
    ];

    let out = Config::new()
        .with_indent(Some("  "))
        .marshal_errors(&MarshalParams::default(), &errors)
        .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        indoc! {r#"
            {
              "jsonapi": {
                "version": "1.0"
              },
              "errors": [
                {
                  "id": "1",
                  "status": "422",
                  "title": "Invalid Attribute",
                  "detail": "title must not be empty",
                  "source": {
                    "pointer": "/data/attributes/title"
                  }
                },
                {
                  "status": "500",
                  "code": "db"
                }
              ]
            }"#}
    );
}

#[jsonapi_testhelpers::test]
fn errors_documents_carry_params() {
    let mut links = Links::new();
    links.add_link("about", "https://example.com/errors/db");
    let params = MarshalParams {
        links: Some(links),
        meta: None,
    };
    let errors = [ErrorObject {
        title: Some("down".into()),
        ..ErrorObject::default()
    }];
    let out = Config::new()
        .with_indent(None)
        .marshal_errors(&params, &errors)
        .unwrap();
    assert_eq!(
        std::str::from_utf8(&out).unwrap(),
        r#"{"jsonapi":{"version":"1.0"},"links":{"about":"https://example.com/errors/db"},"errors":[{"title":"down"}]}"#
    );
}

#[jsonapi_testhelpers::test]
fn error_objects_display_as_json() {
    let object = ErrorObject {
        status: Some("404".into()),
        title: Some("Not Found".into()),
        ..ErrorObject::default()
    };
    assert_eq!(
        object.to_string(),
        indoc! {r#"
            {
              "status": "404",
              "title": "Not Found"
            }"#}
    );

    let boxed: Box<dyn std::error::Error> = Box::new(object);
    assert!(boxed.to_string().contains("Not Found"));
}

#[derive(JsonApi, Default)]
struct Thing {
    #[jsonapi("primary,things")]
    id: String,
    #[jsonapi("attribute,count")]
    count: u8,
}

#[jsonapi_testhelpers::test]
fn failures_become_error_objects() {
    let input = r#"{"data":{"type":"things","id":"1","attributes":{"count":300}}}"#;
    let err: JsonApiError = Config::new()
        .unmarshal(input.as_bytes(), &mut Thing::default())
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NumberOutOfRange { .. }));

    let object = err.to_error_object(400);
    assert_eq!(object.status.as_deref(), Some("400"));
    assert_eq!(object.code.as_deref(), Some("jsonapi::number_out_of_range"));
    assert_eq!(
        object.detail.as_deref(),
        Some("number `300` out of range for u8")
    );
    assert_eq!(
        object.source.as_ref().and_then(|s| s.get("pointer")).map(String::as_str),
        Some("/data/attributes/count")
    );

    // round trip through an errors document
    let out = Config::new()
        .marshal_errors(&MarshalParams::default(), &[object.clone()])
        .unwrap();
    let err = Config::new()
        .unmarshal(&out, &mut Thing::default())
        .unwrap_err();
    match err.kind {
        ErrorKind::ErrorDocument(errors) => assert_eq!(errors, vec![object]),
        other => panic!("unexpected {other:?}"),
    }
}

#[derive(JsonApi, Default)]
struct Owner {
    #[jsonapi("primary,owners")]
    id: String,
    #[jsonapi("relationship,things")]
    things: Vec<Thing>,
}

#[jsonapi_testhelpers::test]
fn pointers_name_the_failing_member_of_the_document() {
    let input = r#"{"data":[
        {"type":"things","id":"1","attributes":{"count":1}},
        {"type":"things","id":"2","attributes":{"count":-1}}
    ]}"#;
    let mut things: Vec<Thing> = Vec::new();
    let err = Config::new()
        .unmarshal(input.as_bytes(), &mut things)
        .unwrap_err();
    assert_eq!(err.pointer.as_deref(), Some("/data/1/attributes/count"));

    // failures inside included resources point at the relationship
    let input = r#"{
        "data": {"type":"owners","id":"o","relationships":{"things":{"data":[{"type":"things","id":"1"}]}}},
        "included": [{"type":"things","id":"1","attributes":{"count":"many"}}]
    }"#;
    let err = Config::new()
        .unmarshal(input.as_bytes(), &mut Owner::default())
        .unwrap_err();
    assert_eq!(err.path.as_deref(), Some("count"));
    assert_eq!(err.pointer.as_deref(), Some("/data/relationships/things"));
}
