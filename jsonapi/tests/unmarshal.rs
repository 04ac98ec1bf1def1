use indoc::indoc;
use jsonapi::{Config, ErrorKind, JsonApi, Link, Links};

fn config() -> Config {
    Config::new()
}

#[derive(JsonApi, Debug, Default, PartialEq)]
struct Article {
    #[jsonapi("primary,articles")]
    id: String,
    #[jsonapi("attribute,title")]
    title: String,
    #[jsonapi("attribute,rating")]
    rating: Option<u8>,
    #[jsonapi("attribute,published")]
    published: bool,
    #[jsonapi("meta,revision")]
    revision: u32,
    #[jsonapi("links,links")]
    links: Links,
}

#[jsonapi_testhelpers::test]
fn resource_fills_matching_fields() {
    let input = indoc! {r#"
        {
            "data": {
                "type": "articles",
                "id": "1",
                "attributes": {"title": "Hello", "rating": 4, "published": true, "unknown": [1, 2]},
                "meta": {"revision": 3},
                "links": {"self": "/articles/1", "related": {"href": "/authors/9", "meta": {"count": 1}}}
            }
        }
    "#};

    let mut article = Article::default();
    config().unmarshal(input.as_bytes(), &mut article).unwrap();

    assert_eq!(article.id, "1");
    assert_eq!(article.title, "Hello");
    assert_eq!(article.rating, Some(4));
    assert!(article.published);
    assert_eq!(article.revision, 3);
    assert_eq!(article.links.get("self"), Some(&Link::Url("/articles/1".into())));
    assert_eq!(article.links.get("related").map(Link::href), Some("/authors/9"));
}

#[jsonapi_testhelpers::test]
fn absent_and_null_members_leave_fields_alone() {
    let input = r#"{"data":{"type":"articles","id":"1","attributes":{"title":null}}}"#;
    let mut article = Article {
        title: "kept".into(),
        rating: Some(2),
        revision: 9,
        ..Article::default()
    };
    config().unmarshal(input.as_bytes(), &mut article).unwrap();

    assert_eq!(article.id, "1");
    assert_eq!(article.title, "kept");
    assert_eq!(article.rating, Some(2));
    assert_eq!(article.revision, 9);
}

#[jsonapi_testhelpers::test]
fn wrong_json_type_is_a_mismatch() {
    let input = r#"{"data":{"type":"articles","id":"1","attributes":{"title":12}}}"#;
    let err = config()
        .unmarshal(input.as_bytes(), &mut Article::default())
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::TypeMismatch {
            expected: "String",
            got: "number"
        }
    ));
    assert_eq!(err.path.as_deref(), Some("title"));

    let input = r#"{"data":{"type":"articles","id":"1","attributes":{"published":"yes"}}}"#;
    let err = config()
        .unmarshal(input.as_bytes(), &mut Article::default())
        .unwrap_err();
    assert_eq!(err.code(), "jsonapi::type_mismatch");
    assert_eq!(err.path.as_deref(), Some("published"));
}

#[derive(JsonApi, Debug, Default, PartialEq)]
struct Inner {
    #[jsonapi("attribute,nested_string")]
    nested_string: String,
}

#[derive(JsonApi, Debug, Default, PartialEq)]
struct Audit {
    #[jsonapi("attribute,created_by")]
    created_by: String,
}

#[derive(JsonApi, Debug, Default, PartialEq)]
struct Outer {
    #[jsonapi("primary,outers")]
    id: String,
    #[jsonapi("attribute,nested")]
    nested: Inner,
    #[jsonapi(embed)]
    audit: Audit,
    #[jsonapi("meta,stats.views")]
    views: u64,
}

#[jsonapi_testhelpers::test]
fn nested_paths_are_followed() {
    let input = r#"{"data":{"type":"outers","id":"o","attributes":{"nested":{"nested_string":"deep"},"created_by":"me"},"meta":{"stats":{"views":10}}}}"#;
    let mut outer = Outer::default();
    config().unmarshal(input.as_bytes(), &mut outer).unwrap();
    assert_eq!(
        outer,
        Outer {
            id: "o".into(),
            nested: Inner {
                nested_string: "deep".into()
            },
            audit: Audit {
                created_by: "me".into()
            },
            views: 10,
        }
    );

    // a scalar where an object is expected means the path is absent
    let input = r#"{"data":{"type":"outers","id":"o","attributes":{"nested":"flat"}}}"#;
    let mut outer = Outer::default();
    config().unmarshal(input.as_bytes(), &mut outer).unwrap();
    assert_eq!(outer.nested, Inner::default());
}

#[derive(JsonApi, Debug, Default, PartialEq)]
struct Counter {
    #[jsonapi("primary,counters")]
    id: u32,
    #[jsonapi("attribute,label")]
    label: Option<Box<String>>,
}

#[jsonapi_testhelpers::test]
fn integer_ids_and_boxed_options() {
    let input = r#"{"data":{"type":"counters","id":"42","attributes":{"label":"answer"}}}"#;
    let mut counter = Counter::default();
    config().unmarshal(input.as_bytes(), &mut counter).unwrap();
    assert_eq!(counter.id, 42);
    assert_eq!(counter.label.as_deref().map(String::as_str), Some("answer"));

    let input = r#"{"data":{"type":"counters","id":"forty-two"}}"#;
    let err = config()
        .unmarshal(input.as_bytes(), &mut Counter::default())
        .unwrap_err();
    match err.kind {
        ErrorKind::InvalidId { id, target_type } => {
            assert_eq!(id, "forty-two");
            assert_eq!(target_type, "u32");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[jsonapi_testhelpers::test]
fn compound_documents_fill_lists() {
    let input = r#"{"data":[
        {"type":"articles","id":"1","attributes":{"title":"one"}},
        {"type":"articles","id":"2","attributes":{"title":"two"}}
    ]}"#;

    let articles: Vec<Article> = jsonapi::from_str(input).unwrap();
    let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, ["one", "two"]);

    let mut boxed: Vec<Box<Article>> = Vec::new();
    config().unmarshal(input.as_bytes(), &mut boxed).unwrap();
    assert_eq!(boxed.len(), 2);
    assert_eq!(boxed[1].id, "2");

    let empty: Vec<Article> = jsonapi::from_str(r#"{"data":null}"#).unwrap();
    assert!(empty.is_empty());
}

#[jsonapi_testhelpers::test]
fn document_shape_errors() {
    let mut article = Article::default();

    let err = config().unmarshal(b"{not json", &mut article).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Decode(_)));

    let err = config().unmarshal(b"{}", &mut article).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingData));

    let input = r#"{"data":{"type":"articles","id":"1"},"errors":[{"title":"x"}]}"#;
    let err = config().unmarshal(input.as_bytes(), &mut article).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DataAndErrors));

    let input = r#"{"errors":[{"status":"404","title":"Not Found"}]}"#;
    let err = config().unmarshal(input.as_bytes(), &mut article).unwrap_err();
    match err.kind {
        ErrorKind::ErrorDocument(errors) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].status.as_deref(), Some("404"));
        }
        other => panic!("unexpected {other:?}"),
    }

    // a list where one resource is expected does not decode
    let input = r#"{"data":[]}"#;
    let err = config().unmarshal(input.as_bytes(), &mut article).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Decode(_)));
}

#[derive(JsonApi, Default)]
struct Everything {
    #[jsonapi("primary,everything")]
    id: Option<String>,
    #[jsonapi("attribute,b")]
    b: bool,
    #[jsonapi("attribute,s")]
    s: String,
    #[jsonapi("attribute,u8")]
    u8: u8,
    #[jsonapi("attribute,u16")]
    u16: u16,
    #[jsonapi("attribute,u32")]
    u32: u32,
    #[jsonapi("attribute,u64")]
    u64: u64,
    #[jsonapi("attribute,usize")]
    usize: usize,
    #[jsonapi("attribute,i8")]
    i8: i8,
    #[jsonapi("attribute,i16")]
    i16: i16,
    #[jsonapi("attribute,i32")]
    i32: i32,
    #[jsonapi("attribute,i64")]
    i64: i64,
    #[jsonapi("attribute,isize")]
    isize: isize,
    #[jsonapi("attribute,f32")]
    f32: f32,
    #[jsonapi("attribute,f64")]
    f64: f64,
    #[jsonapi("attribute,maybe")]
    maybe: Option<Option<i16>>,
}

#[jsonapi_testhelpers::test]
fn every_scalar_survives_a_round_trip() {
    let value = Everything {
        id: Some("e".into()),
        b: true,
        s: "text".into(),
        u8: 200,
        u16: 60_000,
        u32: 4_000_000_000,
        u64: 18_000_000_000_000_000_000,
        usize: 7,
        i8: -100,
        i16: -30_000,
        i32: -2_000_000_000,
        i64: -9_000_000_000_000_000_000,
        isize: -7,
        f32: 1.5,
        f64: -0.125,
        maybe: Some(Some(-3)),
    };
    let bytes = config().marshal(&value).unwrap();

    let mut back = Everything::default();
    config().unmarshal(&bytes, &mut back).unwrap();
    assert_eq!(back.id.as_deref(), Some("e"));
    assert!(back.b);
    assert_eq!(back.s, "text");
    assert_eq!(back.u8, 200);
    assert_eq!(back.u16, 60_000);
    assert_eq!(back.u32, 4_000_000_000);
    assert_eq!(back.u64, 18_000_000_000_000_000_000);
    assert_eq!(back.usize, 7);
    assert_eq!(back.i8, -100);
    assert_eq!(back.i16, -30_000);
    assert_eq!(back.i32, -2_000_000_000);
    assert_eq!(back.i64, -9_000_000_000_000_000_000);
    assert_eq!(back.isize, -7);
    assert_eq!(back.f32, 1.5);
    assert_eq!(back.f64, -0.125);
    assert_eq!(back.maybe, Some(Some(-3)));
}

#[jsonapi_testhelpers::test]
fn missing_id_keeps_the_primary_field() {
    let input = r#"{"data":{"type":"everything","attributes":{"s":"new"}}}"#;
    let mut value = Everything {
        id: Some("old".into()),
        ..Everything::default()
    };
    config().unmarshal(input.as_bytes(), &mut value).unwrap();
    assert_eq!(value.id.as_deref(), Some("old"));
    assert_eq!(value.s, "new");
}

#[derive(JsonApi, Debug, Default, PartialEq)]
struct Foo {
    #[jsonapi("primary,t")]
    id: String,
    #[jsonapi("attribute,bar")]
    bar: i32,
}

#[jsonapi_testhelpers::test]
fn integer_attribute_from_document() {
    let foo: Foo =
        jsonapi::from_str(r#"{"data":{"id":"7","type":"t","attributes":{"bar":99}}}"#).unwrap();
    assert_eq!(
        foo,
        Foo {
            id: "7".into(),
            bar: 99
        }
    );
}
