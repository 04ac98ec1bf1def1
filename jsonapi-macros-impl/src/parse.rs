//! Grammar for the derive input.

use proc_macro2::{Span, TokenStream as TokenStream2};
use unsynn::*;

keyword! {
    KStruct = "struct";
    KPub = "pub";
}

operator! {
    /// Represents the '=' operator.
    Eq = "=";
}

unsynn! {
    /// Visibility: `pub`, `pub(...)` or nothing
    enum Vis {
        PubIn(Cons<KPub, ParenthesisGroup>),
        Pub(KPub),
    }

    /// An attribute: `#[...]`
    struct Attribute {
        _pound: Pound,
        content: BracketGroup,
    }

    /// A struct definition; anything between the name and the body is generics
    struct StructDef {
        attrs: Vec<Attribute>,
        vis: Option<Vis>,
        _kw_struct: KStruct,
        name: Ident,
        generics: Vec<Cons<Except<StructBody>, TokenTree>>,
        body: StructBody,
    }

    /// Struct body
    enum StructBody {
        Named(BraceGroup),
        Tuple(ParenthesisGroup),
        Unit(Semicolon),
    }

    /// A named field, split out of the body beforehand
    struct FieldDef {
        attrs: Vec<Attribute>,
        vis: Option<Vis>,
        name: Ident,
        _colon: Colon,
        ty: Vec<TokenTree>,
    }

    /// `jsonapi(...)` inside an attribute
    struct JsonApiAttr {
        _name: Ident,
        args: ParenthesisGroupContaining<CommaDelimitedVec<TagArg>>,
    }

    /// One argument of `#[jsonapi(...)]`
    enum TagArg {
        /// `key = "kind,name"`
        Keyed(KeyedTag),
        /// `"kind,name"`
        Value(LiteralString),
        /// `embed`
        Flag(Ident),
    }

    /// `key = "kind,name"`
    struct KeyedTag {
        key: Ident,
        _eq: Eq,
        value: LiteralString,
    }
}

/// Annotation key used when a tag is written without one.
pub(crate) const DEFAULT_KEY: &str = "jsonapi";

/// An error to report through `compile_error!`.
#[derive(Debug)]
pub(crate) struct DeriveError {
    pub message: String,
    pub span: Span,
}

impl DeriveError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        DeriveError {
            message: message.into(),
            span,
        }
    }
}

/// A struct ready for code emission.
#[derive(Debug)]
pub(crate) struct ParsedStruct {
    pub name: Ident,
    pub fields: Vec<ParsedField>,
}

/// A field carrying at least one `#[jsonapi(...)]` attribute.
#[derive(Debug)]
pub(crate) struct ParsedField {
    pub ident: Ident,
    /// `(key, "kind,name")` pairs in declaration order
    pub tags: Vec<(String, String)>,
    pub embedded: bool,
}

impl ParsedField {
    /// Field name without a raw-identifier prefix.
    pub fn name(&self) -> String {
        let name = self.ident.to_string();
        match name.strip_prefix("r#") {
            Some(stripped) => stripped.to_string(),
            None => name,
        }
    }
}

pub(crate) fn parse_struct(
    input: TokenStream2,
) -> core::result::Result<ParsedStruct, DeriveError> {
    let mut iter = input.to_token_iter();
    let def: StructDef = iter.parse().map_err(|_| {
        DeriveError::new(
            "#[derive(JsonApi)] only supports structs with named fields",
            Span::call_site(),
        )
    })?;

    if !def.generics.is_empty() {
        return Err(DeriveError::new(
            "#[derive(JsonApi)] does not support generic structs",
            def.name.span(),
        ));
    }

    let body = match def.body {
        StructBody::Named(group) => group.0.stream(),
        StructBody::Tuple(_) | StructBody::Unit(_) => {
            return Err(DeriveError::new(
                "#[derive(JsonApi)] only supports structs with named fields",
                def.name.span(),
            ));
        }
    };

    let mut fields = Vec::new();
    for tokens in split_fields(body) {
        let mut iter = tokens.to_token_iter();
        let field: FieldDef = iter.parse().map_err(|e| {
            DeriveError::new(format!("could not parse field: {e}"), Span::call_site())
        })?;
        if let Some(parsed) = parse_field(&field)? {
            fields.push(parsed);
        }
    }

    Ok(ParsedStruct {
        name: def.name,
        fields,
    })
}

/// `None` for fields without any `#[jsonapi(...)]` attribute.
fn parse_field(field: &FieldDef) -> core::result::Result<Option<ParsedField>, DeriveError> {
    let mut tags = Vec::new();
    let mut embedded = false;
    let mut annotated = false;

    for attr in &field.attrs {
        let stream = attr.content.0.stream();
        let is_ours = matches!(
            stream.clone().into_iter().next(),
            Some(proc_macro2::TokenTree::Ident(ident)) if ident == DEFAULT_KEY
        );
        if !is_ours {
            continue;
        }
        annotated = true;

        let mut iter = stream.to_token_iter();
        let parsed: JsonApiAttr = iter.parse().map_err(|_| {
            DeriveError::new(
                "expected #[jsonapi(\"<kind>,<name>\")], #[jsonapi(key = \"<kind>,<name>\")] or #[jsonapi(embed)]",
                field.name.span(),
            )
        })?;

        for arg in parsed.args.content.iter() {
            match &arg.value {
                TagArg::Keyed(keyed) => {
                    tags.push((keyed.key.to_string(), unquote(&keyed.value)));
                }
                TagArg::Value(value) => tags.push((DEFAULT_KEY.to_string(), unquote(value))),
                TagArg::Flag(flag) if flag == "embed" => embedded = true,
                TagArg::Flag(flag) => {
                    return Err(DeriveError::new(
                        format!("unknown jsonapi flag `{flag}`, expected `embed`"),
                        flag.span(),
                    ));
                }
            }
        }
    }

    if !annotated {
        return Ok(None);
    }
    Ok(Some(ParsedField {
        ident: field.name.clone(),
        tags,
        embedded,
    }))
}

fn unquote(literal: &LiteralString) -> String {
    // LiteralString::value() includes quotes, so strip them
    literal.value().trim_matches('"').to_string()
}

/// Split a struct body at top-level commas; commas inside `<...>` belong
/// to the field type.
fn split_fields(body: TokenStream2) -> Vec<TokenStream2> {
    use proc_macro2::{Spacing, TokenTree as TT};

    let mut fields = Vec::new();
    let mut current: Vec<TT> = Vec::new();
    let mut depth = 0usize;
    let mut after_dash = false;

    for tt in body {
        if let TT::Punct(p) = &tt {
            match p.as_char() {
                ',' if depth == 0 => {
                    fields.push(current.drain(..).collect());
                    after_dash = false;
                    continue;
                }
                '<' => depth += 1,
                // `->` in fn pointer types is not a closing bracket
                '>' if !after_dash => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        after_dash = matches!(&tt, TT::Punct(p) if p.as_char() == '-' && p.spacing() == Spacing::Joint);
        current.push(tt);
    }
    if !current.is_empty() {
        fields.push(current.into_iter().collect());
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    #[test]
    fn collects_annotated_fields_in_order() {
        let parsed = parse_struct(quote! {
            #[derive(JsonApi)]
            pub struct Book {
                #[jsonapi("primary,books")]
                pub id: String,
                /// Not mapped
                internal: HashMap<String, Vec<u8>>,
                #[jsonapi("attribute,title")]
                pub(crate) title: String,
                #[jsonapi(embed)]
                audit: Audit,
            }
        })
        .unwrap();

        assert_eq!(parsed.name.to_string(), "Book");
        let names: Vec<_> = parsed.fields.iter().map(ParsedField::name).collect();
        assert_eq!(names, ["id", "title", "audit"]);
        assert_eq!(
            parsed.fields[0].tags,
            [("jsonapi".to_string(), "primary,books".to_string())]
        );
        assert!(parsed.fields[2].embedded);
        assert!(parsed.fields[2].tags.is_empty());
    }

    #[test]
    fn keyed_tags_keep_their_key() {
        let parsed = parse_struct(quote! {
            struct Post {
                #[jsonapi("attribute,body", api = "meta,body")]
                r#body: Option<String>,
            }
        })
        .unwrap();
        let field = &parsed.fields[0];
        assert_eq!(field.name(), "body");
        assert_eq!(
            field.tags,
            [
                ("jsonapi".to_string(), "attribute,body".to_string()),
                ("api".to_string(), "meta,body".to_string()),
            ]
        );
    }

    #[test]
    fn generic_commas_do_not_split_fields() {
        let fields = split_fields(quote! {
            a: BTreeMap<String, u8>, b: fn(u8) -> Vec<u8>, c: u8,
        });
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn unsupported_inputs_are_rejected() {
        let err = parse_struct(quote! { struct Pair(u8, u8); }).unwrap_err();
        assert!(err.message.contains("named fields"));

        let err = parse_struct(quote! { struct Wrapper<T> { inner: T } }).unwrap_err();
        assert!(err.message.contains("generic"));

        let err = parse_struct(quote! { enum Kind { A } }).unwrap_err();
        assert!(err.message.contains("named fields"));

        let err = parse_struct(quote! {
            struct Bad { #[jsonapi(flatten)] x: u8 }
        })
        .unwrap_err();
        assert!(err.message.contains("unknown jsonapi flag"));
    }
}
