//! Attribute parsing for `#[env(...)]` annotations.
//!
//! Struct-level attributes are read into [`ContainerAttrs`], field-level ones
//! into [`FieldAttrs`]. Unknown keys, malformed values and conflicting
//! combinations are reported as compile errors at the offending span.

use syn::meta::ParseNestedMeta;
use syn::{Attribute, Expr, ExprLit, ExprUnary, Field, Lit, Meta, UnOp};

/// Parsed `#[env(...)]` attributes on the struct itself.
#[derive(Debug, Default)]
pub struct ContainerAttrs {
    /// Default key prefix used by the generated `options()`.
    pub prefix: Option<String>,
}

impl ContainerAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut container = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("env") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("prefix") {
                    container.prefix = Some(string_value(&meta)?);
                    return Ok(());
                }

                Err(meta.error("unsupported struct-level env attribute"))
            })?;
        }

        Ok(container)
    }
}

/// File-indirection tag of a field.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum FileTag {
    #[default]
    Inherit,
    Enabled,
    Disabled,
    Suffix(String),
}

/// How a field's string value is converted.
#[derive(Debug, Default)]
pub enum Strategy {
    /// The field type's own `Decode` impl.
    #[default]
    Decode,
    /// `deserializer = "path"`: a `fn(&str) -> Result<T, E>`.
    Deserializer(Expr),
    /// `from_str`
    FromStr,
    /// `from_bytes`
    FromBytes,
}

/// Parsed `#[env(...)]` attributes from a struct field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    pub ignored: bool,

    /// Explicit key, replacing the field-derived one.
    pub name: Option<String>,

    pub split_words: bool,
    pub required: bool,

    /// Default value, already rendered as the string the decoder will see.
    pub default: Option<String>,

    pub file: FileTag,

    /// `desc = "..."`, falling back to the field's doc comment.
    pub desc: Option<String>,

    pub flatten: bool,
    pub strategy: Strategy,
}

impl FieldAttrs {
    /// Extract and validate `#[env(...)]` attributes from a struct field.
    ///
    /// Attributes of other derives are left alone.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();
        let mut strategy_set = false;

        for attr in &field.attrs {
            if !attr.path().is_ident("env") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                let mut set_strategy = |strategy: Strategy| {
                    if strategy_set {
                        return Err(meta.error(
                            "only one of `deserializer`, `from_str` and `from_bytes` may be used",
                        ));
                    }
                    strategy_set = true;
                    attrs.strategy = strategy;
                    Ok(())
                };

                if meta.path.is_ident("ignored") {
                    attrs.ignored = true;
                    return Ok(());
                }

                if meta.path.is_ident("name") {
                    attrs.name = Some(string_value(&meta)?);
                    return Ok(());
                }

                if meta.path.is_ident("split_words") {
                    attrs.split_words = true;
                    return Ok(());
                }

                if meta.path.is_ident("required") {
                    attrs.required = true;
                    return Ok(());
                }

                if meta.path.is_ident("default") {
                    if !meta.input.peek(syn::Token![=]) {
                        return Err(meta.error("expected `default = value`"));
                    }
                    let expr: Expr = meta.value()?.parse()?;
                    attrs.default = Some(default_text(&expr)?);
                    return Ok(());
                }

                if meta.path.is_ident("file") {
                    attrs.file = if meta.input.peek(syn::Token![=]) {
                        match meta.value()?.parse::<Lit>()? {
                            Lit::Bool(flag) if flag.value => FileTag::Enabled,
                            Lit::Bool(_) => FileTag::Disabled,
                            Lit::Str(s) => file_tag(&s.value()),
                            other => {
                                return Err(syn::Error::new_spanned(
                                    other,
                                    "expected `file = true`, `file = false` or `file = \"_SUFFIX\"`",
                                ))
                            }
                        }
                    } else {
                        FileTag::Enabled
                    };
                    return Ok(());
                }

                if meta.path.is_ident("desc") {
                    attrs.desc = Some(string_value(&meta)?);
                    return Ok(());
                }

                if meta.path.is_ident("flatten") {
                    attrs.flatten = true;
                    return Ok(());
                }

                if meta.path.is_ident("deserializer") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    let path: Expr = lit.parse()?;
                    return set_strategy(Strategy::Deserializer(path));
                }

                if meta.path.is_ident("from_str") {
                    return set_strategy(Strategy::FromStr);
                }

                if meta.path.is_ident("from_bytes") {
                    return set_strategy(Strategy::FromBytes);
                }

                Err(meta.error("unsupported env attribute"))
            })?;
        }

        if attrs.flatten && !matches!(attrs.strategy, Strategy::Decode) {
            return Err(syn::Error::new_spanned(
                field,
                "`flatten` cannot be combined with a conversion attribute",
            ));
        }

        if attrs.desc.is_none() {
            attrs.desc = extract_doc_comment(field);
        }

        Ok(attrs)
    }
}

fn string_value(meta: &ParseNestedMeta) -> syn::Result<String> {
    let lit: syn::LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

/// Render a `default = ...` literal as text.
///
/// Strings are taken verbatim; numbers (optionally negated) and booleans use
/// their source spelling.
fn default_text(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => match lit {
            Lit::Str(s) => Ok(s.value()),
            Lit::Int(i) => Ok(i.base10_digits().to_string()),
            Lit::Float(f) => Ok(f.base10_digits().to_string()),
            Lit::Bool(b) => Ok(b.value.to_string()),
            other => Err(syn::Error::new_spanned(
                other,
                "default must be a string, number or bool literal",
            )),
        },
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr: inner,
            ..
        }) => match inner.as_ref() {
            Expr::Lit(ExprLit {
                lit: Lit::Int(_) | Lit::Float(_),
                ..
            }) => Ok(format!("-{}", default_text(inner)?)),
            other => Err(syn::Error::new_spanned(
                other,
                "only numeric literals can be negated in a default",
            )),
        },
        other => Err(syn::Error::new_spanned(
            other,
            "default must be a string, number or bool literal",
        )),
    }
}

/// A string `file` tag is a boolean token or a custom suffix.
fn file_tag(value: &str) -> FileTag {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => FileTag::Enabled,
        "0" | "f" | "F" | "FALSE" | "false" | "False" => FileTag::Disabled,
        suffix => FileTag::Suffix(suffix.to_string()),
    }
}

/// Join a field's `///` lines into a single description.
pub fn extract_doc_comment(field: &Field) -> Option<String> {
    let mut result = String::new();

    for attr in &field.attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }

        if let Meta::NameValue(meta) = &attr.meta {
            if let Expr::Lit(ExprLit {
                lit: Lit::Str(lit_str),
                ..
            }) = &meta.value
            {
                let line = lit_str.value();
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if !result.is_empty() {
                    result.push(' ');
                }
                result.push_str(line);
            }
        }
    }

    (!result.is_empty()).then_some(result)
}
