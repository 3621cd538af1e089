//! Derive macro implementation for envbind

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DataStruct, DeriveInput, Field, Fields, Type};

mod attrs;

use attrs::{ContainerAttrs, FieldAttrs, FileTag, Strategy};

/// Extract inner type from `Option<T>`
fn option_inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let seg = type_path.path.segments.last()?;
    if seg.ident != "Option" {
        return None;
    }
    match &seg.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(syn::GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

/// `Specification` derive macro
///
/// Implements `envbind::Specification` and `envbind::Decode` for a struct with
/// named fields. Every field type must implement `envbind::Decode` unless a
/// conversion attribute says otherwise; fields whose type also derives
/// `Specification` are walked as nested specifications.
///
/// # Supported Attributes
///
/// **Struct-level**:
/// - `#[env(prefix = "APP")]`: Prefix used by `from_env()`
///
/// **Field-level**:
/// - `#[env(ignored)]`: Skip the field
/// - `#[env(name = "KEY")]`: Explicit key
/// - `#[env(split_words)]`: Split the identifier at capitalization boundaries
/// - `#[env(required)]`: Fail when no value resolves
/// - `#[env(default = value)]`: String, number or bool literal used as fallback
/// - `#[env(file)]`, `#[env(file = false)]`, `#[env(file = "_SUFFIX")]`: File indirection
/// - `#[env(desc = "...")]`: Usage description (defaults to the doc comment)
/// - `#[env(flatten)]`: Walk a nested specification without adding its key to the prefix
/// - `#[env(deserializer = "path")]`: Convert with `fn(&str) -> Result<T, E>`
/// - `#[env(from_str)]`: Convert with `FromStr`
/// - `#[env(from_bytes)]`: Convert with `TryFrom<Vec<u8>>`
///
/// # Example
///
/// See the `envbind` crate documentation for usage examples.
#[proc_macro_derive(Specification, attributes(env))]
pub fn derive_specification(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let container = ContainerAttrs::from_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(named),
            ..
        }) => &named.named,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "invalid specification: `Specification` can only be derived for structs with named fields",
            ));
        }
    };

    let visits = fields
        .iter()
        .map(expand_field)
        .collect::<syn::Result<Vec<_>>>()?;

    let options = container.prefix.map(|prefix| {
        quote! {
            fn options() -> ::envbind::Options {
                ::envbind::Options::new().with_prefix(#prefix)
            }
        }
    });

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::envbind::Specification for #ident #ty_generics #where_clause {
            fn gather<'__envbind>(
                &'__envbind mut self,
                __opts: &::envbind::Options,
                __vars: &mut ::std::vec::Vec<::envbind::Variable<'__envbind>>,
            ) -> ::std::result::Result<(), ::envbind::EnvError> {
                #(#visits)*
                ::std::result::Result::Ok(())
            }

            #options
        }

        impl #impl_generics ::envbind::Decode for #ident #ty_generics #where_clause {
            fn decode(&mut self, _value: &str) -> ::std::result::Result<(), ::envbind::BoxError> {
                ::std::result::Result::Err(::std::boxed::Box::new(
                    ::envbind::EnvError::InvalidSpecification {
                        type_name: ::std::any::type_name::<Self>(),
                    },
                ))
            }

            fn slot(&mut self) -> ::envbind::Slot<'_> {
                ::envbind::Slot::Nested(self)
            }

            fn is_nested() -> bool {
                true
            }
        }
    })
}

fn optional_str(value: Option<&str>) -> TokenStream2 {
    match value {
        Some(value) => quote!(::std::option::Option::Some(#value)),
        None => quote!(::std::option::Option::None),
    }
}

/// Generate the `visit` call registering one field.
fn expand_field(field: &Field) -> syn::Result<TokenStream2> {
    let attrs = FieldAttrs::from_field(field)?;
    if attrs.ignored {
        return Ok(TokenStream2::new());
    }

    let Some(ident) = field.ident.as_ref() else {
        return Err(syn::Error::new_spanned(field, "expected a named field"));
    };
    let ty = &field.ty;

    let name = ident.unraw().to_string();
    let key = optional_str(attrs.name.as_deref());
    let default = optional_str(attrs.default.as_deref());
    let description = optional_str(attrs.desc.as_deref());
    let split_words = attrs.split_words;
    let required = attrs.required;
    let flatten = attrs.flatten;
    let file = match &attrs.file {
        FileTag::Inherit => quote!(::envbind::FileLoading::Inherit),
        FileTag::Enabled => quote!(::envbind::FileLoading::Enabled),
        FileTag::Disabled => quote!(::envbind::FileLoading::Disabled),
        FileTag::Suffix(suffix) => quote!(::envbind::FileLoading::Suffix(#suffix)),
    };

    let meta = quote! {
        ::envbind::FieldMeta {
            name: #name,
            key: #key,
            split_words: #split_words,
            required: #required,
            default: #default,
            file: #file,
            description: #description,
            flatten: #flatten,
        }
    };

    // Adapters on `Option<T>` convert into `T` and wrap the result in `Some`.
    let inner = option_inner_type(ty);
    let described = inner.unwrap_or(ty);
    let wrap = inner.map(|_| quote!(.map(::std::option::Option::Some)));

    let adapter = match (&attrs.strategy, inner) {
        (Strategy::Decode, _) => {
            return Ok(quote! {
                ::envbind::walk::visit(&mut self.#ident, #meta, __opts, __vars)?;
            });
        }
        (Strategy::Deserializer(path), _) => quote! {
            ::envbind::adapt::WithFn::new(&mut self.#ident, |__value: &str| (#path)(__value) #wrap)
        },
        (Strategy::FromStr, None) => quote! {
            ::envbind::adapt::Text::new(&mut self.#ident)
        },
        (Strategy::FromStr, Some(inner)) => quote! {
            ::envbind::adapt::WithFn::new(&mut self.#ident, |__value: &str| {
                <#inner as ::std::str::FromStr>::from_str(__value) #wrap
            })
        },
        (Strategy::FromBytes, None) => quote! {
            ::envbind::adapt::Bytes::new(&mut self.#ident)
        },
        (Strategy::FromBytes, Some(inner)) => quote! {
            ::envbind::adapt::WithFn::new(&mut self.#ident, |__value: &str| {
                <#inner as ::std::convert::TryFrom<::std::vec::Vec<u8>>>::try_from(__value.as_bytes().to_vec()) #wrap
            })
        },
    };

    Ok(quote! {
        ::envbind::walk::visit_with::<#described>(
            ::std::boxed::Box::new(#adapter),
            #meta,
            __opts,
            __vars,
        )?;
    })
}
