//! # rowbind-derive
//!
//! Procedural macros for rowbind member reflection and enum conversion.
//!
//! Rust has no runtime reflection, so the member list a type descriptor is
//! built from is generated at compile time by these derives.
//!
//! ## Available Macros
//!
//! - `#[derive(Reflect)]` - Describe a struct's fields and properties
//! - `#[derive(SqlEnum)]` - Convert an enum from variant names or discriminants
//!
//! ## Example
//!
//! ```rust,ignore
//! use rowbind::{Reflect, SqlEnum};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, SqlEnum)]
//! enum AccountType {
//!     Checking,
//!     Savings,
//!     MoneyMarket,
//! }
//!
//! #[derive(Default, Reflect)]
//! #[rowbind(property(name = "FullName", ty = "String", get = "full_name"))]
//! struct Customer {
//!     id: i32,
//!     #[rowbind(rename = "first_name")]
//!     first: String,
//!     account: AccountType,
//!     #[rowbind(skip)]
//!     cached: Option<String>,
//! }
//! ```

#![warn(missing_docs)]

use proc_macro::TokenStream;
use proc_macro2::{Literal, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Expr, ExprLit, ExprUnary, Fields, Ident, Lit, LitStr, Type, UnOp,
    parse_macro_input,
};

/// Field configuration extracted from attributes.
#[derive(Default)]
struct FieldConfig {
    /// Renamed member name.
    rename: Option<String>,
    /// Skip this field.
    skip: bool,
    /// Expose the field without a setter.
    readonly: bool,
}

/// A property declared at struct level.
struct PropertyConfig {
    name: LitStr,
    ty: Type,
    get: Option<Ident>,
    set: Option<Ident>,
}

/// Struct-level configuration extracted from attributes.
#[derive(Default)]
struct StructConfig {
    /// Type name used in place of the Rust identifier.
    type_name: Option<String>,
    /// Rename all fields using a casing convention.
    rename_all: Option<String>,
    /// The type has no usable name.
    anonymous: bool,
    /// Accessor-backed properties.
    properties: Vec<PropertyConfig>,
}

fn parse_string(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<LitStr> {
    let value: Expr = meta.value()?.parse()?;
    match value {
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) => Ok(lit),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

/// Parse rowbind attributes from a field or variant.
fn parse_field_config(attrs: &[Attribute]) -> syn::Result<FieldConfig> {
    let mut config = FieldConfig::default();

    for attr in attrs {
        if !attr.path().is_ident("rowbind") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                config.rename = Some(parse_string(&meta)?.value());
            } else if meta.path.is_ident("skip") {
                config.skip = true;
            } else if meta.path.is_ident("readonly") {
                config.readonly = true;
            } else {
                return Err(meta.error("unsupported rowbind field attribute"));
            }
            Ok(())
        })?;
    }

    Ok(config)
}

/// Parse struct-level rowbind attributes.
fn parse_struct_config(attrs: &[Attribute]) -> syn::Result<StructConfig> {
    let mut config = StructConfig::default();

    for attr in attrs {
        if !attr.path().is_ident("rowbind") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("type_name") {
                config.type_name = Some(parse_string(&meta)?.value());
            } else if meta.path.is_ident("rename_all") {
                config.rename_all = Some(parse_string(&meta)?.value());
            } else if meta.path.is_ident("anonymous") {
                config.anonymous = true;
            } else if meta.path.is_ident("property") {
                config.properties.push(parse_property(&meta)?);
            } else {
                return Err(meta.error("unsupported rowbind attribute"));
            }
            Ok(())
        })?;
    }

    Ok(config)
}

fn parse_property(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<PropertyConfig> {
    let mut name = None;
    let mut ty = None;
    let mut get = None;
    let mut set = None;

    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("name") {
            name = Some(parse_string(&inner)?);
        } else if inner.path.is_ident("ty") {
            ty = Some(parse_string(&inner)?.parse::<Type>()?);
        } else if inner.path.is_ident("get") {
            get = Some(parse_string(&inner)?.parse::<Ident>()?);
        } else if inner.path.is_ident("set") {
            set = Some(parse_string(&inner)?.parse::<Ident>()?);
        } else {
            return Err(inner.error("expected `name`, `ty`, `get` or `set`"));
        }
        Ok(())
    })?;

    let name = name.ok_or_else(|| meta.error("property requires `name`"))?;
    let ty = ty.ok_or_else(|| meta.error("property requires `ty`"))?;
    if get.is_none() && set.is_none() {
        return Err(meta.error("property requires `get`, `set` or both"));
    }

    Ok(PropertyConfig { name, ty, get, set })
}

/// Convert a field name to a member name based on rename_all setting.
fn apply_rename_all(name: &str, rename_all: Option<&str>) -> String {
    match rename_all {
        Some("snake_case") => to_snake_case(name),
        Some("camelCase") => to_camel_case(name),
        Some("PascalCase") => to_pascal_case(name),
        Some("SCREAMING_SNAKE_CASE") => to_screaming_snake_case(name),
        _ => name.to_string(),
    }
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn to_pascal_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = true;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

fn to_screaming_snake_case(s: &str) -> String {
    to_snake_case(s).to_uppercase()
}

/// Derive macro for implementing `Reflect`.
///
/// Named structs get one field member per struct field and one property
/// member per `property(...)` declaration. A single-field tuple struct is
/// treated as a wrapper around a scalar: it has no members and maps a
/// one-column row by converting into the wrapped type.
///
/// The type must also implement `Default`, which supplies the instance a row
/// is mapped onto.
///
/// ## Attributes
///
/// ### Field Attributes
///
/// - `#[rowbind(rename = "name")]` - Use a different member name
/// - `#[rowbind(skip)]` - Don't expose this field
/// - `#[rowbind(readonly)]` - Expose the field for reading only
///
/// ### Struct Attributes
///
/// - `#[rowbind(rename_all = "snake_case")]` - Apply naming convention to all fields
/// - `#[rowbind(type_name = "Customer")]` - Name used for default table names
/// - `#[rowbind(anonymous)]` - The type has no usable name
/// - `#[rowbind(property(name = "FullName", ty = "String", get = "full_name", set = "set_full_name"))]`
///   - Expose a getter/setter method pair as a property
///
/// ## Example
///
/// ```rust,ignore
/// #[derive(Default, Reflect)]
/// #[rowbind(rename_all = "PascalCase")]
/// struct Customer {
///     customer_id: i32,
///     #[rowbind(readonly)]
///     created: NaiveDateTime,
///     #[rowbind(skip)]
///     scratch: Vec<u8>,
/// }
///
/// #[derive(Default, Reflect)]
/// struct CustomerId(i32);
/// ```
#[proc_macro_derive(Reflect, attributes(rowbind))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match impl_reflect(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn impl_reflect(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let struct_config = parse_struct_config(&input.attrs)?;
    let type_name = struct_config
        .type_name
        .clone()
        .unwrap_or_else(|| name.to_string());
    let anonymous = struct_config.anonymous;

    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Reflect can only be derived for structs",
            ));
        }
    };

    let fields = match &data.fields {
        Fields::Named(fields) => &fields.named,
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
            let inner = &fields.unnamed[0].ty;
            return Ok(quote! {
                impl #impl_generics rowbind::Reflect for #name #ty_generics #where_clause {
                    fn type_name() -> &'static str {
                        #type_name
                    }

                    fn is_anonymous() -> bool {
                        #anonymous
                    }

                    fn from_scalar(
                        value: &rowbind::SqlValue,
                    ) -> ::std::result::Result<Self, rowbind::TypeError> {
                        <#inner as rowbind::Reflect>::from_scalar(value).map(Self)
                    }
                }
            });
        }
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Reflect can only be derived for structs with named fields or a single unnamed field",
            ));
        }
    };

    let mut members = Vec::new();

    for property in &struct_config.properties {
        let member_name = &property.name;
        let ty = &property.ty;
        let member = match (&property.get, &property.set) {
            (Some(get), Some(set)) => quote! {
                rowbind::MemberDescriptor::property::<Self, #ty>(
                    #member_name,
                    |o| o.#get(),
                    |o, v| o.#set(v),
                )
            },
            (Some(get), None) => quote! {
                rowbind::MemberDescriptor::readonly_property::<Self, #ty>(#member_name, |o| o.#get())
            },
            (None, Some(set)) => quote! {
                rowbind::MemberDescriptor::writeonly_property::<Self, #ty>(#member_name, |o, v| o.#set(v))
            },
            (None, None) => continue,
        };
        members.push(member);
    }

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_type = &field.ty;
        let config = parse_field_config(&field.attrs)?;

        if config.skip {
            continue;
        }

        let raw_name = field_name.to_string();
        let raw_name = raw_name.strip_prefix("r#").unwrap_or(&raw_name);
        let member_name = config.rename.unwrap_or_else(|| {
            apply_rename_all(raw_name, struct_config.rename_all.as_deref())
        });

        if config.readonly {
            members.push(quote! {
                rowbind::MemberDescriptor::readonly_field::<Self, #field_type>(
                    #member_name,
                    |o| &o.#field_name,
                )
            });
        } else {
            members.push(quote! {
                rowbind::MemberDescriptor::field::<Self, #field_type>(
                    #member_name,
                    |o| &o.#field_name,
                    |o| &mut o.#field_name,
                )
            });
        }
    }

    Ok(quote! {
        impl #impl_generics rowbind::Reflect for #name #ty_generics #where_clause {
            fn type_name() -> &'static str {
                #type_name
            }

            fn is_anonymous() -> bool {
                #anonymous
            }

            fn reflect_members() -> ::std::vec::Vec<rowbind::MemberDescriptor> {
                ::std::vec![
                    #(#members),*
                ]
            }
        }
    })
}

/// Derive macro for implementing `SqlEnum`.
///
/// Only unit variants are supported. Discriminants follow Rust's rules:
/// explicit integer values where given, otherwise one more than the previous
/// variant.
///
/// Besides `SqlEnum`, the derive implements `FromSql`, `ToSql`, `SqlType`,
/// `Reflect` and `Default` (the first variant, which is also what NULL maps
/// to for a non-nullable member).
///
/// ## Attributes
///
/// - `#[rowbind(type_name = "AccountType")]` - Enum name used in errors
/// - `#[rowbind(rename = "MM")]` on a variant - Accept a different literal
///
/// ## Example
///
/// ```rust,ignore
/// #[derive(Debug, Clone, Copy, PartialEq, SqlEnum)]
/// enum AccountType {
///     Checking,
///     Savings,
///     MoneyMarket = 5,
/// }
///
/// let account: AccountType = rowbind::convert_to(&SqlValue::from("savings"))?;
/// ```
#[proc_macro_derive(SqlEnum, attributes(rowbind))]
pub fn derive_sql_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match impl_sql_enum(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Evaluate an explicit discriminant, accepting integer literals and their negation.
fn discriminant_value(expr: &Expr) -> syn::Result<i64> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(lit), ..
        }) => lit.base10_parse::<i64>(),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => discriminant_value(expr).map(|v| -v),
        Expr::Group(group) => discriminant_value(&group.expr),
        Expr::Paren(paren) => discriminant_value(&paren.expr),
        other => Err(syn::Error::new_spanned(
            other,
            "SqlEnum discriminants must be integer literals",
        )),
    }
}

fn impl_sql_enum(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let struct_config = parse_struct_config(&input.attrs)?;
    let enum_name = struct_config
        .type_name
        .unwrap_or_else(|| name.to_string());

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "SqlEnum cannot be derived for generic enums",
        ));
    }

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "SqlEnum can only be derived for enums",
            ));
        }
    };

    let mut idents = Vec::new();
    let mut names = Vec::new();
    let mut discriminants = Vec::new();
    let mut next = 0i64;

    for variant in variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "SqlEnum variants cannot carry data",
            ));
        }

        let value = match &variant.discriminant {
            Some((_, expr)) => discriminant_value(expr)?,
            None => next,
        };
        next = value.wrapping_add(1);

        let config = parse_field_config(&variant.attrs)?;
        idents.push(&variant.ident);
        names.push(config.rename.unwrap_or_else(|| variant.ident.to_string()));
        discriminants.push(Literal::i64_suffixed(value));
    }

    let Some(first) = idents.first().copied() else {
        return Err(syn::Error::new_spanned(
            input,
            "SqlEnum requires at least one variant",
        ));
    };

    Ok(quote! {
        impl rowbind::SqlEnum for #name {
            fn enum_info() -> &'static rowbind::EnumInfo {
                static INFO: rowbind::EnumInfo = rowbind::EnumInfo {
                    name: #enum_name,
                    variants: &[#((#names, #discriminants)),*],
                };
                &INFO
            }

            fn from_discriminant(discriminant: i64) -> ::std::option::Option<Self> {
                match discriminant {
                    #(#discriminants => ::std::option::Option::Some(Self::#idents),)*
                    _ => ::std::option::Option::None,
                }
            }

            fn discriminant(&self) -> i64 {
                match self {
                    #(Self::#idents => #discriminants,)*
                }
            }
        }

        impl ::std::default::Default for #name {
            fn default() -> Self {
                Self::#first
            }
        }

        impl rowbind::FromSql for #name {
            fn from_sql(
                value: &rowbind::SqlValue,
            ) -> ::std::result::Result<Self, rowbind::TypeError> {
                let info = <Self as rowbind::SqlEnum>::enum_info();
                let discriminant = rowbind::convert_enum(value, info)?;
                <Self as rowbind::SqlEnum>::from_discriminant(discriminant).ok_or_else(|| {
                    rowbind::TypeError::InvalidEnum {
                        value: value.to_string(),
                        enum_name: info.name,
                    }
                })
            }
        }

        impl rowbind::ToSql for #name {
            fn to_sql(&self) -> ::std::result::Result<rowbind::SqlValue, rowbind::TypeError> {
                ::std::result::Result::Ok(rowbind::SqlValue::BigInt(
                    <Self as rowbind::SqlEnum>::discriminant(self),
                ))
            }
        }

        impl rowbind::SqlType for #name {
            fn declared_type() -> rowbind::DeclaredType {
                let info = <Self as rowbind::SqlEnum>::enum_info();
                rowbind::DeclaredType::new(info.name, rowbind::TypeKind::Enum(info))
            }
        }

        impl rowbind::Reflect for #name {
            fn type_name() -> &'static str {
                <Self as rowbind::SqlEnum>::enum_info().name
            }

            fn scalar_type() -> ::std::option::Option<rowbind::DeclaredType> {
                ::std::option::Option::Some(<Self as rowbind::SqlType>::declared_type())
            }

            fn from_scalar(
                value: &rowbind::SqlValue,
            ) -> ::std::result::Result<Self, rowbind::TypeError> {
                rowbind::convert_to::<Self>(value)
            }
        }
    })
}
