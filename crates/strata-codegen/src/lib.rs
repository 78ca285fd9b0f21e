// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DataEnum, DeriveInput, Fields, Generics,
    Ident, LitStr, Type,
};

/// Container options: `#[strata(default, name = "...")]`.
#[derive(Default)]
struct ContainerAttrs {
    default: bool,
    name: Option<String>,
}

/// Field/variant options: `#[strata(skip, base, rename = "...")]`.
#[derive(Default)]
struct MemberAttrs {
    skip: bool,
    base: bool,
    rename: Option<String>,
}

fn container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut out = ContainerAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("strata")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                out.default = true;
                Ok(())
            } else if meta.path.is_ident("name") {
                out.name = Some(meta.value()?.parse::<LitStr>()?.value());
                Ok(())
            } else {
                Err(meta.error("expected `default` or `name = \"...\"`"))
            }
        })?;
    }
    Ok(out)
}

fn member_attrs(attrs: &[Attribute]) -> syn::Result<MemberAttrs> {
    let mut out = MemberAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("strata")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                out.skip = true;
                Ok(())
            } else if meta.path.is_ident("base") {
                out.base = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                out.rename = Some(meta.value()?.parse::<LitStr>()?.value());
                Ok(())
            } else {
                Err(meta.error("expected `skip`, `base` or `rename = \"...\"`"))
            }
        })?;
    }
    Ok(out)
}

/// `#[derive(Reflect)]` macro: generates the `strata::reflect::Reflect` impl
///
/// Supports:
/// - Structs with named fields, and unit structs
/// - Unit-only enums (encoded by variant name)
///
/// Attributes:
/// - `#[strata(default)]` on a struct: decode through `Default::default()`
///   and field assignment. Without it the type is built positionally from
///   its members, skipped fields taking `Default::default()`.
/// - `#[strata(name = "...")]` on a struct or enum: name used for tags.
/// - `#[strata(skip)]` on a field: not a member.
/// - `#[strata(base)]` on a field: embedded ancestor, its members follow
///   the type's own.
/// - `#[strata(rename = "...")]` on a field or variant.
///
/// Example:
/// ```ignore
/// use strata::Reflect;
///
/// #[derive(Reflect, Default)]
/// #[strata(default)]
/// struct Pose {
///     x: f64,
///     y: f64,
///     #[strata(rename = "theta")]
///     heading: f64,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(strata))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let expanded = match &input.data {
        Data::Struct(data) => expand_struct(&input, &data.fields),
        Data::Enum(data) => expand_enum(&input, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input,
            "Reflect cannot be derived for unions",
        )),
    };
    expanded
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Name literal: explicit, `type_name` for generic types, else module path.
fn type_name_tokens(input: &DeriveInput, explicit: Option<String>) -> TokenStream2 {
    let ident = &input.ident;
    match explicit {
        Some(name) => quote!(#name),
        None if input.generics.params.is_empty() => {
            let short = ident.to_string();
            quote!(::core::concat!(::core::module_path!(), "::", #short))
        }
        None => quote!(::std::any::type_name::<Self>()),
    }
}

/// Every type parameter must itself be reflected.
fn add_bounds(mut generics: Generics) -> Generics {
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(::strata::reflect::Reflect));
    }
    generics
}

struct MemberField {
    ident: Ident,
    ty: Type,
    name: String,
}

fn expand_struct(input: &DeriveInput, fields: &Fields) -> syn::Result<TokenStream2> {
    let attrs = container_attrs(&input.attrs)?;
    let ident = &input.ident;

    let mut members = Vec::new();
    let mut bases = Vec::new();
    let mut skipped = Vec::new();
    match fields {
        Fields::Named(named) => {
            for field in &named.named {
                let Some(field_ident) = field.ident.clone() else {
                    return Err(syn::Error::new_spanned(field, "Field must have a name"));
                };
                let opts = member_attrs(&field.attrs)?;
                if opts.skip {
                    skipped.push(field_ident);
                } else if opts.base {
                    if opts.rename.is_some() {
                        return Err(syn::Error::new_spanned(
                            field,
                            "a base field cannot be renamed",
                        ));
                    }
                    bases.push((field_ident, field.ty.clone()));
                } else {
                    let name = opts.rename.unwrap_or_else(|| field_ident.to_string());
                    members.push(MemberField {
                        ident: field_ident,
                        ty: field.ty.clone(),
                        name,
                    });
                }
            }
        }
        Fields::Unit => {}
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Only named fields are supported",
            ))
        }
    }

    let member_calls = members.iter().map(|m| {
        let (f, ty, name) = (&m.ident, &m.ty, &m.name);
        quote! {
            .member(::strata::reflect::MemberInfo::field::<Self, #ty>(
                #name,
                |o| &o.#f,
                |o| &mut o.#f,
            ))
        }
    });
    let base_calls = bases.iter().map(|(f, ty)| {
        quote! {
            .base(::strata::reflect::BaseInfo::field::<Self, #ty>(
                |o| &o.#f,
                |o| &mut o.#f,
            ))
        }
    });

    let construction = if attrs.default {
        quote!(.default_constructor::<Self>())
    } else if !bases.is_empty() {
        // Positional construction cannot address inherited members.
        quote!()
    } else {
        let param_types = members.iter().map(|m| &m.ty);
        let body = match fields {
            Fields::Unit => quote!(Self),
            _ => {
                let assigned = members.iter().map(|m| {
                    let (f, ty) = (&m.ident, &m.ty);
                    quote!(#f: ::strata::reflect::take_arg::<#ty>(&mut args)?)
                });
                let defaulted = skipped
                    .iter()
                    .map(|f| quote!(#f: ::core::default::Default::default()));
                quote!(Self { #(#assigned,)* #(#defaulted,)* })
            }
        };
        quote! {
            .constructor(::strata::reflect::Constructor::new(
                ::std::vec![#(::strata::reflect::TypeRef::of::<#param_types>()),*],
                |args| {
                    #[allow(unused_mut, unused_variables)]
                    let mut args = args.into_iter();
                    ::core::result::Result::Ok(
                        ::std::boxed::Box::new(#body) as ::std::boxed::Box<dyn ::std::any::Any>
                    )
                },
            ))
        }
    };

    let type_name = type_name_tokens(input, attrs.name);
    let generics = add_bounds(input.generics.clone());
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::strata::reflect::Reflect for #ident #ty_generics #where_clause {
            fn type_info() -> ::strata::reflect::TypeInfo {
                ::strata::reflect::TypeInfo::new(
                    #type_name,
                    ::strata::reflect::Shape::Object(
                        ::strata::reflect::ObjectInfo::new()
                            #(#member_calls)*
                            #(#base_calls)*
                            #construction
                    ),
                )
            }
        }
    })
}

fn expand_enum(input: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream2> {
    let attrs = container_attrs(&input.attrs)?;
    if attrs.default {
        return Err(syn::Error::new_spanned(
            input,
            "`default` applies to structs only",
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Reflect cannot be derived for generic enums",
        ));
    }
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            input,
            "Reflect cannot be derived for an enum without variants",
        ));
    }
    let ident = &input.ident;

    let mut names = Vec::new();
    let mut idents = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Only unit variants are supported",
            ));
        }
        let opts = member_attrs(&variant.attrs)?;
        if opts.skip || opts.base {
            return Err(syn::Error::new_spanned(
                variant,
                "variants accept only `rename`",
            ));
        }
        names.push(opts.rename.unwrap_or_else(|| variant.ident.to_string()));
        idents.push(variant.ident.clone());
    }
    let ordinals: Vec<usize> = (0..idents.len()).collect();
    let type_name = type_name_tokens(input, attrs.name);

    Ok(quote! {
        impl ::strata::reflect::Reflect for #ident {
            fn type_info() -> ::strata::reflect::TypeInfo {
                ::strata::reflect::TypeInfo::new(
                    #type_name,
                    ::strata::reflect::Shape::Enum(::strata::reflect::EnumInfo::of::<Self>(
                        ::std::vec![#(#names),*],
                        |v| match v {
                            #(Self::#idents => #ordinals,)*
                        },
                        |i| match i {
                            #(#ordinals => ::core::option::Option::Some(Self::#idents),)*
                            _ => ::core::option::Option::None,
                        },
                    )),
                )
            }
        }
    })
}
