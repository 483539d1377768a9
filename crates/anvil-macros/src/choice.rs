//! `#[derive(CommandChoice)]` implementation.
//!
//! # Enum-level attributes `#[choice(...)]`
//!
//! | Key | Example | Description |
//! |-----|---------|-------------|
//! | `crate` | `"anvil::core"` | Path to the core crate (default `::anvil_core`) |
//!
//! # Variant-level attributes `#[choice(...)]`
//!
//! | Key | Example | Description |
//! |-----|---------|-------------|
//! | `name` | `"Heads up"` | Canonical name (default: the variant identifier) |

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Path, spanned::Spanned};

// ============================================================================
// Entry point
// ============================================================================

pub fn derive_command_choice(input: &DeriveInput) -> syn::Result<TokenStream> {
    let data = match &input.data {
        Data::Enum(data) => data,
        Data::Struct(_) => {
            return Err(syn::Error::new(
                input.span(),
                "CommandChoice can only be derived for enums",
            ));
        }
        Data::Union(_) => {
            return Err(syn::Error::new(
                input.span(),
                "CommandChoice cannot be derived for unions",
            ));
        }
    };

    if data.variants.is_empty() {
        return Err(syn::Error::new(
            input.span(),
            "CommandChoice requires at least one variant",
        ));
    }

    let krate = parse_crate_path(&input.attrs)?;
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut members = Vec::with_capacity(data.variants.len());
    let mut arms = Vec::with_capacity(data.variants.len());

    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "CommandChoice variants must not have fields",
            ));
        }

        let ident = &variant.ident;
        let label = parse_variant_name(&variant.attrs)?.unwrap_or_else(|| ident.to_string());

        members.push(quote! { Self::#ident });
        arms.push(quote! { Self::#ident => #label });
    }

    Ok(quote! {
        impl #impl_generics #krate::CommandChoice for #name #ty_generics #where_clause {
            fn members() -> ::std::vec::Vec<Self> {
                ::std::vec![#(#members),*]
            }

            fn canonical_name(&self) -> &'static str {
                match self {
                    #(#arms),*
                }
            }
        }
    })
}

// ============================================================================
// Attribute parsing
// ============================================================================

fn parse_crate_path(attrs: &[Attribute]) -> syn::Result<TokenStream> {
    let mut path: Option<Path> = None;

    for attr in attrs.iter().filter(|a| a.path().is_ident("choice")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                path = Some(meta.value()?.parse::<LitStr>()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unknown #[choice] key, expected `crate`"))
            }
        })?;
    }

    Ok(match path {
        Some(path) => quote! { #path },
        None => quote! { ::anvil_core },
    })
}

fn parse_variant_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;

    for attr in attrs.iter().filter(|a| a.path().is_ident("choice")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = Some(meta.value()?.parse::<LitStr>()?.value());
                Ok(())
            } else {
                Err(meta.error("unknown #[choice] key, expected `name`"))
            }
        })?;
    }

    Ok(name)
}
