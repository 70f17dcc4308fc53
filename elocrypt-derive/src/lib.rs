//! Derive macros for `elocrypt`.
//!
//! This crate provides `#[derive(Encryptable)]`, which turns `#[encrypted]`
//! field markers into the static allow-list read by the classifier.

#![warn(clippy::pedantic, clippy::nursery)]

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Meta};

/// Derive macro listing the encrypted fields of a record type.
///
/// # Example
///
/// ```rust,ignore
/// use elocrypt::classifier::{Encryptable, FieldConfig};
/// use elocrypt_derive::Encryptable;
///
/// #[derive(Encryptable)]
/// struct User {
///     name: String,
///     #[encrypted]
///     email: String,
///     #[encrypted(rename = "ssn")]
///     social_security_number: String,
/// }
///
/// assert_eq!(User::ENCRYPTED_FIELDS, &["email", "ssn"]);
/// let config = FieldConfig::of::<User>();
/// ```
#[proc_macro_derive(Encryptable, attributes(encrypted))]
pub fn derive_encryptable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input).unwrap_or_else(syn::Error::into_compile_error).into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Encryptable can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Encryptable requires a struct with named fields",
        ));
    };

    let mut names = Vec::new();
    for field in &fields.named {
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("encrypted")) {
            let mut name = field.ident.as_ref().map(|ident| ident.unraw().to_string());

            if !matches!(attr.meta, Meta::Path(_)) {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        let lit: LitStr = meta.value()?.parse()?;
                        name = Some(lit.value());
                        Ok(())
                    } else {
                        Err(meta.error("unsupported encrypted attribute, expected `rename`"))
                    }
                })?;
            }

            if let Some(name) = name {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::elocrypt::classifier::Encryptable
            for #ident #ty_generics #where_clause
        {
            const ENCRYPTED_FIELDS: &'static [&'static str] = &[#(#names),*];
        }
    })
}
