//! FromRow derive macro implementation

use crate::attrs::{mapped_fields, option_inner};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let field_extracts: Vec<_> = mapped_fields(&input, "FromRow")?
        .iter()
        .map(|f| {
            let ident = f.ident;
            let column = &f.column;
            if f.attr.skip {
                return quote! { #ident: ::core::default::Default::default() };
            }
            // Option fields read a missing column as None.
            match option_inner(f.ty) {
                Some(inner) => quote! { #ident: row.get_opt::<#inner>(#column)? },
                None => {
                    let ty = f.ty;
                    quote! { #ident: row.get::<#ty>(#column)? }
                }
            }
        })
        .collect();

    Ok(quote! {
        impl #impl_generics ::quarry::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &::quarry::Row) -> ::quarry::QuarryResult<Self> {
                Ok(Self {
                    #(#field_extracts),*
                })
            }
        }
    })
}
