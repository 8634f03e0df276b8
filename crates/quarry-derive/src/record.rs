//! Record derive macro implementation

use crate::attrs::mapped_fields;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields: Vec<_> = mapped_fields(&input, "Record")?
        .into_iter()
        .filter(|f| !f.attr.skip)
        .collect();

    let columns = fields.iter().map(|f| {
        let column = &f.column;
        let mut col = quote! { ::quarry::Column::new(#column) };
        if f.attr.pk {
            col = quote! { #col.pk() };
        }
        if f.attr.generated {
            col = quote! { #col.generated() };
        }
        if f.attr.autoincr {
            col = quote! { #col.autoincr() };
        }
        col
    });

    let reads = fields.iter().enumerate().map(|(index, f)| {
        let ident = f.ident;
        quote! {
            #index => ::quarry::Value::from(::core::clone::Clone::clone(&self.#ident))
        }
    });

    Ok(quote! {
        impl #impl_generics ::quarry::Record for #name #ty_generics #where_clause {
            fn columns() -> &'static [::quarry::Column] {
                const COLUMNS: &[::quarry::Column] = &[#(#columns),*];
                COLUMNS
            }

            fn field_value(&self, index: usize) -> ::quarry::Value {
                match index {
                    #(#reads,)*
                    _ => ::quarry::Value::Null,
                }
            }
        }

        impl #impl_generics ::quarry::BindArg for #name #ty_generics #where_clause {
            fn shape() -> ::quarry::BindShape {
                ::quarry::record_shape::<Self>()
            }

            fn field(&self, index: usize) -> ::quarry::Value {
                <Self as ::quarry::Record>::field_value(self, index)
            }
        }
    })
}
