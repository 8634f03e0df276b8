//! Derive macros for quarry
//!
//! Provides `#[derive(Record)]` and `#[derive(FromRow)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod from_row;
mod record;

/// Derive `Record` and `BindArg` for a struct.
///
/// # Example
///
/// ```ignore
/// use quarry::Record;
///
/// #[derive(Record)]
/// struct User {
///     #[orm(pk, autoincr)]
///     id: i64,
///     #[orm(column = "email_address")]
///     email: Option<String>,
///     #[orm(skip)]
///     cached: Vec<u8>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(pk)]`, `#[orm(generated)]`, `#[orm(autoincr)]` - Column flags
/// - `#[orm(skip)]` - Leave the field out of the mapping
/// - `#[orm(rename_all = "...")]` on the struct - Case of default column names
///
/// Every mapped field must be `Clone` and convert into `quarry::Value`.
#[proc_macro_derive(Record, attributes(orm))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `FromRow` trait for a struct.
///
/// # Example
///
/// ```ignore
/// use quarry::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     username: String,
///     #[orm(column = "email_address")]
///     email: Option<String>,
/// }
/// ```
///
/// Accepts the same attributes as `Record`; skipped fields are filled with
/// `Default::default()`.
#[proc_macro_derive(FromRow, attributes(orm))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
