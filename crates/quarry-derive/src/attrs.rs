//! Attribute parsing shared by `Record` and `FromRow`.
//!
//! Field level: `#[orm(column = "name", pk, generated, autoincr, skip)]`.
//! Struct level: `#[orm(rename_all = "camelCase")]`.

use heck::{ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use syn::{Data, DeriveInput, Fields, Result};

/// Parsed `#[orm(...)]` flags of one field.
#[derive(Default)]
pub(crate) struct FieldAttr {
    pub column: Option<String>,
    pub pk: bool,
    pub generated: bool,
    pub autoincr: bool,
    pub skip: bool,
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            match ident.to_string().as_str() {
                "pk" => attr.pk = true,
                "generated" => attr.generated = true,
                "autoincr" => attr.autoincr = true,
                "skip" => attr.skip = true,
                "column" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: syn::LitStr = input.parse()?;
                    attr.column = Some(value.value());
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown orm attribute `{other}`"),
                    ));
                }
            }

            if input.is_empty() {
                break;
            }
            let _: syn::Token![,] = input.parse()?;
        }

        Ok(attr)
    }
}

/// Merge every `#[orm(...)]` on `field`.
pub(crate) fn field_attr(field: &syn::Field) -> Result<FieldAttr> {
    let mut merged = FieldAttr::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        let parsed: FieldAttr = attr.parse_args()?;
        merged.pk |= parsed.pk;
        merged.generated |= parsed.generated;
        merged.autoincr |= parsed.autoincr;
        merged.skip |= parsed.skip;
        if parsed.column.is_some() {
            merged.column = parsed.column;
        }
    }
    Ok(merged)
}

/// Case conversion applied to field names without an explicit column.
#[derive(Clone, Copy, Default)]
pub(crate) enum RenameAll {
    #[default]
    None,
    Snake,
    Camel,
    Pascal,
    Kebab,
    ScreamingSnake,
}

impl RenameAll {
    fn apply(self, name: &str) -> String {
        match self {
            RenameAll::None => name.to_string(),
            RenameAll::Snake => name.to_snake_case(),
            RenameAll::Camel => name.to_lower_camel_case(),
            RenameAll::Pascal => name.to_upper_camel_case(),
            RenameAll::Kebab => name.to_kebab_case(),
            RenameAll::ScreamingSnake => name.to_shouty_snake_case(),
        }
    }
}

/// Read `#[orm(rename_all = "...")]` from the struct.
pub(crate) fn rename_all(input: &DeriveInput) -> Result<RenameAll> {
    for attr in &input.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        let nested = attr.parse_args::<syn::MetaNameValue>()?;
        if !nested.path.is_ident("rename_all") {
            return Err(syn::Error::new_spanned(
                &nested.path,
                "expected `rename_all = \"...\"`",
            ));
        }
        let syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(lit),
            ..
        }) = &nested.value
        else {
            return Err(syn::Error::new_spanned(&nested.value, "expected a string"));
        };
        return match lit.value().as_str() {
            "snake_case" => Ok(RenameAll::Snake),
            "camelCase" => Ok(RenameAll::Camel),
            "PascalCase" => Ok(RenameAll::Pascal),
            "kebab-case" => Ok(RenameAll::Kebab),
            "SCREAMING_SNAKE_CASE" => Ok(RenameAll::ScreamingSnake),
            other => Err(syn::Error::new_spanned(
                lit,
                format!("unsupported rename_all value `{other}`"),
            )),
        };
    }
    Ok(RenameAll::None)
}

/// One named field with its resolved column.
pub(crate) struct MappedField<'a> {
    pub ident: &'a syn::Ident,
    pub ty: &'a syn::Type,
    pub column: String,
    pub attr: FieldAttr,
}

/// The named fields of a struct, with columns resolved.
pub(crate) fn mapped_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> Result<Vec<MappedField<'a>>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    format!("{derive} can only be derived for structs with named fields"),
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                format!("{derive} can only be derived for structs"),
            ));
        }
    };

    let rename = rename_all(input)?;
    fields
        .iter()
        .map(|field| {
            let ident = field
                .ident
                .as_ref()
                .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
            let attr = field_attr(field)?;
            let column = attr
                .column
                .clone()
                .unwrap_or_else(|| rename.apply(&ident.to_string()));
            Ok(MappedField {
                ident,
                ty: &field.ty,
                column,
                attr,
            })
        })
        .collect()
}

/// `T` when `ty` is `Option<T>`.
pub(crate) fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    let seg = type_path.path.segments.last()?;
    if seg.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    let syn::GenericArgument::Type(inner) = args.args.first()? else {
        return None;
    };
    Some(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn parses_flags_and_column() {
        let attr: FieldAttr = syn::parse_quote!(column = "user_id", pk, autoincr);
        assert_eq!(attr.column.as_deref(), Some("user_id"));
        assert!(attr.pk && attr.autoincr);
        assert!(!attr.generated && !attr.skip);
    }

    #[test]
    fn rename_all_applies_to_unannotated_fields() {
        let input: DeriveInput = parse_quote! {
            #[orm(rename_all = "camelCase")]
            struct User {
                user_id: i64,
                #[orm(column = "mail")]
                email_address: String,
            }
        };
        let fields = mapped_fields(&input, "Record").unwrap();
        assert_eq!(fields[0].column, "userId");
        assert_eq!(fields[1].column, "mail");
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let field: syn::Field = parse_quote!(#[orm(primary)] id: i64);
        assert!(field_attr(&field).is_err());
    }

    #[test]
    fn option_inner_detects_options() {
        let ty: syn::Type = parse_quote!(Option<String>);
        assert!(option_inner(&ty).is_some());
        let ty: syn::Type = parse_quote!(String);
        assert!(option_inner(&ty).is_none());
    }
}
