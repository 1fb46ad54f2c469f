//! Attribute parsing for compact derive macros.

use proc_macro2::Span;
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{
    Attribute, DeriveInput, Expr, ExprLit, ExprUnary, Field, Fields, GenericArgument, Ident, Lit,
    PathArguments, Result, Type, UnOp,
};

/// Parsed field attributes from #[compact(...)]
#[derive(Default)]
pub struct FieldAttrs {
    /// The field id (required unless skipped).
    pub id: Option<i16>,
    /// Whether to leave this field off the wire entirely.
    pub skip: bool,
    /// Whether to use Default::default() for missing fields.
    pub use_default: bool,
    /// Whether a `Vec<u8>` is written as binary rather than list<byte>.
    pub binary: bool,
}

impl FieldAttrs {
    /// Parse attributes from a field.
    pub fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut result = FieldAttrs::default();

        for attr in attrs {
            if attr.path().is_ident("compact") {
                result.parse_compact_attr(attr)?;
            }
        }

        Ok(result)
    }

    fn parse_compact_attr(&mut self, attr: &Attribute) -> Result<()> {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                let value: Expr = meta.value()?.parse()?;
                self.id = Some(parse_id(&value)?);
            } else if meta.path.is_ident("skip") {
                self.skip = true;
            } else if meta.path.is_ident("default") {
                self.use_default = true;
            } else if meta.path.is_ident("binary") {
                self.binary = true;
            } else {
                return Err(syn::Error::new_spanned(
                    meta.path,
                    "unknown compact attribute",
                ));
            }
            Ok(())
        })
    }
}

/// Accepts `5` and `-5`.
fn parse_id(value: &Expr) -> Result<i16> {
    match value {
        Expr::Lit(ExprLit {
            lit: Lit::Int(lit), ..
        }) => lit.base10_parse(),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => match expr.as_ref() {
            Expr::Lit(ExprLit {
                lit: Lit::Int(lit), ..
            }) => {
                let magnitude: i32 = lit.base10_parse()?;
                i16::try_from(-magnitude)
                    .map_err(|_| syn::Error::new_spanned(value, "field id out of range for i16"))
            }
            _ => Err(syn::Error::new_spanned(value, "expected integer literal")),
        },
        _ => Err(syn::Error::new_spanned(value, "expected integer literal")),
    }
}

/// Field information collected from the struct definition.
pub struct FieldInfo {
    pub ident: Ident,
    pub id: i16,
    /// The declared type, or the inner type of an `Option`.
    pub value_ty: Type,
    pub is_optional: bool,
    pub binary: bool,
    pub skip: bool,
    pub use_default: bool,
    pub span: Span,
}

/// Collect the named fields of a struct, or fail for anything else.
pub fn named_fields<'a>(
    input: &'a DeriveInput,
    derive_name: &str,
) -> Result<&'a Punctuated<Field, Comma>> {
    match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{} only supports structs with named fields", derive_name),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{} only supports structs", derive_name),
        )),
    }
}

/// Parse every field's attributes and type shape.
pub fn collect_fields(fields: &Punctuated<Field, Comma>) -> Result<Vec<FieldInfo>> {
    let mut infos = Vec::with_capacity(fields.len());
    for field in fields {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let span = ident.span();
        let attrs = FieldAttrs::from_attrs(&field.attrs)?;

        if attrs.skip {
            infos.push(FieldInfo {
                ident,
                id: 0,
                value_ty: field.ty.clone(),
                is_optional: false,
                binary: false,
                skip: true,
                use_default: true,
                span,
            });
            continue;
        }

        let id = attrs.id.ok_or_else(|| {
            syn::Error::new_spanned(&field.ident, "field must have #[compact(id = N)] attribute")
        })?;

        let inner = option_inner(&field.ty);
        let value_ty = inner.unwrap_or(&field.ty).clone();
        let binary = attrs.binary || is_byte_vec(&value_ty);
        if attrs.binary && !is_byte_vec(&value_ty) {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "#[compact(binary)] requires Vec<u8>",
            ));
        }

        infos.push(FieldInfo {
            ident,
            id,
            value_ty,
            is_optional: inner.is_some(),
            binary,
            skip: false,
            use_default: attrs.use_default,
            span,
        });
    }
    Ok(infos)
}

/// Validate that field ids are unique among non-skipped fields.
pub fn validate_fields(fields: &[FieldInfo]) -> Result<()> {
    use std::collections::HashSet;

    let mut seen_ids = HashSet::new();

    for field in fields {
        if field.skip {
            continue;
        }

        if !seen_ids.insert(field.id) {
            return Err(syn::Error::new(
                field.span,
                format!("duplicate field id {} in struct", field.id),
            ));
        }
    }

    Ok(())
}

/// The `T` of an `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

fn is_byte_vec(ty: &Type) -> bool {
    let Type::Path(type_path) = ty else {
        return false;
    };
    let Some(segment) = type_path.path.segments.last() else {
        return false;
    };
    if segment.ident != "Vec" {
        return false;
    }
    if let PathArguments::AngleBracketed(args) = &segment.arguments {
        if let Some(GenericArgument::Type(Type::Path(inner))) = args.args.first() {
            return inner.path.is_ident("u8");
        }
    }
    false
}
