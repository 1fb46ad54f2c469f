//! Code generation for CompactDecode derive macro.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{DeriveInput, Result};

use crate::attr::{collect_fields, named_fields, validate_fields, FieldInfo};

/// Generate the CompactDecode implementation for a struct.
pub fn derive_decode(input: &DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = collect_fields(named_fields(input, "CompactDecode")?)?;
    validate_fields(&fields)?;

    let wire_fields: Vec<&FieldInfo> = fields.iter().filter(|f| !f.skip).collect();

    let slots = wire_fields.iter().map(|field| {
        let slot = slot_ident(field);
        let ty = &field.value_ty;
        quote! { let mut #slot: ::std::option::Option<#ty> = ::std::option::Option::None; }
    });

    let arms = wire_fields.iter().map(|field| {
        let slot = slot_ident(field);
        let id = field.id;
        let ty = &field.value_ty;
        let (ttype, read) = if field.binary {
            (
                quote! { ::tcompact::TType::String },
                quote! { __protocol.read_binary()? },
            )
        } else {
            (
                quote! { <#ty as ::tcompact::CompactDecode>::TTYPE },
                quote! { <#ty as ::tcompact::CompactDecode>::decode(__protocol)? },
            )
        };
        quote! {
            if __field.id == #id && __field.field_type == #ttype {
                #slot = ::std::option::Option::Some(#read);
            } else
        }
    });

    let assignments = fields.iter().map(|field| {
        let ident = &field.ident;
        if field.skip {
            return quote! { #ident: ::std::default::Default::default() };
        }
        let slot = slot_ident(field);
        let field_name = ident.to_string();
        let id = field.id;
        if field.is_optional {
            quote! { #ident: #slot }
        } else if field.use_default {
            quote! { #ident: #slot.unwrap_or_default() }
        } else {
            quote! {
                #ident: #slot.ok_or_else(|| ::tcompact::ProtocolError::InvalidData(
                    ::std::format!(
                        "missing required field {}.{} (id {})",
                        #type_name,
                        #field_name,
                        #id
                    )
                ))?
            }
        }
    });

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::tcompact::CompactDecode for #name #ty_generics #where_clause {
            const TTYPE: ::tcompact::TType = ::tcompact::TType::Struct;

            fn decode<__T: ::tcompact::Transport>(
                __protocol: &mut ::tcompact::CompactProtocol<__T>,
            ) -> ::std::result::Result<Self, ::tcompact::ProtocolError> {
                #(#slots)*
                __protocol.read_struct_begin()?;
                loop {
                    let __field = __protocol.read_field_begin()?;
                    if __field.is_stop() {
                        break;
                    }
                    // Unknown ids and mismatched types are skipped.
                    #(#arms)* {
                        __protocol.skip(__field.field_type)?;
                    }
                    __protocol.read_field_end()?;
                }
                __protocol.read_struct_end()?;
                ::std::result::Result::Ok(Self {
                    #(#assignments),*
                })
            }
        }
    })
}

fn slot_ident(field: &FieldInfo) -> syn::Ident {
    format_ident!("__field_{}", field.ident)
}
