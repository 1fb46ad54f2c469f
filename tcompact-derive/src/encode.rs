//! Code generation for CompactEncode derive macro.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attr::{collect_fields, named_fields, validate_fields, FieldInfo};

/// Generate the CompactEncode implementation for a struct.
pub fn derive_encode(input: &DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = collect_fields(named_fields(input, "CompactEncode")?)?;
    validate_fields(&fields)?;

    // Ascending ids keep the field headers in their short form.
    let mut sorted: Vec<&FieldInfo> = fields.iter().filter(|f| !f.skip).collect();
    sorted.sort_by_key(|f| f.id);

    let field_writes = sorted.iter().map(|field| write_field(field));

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::tcompact::CompactEncode for #name #ty_generics #where_clause {
            const TTYPE: ::tcompact::TType = ::tcompact::TType::Struct;

            fn encode<__T: ::tcompact::Transport>(
                &self,
                __protocol: &mut ::tcompact::CompactProtocol<__T>,
            ) -> ::std::result::Result<(), ::tcompact::ProtocolError> {
                __protocol.write_struct_begin()?;
                #(#field_writes)*
                __protocol.write_field_stop()?;
                __protocol.write_struct_end()
            }
        }
    })
}

fn write_field(field: &FieldInfo) -> TokenStream {
    let ident = &field.ident;
    let id = field.id;
    let ty = &field.value_ty;

    let (ttype, write) = if field.binary {
        (
            quote! { ::tcompact::TType::String },
            quote! { __protocol.write_binary(__value)?; },
        )
    } else {
        (
            quote! { <#ty as ::tcompact::CompactEncode>::TTYPE },
            quote! { ::tcompact::CompactEncode::encode(__value, __protocol)?; },
        )
    };

    let body = quote! {
        __protocol.write_field_begin(#ttype, #id)?;
        #write
        __protocol.write_field_end()?;
    };

    if field.is_optional {
        quote! {
            if let ::std::option::Option::Some(__value) = &self.#ident {
                #body
            }
        }
    } else {
        quote! {
            {
                let __value = &self.#ident;
                #body
            }
        }
    }
}
