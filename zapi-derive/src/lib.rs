//! `#[derive(ZapiRecord)]` generates the xml writer and reader for a ZAPI
//! record.  Every field of the struct must be an `Option`: a `None` field
//! is never written, which is what makes the same record usable as a
//! query template, a desired-attributes template and a response record.
//!
//! Struct attribute:
//!   `#[zapi(tag = "lun-info")]` element name of the record.  Defaults to
//!   the kebab-case struct name.
//!
//! Field attributes:
//!   `#[zapi(rename = "is-home")]` element name.  Defaults to the
//!   kebab-case field name.
//!   `#[zapi(list = "aggr-name")]` the field is an `Option<Vec<T>>` whose
//!   items are written as `<aggr-name>` children.
//!   `#[zapi(wrapped)]` the field is a nested record written with its own
//!   tag inside the field element, ie `<query><lun-info>..</lun-info></query>`
extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, LitStr};

#[proc_macro_derive(ZapiRecord, attributes(zapi))]
pub fn zapi_record(input: TokenStream) -> TokenStream {
    // Parse the input stream
    let ast = parse_macro_input!(input as DeriveInput);

    // Build the impl
    let gen = match ast.data {
        Data::Struct(ref data) => impl_struct_record(&ast, &data.fields),
        Data::Enum(_) | Data::Union(_) => Err(syn::Error::new_spanned(
            &ast.ident,
            "ZapiRecord can only be derived for structs",
        )),
    };

    match gen {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

enum FieldKind {
    Value,
    List(String),
    Wrapped,
}

struct RecordField {
    ident: Ident,
    name: String,
    kind: FieldKind,
}

// LunInfo -> lun-info, size_used -> size-used
fn kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else if c == '_' {
            out.push('-');
        } else {
            out.push(c);
        }
    }
    out
}

fn record_tag(ast: &DeriveInput) -> syn::Result<String> {
    let mut tag = None;
    for attr in &ast.attrs {
        if !attr.path().is_ident("zapi") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("tag") {
                let s: LitStr = meta.value()?.parse()?;
                tag = Some(s.value());
                Ok(())
            } else {
                Err(meta.error("expected `tag = \"...\"`"))
            }
        })?;
    }
    Ok(tag.unwrap_or_else(|| kebab_case(&ast.ident.to_string())))
}

fn record_fields(fields: &Fields) -> syn::Result<Vec<RecordField>> {
    let mut result = Vec::new();
    for field in fields.iter() {
        let ident = match field.ident {
            Some(ref i) => i.clone(),
            None => {
                return Err(syn::Error::new_spanned(
                    field,
                    "ZapiRecord fields must be named",
                ))
            }
        };
        let raw = ident.to_string();
        let mut name = kebab_case(raw.trim_start_matches("r#"));
        let mut kind = FieldKind::Value;
        for attr in &field.attrs {
            if !attr.path().is_ident("zapi") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let s: LitStr = meta.value()?.parse()?;
                    name = s.value();
                    Ok(())
                } else if meta.path.is_ident("list") {
                    let s: LitStr = meta.value()?.parse()?;
                    kind = FieldKind::List(s.value());
                    Ok(())
                } else if meta.path.is_ident("wrapped") {
                    kind = FieldKind::Wrapped;
                    Ok(())
                } else {
                    Err(meta.error("expected `rename`, `list` or `wrapped`"))
                }
            })?;
        }
        result.push(RecordField { ident, name, kind });
    }
    Ok(result)
}

fn impl_struct_record(ast: &DeriveInput, fields: &Fields) -> syn::Result<TokenStream2> {
    let name = &ast.ident;
    let tag = record_tag(ast)?;
    let fields = record_fields(fields)?;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let writes = fields.iter().map(|f| {
        let ident = &f.ident;
        let field_name = &f.name;
        match f.kind {
            FieldKind::Value => quote! {
                if let Some(ref v) = self.#ident {
                    ::netapp_zapi::record::XmlField::write_field(v, w, #field_name)?;
                }
            },
            FieldKind::List(ref item) => quote! {
                if let Some(ref v) = self.#ident {
                    ::netapp_zapi::record::write_list(w, #field_name, #item, v)?;
                }
            },
            FieldKind::Wrapped => quote! {
                if let Some(ref v) = self.#ident {
                    ::netapp_zapi::record::write_wrapped(w, #field_name, v)?;
                }
            },
        }
    });

    let reads = fields.iter().map(|f| {
        let ident = &f.ident;
        let field_name = &f.name;
        match f.kind {
            FieldKind::Value => quote! {
                #ident: ::netapp_zapi::record::read_field(e, #field_name)?,
            },
            FieldKind::List(ref item) => quote! {
                #ident: ::netapp_zapi::record::read_list(e, #field_name, #item)?,
            },
            FieldKind::Wrapped => quote! {
                #ident: ::netapp_zapi::record::read_wrapped(e, #field_name)?,
            },
        }
    });

    Ok(quote! {
        impl #impl_generics ::netapp_zapi::record::ZapiRecord for #name #ty_generics #where_clause {
            const TAG: &'static str = #tag;

            #[allow(unused_variables)]
            fn write_fields<W: ::std::io::Write>(
                &self,
                w: &mut ::netapp_zapi::record::EventWriter<W>,
            ) -> ::netapp_zapi::error::ZapiResult<()> {
                #(#writes)*
                Ok(())
            }

            #[allow(unused_variables)]
            fn from_element(
                e: &::netapp_zapi::record::Element,
            ) -> ::netapp_zapi::error::ZapiResult<Self> {
                Ok(#name { #(#reads)* })
            }
        }

        impl #impl_generics ::netapp_zapi::record::XmlField for #name #ty_generics #where_clause {
            fn write_field<W: ::std::io::Write>(
                &self,
                w: &mut ::netapp_zapi::record::EventWriter<W>,
                name: &str,
            ) -> ::netapp_zapi::error::ZapiResult<()> {
                ::netapp_zapi::record::write_nested(w, name, self)
            }

            fn read_field(
                e: &::netapp_zapi::record::Element,
            ) -> ::netapp_zapi::error::ZapiResult<Self> {
                <Self as ::netapp_zapi::record::ZapiRecord>::from_element(e)
            }
        }
    })
}
