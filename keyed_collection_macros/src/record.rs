use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Field, Fields, Ident, LitStr};

struct RecordField {
    ident: Ident,
    name: String,
    skip: bool,
}

pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = record_fields(input)?;

    let (stored, skipped): (Vec<_>, Vec<_>) = fields.iter().partition(|f| !f.skip);

    let stored_idents: Vec<_> = stored.iter().map(|f| &f.ident).collect();
    let stored_names: Vec<_> = stored.iter().map(|f| f.name.as_str()).collect();
    let skipped_idents: Vec<_> = skipped.iter().map(|f| &f.ident).collect();
    let staged: Vec<_> = stored
        .iter()
        .enumerate()
        .map(|(i, _)| format_ident!("__staged_{}", i))
        .collect();

    let private = quote!(::keyed_collection::__private);

    Ok(quote! {
        impl #impl_generics ::keyed_collection::Record for #name #ty_generics #where_clause {
            fn from_body(
                mut body: ::keyed_collection::Body,
            ) -> ::keyed_collection::Result<Self> {
                let _ = &mut body;
                ::core::result::Result::Ok(Self {
                    #( #stored_idents: #private::take_field(&mut body, #stored_names)?, )*
                    #( #skipped_idents: ::core::default::Default::default(), )*
                })
            }

            fn field(&self, name: &str) -> ::core::option::Option<#private::Value> {
                match name {
                    #( #stored_names => #private::to_value(#stored_names, &self.#stored_idents), )*
                    _ => ::core::option::Option::None,
                }
            }

            fn assign(
                &mut self,
                mut fields: ::keyed_collection::Body,
            ) -> ::keyed_collection::Result<()> {
                let _ = &mut fields;
                // Convert everything first so a bad field leaves the record untouched.
                #(
                    let #staged = match fields.remove(#stored_names) {
                        ::core::option::Option::Some(value) => ::core::option::Option::Some(
                            #private::from_value(#stored_names, value)?,
                        ),
                        ::core::option::Option::None => ::core::option::Option::None,
                    };
                )*
                #(
                    if let ::core::option::Option::Some(value) = #staged {
                        self.#stored_idents = value;
                    }
                )*
                ::core::result::Result::Ok(())
            }

            fn to_body(&self) -> ::keyed_collection::Body {
                let mut body = ::keyed_collection::Body::new();
                #(
                    let value = #private::to_value(#stored_names, &self.#stored_idents);
                    if let ::core::option::Option::Some(value) = value {
                        body.insert(::std::string::String::from(#stored_names), value);
                    }
                )*
                body
            }
        }
    })
}

fn record_fields(input: &DeriveInput) -> syn::Result<Vec<RecordField>> {
    let named = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Record derive: only structs with named fields are supported",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Record derive: only structs are supported",
            ))
        }
    };

    named.iter().map(parse_field).collect()
}

fn parse_field(field: &Field) -> syn::Result<RecordField> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new_spanned(field, "Record derive: unnamed field"))?;

    let mut name = ident.to_string();
    let mut skip = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                name = value.value();
                Ok(())
            } else if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `rename = \"...\"` or `skip`"))
            }
        })?;
    }

    if let Some(raw) = name.strip_prefix("r#") {
        name = raw.to_string();
    }

    Ok(RecordField { ident, name, skip })
}
