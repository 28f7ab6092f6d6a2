use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, LitStr, parse_macro_input};

#[proc_macro_derive(FormModel, attributes(form))]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.ident,
            "FormModel derive currently supports only non-generic structs",
        ));
    }

    let model_ident = input.ident;
    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            Fields::Unnamed(fields) => {
                return Err(syn::Error::new_spanned(
                    fields,
                    "FormModel derive requires a struct with named fields",
                ));
            }
            Fields::Unit => {
                return Err(syn::Error::new_spanned(
                    model_ident,
                    "FormModel derive requires a struct with named fields",
                ));
            }
        },
        Data::Enum(data) => {
            return Err(syn::Error::new_spanned(
                data.enum_token,
                "FormModel derive is only supported on structs",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "FormModel derive is only supported on structs",
            ));
        }
    };

    let calmform = calmform_path();
    let mut names = Vec::new();
    let mut decoders = Vec::new();
    let mut encoders = Vec::new();

    for field in &named_fields {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let field_ty = &field.ty;
        let field_name = form_name(field)?.unwrap_or_else(|| field_ident.to_string());

        decoders.push(quote! {
            #field_ident: values.decode::<#field_ty>(#field_name)?
        });
        encoders.push(quote! {
            values.insert(
                #field_name,
                #calmform::form::FieldData::into_field(self.#field_ident),
            );
        });
        names.push(field_name);
    }

    Ok(quote! {
        impl #calmform::form::FormModel for #model_ident {
            const FIELDS: &'static [&'static str] = &[#(#names),*];

            fn from_values(
                values: &#calmform::form::ValueMap,
            ) -> ::core::result::Result<Self, #calmform::form::ModelError> {
                ::core::result::Result::Ok(Self {
                    #(#decoders,)*
                })
            }

            fn into_values(self) -> #calmform::form::ValueMap {
                let mut values = #calmform::form::ValueMap::new();
                #(#encoders)*
                values
            }
        }
    })
}

/// Reads `#[form(rename = "...")]` from a field.
fn form_name(field: &Field) -> syn::Result<Option<String>> {
    let mut rename = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("form") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                rename = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported form attribute"))
            }
        })?;
    }
    Ok(rename)
}

fn calmform_path() -> TokenStream2 {
    match crate_name("calmform") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::calmform),
    }
}
