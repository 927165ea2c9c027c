use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr};

#[derive(Default)]
struct FieldOptions {
    skip: bool,
    rename: Option<String>,
    object: bool,
    objects: bool,
}

fn parse_field_options(attrs: &[Attribute]) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("attributes")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
            } else if meta.path.is_ident("object") {
                options.object = true;
            } else if meta.path.is_ident("objects") {
                options.objects = true;
            } else if meta.path.is_ident("rename") {
                let name: LitStr = meta.value()?.parse()?;
                options.rename = Some(name.value());
            } else {
                return Err(meta.error("expected one of: skip, rename, object, objects"));
            }
            Ok(())
        })?;
    }
    if options.object && options.objects {
        return Err(syn::Error::new_spanned(
            &attrs[0],
            "`object` and `objects` are mutually exclusive",
        ));
    }
    Ok(options)
}

/// Expose a struct with named fields as a source object.
///
/// Every field is readable under its own name (or `#[attributes(rename = "..")]`)
/// and is cloned into a `Value` on lookup. `#[attributes(object)]` wraps a
/// field that itself implements `Attributes`; `#[attributes(objects)]` does the
/// same for each element of a `Vec`. `#[attributes(skip)]` hides a field.
#[proc_macro_derive(Attributes, attributes(attributes))]
pub fn derive_attributes(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_attributes(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_attributes(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(ds) = &input.data else {
        return Err(syn::Error::new_spanned(
            struct_name,
            "Attributes derive only supports structs",
        ));
    };
    let Fields::Named(named) = &ds.fields else {
        return Err(syn::Error::new_spanned(
            struct_name,
            "Attributes derive only supports structs with named fields",
        ));
    };

    let mut arms = Vec::new();
    for field in named.named.iter() {
        let options = parse_field_options(&field.attrs)?;
        if options.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let key = options.rename.unwrap_or_else(|| ident.to_string());
        let value = if options.object {
            quote! { ::prism_serializer::Value::object(::core::clone::Clone::clone(&self.#ident)) }
        } else if options.objects {
            quote! {
                ::prism_serializer::Value::List(
                    self.#ident
                        .iter()
                        .cloned()
                        .map(::prism_serializer::Value::object)
                        .collect(),
                )
            }
        } else {
            quote! { ::prism_serializer::Value::from(::core::clone::Clone::clone(&self.#ident)) }
        };
        arms.push(quote! { #key => ::core::option::Option::Some(#value), });
    }

    let type_name = struct_name.to_string();
    Ok(quote! {
        impl #impl_generics ::prism_serializer::Attributes for #struct_name #ty_generics #where_clause {
            fn attribute(&self, name: &str) -> ::core::option::Option<::prism_serializer::Value> {
                match name {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn type_name(&self) -> &str {
                #type_name
            }
        }
    })
}
