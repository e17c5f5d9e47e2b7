use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Type};

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = generate_injectable_impl(&input).unwrap_or_else(syn::Error::into_compile_error);
    TokenStream::from(expanded)
}

fn generate_injectable_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let construct = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => {
                let field_injections = fields
                    .named
                    .iter()
                    .map(|field| {
                        let field_name = &field.ident;
                        let value = if is_default_field(field)? {
                            quote!(::core::default::Default::default())
                        } else {
                            resolve_expr(&field.ty)
                        };
                        Ok(quote! { #field_name: #value })
                    })
                    .collect::<syn::Result<Vec<_>>>()?;
                quote! { Self { #(#field_injections),* } }
            }
            Fields::Unit => quote! { Self },
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    struct_name,
                    "#[derive(Injectable)] only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "#[derive(Injectable)] can only be applied to structs",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::di_extensions::Injectable for #struct_name #ty_generics #where_clause {
            fn inject(
                container: &::di_extensions::Container
            ) -> ::di_extensions::Result<Self> {
                let _ = container;
                Ok(#construct)
            }
        }
    })
}

/// `#[inject(default)]` fields are built with `Default` instead of resolved
fn is_default_field(field: &syn::Field) -> syn::Result<bool> {
    let mut is_default = false;
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("inject")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                is_default = true;
                Ok(())
            } else {
                Err(meta.error("expected `default`"))
            }
        })?;
    }
    Ok(is_default)
}

/// Container lookup for a field of type `Arc<T>` or `Arc<dyn Trait>`
pub(crate) fn resolve_expr(ty: &Type) -> TokenStream2 {
    let inner = extract_arc_inner(ty);
    match &inner {
        Type::TraitObject(_) => quote!(container.resolve_trait::<#inner>()?),
        _ => quote!(container.resolve::<#inner>()?),
    }
}

/// Extract the inner type from Arc<T> or Arc<dyn Trait>
fn extract_arc_inner(ty: &Type) -> Type {
    generic_argument_of(ty, "Arc").unwrap_or_else(|| ty.clone())
}

/// The first type argument of `ty` if its last path segment is `wrapper`
pub(crate) fn generic_argument_of(ty: &Type, wrapper: &str) -> Option<Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner.clone()),
        _ => None,
    }
}
