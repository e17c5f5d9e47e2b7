use crate::injectable::generic_argument_of;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, punctuated::Punctuated, Attribute, Data, DeriveInput, Fields, LitStr, Path,
    Token, Type,
};

/// Declarations shared by test classes and composed bundles
struct Declarations {
    extend_with: Vec<Vec<Path>>,
    compose: Vec<Path>,
}

impl Declarations {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut extend_with = Vec::new();
        let mut compose = Vec::new();

        for attr in attrs {
            if attr.path().is_ident("extend_with") {
                let paths = attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)?;
                if paths.is_empty() {
                    return Err(syn::Error::new_spanned(
                        attr,
                        "#[extend_with] needs at least one extension type",
                    ));
                }
                extend_with.push(paths.into_iter().collect());
            } else if attr.path().is_ident("compose") {
                let paths = attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)?;
                compose.extend(paths);
            }
        }

        Ok(Self {
            extend_with,
            compose,
        })
    }

    fn metadata_expr(&self) -> TokenStream2 {
        let declarations = self.extend_with.iter().map(|paths| {
            quote! {
                .extend_with([
                    #(::di_extensions::ExtensionClass::of::<#paths>()),*
                ])
            }
        });
        let composed = self.compose.iter().map(|path| {
            quote! {
                .compose(::di_extensions::ComposedDeclaration::of::<#path>())
            }
        });

        quote! {
            ::di_extensions::TestClassMetadata::builder()
                #(#declarations)*
                #(#composed)*
        }
    }
}

pub fn derive_test_class(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let expanded = generate_test_class_impl(&input).unwrap_or_else(syn::Error::into_compile_error);
    TokenStream::from(expanded)
}

pub fn derive_composed_extensions(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let expanded = Declarations::parse(&input.attrs).map(|declarations| {
        let name = &input.ident;
        let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
        let metadata = declarations.metadata_expr();
        quote! {
            impl #impl_generics ::di_extensions::ComposedExtensions for #name #ty_generics #where_clause {
                fn metadata() -> ::di_extensions::TestClassMetadata {
                    #metadata
                }
            }
        }
    });
    TokenStream::from(expanded.unwrap_or_else(syn::Error::into_compile_error))
}

fn generate_test_class_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let metadata = Declarations::parse(&input.attrs)?.metadata_expr();

    let mut modules = Vec::new();
    let mut properties = Vec::new();
    for attr in &input.attrs {
        if attr.path().is_ident("configure") {
            let paths = attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)?;
            modules.extend(paths);
        } else if attr.path().is_ident("property") {
            let entries = attr.parse_args_with(Punctuated::<LitStr, Token![,]>::parse_terminated)?;
            for entry in entries {
                if !entry.value().contains('=') {
                    return Err(syn::Error::new_spanned(
                        &entry,
                        "#[property] entries are written as \"key = value\"",
                    ));
                }
                properties.push(entry);
            }
        }
    }

    let autowired = autowired_fields(&input.data)?;

    Ok(quote! {
        impl #impl_generics ::di_extensions::TestClass for #name #ty_generics #where_clause {
            fn metadata() -> ::di_extensions::TestClassMetadata {
                #metadata
            }

            fn configure(
                container: &mut ::di_extensions::Container
            ) -> ::di_extensions::Result<()> {
                let _ = &container;
                #(<#modules as ::di_extensions::Module>::register(container)?;)*
                Ok(())
            }

            fn properties() -> ::std::vec::Vec<(::std::string::String, ::std::string::String)> {
                let entries: &[&str] = &[#(#properties),*];
                entries
                    .iter()
                    .copied()
                    .filter_map(::di_extensions::config::parse_inline)
                    .collect()
            }

            fn autowire(
                &mut self,
                container: &::di_extensions::Container
            ) -> ::di_extensions::Result<()> {
                let _ = container;
                #(#autowired)*
                Ok(())
            }
        }
    })
}

/// Assignments for `#[autowired]` fields of type `Option<Arc<T>>`
fn autowired_fields(data: &Data) -> syn::Result<Vec<TokenStream2>> {
    let Data::Struct(data) = data else {
        return Ok(Vec::new());
    };
    let Fields::Named(fields) = &data.fields else {
        return Ok(Vec::new());
    };

    fields
        .named
        .iter()
        .filter(|field| field.attrs.iter().any(|attr| attr.path().is_ident("autowired")))
        .map(|field| {
            let field_name = &field.ident;
            let inner: Type = generic_argument_of(&field.ty, "Option").ok_or_else(|| {
                syn::Error::new_spanned(&field.ty, "#[autowired] fields must be Option<Arc<T>>")
            })?;
            let resolve = crate::injectable::resolve_expr(&inner);
            Ok(quote! {
                self.#field_name = ::core::option::Option::Some(#resolve);
            })
        })
        .collect()
}
