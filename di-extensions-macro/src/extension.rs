use darling::FromDeriveInput;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// `#[capabilities(before_all, after_all, post_process, before_each, after_each)]`
#[derive(FromDeriveInput)]
#[darling(attributes(capabilities), supports(struct_any, enum_any))]
struct ExtensionArgs {
    ident: syn::Ident,
    generics: syn::Generics,
    #[darling(default)]
    before_all: bool,
    #[darling(default)]
    after_all: bool,
    #[darling(default)]
    post_process: bool,
    #[darling(default)]
    before_each: bool,
    #[darling(default)]
    after_each: bool,
}

pub fn derive_extension(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let args = match ExtensionArgs::from_derive_input(&input) {
        Ok(args) => args,
        Err(e) => return e.write_errors().into(),
    };
    TokenStream::from(generate_extension_impl(&args))
}

fn generate_extension_impl(args: &ExtensionArgs) -> TokenStream2 {
    let name = &args.ident;
    let (impl_generics, ty_generics, where_clause) = args.generics.split_for_impl();

    let accessor = |enabled: bool, method: TokenStream2, capability: TokenStream2| {
        if enabled {
            quote! {
                fn #method(&self) -> ::core::option::Option<&dyn ::di_extensions::extension::#capability> {
                    ::core::option::Option::Some(self)
                }
            }
        } else {
            TokenStream2::new()
        }
    };

    let accessors = [
        accessor(args.before_all, quote!(as_before_all), quote!(BeforeAllCallback)),
        accessor(args.after_all, quote!(as_after_all), quote!(AfterAllCallback)),
        accessor(
            args.post_process,
            quote!(as_test_instance_post_processor),
            quote!(TestInstancePostProcessor),
        ),
        accessor(args.before_each, quote!(as_before_each), quote!(BeforeEachCallback)),
        accessor(args.after_each, quote!(as_after_each), quote!(AfterEachCallback)),
    ];

    quote! {
        impl #impl_generics ::di_extensions::Extension for #name #ty_generics #where_clause {
            #(#accessors)*
        }
    }
}
