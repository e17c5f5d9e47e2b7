use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Attribute, Ident, ItemStruct, Path, Token, Type};

/// A path inside `imports = [...]` or `providers = [...]`, with its `#[cfg]`s
struct Entry {
    attrs: Vec<Attribute>,
    path: Path,
}

impl Parse for Entry {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        Ok(Entry {
            attrs: input.call(Attribute::parse_outer)?,
            path: input.parse()?,
        })
    }
}

/// `(dyn Trait => Impl)`
struct Binding {
    contract: Type,
    implementation: Path,
}

impl Parse for Binding {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let pair;
        syn::parenthesized!(pair in input);
        let contract = pair.parse()?;
        pair.parse::<Token![=>]>()?;
        Ok(Binding {
            contract,
            implementation: pair.parse()?,
        })
    }
}

enum Section {
    Imports(Vec<Entry>),
    Providers(Vec<Entry>),
    Bindings(Vec<Binding>),
}

impl Parse for Section {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let key: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let list;
        syn::bracketed!(list in input);

        let section = match key.to_string().as_str() {
            "imports" => Section::Imports(entries(&list)?),
            "providers" => Section::Providers(entries(&list)?),
            "bindings" => Section::Bindings(
                Punctuated::<Binding, Token![,]>::parse_terminated(&list)?
                    .into_iter()
                    .collect(),
            ),
            _ => {
                return Err(syn::Error::new_spanned(
                    key,
                    "expected `imports`, `providers` or `bindings`",
                ))
            }
        };
        Ok(section)
    }
}

fn entries(list: ParseStream) -> syn::Result<Vec<Entry>> {
    Ok(Punctuated::<Entry, Token![,]>::parse_terminated(list)?
        .into_iter()
        .collect())
}

#[derive(Default)]
struct ModuleLayout {
    imports: Vec<Entry>,
    providers: Vec<Entry>,
    bindings: Vec<Binding>,
}

impl Parse for ModuleLayout {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut layout = ModuleLayout::default();
        for section in Punctuated::<Section, Token![,]>::parse_terminated(input)? {
            match section {
                Section::Imports(items) => layout.imports.extend(items),
                Section::Providers(items) => layout.providers.extend(items),
                Section::Bindings(items) => layout.bindings.extend(items),
            }
        }
        Ok(layout)
    }
}

pub fn module_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let layout = parse_macro_input!(attr as ModuleLayout);
    let input = parse_macro_input!(item as ItemStruct);
    expand(&layout, &input).into()
}

fn expand(layout: &ModuleLayout, input: &ItemStruct) -> TokenStream2 {
    let name = &input.ident;

    let bindings = layout.bindings.iter().map(|Binding { contract, implementation }| {
        quote! {
            container.register_trait::<#contract, #implementation, _>(|instance| {
                instance as ::std::sync::Arc<#contract>
            });
        }
    });

    let imports = layout.imports.iter().map(|Entry { attrs, path }| {
        quote! {
            #(#attrs)*
            <#path as ::di_extensions::Module>::register(container)?;
        }
    });

    // Built in declared order: a provider may inject anything listed before it.
    let providers = layout.providers.iter().map(|Entry { attrs, path }| {
        quote! {
            #(#attrs)*
            {
                let provided = <#path as ::di_extensions::Injectable>::inject(container)?;
                container.register(provided);
            }
        }
    });

    quote! {
        #input

        impl ::di_extensions::Module for #name {
            fn register(
                container: &mut ::di_extensions::Container
            ) -> ::di_extensions::Result<()> {
                #(#bindings)*
                #(#imports)*
                #(#providers)*
                Ok(())
            }
        }

        impl #name {
            /// A fresh container holding everything this module provides
            pub fn create_container() -> ::di_extensions::Result<::di_extensions::Container> {
                let mut container = ::di_extensions::Container::new();
                <Self as ::di_extensions::Module>::register(&mut container)?;
                Ok(container)
            }
        }
    }
}
