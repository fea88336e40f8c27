use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use std::env::var_os;
use syn::{parse::Parse, Error};

mod attr_parsing;
mod injectable;

/// Records the descriptor of a type into the link-time module of the current crate.
///
/// Accepted on a non-generic struct or enum, on its inherent impl and on its trait impls.
/// See the `stevedore` documentation for the helper attributes.
#[proc_macro_attribute]
pub fn injectable(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let attr = proc_macro2::TokenStream::from(attr);
        return Error::new_spanned(attr, "`injectable` takes no arguments")
            .into_compile_error()
            .into();
    }
    expand_with(item, injectable::expand)
}

fn expand_with<F, I, K>(input: TokenStream, f: F) -> TokenStream
where
    F: FnOnce(I) -> syn::Result<K>,
    I: Parse,
    K: ToTokens,
{
    expand(syn::parse(input).and_then(f))
}

fn expand<T>(result: syn::Result<T>) -> TokenStream
where
    T: ToTokens,
{
    match result {
        Ok(tokens) => {
            let tokens = (quote! { #tokens }).into();
            if var_os("MACROS_DEBUG").is_some() {
                eprintln!("{tokens}");
            }
            tokens
        }
        Err(err) => err.into_compile_error().into(),
    }
}
