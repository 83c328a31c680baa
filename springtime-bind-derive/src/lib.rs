use crate::bind::expand_bind;
use crate::converter::register_converter;
use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, Error, ItemFn};

mod attributes;
mod bind;
mod converter;

#[proc_macro_derive(Bind, attributes(bind))]
pub fn generate_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_bind(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

#[proc_macro_attribute]
pub fn converter(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = parse_macro_input!(item as ItemFn);
    register_converter(&item)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}
