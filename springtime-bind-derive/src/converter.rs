use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Error, ItemFn, Result, ReturnType};

pub fn register_converter(item: &ItemFn) -> Result<TokenStream> {
    if item.sig.inputs.len() != 1 || matches!(item.sig.output, ReturnType::Default) {
        return Err(Error::new(
            item.sig.span(),
            "Converters must have the form fn(&str) -> Result<T, E>!",
        ));
    }

    if !item.sig.generics.params.is_empty() {
        return Err(Error::new(
            item.sig.generics.span(),
            "Converters cannot be generic!",
        ));
    }

    let ident = &item.sig.ident;

    Ok(quote! {
        #item

        const _: () = {
            fn register() -> springtime_bind::convert::internal::ConverterDefinition {
                springtime_bind::convert::internal::ConverterDefinition::new(#ident)
            }

            springtime_bind::convert::internal::submit! {
                springtime_bind::convert::internal::ConverterRegisterer {
                    register
                }
            };
        };
    })
}
