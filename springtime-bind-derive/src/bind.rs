use crate::attributes::{BindAttributes, DefaultDefinition, FieldAttributes, VariantAttributes};
use convert_case::{Case, Casing};
use itertools::Itertools;
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::spanned::Spanned;
use syn::{
    parse_quote, Attribute, Data, DataEnum, DataStruct, DeriveInput, Error, Field, Fields,
    FieldsNamed, Generics, LitStr, Result, Type,
};

const BIND: &str = "bind";

struct BoundField<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    name: String,
    default: Option<DefaultDefinition>,
}

fn extract_attributes<'a, T>(attributes: &'a [Attribute]) -> Result<Option<T>>
where
    T: TryFrom<&'a Attribute, Error = Error>,
{
    attributes
        .iter()
        .filter(|attribute| attribute.path().is_ident(BIND))
        .map(T::try_from)
        .next()
        .transpose()
}

/// Splits fields into bound ones and ignored ones.
fn split_fields(fields: &FieldsNamed) -> Result<(Vec<BoundField<'_>>, Vec<&Field>)> {
    let mut bound = vec![];
    let mut ignored = vec![];

    for field in &fields.named {
        let Some(ident) = field.ident.as_ref() else {
            return Err(Error::new(field.span(), "Missing field identifier!"));
        };

        let attributes = extract_attributes::<FieldAttributes>(&field.attrs)?;
        match attributes {
            Some(FieldAttributes { ignore: true, .. }) => ignored.push(field),
            Some(FieldAttributes { default, name, .. }) => bound.push(BoundField {
                ident,
                ty: &field.ty,
                name: name
                    .map(|name| name.value())
                    .unwrap_or_else(|| property_name(ident)),
                default,
            }),
            None => bound.push(BoundField {
                ident,
                ty: &field.ty,
                name: property_name(ident),
                default: None,
            }),
        }
    }

    Ok((bound, ignored))
}

fn property_name(ident: &Ident) -> String {
    ident
        .to_string()
        .trim_start_matches("r#")
        .to_case(Case::Kebab)
}

fn add_bounds(generics: &Generics, bean: bool) -> Generics {
    let mut generics = generics.clone();
    for param in generics.type_params_mut() {
        param
            .bounds
            .push(parse_quote!(springtime_bind::descriptor::Bind));
        if bean {
            param.bounds.push(parse_quote!(Clone));
            param.bounds.push(parse_quote!(Default));
        }
    }

    generics
}

fn generate_default(field: &BoundField) -> TokenStream {
    let ty = field.ty;
    match &field.default {
        Some(DefaultDefinition::Expr(path)) => quote! {
            Some((|| Box::new(#path()) as springtime_bind::descriptor::BoundValue)
                as fn() -> springtime_bind::descriptor::BoundValue)
        },
        Some(DefaultDefinition::Default) => quote! {
            Some((|| Box::new(<#ty as std::default::Default>::default()) as springtime_bind::descriptor::BoundValue)
                as fn() -> springtime_bind::descriptor::BoundValue)
        },
        None => quote!(None),
    }
}

fn generate_constructor(
    bound: &[BoundField],
    ignored: &[&Field],
    constructor: Option<&syn::ExprPath>,
) -> TokenStream {
    let parameters = bound.iter().map(|field| {
        let name = &field.name;
        let ty = field.ty;
        let default = generate_default(field);
        quote! {
            springtime_bind::descriptor::ParameterDescriptor {
                name: #name,
                type_descriptor: <#ty as springtime_bind::descriptor::Bind>::type_descriptor,
                default: #default,
            }
        }
    });

    let arguments = bound.iter().map(|field| {
        let ty = field.ty;
        quote! {
            *arguments.next()??.downcast::<#ty>().ok()?
        }
    });

    let construction = if let Some(constructor) = constructor {
        quote! {
            #constructor(#(#arguments),*)
        }
    } else {
        let bound_idents = bound.iter().map(|field| field.ident);
        let ignored_idents = ignored.iter().filter_map(|field| field.ident.as_ref());
        quote! {
            Self {
                #(#bound_idents: #arguments,)*
                #(#ignored_idents: std::default::Default::default(),)*
            }
        }
    };

    quote! {
        Some(springtime_bind::descriptor::ConstructorDescriptor {
            parameters: vec![#(#parameters),*],
            instantiate: |arguments: Vec<Option<springtime_bind::descriptor::BoundValue>>| {
                let mut arguments = arguments.into_iter();
                Some(Box::new(#construction) as springtime_bind::descriptor::BoundValue)
            },
        })
    }
}

fn generate_bean(bound: &[BoundField]) -> TokenStream {
    let properties = bound.iter().map(|field| {
        let name = &field.name;
        let ident = field.ident;
        let ty = field.ty;
        quote! {
            springtime_bind::descriptor::BeanPropertyDescriptor {
                name: #name,
                type_descriptor: <#ty as springtime_bind::descriptor::Bind>::type_descriptor,
                get: Some((|instance: &dyn std::any::Any| {
                    instance
                        .downcast_ref::<Self>()
                        .map(|instance| Box::new(instance.#ident.clone()) as springtime_bind::descriptor::BoundValue)
                }) as fn(&dyn std::any::Any) -> Option<springtime_bind::descriptor::BoundValue>),
                set: |instance: &mut dyn std::any::Any, value: springtime_bind::descriptor::BoundValue| {
                    if let (Some(instance), Ok(value)) = (instance.downcast_mut::<Self>(), value.downcast::<#ty>()) {
                        instance.#ident = *value;
                    }
                },
            }
        }
    });

    quote! {
        Some(springtime_bind::descriptor::BeanDescriptor {
            create: || Box::new(<Self as std::default::Default>::default()) as springtime_bind::descriptor::BoundValue,
            properties: vec![#(#properties),*],
        })
    }
}

fn expand_struct(input: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let Fields::Named(fields) = &data.fields else {
        return Err(Error::new(
            input.span(),
            "Can only derive Bind on structs with named fields!",
        ));
    };

    let attributes = extract_attributes::<BindAttributes>(&input.attrs)?.unwrap_or(BindAttributes {
        bean: false,
        constructor: None,
    });

    let (bound, ignored) = split_fields(fields)?;
    let duplicate = bound.iter().map(|field| &field.name).duplicates().next();
    if let Some(duplicate) = duplicate {
        return Err(Error::new(
            input.span(),
            format!("Duplicate property name: {duplicate}"),
        ));
    }

    let (constructor, bean) = if attributes.bean {
        (quote!(None), generate_bean(&bound))
    } else {
        (
            generate_constructor(&bound, &ignored, attributes.constructor.as_ref()),
            quote!(None),
        )
    };

    let ident = &input.ident;
    let generics = add_bounds(&input.generics, attributes.bean);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics springtime_bind::descriptor::Bind for #ident #ty_generics #where_clause {
            fn type_descriptor() -> springtime_bind::descriptor::TypeDescriptor {
                springtime_bind::descriptor::TypeDescriptor::data_object::<Self>(|| {
                    springtime_bind::descriptor::DataObjectDescriptor {
                        constructor: #constructor,
                        bean: #bean,
                    }
                })
            }
        }
    })
}

fn variant_names(ident: &Ident, attributes: Option<VariantAttributes>) -> Vec<String> {
    let mut names = vec![lenient_name(&ident.to_string())];
    if let Some(name) = attributes.and_then(|attributes| attributes.name) {
        names.push(lenient_name(&name.value()));
    }

    names.into_iter().unique().collect()
}

fn lenient_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn expand_enum(input: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Can only derive Bind on non-generic enums!",
        ));
    }

    let mut arms = vec![];
    let mut known_names = vec![];
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(Error::new(
                variant.span(),
                "Can only derive Bind on enums with unit variants!",
            ));
        }

        let attributes = extract_attributes::<VariantAttributes>(&variant.attrs)?;
        let variant_ident = &variant.ident;
        for name in variant_names(variant_ident, attributes) {
            if known_names.contains(&name) {
                return Err(Error::new(
                    variant.span(),
                    format!("Ambiguous variant name: {name}"),
                ));
            }

            let pattern = LitStr::new(&name, variant.span());
            arms.push(quote! {
                #pattern => Ok(Box::new(Self::#variant_ident) as springtime_bind::descriptor::BoundValue),
            });
            known_names.push(name);
        }
    }

    let ident = &input.ident;
    let expected = known_names.join(", ");

    Ok(quote! {
        #[automatically_derived]
        impl springtime_bind::descriptor::Bind for #ident {
            fn type_descriptor() -> springtime_bind::descriptor::TypeDescriptor {
                springtime_bind::descriptor::TypeDescriptor::scalar::<Self>(|value: &springtime_bind::property::PropertyValue| {
                    if let springtime_bind::property::PropertyValue::Sequence(_) = value {
                        return Err(springtime_bind::descriptor::ScalarParseError::Unsupported);
                    }

                    match springtime_bind::descriptor::lenient_enum_name(&value.to_string()).as_str() {
                        #(#arms)*
                        _ => Err(springtime_bind::descriptor::ScalarParseError::Invalid(
                            format!("expected one of: {}", #expected)
                        )),
                    }
                })
            }
        }
    })
}

pub fn expand_bind(input: &DeriveInput) -> Result<TokenStream> {
    match &input.data {
        Data::Struct(data) => expand_struct(input, data),
        Data::Enum(data) => expand_enum(input, data),
        Data::Union(_) => Err(Error::new(
            input.span(),
            "Can only derive Bind on structs and enums!",
        )),
    }
}
