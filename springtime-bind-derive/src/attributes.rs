use syn::{Attribute, Error, ExprPath, LitStr, Token};

pub enum DefaultDefinition {
    Default,
    Expr(ExprPath),
}

pub struct FieldAttributes {
    pub default: Option<DefaultDefinition>,
    pub name: Option<LitStr>,
    pub ignore: bool,
}

impl TryFrom<&Attribute> for FieldAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self, Self::Error> {
        let mut default = None;
        let mut name = None;
        let mut ignore = false;
        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                if meta.input.peek(Token![=]) {
                    let value = meta.value()?;
                    let expr: LitStr = value.parse()?;
                    default = Some(DefaultDefinition::Expr(expr.parse()?));
                } else {
                    default = Some(DefaultDefinition::Default);
                }
            } else if meta.path.is_ident("name") {
                name = Some(meta.value().and_then(|value| value.parse())?);
            } else if meta.path.is_ident("ignore") {
                ignore = true;
            } else {
                return Err(meta.error("unsupported field attribute"));
            }

            Ok(())
        })?;

        Ok(Self {
            default,
            name,
            ignore,
        })
    }
}

pub struct BindAttributes {
    pub bean: bool,
    pub constructor: Option<ExprPath>,
}

impl TryFrom<&Attribute> for BindAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self, Self::Error> {
        let mut bean = false;
        let mut constructor = None;
        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("bean") {
                bean = true;
            } else if meta.path.is_ident("constructor") {
                let value = meta.value()?;
                let path: LitStr = value.parse()?;
                constructor = Some(path.parse()?);
            } else {
                return Err(meta.error("unsupported bind attribute"));
            }

            Ok(())
        })?;

        if bean && constructor.is_some() {
            return Err(Error::new_spanned(
                value,
                "Bean binding cannot use a constructor!",
            ));
        }

        Ok(Self { bean, constructor })
    }
}

pub struct VariantAttributes {
    pub name: Option<LitStr>,
}

impl TryFrom<&Attribute> for VariantAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self, Self::Error> {
        let mut name = None;
        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = Some(meta.value().and_then(|value| value.parse())?);
            } else {
                return Err(meta.error("unsupported variant attribute"));
            }

            Ok(())
        })?;

        Ok(Self { name })
    }
}
