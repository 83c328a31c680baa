//! Raw property values as provided by sources.

use crate::name::ConfigurationPropertyName;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// Loosely-typed value of a single property. Most sources provide [PropertyValue::Text], while
/// structured sources (e.g. configuration files) can preserve native types.
#[derive(Clone, PartialEq, Debug)]
pub enum PropertyValue {
    Text(String),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Sequence(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Short description of the value kind, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Text(_) => "text",
            PropertyValue::Boolean(_) => "boolean",
            PropertyValue::Integer(_) => "integer",
            PropertyValue::Float(_) => "float",
            PropertyValue::Sequence(_) => "sequence",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Checks if this is text without any characters.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, PropertyValue::Text(text) if text.is_empty())
    }

    /// Splits the value into elements of an aggregate. Text is treated as a comma-delimited list
    /// with each element trimmed, while sequences yield their elements.
    pub fn into_elements(self) -> Vec<PropertyValue> {
        match self {
            PropertyValue::Sequence(elements) => elements,
            PropertyValue::Text(text) => {
                if text.trim().is_empty() {
                    vec![]
                } else {
                    text.split(',')
                        .map(|element| PropertyValue::Text(element.trim().to_string()))
                        .collect()
                }
            }
            value => vec![value],
        }
    }
}

impl Display for PropertyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Text(value) => f.write_str(value),
            PropertyValue::Boolean(value) => write!(f, "{value}"),
            PropertyValue::Integer(value) => write!(f, "{value}"),
            PropertyValue::Float(value) => write!(f, "{value}"),
            PropertyValue::Sequence(values) => write!(f, "{}", values.iter().join(",")),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Integer(value.into())
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(values: Vec<T>) -> Self {
        PropertyValue::Sequence(values.into_iter().map(Into::into).collect())
    }
}

/// A single property found in a source, together with an optional description of its origin.
#[derive(Clone, PartialEq, Debug)]
pub struct ConfigurationProperty {
    name: ConfigurationPropertyName,
    value: PropertyValue,
    origin: Option<String>,
}

impl ConfigurationProperty {
    pub fn new(
        name: ConfigurationPropertyName,
        value: PropertyValue,
        origin: Option<String>,
    ) -> Self {
        Self {
            name,
            value,
            origin,
        }
    }

    #[inline]
    pub fn name(&self) -> &ConfigurationPropertyName {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    #[inline]
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }
}

impl Display for ConfigurationProperty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] = '{}'", self.name, self.value)?;
        if let Some(origin) = &self.origin {
            write!(f, " from {origin}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::property::PropertyValue;

    #[test]
    fn should_split_delimited_text() {
        assert_eq!(
            PropertyValue::from(" a, b ,c").into_elements(),
            vec![
                PropertyValue::from("a"),
                PropertyValue::from("b"),
                PropertyValue::from("c")
            ]
        );
        assert!(PropertyValue::from("  ").into_elements().is_empty());
        assert_eq!(
            PropertyValue::Integer(5).into_elements(),
            vec![PropertyValue::Integer(5)]
        );
    }

    #[test]
    fn should_display_sequences_delimited() {
        let value = PropertyValue::from(vec![1, 2, 3]);
        assert_eq!(value.to_string(), "1,2,3");
    }
}
