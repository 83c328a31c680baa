//! Resolution of `${...}` placeholders in property values.
//!
//! A placeholder names another property, optionally followed by a default value after `:`, e.g.
//! `${server.port:8080}`. Placeholders can be nested, both in names (`${${env}.url}`) and in
//! resolved values, which are resolved recursively. A placeholder prefix preceded by `\` is kept
//! literally.

use crate::error::PlaceholderError;
use crate::name::ConfigurationPropertyName;
use crate::property::PropertyValue;
use crate::ptr::SharedPtr;
use crate::source::PropertySourcePtr;
use tracing::trace;

const PREFIX: &str = "${";
const SUFFIX: &str = "}";
const SEPARATOR: char = ':';
const ESCAPE: char = '\\';

#[cfg(not(feature = "threadsafe"))]
pub type PlaceholdersResolverPtr = SharedPtr<dyn PlaceholdersResolver>;
#[cfg(feature = "threadsafe")]
pub type PlaceholdersResolverPtr = SharedPtr<dyn PlaceholdersResolver + Send + Sync>;

/// Resolves placeholders in values before they get converted.
pub trait PlaceholdersResolver {
    fn resolve_placeholders(&self, value: PropertyValue) -> Result<PropertyValue, PlaceholderError>;
}

/// Resolver returning values unchanged.
#[derive(Clone, Copy, Default, Debug)]
pub struct NoOpPlaceholdersResolver;

impl PlaceholdersResolver for NoOpPlaceholdersResolver {
    #[inline]
    fn resolve_placeholders(&self, value: PropertyValue) -> Result<PropertyValue, PlaceholderError> {
        Ok(value)
    }
}

/// Resolver looking up placeholder values in property sources, in source order.
#[derive(Clone)]
pub struct PropertySourcesPlaceholdersResolver {
    sources: Vec<PropertySourcePtr>,
    ignore_unresolvable: bool,
}

impl PropertySourcesPlaceholdersResolver {
    pub fn new(sources: Vec<PropertySourcePtr>) -> Self {
        Self {
            sources,
            ignore_unresolvable: false,
        }
    }

    /// Keeps unresolvable placeholders as they are, instead of reporting an error.
    pub fn with_ignore_unresolvable(mut self, ignore_unresolvable: bool) -> Self {
        self.ignore_unresolvable = ignore_unresolvable;
        self
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let name = ConfigurationPropertyName::of(key).ok()?;
        self.sources
            .iter()
            .find_map(|source| source.configuration_property(&name))
            .map(|property| property.value().to_string())
    }

    fn resolve_text(&self, value: &str) -> Result<String, PlaceholderError> {
        self.parse(value, value, &mut vec![])
    }

    fn parse(
        &self,
        value: &str,
        original: &str,
        visited: &mut Vec<String>,
    ) -> Result<String, PlaceholderError> {
        let mut result = String::with_capacity(value.len());
        let mut rest = value;

        while let Some(start) = rest.find(PREFIX) {
            if rest[..start].ends_with(ESCAPE) {
                result.push_str(&rest[..start - ESCAPE.len_utf8()]);
                result.push_str(PREFIX);
                rest = &rest[start + PREFIX.len()..];
                continue;
            }

            result.push_str(&rest[..start]);

            let content_start = start + PREFIX.len();
            let Some(end) = Self::find_placeholder_end(rest, content_start) else {
                result.push_str(&rest[start..]);
                return Ok(result);
            };

            let placeholder = &rest[content_start..end];
            let expression = self.parse(placeholder, original, visited)?;
            let (key, default) = match expression.split_once(SEPARATOR) {
                Some((key, default)) => (key.to_string(), Some(default.to_string())),
                None => (expression, None),
            };

            if visited.contains(&key) {
                return Err(PlaceholderError::CircularReference(key));
            }

            match self.lookup(&key) {
                Some(resolved) => {
                    trace!(placeholder = key, "Resolved placeholder");
                    visited.push(key);
                    let resolved = self.parse(&resolved, original, visited)?;
                    visited.pop();
                    result.push_str(&resolved);
                }
                None => match default {
                    Some(default) => {
                        let default = self.parse(&default, original, visited)?;
                        result.push_str(&default);
                    }
                    None if self.ignore_unresolvable => {
                        result.push_str(&rest[start..end + SUFFIX.len()]);
                    }
                    None => {
                        return Err(PlaceholderError::Unresolvable {
                            placeholder: key,
                            value: original.to_string(),
                        })
                    }
                },
            }

            rest = &rest[end + SUFFIX.len()..];
        }

        result.push_str(rest);
        Ok(result)
    }

    fn find_placeholder_end(value: &str, content_start: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut position = content_start;

        while position < value.len() {
            let rest = &value[position..];
            if rest.starts_with(PREFIX) {
                depth += 1;
                position += PREFIX.len();
            } else if rest.starts_with(SUFFIX) {
                if depth == 0 {
                    return Some(position);
                }

                depth -= 1;
                position += SUFFIX.len();
            } else {
                position += rest.chars().next().map(char::len_utf8).unwrap_or(1);
            }
        }

        None
    }
}

impl PlaceholdersResolver for PropertySourcesPlaceholdersResolver {
    fn resolve_placeholders(&self, value: PropertyValue) -> Result<PropertyValue, PlaceholderError> {
        match value {
            PropertyValue::Text(text) => self.resolve_text(&text).map(PropertyValue::Text),
            PropertyValue::Sequence(values) => values
                .into_iter()
                .map(|value| self.resolve_placeholders(value))
                .collect::<Result<Vec<_>, _>>()
                .map(PropertyValue::Sequence),
            value => Ok(value),
        }
    }
}
