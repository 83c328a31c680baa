//! Property sources backed by the process environment and configuration files.

use config::{Config, ConfigError, File, FileFormat, Source, Value, ValueKind};
use indexmap::IndexMap;
use itertools::Itertools;
use springtime_bind::name::ConfigurationPropertyName;
use springtime_bind::property::{ConfigurationProperty, PropertyValue};
use springtime_bind::source::map::MapConfigurationPropertySource;
use springtime_bind::source::{ConfigurationPropertySource, ConfigurationPropertyState};
use tracing::debug;

const ENV_SEPARATOR: char = '_';

/// Source of environment variables. Variable names are mapped to property names by splitting on
/// `_` and treating numeric segments as indexes, e.g. `SERVER_PORTS_0` becomes `server.ports[0]`.
/// Lookups of names containing dashes try both the collapsed form (`SERVER_MAXTHREADS` for
/// `server.max-threads`) and the form with dashes replaced by underscores (`SERVER_MAX_THREADS`).
#[derive(Clone, Debug)]
pub struct SystemEnvironmentPropertySource {
    variables: IndexMap<String, String>,
}

impl SystemEnvironmentPropertySource {
    /// Captures all current environment variables.
    pub fn new() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Captures current environment variables starting with `{prefix}_`.
    pub fn with_prefix(prefix: &str) -> Self {
        let prefix = format!("{}{ENV_SEPARATOR}", prefix.to_ascii_uppercase());
        Self::from_vars(
            std::env::vars().filter(|(key, _)| key.to_ascii_uppercase().starts_with(&prefix)),
        )
    }

    /// Creates a source from the given variables instead of the process environment.
    pub fn from_vars<K: Into<String>, V: Into<String>>(
        variables: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self {
            variables: variables
                .into_iter()
                .map(|(key, value)| (key.into().to_ascii_uppercase(), value.into()))
                .collect(),
        }
    }

    fn variable_name(key: &str) -> ConfigurationPropertyName {
        key.split(ENV_SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .fold(ConfigurationPropertyName::empty(), |name, segment| {
                if segment.bytes().all(|byte| byte.is_ascii_digit()) {
                    name.append_key(segment)
                } else {
                    name.append_name(&ConfigurationPropertyName::adapt(
                        &segment.to_ascii_lowercase(),
                        ENV_SEPARATOR,
                    ))
                }
            })
    }

    fn candidate_keys(name: &ConfigurationPropertyName) -> [String; 2] {
        let uniform = (0..name.len())
            .filter_map(|index| {
                if name.is_indexed(index) {
                    name.element(index)
                } else {
                    name.uniform_element(index)
                }
            })
            .join("_");

        let legacy = name.elements().join("_").replace(['-', '.'], "_");

        [uniform.to_ascii_uppercase(), legacy.to_ascii_uppercase()]
    }
}

impl Default for SystemEnvironmentPropertySource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationPropertySource for SystemEnvironmentPropertySource {
    fn configuration_property(
        &self,
        name: &ConfigurationPropertyName,
    ) -> Option<ConfigurationProperty> {
        if name.is_empty() {
            return None;
        }

        Self::candidate_keys(name).into_iter().find_map(|key| {
            self.variables.get(&key).map(|value| {
                ConfigurationProperty::new(
                    name.clone(),
                    PropertyValue::Text(value.clone()),
                    Some(format!("System environment property \"{key}\"")),
                )
            })
        })
    }

    fn contains_descendant_of(&self, name: &ConfigurationPropertyName) -> ConfigurationPropertyState {
        // names are matched against raw keys, since splitting on every separator loses dashes
        let found = if name.is_empty() {
            !self.variables.is_empty()
        } else {
            let prefixes = Self::candidate_keys(name).map(|key| format!("{key}{ENV_SEPARATOR}"));
            self.variables
                .keys()
                .any(|key| prefixes.iter().any(|prefix| key.starts_with(prefix.as_str())))
        };

        if found {
            ConfigurationPropertyState::Present
        } else {
            ConfigurationPropertyState::Absent
        }
    }

    fn property_names(&self) -> Option<Vec<ConfigurationPropertyName>> {
        Some(
            self.variables
                .keys()
                .map(|key| Self::variable_name(key))
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }

    fn is_iterable(&self) -> bool {
        true
    }
}

/// Source of properties read from a configuration file through the [config] crate. Nested tables
/// become nested names, while arrays become indexed names, so
/// `{"server": {"ports": [80, 443]}}` yields `server.ports[0]` and `server.ports[1]`. Native value
/// types are preserved.
#[derive(Clone, Debug)]
pub struct ConfigFilePropertySource {
    properties: MapConfigurationPropertySource,
}

impl ConfigFilePropertySource {
    /// Loads the file with the given name, which may omit the extension. A missing file results in
    /// an empty source.
    pub fn load(name: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(name).required(false))
            .build()?;

        Self::from_config(&config, name)
    }

    /// Parses configuration given directly as a string in the given format.
    pub fn from_content(content: &str, format: FileFormat) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(content, format))
            .build()?;

        Self::from_config(&config, "inline configuration")
    }

    fn from_config(config: &Config, origin: &str) -> Result<Self, ConfigError> {
        let mut properties =
            MapConfigurationPropertySource::named(format!("Config file \"{origin}\""));

        for (key, value) in config.collect()? {
            Self::flatten(
                &Self::key_name(&ConfigurationPropertyName::empty(), &key),
                value,
                &mut properties,
            );
        }

        debug!(origin, count = properties.len(), "Loaded configuration file properties");

        Ok(Self { properties })
    }

    fn key_name(parent: &ConfigurationPropertyName, key: &str) -> ConfigurationPropertyName {
        parent
            .append(key)
            .unwrap_or_else(|_| parent.append_key(key))
    }

    fn flatten(
        name: &ConfigurationPropertyName,
        value: Value,
        properties: &mut MapConfigurationPropertySource,
    ) {
        let value = match value.kind {
            ValueKind::Nil => return,
            ValueKind::Boolean(value) => PropertyValue::Boolean(value),
            ValueKind::I64(value) => PropertyValue::Integer(value),
            ValueKind::I128(value) => Self::integer(value),
            ValueKind::U64(value) => Self::integer(value),
            ValueKind::U128(value) => Self::integer(value),
            ValueKind::Float(value) => PropertyValue::Float(value),
            ValueKind::String(value) => PropertyValue::Text(value),
            ValueKind::Table(table) => {
                for (key, value) in table {
                    Self::flatten(&Self::key_name(name, &key), value, properties);
                }

                return;
            }
            ValueKind::Array(values) if values.is_empty() => PropertyValue::Sequence(vec![]),
            ValueKind::Array(values) => {
                for (index, value) in values.into_iter().enumerate() {
                    Self::flatten(&name.append_index(index), value, properties);
                }

                return;
            }
        };

        properties.insert(name.clone(), value);
    }

    fn integer<T: TryInto<i64> + ToString + Copy>(value: T) -> PropertyValue {
        value
            .try_into()
            .map(PropertyValue::Integer)
            .unwrap_or_else(|_| PropertyValue::Text(value.to_string()))
    }
}

impl ConfigurationPropertySource for ConfigFilePropertySource {
    fn configuration_property(
        &self,
        name: &ConfigurationPropertyName,
    ) -> Option<ConfigurationProperty> {
        self.properties.configuration_property(name)
    }

    fn contains_descendant_of(&self, name: &ConfigurationPropertyName) -> ConfigurationPropertyState {
        self.properties.contains_descendant_of(name)
    }

    fn property_names(&self) -> Option<Vec<ConfigurationPropertyName>> {
        self.properties.property_names()
    }

    fn is_iterable(&self) -> bool {
        true
    }
}
