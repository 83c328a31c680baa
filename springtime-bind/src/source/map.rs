//! In-memory property source backed by an insertion-ordered map.

use crate::name::ConfigurationPropertyName;
use crate::property::{ConfigurationProperty, PropertyValue};
use crate::source::{ConfigurationPropertySource, ConfigurationPropertyState};
use indexmap::IndexMap;

/// Iterable source holding properties in memory. Names given as strings are adapted leniently
/// using `.` as the separator. Iteration follows insertion order.
#[derive(Clone, Default, Debug)]
pub struct MapConfigurationPropertySource {
    origin: Option<String>,
    properties: IndexMap<ConfigurationPropertyName, PropertyValue>,
}

impl MapConfigurationPropertySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty source, which describes the origin of its properties with given name.
    pub fn named(origin: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            properties: Default::default(),
        }
    }

    /// Adds a property, replacing any existing value under an equal name.
    pub fn put(&mut self, name: &str, value: impl Into<PropertyValue>) {
        self.insert(ConfigurationPropertyName::adapt(name, '.'), value.into());
    }

    pub fn insert(&mut self, name: ConfigurationPropertyName, value: PropertyValue) {
        if !name.is_empty() {
            self.properties.insert(name, value);
        }
    }

    /// Builder-style version of [MapConfigurationPropertySource::put].
    pub fn with(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.put(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<PropertyValue>> FromIterator<(K, V)> for MapConfigurationPropertySource {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut source = Self::new();
        for (name, value) in iter {
            source.put(name.as_ref(), value);
        }

        source
    }
}

impl ConfigurationPropertySource for MapConfigurationPropertySource {
    fn configuration_property(
        &self,
        name: &ConfigurationPropertyName,
    ) -> Option<ConfigurationProperty> {
        self.properties.get_key_value(name).map(|(key, value)| {
            ConfigurationProperty::new(key.clone(), value.clone(), self.origin.clone())
        })
    }

    fn contains_descendant_of(&self, name: &ConfigurationPropertyName) -> ConfigurationPropertyState {
        ConfigurationPropertyState::search(self.properties.keys(), |candidate| {
            name.is_ancestor_of(candidate)
        })
    }

    fn property_names(&self) -> Option<Vec<ConfigurationPropertyName>> {
        Some(self.properties.keys().cloned().collect())
    }

    fn is_iterable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::name::ConfigurationPropertyName;
    use crate::property::PropertyValue;
    use crate::source::map::MapConfigurationPropertySource;
    use crate::source::ConfigurationPropertySource;

    #[test]
    fn should_lookup_by_equivalent_name() {
        let source = MapConfigurationPropertySource::named("test")
            .with("server.max_threads", 10);

        let property = source
            .configuration_property(&ConfigurationPropertyName::of("server.max-threads").unwrap())
            .unwrap();
        assert_eq!(property.value(), &PropertyValue::Integer(10));
        assert_eq!(property.origin(), Some("test"));
    }

    #[test]
    fn should_keep_insertion_order() {
        let source: MapConfigurationPropertySource =
            [("b", "1"), ("a", "2"), ("c", "3")].into_iter().collect();

        let names = source
            .property_names()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn should_replace_equal_names() {
        let source = MapConfigurationPropertySource::new()
            .with("a.b-c", "1")
            .with("A.B_C", "2");

        assert_eq!(source.len(), 1);
        assert_eq!(
            source
                .configuration_property(&ConfigurationPropertyName::of("a.bc").unwrap())
                .unwrap()
                .value(),
            &PropertyValue::from("2")
        );
    }
}
