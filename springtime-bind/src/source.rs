//! Sources of configuration properties. A [ConfigurationPropertySource] answers property lookups
//! by [ConfigurationPropertyName] and can optionally enumerate all names it knows about, which
//! allows the binder to discover map keys and collection indexes, and to skip lookups under names
//! without descendants.

pub mod caching;
pub mod map;

use crate::name::ConfigurationPropertyName;
use crate::property::ConfigurationProperty;
use crate::ptr::SharedPtr;
use crate::source::caching::ConfigurationPropertyCache;
#[cfg(test)]
use mockall::automock;

#[cfg(not(feature = "threadsafe"))]
pub type PropertySourcePtr = SharedPtr<dyn ConfigurationPropertySource>;
#[cfg(feature = "threadsafe")]
pub type PropertySourcePtr = SharedPtr<dyn ConfigurationPropertySource + Send + Sync>;

/// Knowledge of a source about the presence of descendants of some name.
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum ConfigurationPropertyState {
    Present,
    Absent,
    /// The source cannot determine if descendants exist, e.g. because it cannot enumerate names.
    Unknown,
}

impl ConfigurationPropertyState {
    /// Returns [ConfigurationPropertyState::Present] if any of the names match the predicate,
    /// [ConfigurationPropertyState::Absent] otherwise.
    pub fn search<'a>(
        names: impl IntoIterator<Item = &'a ConfigurationPropertyName>,
        predicate: impl Fn(&ConfigurationPropertyName) -> bool,
    ) -> Self {
        if names.into_iter().any(predicate) {
            ConfigurationPropertyState::Present
        } else {
            ConfigurationPropertyState::Absent
        }
    }
}

/// A source of configuration properties.
#[cfg_attr(test, automock)]
pub trait ConfigurationPropertySource {
    /// Looks up a single property by exact name.
    fn configuration_property(
        &self,
        name: &ConfigurationPropertyName,
    ) -> Option<ConfigurationProperty>;

    /// Reports if the source contains any properties under the given name. Iterable sources answer
    /// definitively by searching their names.
    fn contains_descendant_of(&self, name: &ConfigurationPropertyName) -> ConfigurationPropertyState {
        self.property_names()
            .map(|names| {
                ConfigurationPropertyState::search(&names, |candidate| {
                    name.is_ancestor_of(candidate)
                })
            })
            .unwrap_or(ConfigurationPropertyState::Unknown)
    }

    /// Enumerates all names in this source, if the source is iterable.
    fn property_names(&self) -> Option<Vec<ConfigurationPropertyName>> {
        None
    }

    /// Checks if [ConfigurationPropertySource::property_names] can enumerate names.
    fn is_iterable(&self) -> bool {
        false
    }

    /// Returns the cache controlling this source, if the source caches its answers.
    fn caching(&self) -> Option<SharedPtr<ConfigurationPropertyCache>> {
        None
    }
}
