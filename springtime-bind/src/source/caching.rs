//! Caching of name enumeration and descendant queries for sources where those are expensive.
//!
//! Caching is disabled by default. The [Binder](crate::binder::Binder) temporarily overrides
//! caching for the duration of each bind operation, so repeated queries made while binding a
//! single object graph do not hit the underlying source again.

use crate::name::ConfigurationPropertyName;
use crate::property::ConfigurationProperty;
use crate::ptr::SharedPtr;
use crate::source::{ConfigurationPropertySource, ConfigurationPropertyState};
use fxhash::FxHashMap;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::trace;

const DESCENDANT_CACHE_CAPACITY: usize = 1024;

#[derive(Default, Debug)]
struct CacheData {
    enabled: bool,
    time_to_live: Option<Duration>,
    override_depth: usize,
    names: Option<(Instant, Option<Vec<ConfigurationPropertyName>>)>,
    descendants: FxHashMap<ConfigurationPropertyName, (Instant, ConfigurationPropertyState)>,
}

impl CacheData {
    fn is_valid(&self, stored_at: Instant) -> bool {
        self.override_depth > 0
            || (self.enabled
                && self
                    .time_to_live
                    .map(|time_to_live| stored_at.elapsed() < time_to_live)
                    .unwrap_or(true))
    }

    fn is_active(&self) -> bool {
        self.enabled || self.override_depth > 0
    }

    fn clear(&mut self) {
        self.names = None;
        self.descendants.clear();
    }
}

/// Cache state shared between a caching source and its controllers.
#[derive(Default, Debug)]
pub struct ConfigurationPropertyCache {
    data: Mutex<CacheData>,
}

impl ConfigurationPropertyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&self) {
        self.data.lock().enabled = true;
    }

    pub fn disable(&self) {
        self.data.lock().enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.data.lock().enabled
    }

    /// Sets how long cached entries stay valid while caching is enabled. `None` means entries
    /// never expire.
    pub fn set_time_to_live(&self, time_to_live: Option<Duration>) {
        self.data.lock().time_to_live = time_to_live;
    }

    pub fn clear(&self) {
        self.data.lock().clear();
    }

    /// Enables caching, with entries never expiring, until the returned guard is dropped.
    /// Overrides can be nested. Stale entries are cleared when an override starts on a disabled
    /// cache.
    pub fn override_caching(self: SharedPtr<Self>) -> CacheOverride {
        {
            let mut data = self.data.lock();
            if data.override_depth == 0 && !data.enabled {
                data.clear();
            }

            data.override_depth += 1;
        }

        CacheOverride { cache: self }
    }

    fn end_override(&self) {
        let mut data = self.data.lock();
        data.override_depth = data.override_depth.saturating_sub(1);
    }

    fn property_names(
        &self,
        compute: impl FnOnce() -> Option<Vec<ConfigurationPropertyName>>,
    ) -> Option<Vec<ConfigurationPropertyName>> {
        {
            let data = self.data.lock();
            if let Some((stored_at, names)) = &data.names {
                if data.is_valid(*stored_at) {
                    return names.clone();
                }
            }
        }

        let names = compute();

        let mut data = self.data.lock();
        if data.is_active() {
            trace!("Caching property names");
            data.names = Some((Instant::now(), names.clone()));
        }

        names
    }

    fn descendant_state(
        &self,
        name: &ConfigurationPropertyName,
        compute: impl FnOnce() -> ConfigurationPropertyState,
    ) -> ConfigurationPropertyState {
        {
            let data = self.data.lock();
            if let Some((stored_at, state)) = data.descendants.get(name) {
                if data.is_valid(*stored_at) {
                    return *state;
                }
            }
        }

        let state = compute();

        let mut data = self.data.lock();
        if data.is_active() {
            if data.descendants.len() >= DESCENDANT_CACHE_CAPACITY
                && !data.descendants.contains_key(name)
            {
                trace!("Evicting descendant state cache");
                data.descendants.clear();
            }

            data.descendants
                .insert(name.clone(), (Instant::now(), state));
        }

        state
    }
}

/// Guard returned by [ConfigurationPropertyCache::override_caching]. Restores previous caching
/// behavior when dropped.
#[derive(Debug)]
pub struct CacheOverride {
    cache: SharedPtr<ConfigurationPropertyCache>,
}

impl Drop for CacheOverride {
    fn drop(&mut self) {
        self.cache.end_override();
    }
}

/// Wraps another source, caching name enumeration and descendant queries. Direct property
/// lookups are always delegated.
#[derive(Debug)]
pub struct CachingConfigurationPropertySource<S> {
    source: S,
    cache: SharedPtr<ConfigurationPropertyCache>,
}

impl<S: ConfigurationPropertySource> CachingConfigurationPropertySource<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: SharedPtr::new(ConfigurationPropertyCache::new()),
        }
    }

    pub fn cache(&self) -> &ConfigurationPropertyCache {
        &self.cache
    }

    pub fn inner(&self) -> &S {
        &self.source
    }
}

impl<S: ConfigurationPropertySource> ConfigurationPropertySource
    for CachingConfigurationPropertySource<S>
{
    fn configuration_property(
        &self,
        name: &ConfigurationPropertyName,
    ) -> Option<ConfigurationProperty> {
        self.source.configuration_property(name)
    }

    fn contains_descendant_of(&self, name: &ConfigurationPropertyName) -> ConfigurationPropertyState {
        self.cache
            .descendant_state(name, || self.source.contains_descendant_of(name))
    }

    fn property_names(&self) -> Option<Vec<ConfigurationPropertyName>> {
        self.cache.property_names(|| self.source.property_names())
    }

    fn is_iterable(&self) -> bool {
        self.source.is_iterable()
    }

    fn caching(&self) -> Option<SharedPtr<ConfigurationPropertyCache>> {
        Some(self.cache.clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::name::ConfigurationPropertyName;
    use crate::source::caching::{
        CachingConfigurationPropertySource, ConfigurationPropertyCache, DESCENDANT_CACHE_CAPACITY,
    };
    use crate::source::{
        ConfigurationPropertySource, ConfigurationPropertyState, MockConfigurationPropertySource,
    };
    use std::time::Duration;

    fn counting_source(times: usize) -> MockConfigurationPropertySource {
        let mut source = MockConfigurationPropertySource::new();
        source
            .expect_property_names()
            .times(times)
            .returning(|| Some(vec![ConfigurationPropertyName::of("a.b").unwrap()]));
        source
    }

    #[test]
    fn should_not_cache_when_disabled() {
        let source = CachingConfigurationPropertySource::new(counting_source(2));
        source.property_names();
        source.property_names();
    }

    #[test]
    fn should_cache_when_enabled() {
        let source = CachingConfigurationPropertySource::new(counting_source(1));
        source.cache().enable();
        source.property_names();
        source.property_names();
    }

    #[test]
    fn should_expire_entries() {
        let source = CachingConfigurationPropertySource::new(counting_source(2));
        source.cache().enable();
        source.cache().set_time_to_live(Some(Duration::ZERO));
        source.property_names();
        source.property_names();
    }

    #[test]
    fn should_cache_during_override() {
        let source = CachingConfigurationPropertySource::new(counting_source(3));
        {
            let _override = source.caching().unwrap().override_caching();
            source.property_names();
            source.property_names();
        }

        source.property_names();

        let _override = source.caching().unwrap().override_caching();
        source.property_names();
    }

    #[test]
    fn should_clear_cache() {
        let source = CachingConfigurationPropertySource::new(counting_source(2));
        source.cache().enable();
        source.property_names();
        source.cache().clear();
        source.property_names();
    }

    #[test]
    fn should_bound_descendant_cache() {
        let cache = ConfigurationPropertyCache::new();
        cache.enable();

        for index in 0..DESCENDANT_CACHE_CAPACITY * 3 {
            let name = ConfigurationPropertyName::empty().append_index(index);
            cache.descendant_state(&name, || ConfigurationPropertyState::Absent);
            assert!(cache.data.lock().descendants.len() <= DESCENDANT_CACHE_CAPACITY);
        }

        let name = ConfigurationPropertyName::of("a").unwrap();
        cache.descendant_state(&name, || ConfigurationPropertyState::Present);
        assert_eq!(
            cache.descendant_state(&name, || ConfigurationPropertyState::Absent),
            ConfigurationPropertyState::Present
        );
    }
}
