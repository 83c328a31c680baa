//! Ordered property sources making up the application [Environment].
//!
//! The default environment consists of, in order of precedence:
//!
//! 1. Additional sources registered with [EnvironmentBuilder::with_source].
//! 2. Environment variables.
//! 3. The [CONFIG_FILE] configuration file.
//! 4. Default properties registered with [EnvironmentBuilder::with_default_properties].

use crate::config::CONFIG_FILE;
use crate::source::{ConfigFilePropertySource, SystemEnvironmentPropertySource};
use config::ConfigError;
use derive_more::Constructor;
use springtime_bind::binder::Binder;
use springtime_bind::ptr::SharedPtr;
use springtime_bind::source::caching::CachingConfigurationPropertySource;
use springtime_bind::source::map::MapConfigurationPropertySource;
use springtime_bind::source::{ConfigurationPropertySource, PropertySourcePtr};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("Error loading configuration file: {0}")]
    ConfigFile(#[from] ConfigError),
}

/// Ordered collection of property sources, with earlier sources taking precedence.
#[derive(Constructor, Clone)]
pub struct Environment {
    sources: Vec<PropertySourcePtr>,
}

impl Environment {
    pub fn builder() -> EnvironmentBuilder {
        EnvironmentBuilder::new()
    }

    /// Creates the default environment: environment variables and the default configuration file.
    pub fn from_default_sources() -> Result<Self, EnvironmentError> {
        Self::builder().build()
    }

    #[inline]
    pub fn sources(&self) -> &[PropertySourcePtr] {
        &self.sources
    }

    /// Creates a binder over all sources of this environment, resolving `${...}` placeholders
    /// against the same sources.
    pub fn binder(&self) -> Binder {
        Binder::builder()
            .with_sources(self.sources.iter().cloned())
            .with_source_placeholders()
            .build()
    }
}

/// Builder for an [Environment].
pub struct EnvironmentBuilder {
    sources: Vec<PropertySourcePtr>,
    environment_variables: bool,
    environment_prefix: Option<String>,
    config_file: Option<String>,
    default_properties: Option<MapConfigurationPropertySource>,
    caching: bool,
}

impl EnvironmentBuilder {
    pub fn new() -> Self {
        Self {
            sources: vec![],
            environment_variables: true,
            environment_prefix: None,
            config_file: Some(CONFIG_FILE.to_string()),
            default_properties: None,
            caching: true,
        }
    }

    /// Adds a source taking precedence over all standard sources. Sources added earlier take
    /// precedence over ones added later.
    pub fn with_source(mut self, source: PropertySourcePtr) -> Self {
        self.sources.push(source);
        self
    }

    /// Enables or disables reading environment variables. Enabled by default.
    pub fn with_environment_variables(mut self, enabled: bool) -> Self {
        self.environment_variables = enabled;
        self
    }

    /// Only reads environment variables starting with `{prefix}_`.
    pub fn with_environment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.environment_prefix = Some(prefix.into());
        self
    }

    /// Sets the name of the configuration file, or disables reading one with `None`. The file is
    /// optional and can use any format supported by the [config] crate.
    pub fn with_config_file(mut self, config_file: Option<String>) -> Self {
        self.config_file = config_file;
        self
    }

    /// Sets properties with the lowest precedence.
    pub fn with_default_properties(mut self, properties: MapConfigurationPropertySource) -> Self {
        self.default_properties = Some(properties);
        self
    }

    /// Wraps environment variables and the configuration file in caching sources. Enabled by
    /// default.
    pub fn with_caching(mut self, caching: bool) -> Self {
        self.caching = caching;
        self
    }

    pub fn build(self) -> Result<Environment, EnvironmentError> {
        let mut sources = self.sources;

        if self.environment_variables {
            let source = match &self.environment_prefix {
                Some(prefix) => SystemEnvironmentPropertySource::with_prefix(prefix),
                None => SystemEnvironmentPropertySource::new(),
            };
            sources.push(Self::wrap(source, self.caching));
        }

        if let Some(config_file) = &self.config_file {
            debug!(%config_file, "Loading configuration file");
            sources.push(Self::wrap(
                ConfigFilePropertySource::load(config_file)?,
                self.caching,
            ));
        }

        if let Some(default_properties) = self.default_properties {
            sources.push(SharedPtr::new(default_properties) as PropertySourcePtr);
        }

        Ok(Environment::new(sources))
    }

    #[cfg(feature = "threadsafe")]
    fn wrap<S: ConfigurationPropertySource + Send + Sync + 'static>(
        source: S,
        caching: bool,
    ) -> PropertySourcePtr {
        if caching {
            SharedPtr::new(CachingConfigurationPropertySource::new(source)) as PropertySourcePtr
        } else {
            SharedPtr::new(source) as PropertySourcePtr
        }
    }

    #[cfg(not(feature = "threadsafe"))]
    fn wrap<S: ConfigurationPropertySource + 'static>(
        source: S,
        caching: bool,
    ) -> PropertySourcePtr {
        if caching {
            SharedPtr::new(CachingConfigurationPropertySource::new(source)) as PropertySourcePtr
        } else {
            SharedPtr::new(source) as PropertySourcePtr
        }
    }
}

impl Default for EnvironmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
