//! Framework configuration is bound from the [Environment](crate::environment::Environment) under
//! the [CONFIG_PREFIX] name. [Application](crate::application::Application) uses this config to
//! configure itself.
//!
//! By default, the config is created with opinionated default values, which can then be overwritten
//! by environment variables prefixed with `SPRINGTIME_` or the `springtime.json` file, e.g.
//! `SPRINGTIME_INSTALL_TRACING_LOGGER=false`.

use springtime_bind::Bind;

/// Name of the default config file.
pub const CONFIG_FILE: &str = "springtime.json";

/// Name under which [ApplicationConfig] is bound.
pub const CONFIG_PREFIX: &str = "springtime";

fn default_install_tracing_logger() -> bool {
    true
}

/// Framework configuration.
#[non_exhaustive]
#[derive(Bind, Clone, Debug)]
pub struct ApplicationConfig {
    /// Should a default tracing logger be installed in the scope of the application.
    #[bind(default = "default_install_tracing_logger")]
    pub install_tracing_logger: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            install_tracing_logger: default_install_tracing_logger(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ApplicationConfig, CONFIG_PREFIX};
    use springtime_bind::binder::Binder;
    use springtime_bind::ptr::SharedPtr;
    use springtime_bind::source::map::MapConfigurationPropertySource;
    use springtime_bind::source::PropertySourcePtr;

    fn binder(source: MapConfigurationPropertySource) -> Binder {
        Binder::new(vec![SharedPtr::new(source) as PropertySourcePtr])
    }

    #[test]
    fn should_create_default_config() {
        let config = binder(MapConfigurationPropertySource::new())
            .bind_or_create::<ApplicationConfig>(CONFIG_PREFIX)
            .unwrap();
        assert!(config.install_tracing_logger);
    }

    #[test]
    fn should_bind_config() {
        let config = binder(
            MapConfigurationPropertySource::new().with("springtime.install_tracing_logger", "off"),
        )
        .bind_or_create::<ApplicationConfig>(CONFIG_PREFIX)
        .unwrap();
        assert!(!config.install_tracing_logger);
    }
}
