//! Core application framework functionality.

use crate::config::{ApplicationConfig, CONFIG_PREFIX};
use crate::environment::{Environment, EnvironmentError};
use springtime_bind::bind_result::BindResult;
use springtime_bind::binder::Binder;
use springtime_bind::descriptor::Bind;
use springtime_bind::error::BindError;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Error creating environment: {0}")]
    EnvironmentError(#[from] EnvironmentError),
    #[error("Error binding application config: {0}")]
    ConfigError(BindError),
}

/// Main entrypoint for the application. Binds [ApplicationConfig] from the [Environment] and sets
/// up supporting infrastructure, e.g. logging. Configuration of the application itself can then
/// be bound with [Application::bind].
pub struct Application {
    environment: Environment,
    binder: Binder,
    config: ApplicationConfig,
}

impl Application {
    pub fn new(environment: Environment) -> Result<Self, ApplicationError> {
        let binder = environment.binder();
        let config = binder
            .bind_or_create::<ApplicationConfig>(CONFIG_PREFIX)
            .map_err(ApplicationError::ConfigError)?;

        if config.install_tracing_logger {
            Self::install_tracing_logger();
        }

        info!("Application environment ready");

        Ok(Self {
            environment,
            binder,
            config,
        })
    }

    /// Creates an application using the default [Environment].
    pub fn from_default_environment() -> Result<Self, ApplicationError> {
        Self::new(Environment::from_default_sources()?)
    }

    #[inline]
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    #[inline]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    #[inline]
    pub fn binder(&self) -> &Binder {
        &self.binder
    }

    /// Binds properties under the given name to a new instance of `T`.
    pub fn bind<T: Bind>(&self, name: &str) -> Result<BindResult<T>, BindError> {
        self.binder.bind(name)
    }

    fn install_tracing_logger() {
        // a logger might have been installed already
        if let Err(error) = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init()
        {
            debug!(%error, "Tracing logger not installed");
        }
    }
}
