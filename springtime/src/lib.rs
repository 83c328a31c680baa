//! Application framework based on [springtime_bind] configuration binding.
//!
//! Applications usually need configuration coming from multiple places: configuration files,
//! environment variables or programmatic defaults. This crate assembles such places into an
//! ordered [Environment](environment::Environment) of property sources and provides an entrypoint
//! in the form of [Application](application::Application), which binds framework configuration
//! and configures additional supporting infrastructure, e.g. logging. Any other configuration can
//! then be bound from the same environment:
//!
//! ```
//! use springtime::application::Application;
//! use springtime::environment::Environment;
//! use springtime_bind::source::map::MapConfigurationPropertySource;
//! use springtime_bind::Bind;
//!
//! #[derive(Bind)]
//! struct DatabaseProperties {
//!     url: String,
//!     #[bind(default)]
//!     pool_size: u8,
//! }
//!
//! let environment = Environment::builder()
//!     .with_environment_variables(false)
//!     .with_default_properties(
//!         MapConfigurationPropertySource::new()
//!             .with("springtime.install-tracing-logger", "false")
//!             .with("database.url", "postgres://localhost/db"),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let application = Application::new(environment).unwrap();
//! let database = application
//!     .bind::<DatabaseProperties>("database")
//!     .unwrap()
//!     .get()
//!     .unwrap();
//!
//! assert_eq!(database.url, "postgres://localhost/db");
//! ```
//!
//! ### Features
//!
//! * `threadsafe` - use threadsafe pointers and `Send + Sync` trait bounds

pub mod application;
pub mod config;
pub mod environment;
pub mod source;
