//! Configuration property binding for strongly typed configuration.
//!
//! Configuration usually comes from loosely typed sources: environment variables, configuration
//! files or command line arguments. This crate maps such sources, seen as a tree of
//! [names](name::ConfigurationPropertyName) with [values](property::PropertyValue), onto strongly
//! typed objects. The [Binder](binder::Binder) walks the tree recursively, binding scalars,
//! collections, maps, arrays and nested data objects, resolving `${...}`
//! [placeholders](placeholder) and [converting](convert) values along the way.
//!
//! Any type implementing [Bind](descriptor::Bind) can be bound. Implementations exist for common
//! standard library types, while custom structs and enums usually use `#[derive(Bind)]`:
//!
//! ```
//! use springtime_bind::binder::Binder;
//! use springtime_bind::source::map::MapConfigurationPropertySource;
//! use springtime_bind::source::PropertySourcePtr;
//! use springtime_bind::ptr::SharedPtr;
//! use springtime_bind::Bind;
//!
//! fn default_host() -> String {
//!     "localhost".to_string()
//! }
//!
//! #[derive(Bind)]
//! struct ServerProperties {
//!     port: u16,
//!     #[bind(default = "default_host")]
//!     host: String,
//!     allowed_origins: Vec<String>,
//! }
//!
//! let source = MapConfigurationPropertySource::new()
//!     .with("server.port", "8080")
//!     .with("server.allowed-origins", "a.com, b.com");
//!
//! let binder = Binder::new(vec![SharedPtr::new(source) as PropertySourcePtr]);
//! let properties = binder
//!     .bind::<ServerProperties>("server")
//!     .unwrap()
//!     .get()
//!     .unwrap();
//!
//! assert_eq!(properties.port, 8080);
//! assert_eq!(properties.host, "localhost");
//! assert_eq!(properties.allowed_origins, ["a.com", "b.com"]);
//! ```
//!
//! ### Features
//!
//! * `threadsafe` - use threadsafe pointers and `Send + Sync` trait bounds
//! * `derive` - automatically import helper proc macros

mod aggregate;
pub mod bind_result;
pub mod bindable;
pub mod binder;
pub mod context;
pub mod convert;
pub mod data_object;
pub mod descriptor;
pub mod error;
pub mod handler;
pub mod name;
pub mod placeholder;
pub mod property;
pub mod ptr;
pub mod source;

#[cfg(feature = "derive")]
pub use springtime_bind_derive::{converter, Bind};
