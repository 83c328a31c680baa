//! Shared pointer aliases switched by the `threadsafe` feature.

#[cfg(not(feature = "threadsafe"))]
use std::rc::Rc;
#[cfg(feature = "threadsafe")]
use std::sync::Arc;

#[cfg(not(feature = "threadsafe"))]
pub type SharedPtr<T> = Rc<T>;
#[cfg(feature = "threadsafe")]
pub type SharedPtr<T> = Arc<T>;
