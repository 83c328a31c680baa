//! Binding of data objects: value objects created through a constructor taking all properties,
//! and beans created with defaults and populated property by property.

mod bean;
mod value_object;

pub(crate) use bean::BeanBinder;
pub(crate) use value_object::ValueObjectBinder;

use crate::bindable::Bindable;
use crate::context::Context;
use crate::descriptor::{BoundValue, ConstructorDescriptor, DataObjectDescriptor};
use crate::error::BindError;
use crate::name::ConfigurationPropertyName;
#[cfg(test)]
use mockall::automock;

/// Binds a single named property of a data object.
pub(crate) trait DataObjectPropertyBinder {
    fn bind_property(
        &self,
        context: &mut Context<'_>,
        property_name: &str,
        target: Bindable,
    ) -> Result<Option<BoundValue>, BindError>;
}

/// Strategy for binding and creating data objects.
pub(crate) trait DataObjectBinder {
    /// Binds a data object under given name. Returns `None` if the strategy does not apply to the
    /// target or nothing was bound.
    fn bind(
        &self,
        name: &ConfigurationPropertyName,
        target: &Bindable,
        context: &mut Context<'_>,
        property_binder: &dyn DataObjectPropertyBinder,
    ) -> Result<Option<BoundValue>, BindError>;

    /// Creates an instance without any bound properties, if possible.
    fn create(&self, target: &Bindable, context: &mut Context<'_>) -> Option<BoundValue>;

    /// Called when no strategy was able to create an instance.
    fn on_unable_to_create_instance(&self, _target: &Bindable, _context: &Context<'_>) {}
}

/// Strategy selecting the constructor used for value object binding.
#[cfg_attr(test, automock)]
pub trait BindConstructorProvider {
    /// Returns the constructor to bind with, if any. Nested constructor binding means the target
    /// is a property of another value object being bound.
    fn bind_constructor(
        &self,
        target: &Bindable,
        descriptor: &DataObjectDescriptor,
        is_nested_constructor_binding: bool,
    ) -> Option<ConstructorDescriptor>;
}

#[cfg(not(feature = "threadsafe"))]
pub type BindConstructorProviderPtr = crate::ptr::SharedPtr<dyn BindConstructorProvider>;
#[cfg(feature = "threadsafe")]
pub type BindConstructorProviderPtr =
    crate::ptr::SharedPtr<dyn BindConstructorProvider + Send + Sync>;

/// Returns the declared constructor, unless the target also supports bean binding and an existing
/// value is available for a top-level binding, in which case the existing value is populated
/// instead.
#[derive(Clone, Copy, Default, Debug)]
pub struct DefaultBindConstructorProvider;

impl BindConstructorProvider for DefaultBindConstructorProvider {
    fn bind_constructor(
        &self,
        target: &Bindable,
        descriptor: &DataObjectDescriptor,
        is_nested_constructor_binding: bool,
    ) -> Option<ConstructorDescriptor> {
        if descriptor.bean.is_some() && target.has_value() && !is_nested_constructor_binding {
            return None;
        }

        descriptor.constructor.clone()
    }
}
