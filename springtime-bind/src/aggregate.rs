//! Binding of maps, collections and arrays.
//!
//! Aggregates are bound from descendants of the target name. Maps discover their keys by iterating
//! source names, while collections and arrays look up consecutive indexes (`list[0]`, `list[1]`, ...)
//! or take a whole delimited value given directly under the target name. Elements are bound with
//! the binder itself, so they can be arbitrary bind targets.

mod indexed;
mod map;

use crate::bindable::Bindable;
use crate::context::Context;
use crate::descriptor::{ArrayDescriptor, BoundValue, CollectionDescriptor, MapDescriptor, TypeKind};
use crate::error::BindError;
use crate::name::ConfigurationPropertyName;
use crate::source::PropertySourcePtr;

/// Binds a single element of an aggregate.
pub(crate) trait AggregateElementBinder {
    /// Binds the element under given name. If a source is given, lookups are restricted to it.
    fn bind_element(
        &self,
        context: &mut Context<'_>,
        name: &ConfigurationPropertyName,
        target: Bindable,
        source: Option<&PropertySourcePtr>,
    ) -> Result<Option<BoundValue>, BindError>;
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum AggregateBinder {
    Map(MapDescriptor),
    Collection(CollectionDescriptor),
    Array(ArrayDescriptor),
}

impl AggregateBinder {
    pub(crate) fn for_target(target: &Bindable) -> Option<Self> {
        match target.type_descriptor().kind() {
            TypeKind::Map(descriptor) => Some(AggregateBinder::Map(*descriptor)),
            TypeKind::Collection(descriptor) => Some(AggregateBinder::Collection(*descriptor)),
            TypeKind::Array(descriptor) => Some(AggregateBinder::Array(*descriptor)),
            _ => None,
        }
    }

    /// Checks if elements bound from the given source may be data objects of a type currently
    /// being bound. Maps always allow it, while indexed aggregates only allow it for iterable
    /// sources, which guarantee the recursion ends.
    pub(crate) fn is_allow_recursive_binding(&self, source: Option<&PropertySourcePtr>) -> bool {
        match self {
            AggregateBinder::Map(_) => true,
            AggregateBinder::Collection(_) | AggregateBinder::Array(_) => {
                source.map(|source| source.is_iterable()).unwrap_or(true)
            }
        }
    }

    pub(crate) fn bind(
        &self,
        context: &mut Context<'_>,
        name: &ConfigurationPropertyName,
        target: &Bindable,
        element_binder: &dyn AggregateElementBinder,
    ) -> Result<Option<BoundValue>, BindError> {
        match self {
            AggregateBinder::Map(descriptor) => {
                let Some(result) = map::bind(descriptor, context, name, target, element_binder)?
                else {
                    return Ok(None);
                };

                Ok(Some(match target.take_value() {
                    Some(existing) => (descriptor.merge)(existing, result),
                    None => result,
                }))
            }
            AggregateBinder::Collection(descriptor) => {
                let elements = indexed::bind(
                    context,
                    name,
                    target,
                    (descriptor.element)(),
                    element_binder,
                )?;

                Ok(elements.map(|elements| {
                    let mut collection = (descriptor.create)();
                    for element in elements {
                        (descriptor.push)(collection.as_mut(), element);
                    }

                    collection
                }))
            }
            AggregateBinder::Array(descriptor) => {
                let Some(elements) = indexed::bind(
                    context,
                    name,
                    target,
                    (descriptor.element)(),
                    element_binder,
                )?
                else {
                    return Ok(None);
                };

                let actual = elements.len();
                (descriptor.from_elements)(elements)
                    .map(Some)
                    .ok_or_else(|| BindError::ArrayLength {
                        target_type: target.type_descriptor().type_name(),
                        expected: descriptor.len,
                        actual,
                    })
            }
        }
    }
}
