//! Bind targets.

use crate::descriptor::{Bind, BoundValue, TypeDescriptor};
use derivative::Derivative;
use fxhash::FxHashSet;
use std::cell::RefCell;
use std::rc::Rc;

/// Preferred strategy for binding data objects.
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum BindMethod {
    /// Bind by calling a constructor with all properties.
    ValueObject,
    /// Bind by creating a default instance and setting individual properties.
    Bean,
}

/// Restrictions applied to a bind target.
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum BindRestriction {
    /// Do not look up a property under the exact target name, only under its descendants.
    NoDirectProperty,
}

/// Description of what to bind: the target type, an optional existing value to bind into,
/// an optional binding method hint and restrictions.
///
/// The existing value is handed over to the first part of the binding process which consumes it,
/// e.g. a bean populated in place or a map merged with newly bound entries.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct Bindable {
    type_descriptor: TypeDescriptor,
    #[derivative(Debug = "ignore")]
    value: Option<Rc<RefCell<Option<BoundValue>>>>,
    bind_method: Option<BindMethod>,
    restrictions: FxHashSet<BindRestriction>,
}

impl Bindable {
    pub fn of<T: Bind>() -> Self {
        Self::of_type(T::type_descriptor())
    }

    pub fn of_type(type_descriptor: TypeDescriptor) -> Self {
        Self {
            type_descriptor,
            value: None,
            bind_method: None,
            restrictions: Default::default(),
        }
    }

    /// Sets an existing value to bind into. The value should be of the target type.
    pub fn with_existing_value<T: 'static>(self, value: T) -> Self {
        self.with_value(Box::new(value))
    }

    /// Type-erased version of [Bindable::with_existing_value].
    pub fn with_value(mut self, value: BoundValue) -> Self {
        self.value = Some(Rc::new(RefCell::new(Some(value))));
        self
    }

    pub fn with_bind_method(mut self, bind_method: Option<BindMethod>) -> Self {
        self.bind_method = bind_method;
        self
    }

    pub fn with_bind_restrictions(
        mut self,
        restrictions: impl IntoIterator<Item = BindRestriction>,
    ) -> Self {
        self.restrictions.extend(restrictions);
        self
    }

    /// Creates a target for another type, keeping the bind method and restrictions.
    pub(crate) fn with_type(&self, type_descriptor: TypeDescriptor) -> Self {
        Self {
            type_descriptor,
            value: None,
            bind_method: self.bind_method,
            restrictions: self.restrictions.clone(),
        }
    }

    #[inline]
    pub fn type_descriptor(&self) -> &TypeDescriptor {
        &self.type_descriptor
    }

    #[inline]
    pub fn bind_method(&self) -> Option<BindMethod> {
        self.bind_method
    }

    pub fn has_bind_restriction(&self, restriction: BindRestriction) -> bool {
        self.restrictions.contains(&restriction)
    }

    /// Checks if an existing value is available.
    pub fn has_value(&self) -> bool {
        self.value
            .as_ref()
            .map(|value| value.borrow().is_some())
            .unwrap_or_default()
    }

    /// Takes the existing value out of this target and all its clones.
    pub fn take_value(&self) -> Option<BoundValue> {
        self.value.as_ref().and_then(|value| value.borrow_mut().take())
    }

    /// Puts back a previously taken existing value, which binding left untouched.
    pub(crate) fn restore_value(&self, existing: BoundValue) {
        if let Some(value) = &self.value {
            *value.borrow_mut() = Some(existing);
        }
    }
}
