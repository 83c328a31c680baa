//! State of a single bind operation.

use crate::binder::Binder;
use crate::bindable::Bindable;
use crate::convert::BindConverter;
use crate::descriptor::{DataObjectDescriptor, TypeKind};
use crate::placeholder::PlaceholdersResolver;
use crate::property::ConfigurationProperty;
use crate::ptr::SharedPtr;
use crate::source::PropertySourcePtr;
use std::any::TypeId;

/// Read-only view of the binding state, given to [BindHandler](crate::handler::BindHandler)s.
pub trait BindContext {
    /// The binder performing the operation.
    fn binder(&self) -> &Binder;

    /// Nesting depth of the name currently being bound, with 0 being the root name.
    fn depth(&self) -> usize;

    /// Sources currently in effect. Usually all binder sources, but restricted to a single source
    /// while binding elements discovered in that source.
    fn sources(&self) -> &[PropertySourcePtr];

    /// The property most recently used for binding, if any.
    fn configuration_property(&self) -> Option<&ConfigurationProperty>;
}

pub(crate) struct Context<'b> {
    binder: &'b Binder,
    depth: usize,
    source: Option<PropertySourcePtr>,
    data_object_bindings: Vec<TypeId>,
    constructor_bindings: Vec<TypeId>,
    configuration_property: Option<ConfigurationProperty>,
}

impl<'b> Context<'b> {
    pub(crate) fn new(binder: &'b Binder) -> Self {
        Self {
            binder,
            depth: 0,
            source: None,
            data_object_bindings: vec![],
            constructor_bindings: vec![],
            configuration_property: None,
        }
    }

    /// Runs the operation with sources restricted to the given one, if present.
    pub(crate) fn with_source<R>(
        &mut self,
        source: Option<PropertySourcePtr>,
        operation: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let Some(source) = source else {
            return operation(self);
        };

        let previous = self.source.replace(source);
        let result = operation(self);
        self.source = previous;
        result
    }

    pub(crate) fn with_increased_depth<R>(&mut self, operation: impl FnOnce(&mut Self) -> R) -> R {
        self.depth += 1;
        let result = operation(self);
        self.depth -= 1;
        result
    }

    /// Runs the operation with increased depth, marking the given type as being bound as a data
    /// object.
    pub(crate) fn with_data_object<R>(
        &mut self,
        type_id: TypeId,
        operation: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.data_object_bindings.push(type_id);
        let result = self.with_increased_depth(operation);
        self.data_object_bindings.pop();
        result
    }

    pub(crate) fn is_binding_data_object(&self, type_id: TypeId) -> bool {
        self.data_object_bindings.contains(&type_id)
    }

    pub(crate) fn push_constructor_binding(&mut self, type_id: TypeId) {
        self.constructor_bindings.push(type_id);
    }

    pub(crate) fn pop_constructor_binding(&mut self) {
        self.constructor_bindings.pop();
    }

    pub(crate) fn is_nested_constructor_binding(&self) -> bool {
        !self.constructor_bindings.is_empty()
    }

    pub(crate) fn is_constructor_binding(&self, type_id: TypeId) -> bool {
        self.constructor_bindings.contains(&type_id)
    }

    pub(crate) fn set_configuration_property(&mut self, property: ConfigurationProperty) {
        self.configuration_property = Some(property);
    }

    pub(crate) fn clear_configuration_property(&mut self) {
        self.configuration_property = None;
    }

    #[inline]
    pub(crate) fn converter(&self) -> &'b BindConverter {
        self.binder.converter()
    }

    #[inline]
    pub(crate) fn placeholders_resolver(&self) -> &'b dyn PlaceholdersResolver {
        self.binder.placeholders_resolver()
    }

    /// Returns cached data object metadata for the target, if it describes a data object.
    pub(crate) fn data_object_descriptor(
        &self,
        target: &Bindable,
    ) -> Option<SharedPtr<DataObjectDescriptor>> {
        match target.type_descriptor().kind() {
            TypeKind::DataObject(metadata) => Some(
                self.binder
                    .data_object_descriptor(target.type_descriptor().type_id(), *metadata),
            ),
            _ => None,
        }
    }
}

impl BindContext for Context<'_> {
    fn binder(&self) -> &Binder {
        self.binder
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn sources(&self) -> &[PropertySourcePtr] {
        match &self.source {
            Some(source) => std::slice::from_ref(source),
            None => self.binder.sources(),
        }
    }

    fn configuration_property(&self) -> Option<&ConfigurationProperty> {
        self.configuration_property.as_ref()
    }
}
