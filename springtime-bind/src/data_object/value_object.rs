use crate::bindable::Bindable;
use crate::context::Context;
use crate::data_object::{BindConstructorProviderPtr, DataObjectBinder, DataObjectPropertyBinder};
use crate::descriptor::{BoundValue, ConstructorDescriptor, ParameterDescriptor, TypeKind};
use crate::error::BindError;
use crate::name::ConfigurationPropertyName;
use itertools::Itertools;
use tracing::debug;

/// Binds data objects by binding every constructor parameter and calling the constructor.
pub(crate) struct ValueObjectBinder {
    constructor_provider: BindConstructorProviderPtr,
}

impl ValueObjectBinder {
    pub(crate) fn new(constructor_provider: BindConstructorProviderPtr) -> Self {
        Self {
            constructor_provider,
        }
    }

    fn constructor(
        &self,
        target: &Bindable,
        context: &Context<'_>,
    ) -> Option<ConstructorDescriptor> {
        let descriptor = context.data_object_descriptor(target)?;
        self.constructor_provider.bind_constructor(
            target,
            &descriptor,
            context.is_nested_constructor_binding(),
        )
    }

    fn bind_arguments(
        constructor: &ConstructorDescriptor,
        context: &mut Context<'_>,
        property_binder: &dyn DataObjectPropertyBinder,
    ) -> Result<Vec<Option<BoundValue>>, BindError> {
        constructor
            .parameters
            .iter()
            .map(|parameter| {
                property_binder.bind_property(
                    context,
                    parameter.name,
                    Bindable::of_type((parameter.type_descriptor)()),
                )
            })
            .collect()
    }

    /// Value used for a parameter without a bound value: the declared default, or the absent
    /// state of optional parameters.
    fn default_argument(parameter: &ParameterDescriptor) -> Option<BoundValue> {
        if let Some(default) = parameter.default {
            return Some(default());
        }

        match (parameter.type_descriptor)().kind() {
            TypeKind::Wrapper(wrapper) => wrapper.absent.map(|absent| absent()),
            _ => None,
        }
    }

    fn instantiate(
        constructor: &ConstructorDescriptor,
        arguments: Vec<Option<BoundValue>>,
    ) -> Option<BoundValue> {
        let arguments = constructor
            .parameters
            .iter()
            .zip(arguments)
            .map(|(parameter, argument)| argument.or_else(|| Self::default_argument(parameter)))
            .collect();

        (constructor.instantiate)(arguments)
    }

    fn required_parameters(constructor: &ConstructorDescriptor) -> String {
        constructor
            .parameters
            .iter()
            .filter(|parameter| Self::default_argument(parameter).is_none())
            .map(|parameter| parameter.name)
            .join(", ")
    }
}

impl DataObjectBinder for ValueObjectBinder {
    fn bind(
        &self,
        name: &ConfigurationPropertyName,
        target: &Bindable,
        context: &mut Context<'_>,
        property_binder: &dyn DataObjectPropertyBinder,
    ) -> Result<Option<BoundValue>, BindError> {
        let Some(constructor) = self.constructor(target, context) else {
            return Ok(None);
        };

        context.push_constructor_binding(target.type_descriptor().type_id());
        let arguments = Self::bind_arguments(&constructor, context, property_binder);
        context.clear_configuration_property();
        context.pop_constructor_binding();

        let arguments = arguments?;
        if arguments.iter().all(Option::is_none) {
            return Ok(None);
        }

        let result = Self::instantiate(&constructor, arguments);
        if result.is_none() {
            debug!(
                %name,
                target_type = target.type_descriptor().type_name(),
                required = Self::required_parameters(&constructor),
                "Cannot create value object - missing required parameters"
            );
        }

        Ok(result)
    }

    fn create(&self, target: &Bindable, context: &mut Context<'_>) -> Option<BoundValue> {
        let constructor = self.constructor(target, context)?;
        let arguments = constructor.parameters.iter().map(|_| None).collect();
        Self::instantiate(&constructor, arguments)
    }

    fn on_unable_to_create_instance(&self, target: &Bindable, context: &Context<'_>) {
        if let Some(constructor) = self.constructor(target, context) {
            debug!(
                target_type = target.type_descriptor().type_name(),
                required = Self::required_parameters(&constructor),
                "Unable to create value object with default arguments"
            );
        }
    }
}
