use crate::bindable::Bindable;
use crate::context::Context;
use crate::data_object::{DataObjectBinder, DataObjectPropertyBinder};
use crate::descriptor::{BeanDescriptor, BoundValue, DataObjectDescriptor};
use crate::error::BindError;
use crate::name::ConfigurationPropertyName;
use crate::ptr::SharedPtr;
use tracing::trace;

/// Binds data objects by populating individual properties of an existing or default instance.
#[derive(Clone, Copy, Default, Debug)]
pub(crate) struct BeanBinder;

impl BeanBinder {
    fn descriptor(
        target: &Bindable,
        context: &Context<'_>,
    ) -> Option<SharedPtr<DataObjectDescriptor>> {
        if context.is_constructor_binding(target.type_descriptor().type_id()) {
            return None;
        }

        context
            .data_object_descriptor(target)
            .filter(|descriptor| descriptor.bean.is_some())
    }

    fn bind_properties(
        bean: &BeanDescriptor,
        instance: &mut BoundValue,
        context: &mut Context<'_>,
        property_binder: &dyn DataObjectPropertyBinder,
    ) -> Result<bool, BindError> {
        let mut bound = false;
        for property in &bean.properties {
            let mut property_target = Bindable::of_type((property.type_descriptor)());
            if let Some(current) = property.get.and_then(|get| get(instance.as_ref())) {
                property_target = property_target.with_value(current);
            }

            if let Some(value) =
                property_binder.bind_property(context, property.name, property_target)?
            {
                trace!(property = property.name, "Setting bean property");
                (property.set)(instance.as_mut(), value);
                bound = true;
            }
        }

        Ok(bound)
    }
}

impl DataObjectBinder for BeanBinder {
    fn bind(
        &self,
        _name: &ConfigurationPropertyName,
        target: &Bindable,
        context: &mut Context<'_>,
        property_binder: &dyn DataObjectPropertyBinder,
    ) -> Result<Option<BoundValue>, BindError> {
        let Some(descriptor) = Self::descriptor(target, context) else {
            return Ok(None);
        };
        let Some(bean) = &descriptor.bean else {
            return Ok(None);
        };

        let existing = target.take_value();
        let has_existing = existing.is_some();
        let mut instance = existing.unwrap_or_else(bean.create);

        let result = Self::bind_properties(bean, &mut instance, context, property_binder);
        context.clear_configuration_property();

        match result {
            Ok(true) => Ok(Some(instance)),
            Ok(false) => {
                if has_existing {
                    target.restore_value(instance);
                }

                Ok(None)
            }
            Err(error) => {
                if has_existing {
                    target.restore_value(instance);
                }

                Err(error)
            }
        }
    }

    fn create(&self, target: &Bindable, context: &mut Context<'_>) -> Option<BoundValue> {
        Self::descriptor(target, context)
            .and_then(|descriptor| descriptor.bean.as_ref().map(|bean| (bean.create)()))
    }
}
