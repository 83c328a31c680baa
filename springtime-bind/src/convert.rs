//! Conversion of raw property values into bind targets.
//!
//! A [ConversionService] converts a [PropertyValue] into a value of a described type. The binder
//! consults an ordered list of services: by default a [PropertyEditorConversionService] holding
//! editors registered on the binder builder, followed by the [ApplicationConversionService], which
//! knows about all types implementing [Bind](crate::descriptor::Bind) and about converters
//! registered with the `#[converter]` attribute.

use crate::bindable::Bindable;
use crate::descriptor::{scalar_conversion_error, BoundValue, TypeDescriptor, TypeKind};
use crate::error::ConversionError;
use crate::property::PropertyValue;
use crate::ptr::SharedPtr;
use fxhash::FxHashMap;
#[cfg(test)]
use mockall::automock;
use std::any::{type_name, Any, TypeId};
use std::fmt::Display;
use tracing::debug;

#[cfg(not(feature = "threadsafe"))]
pub type ConversionServicePtr = SharedPtr<dyn ConversionService>;
#[cfg(feature = "threadsafe")]
pub type ConversionServicePtr = SharedPtr<dyn ConversionService + Send + Sync>;

#[cfg(not(feature = "threadsafe"))]
pub type ConverterPtr = SharedPtr<dyn Fn(&str) -> Result<BoundValue, String>>;
#[cfg(feature = "threadsafe")]
pub type ConverterPtr = SharedPtr<dyn Fn(&str) -> Result<BoundValue, String> + Send + Sync>;

/// A service converting property values into values of described types.
#[cfg_attr(test, automock)]
pub trait ConversionService {
    /// Checks if the service is able to convert the given value to the target type at all.
    /// Conversion can still fail for invalid values.
    fn can_convert(&self, value: &PropertyValue, target: &TypeDescriptor) -> bool;

    fn convert(
        &self,
        value: &PropertyValue,
        target: &TypeDescriptor,
    ) -> Result<BoundValue, ConversionError>;
}

fn erase_converter<T: 'static, E: Display>(
    converter: impl Fn(&str) -> Result<T, E> + Send + Sync + 'static,
) -> ConverterPtr {
    SharedPtr::new(move |value: &str| {
        converter(value)
            .map(|value| Box::new(value) as BoundValue)
            .map_err(|error| error.to_string())
    })
}

fn apply_converter(
    converter: &ConverterPtr,
    value: &PropertyValue,
    target: &TypeDescriptor,
) -> Result<BoundValue, ConversionError> {
    let text = value.to_string();
    converter(&text).map_err(|reason| ConversionError::ConversionFailed {
        value: text,
        target_type: target.type_name().to_string(),
        reason,
    })
}

fn converter_not_found(value: &PropertyValue, target: &TypeDescriptor) -> ConversionError {
    ConversionError::ConverterNotFound {
        source_type: value.type_name().to_string(),
        target_type: target.type_name().to_string(),
    }
}

/// Default conversion service handling all bindable scalars, wrappers around them, and delimited
/// collections and arrays of them. Custom converters take precedence over built-in parsing.
#[derive(Clone)]
pub struct ApplicationConversionService {
    converters: FxHashMap<TypeId, ConverterPtr>,
}

impl ApplicationConversionService {
    /// Creates a service with all converters registered via the `#[converter]` attribute.
    pub fn new() -> Self {
        let converters = inventory::iter::<internal::ConverterRegisterer>
            .into_iter()
            .map(|registerer| (registerer.register)())
            .inspect(|definition| {
                debug!(target_type = definition.target_name, "Registering converter");
            })
            .map(|definition| (definition.target, definition.converter))
            .collect();

        Self { converters }
    }

    /// Registers a converter from text, replacing any existing one for the same type.
    pub fn with_converter<T: 'static, E: Display>(
        mut self,
        converter: impl Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    ) -> Self {
        self.converters
            .insert(TypeId::of::<T>(), erase_converter(converter));
        self
    }

    fn convert_elements(
        &self,
        value: &PropertyValue,
        element: &TypeDescriptor,
    ) -> Result<Vec<BoundValue>, ConversionError> {
        value
            .clone()
            .into_elements()
            .iter()
            .map(|element_value| self.convert(element_value, element))
            .collect()
    }
}

impl Default for ApplicationConversionService {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionService for ApplicationConversionService {
    fn can_convert(&self, value: &PropertyValue, target: &TypeDescriptor) -> bool {
        if self.converters.contains_key(&target.type_id()) {
            return true;
        }

        match target.kind() {
            TypeKind::Scalar(_) => true,
            TypeKind::Wrapper(wrapper) => self.can_convert(value, &(wrapper.inner)()),
            TypeKind::Collection(collection) => self.can_convert(value, &(collection.element)()),
            TypeKind::Array(array) => self.can_convert(value, &(array.element)()),
            TypeKind::Map(_) | TypeKind::DataObject(_) => false,
        }
    }

    fn convert(
        &self,
        value: &PropertyValue,
        target: &TypeDescriptor,
    ) -> Result<BoundValue, ConversionError> {
        if let Some(converter) = self.converters.get(&target.type_id()) {
            return apply_converter(converter, value, target);
        }

        match target.kind() {
            TypeKind::Scalar(scalar) => (scalar.parse)(value)
                .map_err(|error| scalar_conversion_error(error, value, target)),
            TypeKind::Wrapper(wrapper) => {
                let inner = self.convert(value, &(wrapper.inner)())?;
                (wrapper.wrap)(inner).ok_or_else(|| ConversionError::ConversionFailed {
                    value: value.to_string(),
                    target_type: target.type_name().to_string(),
                    reason: "cannot wrap converted value".to_string(),
                })
            }
            TypeKind::Collection(collection) => {
                let elements = self.convert_elements(value, &(collection.element)())?;
                let mut result = (collection.create)();
                for element in elements {
                    (collection.push)(result.as_mut(), element);
                }

                Ok(result)
            }
            TypeKind::Array(array) => {
                let elements = self.convert_elements(value, &(array.element)())?;
                let count = elements.len();
                (array.from_elements)(elements).ok_or_else(|| ConversionError::ConversionFailed {
                    value: value.to_string(),
                    target_type: target.type_name().to_string(),
                    reason: format!("expected {} elements, found {count}", array.len),
                })
            }
            TypeKind::Map(_) | TypeKind::DataObject(_) => Err(converter_not_found(value, target)),
        }
    }
}

/// Conversion service using editors registered for specific types. Editors always take the textual
/// form of a value.
#[derive(Clone, Default)]
pub struct PropertyEditorConversionService {
    editors: FxHashMap<TypeId, ConverterPtr>,
}

impl PropertyEditorConversionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_editor<T: 'static, E: Display>(
        &mut self,
        editor: impl Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    ) {
        debug!(target_type = type_name::<T>(), "Registering property editor");
        self.editors.insert(TypeId::of::<T>(), erase_converter(editor));
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }
}

impl ConversionService for PropertyEditorConversionService {
    fn can_convert(&self, _value: &PropertyValue, target: &TypeDescriptor) -> bool {
        self.editors.contains_key(&target.type_id())
    }

    fn convert(
        &self,
        value: &PropertyValue,
        target: &TypeDescriptor,
    ) -> Result<BoundValue, ConversionError> {
        self.editors
            .get(&target.type_id())
            .ok_or_else(|| converter_not_found(value, target))
            .and_then(|editor| apply_converter(editor, value, target))
    }
}

/// Converter used by the binder, delegating to an ordered list of conversion services. The first
/// service able to convert wins; if all capable services fail, the last failure is reported.
pub(crate) struct BindConverter {
    services: Vec<ConversionServicePtr>,
}

impl BindConverter {
    pub(crate) fn new(services: Vec<ConversionServicePtr>) -> Self {
        Self { services }
    }

    pub(crate) fn can_convert(&self, value: &PropertyValue, target: &TypeDescriptor) -> bool {
        self.services
            .iter()
            .any(|service| service.can_convert(value, target))
    }

    pub(crate) fn convert(
        &self,
        value: &PropertyValue,
        target: &Bindable,
    ) -> Result<BoundValue, ConversionError> {
        self.convert_to(value, target.type_descriptor())
    }

    pub(crate) fn convert_to(
        &self,
        value: &PropertyValue,
        target: &TypeDescriptor,
    ) -> Result<BoundValue, ConversionError> {
        let mut failure = None;
        for service in self
            .services
            .iter()
            .filter(|service| service.can_convert(value, target))
        {
            match service.convert(value, target) {
                Ok(result) => return Ok(result),
                Err(error) => failure = Some(error),
            }
        }

        Err(failure.unwrap_or_else(|| converter_not_found(value, target)))
    }

    /// Converts an already bound value to the target type. Values of the target type pass
    /// through, raw property values and text are converted, and values of a wrapped type get
    /// wrapped.
    pub(crate) fn convert_bound(
        &self,
        value: BoundValue,
        target: &TypeDescriptor,
    ) -> Result<BoundValue, ConversionError> {
        if target.is_instance(value.as_ref()) {
            return Ok(value);
        }

        if let Some(property_value) = value.downcast_ref::<PropertyValue>() {
            return self.convert_to(property_value, target);
        }

        if let Some(text) = value.downcast_ref::<String>() {
            return self.convert_to(&PropertyValue::Text(text.clone()), target);
        }

        if let TypeKind::Wrapper(wrapper) = target.kind() {
            let inner = self.convert_bound(value, &(wrapper.inner)())?;
            return (wrapper.wrap)(inner).ok_or_else(|| ConversionError::ConverterNotFound {
                source_type: "bound value".to_string(),
                target_type: target.type_name().to_string(),
            });
        }

        Err(ConversionError::ConverterNotFound {
            source_type: bound_type_name(value.as_ref()),
            target_type: target.type_name().to_string(),
        })
    }
}

fn bound_type_name(value: &dyn Any) -> String {
    format!("{:?}", value.type_id())
}

pub mod internal {
    use crate::convert::{erase_converter, ConverterPtr};
    use inventory::collect;
    pub use inventory::submit;
    use std::any::{type_name, TypeId};
    use std::fmt::Display;

    pub struct ConverterDefinition {
        pub target: TypeId,
        pub target_name: &'static str,
        pub converter: ConverterPtr,
    }

    impl ConverterDefinition {
        pub fn new<T: 'static, E: Display + 'static>(converter: fn(&str) -> Result<T, E>) -> Self {
            Self {
                target: TypeId::of::<T>(),
                target_name: type_name::<T>(),
                converter: erase_converter(converter),
            }
        }
    }

    pub struct ConverterRegisterer {
        pub register: fn() -> ConverterDefinition,
    }

    collect!(ConverterRegisterer);
}

#[cfg(test)]
mod tests {
    use crate::bindable::Bindable;
    use crate::convert::{
        ApplicationConversionService, BindConverter, ConversionService, ConversionServicePtr,
        MockConversionService, PropertyEditorConversionService,
    };
    use crate::descriptor::{BoundValue, TypeDescriptor};
    use crate::error::ConversionError;
    use crate::property::PropertyValue;
    use crate::ptr::SharedPtr;
    use mockall::predicate::always;
    use std::collections::HashMap;

    #[derive(PartialEq, Debug)]
    struct Color(u8, u8, u8);

    #[test]
    fn should_convert_scalars_and_collections() {
        let service = ApplicationConversionService::new();

        let value = service
            .convert(&"1, 2,3".into(), &TypeDescriptor::of::<Vec<u8>>())
            .unwrap();
        assert_eq!(*value.downcast::<Vec<u8>>().unwrap(), vec![1, 2, 3]);

        let value = service
            .convert(&"5".into(), &TypeDescriptor::of::<Option<i64>>())
            .unwrap();
        assert_eq!(*value.downcast::<Option<i64>>().unwrap(), Some(5));

        let value = service
            .convert(&"".into(), &TypeDescriptor::of::<Vec<String>>())
            .unwrap();
        assert!(value.downcast::<Vec<String>>().unwrap().is_empty());
    }

    #[test]
    fn should_report_missing_converter_for_maps() {
        let service = ApplicationConversionService::new();
        let target = TypeDescriptor::of::<HashMap<String, String>>();

        assert!(!service.can_convert(&"a".into(), &target));
        assert!(matches!(
            service.convert(&"a".into(), &target),
            Err(ConversionError::ConverterNotFound { .. })
        ));
    }

    #[test]
    fn should_prefer_custom_converters() {
        let service = ApplicationConversionService::new()
            .with_converter(|value: &str| value.parse::<u8>().map(|value| value * 2));

        let value = service
            .convert(&"4".into(), &TypeDescriptor::of::<u8>())
            .unwrap();
        assert_eq!(*value.downcast::<u8>().unwrap(), 8);

        assert!(matches!(
            service.convert(&"x".into(), &TypeDescriptor::of::<u8>()),
            Err(ConversionError::ConversionFailed { .. })
        ));
    }

    #[test]
    fn should_use_property_editors() {
        let mut service = PropertyEditorConversionService::new();
        service.register_editor(|value: &str| {
            let parts = value
                .split(':')
                .map(|part| part.parse::<u8>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|error| error.to_string())?;
            match parts[..] {
                [r, g, b] => Ok(Color(r, g, b)),
                _ => Err("expected r:g:b".to_string()),
            }
        });

        let target = TypeDescriptor::new::<Color>(crate::descriptor::TypeKind::DataObject(crate::descriptor::DataObjectDescriptor::default));
        assert!(service.can_convert(&"1:2:3".into(), &target));

        let value = service.convert(&"1:2:3".into(), &target).unwrap();
        assert_eq!(*value.downcast::<Color>().unwrap(), Color(1, 2, 3));
    }

    #[test]
    fn should_report_last_failure() {
        let mut first = MockConversionService::new();
        first.expect_can_convert().return_const(true);
        first.expect_convert().times(1).returning(|_, _| {
            Err(ConversionError::ConversionFailed {
                value: "v".to_string(),
                target_type: "t".to_string(),
                reason: "first".to_string(),
            })
        });

        let mut second = MockConversionService::new();
        second.expect_can_convert().return_const(false);
        second.expect_convert().never();

        let converter = BindConverter::new(vec![
            SharedPtr::new(first) as ConversionServicePtr,
            SharedPtr::new(second) as ConversionServicePtr,
        ]);

        assert!(matches!(
            converter.convert(&"v".into(), &Bindable::of::<i32>()),
            Err(ConversionError::ConversionFailed { reason, .. }) if reason == "first"
        ));
    }

    #[test]
    fn should_stop_at_first_successful_service() {
        let mut first = MockConversionService::new();
        first.expect_can_convert().with(always(), always()).return_const(true);
        first
            .expect_convert()
            .times(1)
            .returning(|_, _| Ok(Box::new(7) as BoundValue));

        let mut second = MockConversionService::new();
        second.expect_can_convert().never();

        let converter = BindConverter::new(vec![
            SharedPtr::new(first) as ConversionServicePtr,
            SharedPtr::new(second) as ConversionServicePtr,
        ]);

        let value = converter.convert(&"v".into(), &Bindable::of::<i32>()).unwrap();
        assert_eq!(*value.downcast::<i32>().unwrap(), 7);
    }

    #[test]
    fn should_pass_through_and_wrap_bound_values() {
        let converter = BindConverter::new(vec![
            SharedPtr::new(ApplicationConversionService::new()) as ConversionServicePtr,
        ]);

        let value = converter
            .convert_bound(Box::new(3i32), &TypeDescriptor::of::<i32>())
            .unwrap();
        assert_eq!(*value.downcast::<i32>().unwrap(), 3);

        let value = converter
            .convert_bound(Box::new(3i32), &TypeDescriptor::of::<Option<i32>>())
            .unwrap();
        assert_eq!(*value.downcast::<Option<i32>>().unwrap(), Some(3));

        let value = converter
            .convert_bound(
                Box::new(PropertyValue::from("12")),
                &TypeDescriptor::of::<u64>(),
            )
            .unwrap();
        assert_eq!(*value.downcast::<u64>().unwrap(), 12);
    }
}
