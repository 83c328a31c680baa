//! Type-erased binding metadata.
//!
//! Every type which can be a bind target implements [Bind], which describes how the binder should
//! treat it: as a scalar converted from a single property value, a wrapper around another target, a
//! map, a collection, a fixed-size array, or a data object with named properties. Bound values
//! travel through the binder as [BoundValue]s and are downcast to the target type at the very end.
//!
//! Implementations are provided for common standard library types. Data objects and unit-only enums
//! usually implement [Bind] via the derive macro, but manual implementations are also possible.

mod builtin;

pub use builtin::lenient_enum_name;

use crate::error::ConversionError;
use crate::property::PropertyValue;
use derivative::Derivative;
use std::any::{type_name, Any, TypeId};
use std::fmt::Display;
use std::str::FromStr;

/// A type-erased value produced by binding.
pub type BoundValue = Box<dyn Any>;

/// A type which can be a target of binding.
pub trait Bind: 'static {
    /// Returns metadata describing how to bind this type.
    fn type_descriptor() -> TypeDescriptor;
}

/// Reasons for failing to parse a scalar from a property value.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScalarParseError {
    /// The kind of property value is not supported for the target, e.g. a sequence given for a
    /// number.
    Unsupported,
    /// The value is supported, but not valid for the target.
    Invalid(String),
}

pub type ScalarParser = fn(&PropertyValue) -> Result<BoundValue, ScalarParseError>;

/// Describes how a type should be bound.
#[derive(Clone, Copy, Derivative)]
#[derivative(Debug)]
pub struct TypeDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    #[derivative(Debug = "ignore")]
    kind: TypeKind,
}

impl TypeDescriptor {
    pub fn new<T: 'static>(kind: TypeKind) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            kind,
        }
    }

    /// Shortcut for [Bind::type_descriptor].
    #[inline]
    pub fn of<T: Bind>() -> Self {
        T::type_descriptor()
    }

    /// Creates a scalar descriptor parsing text values with [FromStr]. Non-text property values
    /// are converted to text first, while sequences are not supported.
    pub fn parsed<T: FromStr + 'static>() -> Self
    where
        T::Err: Display,
    {
        Self::scalar::<T>(|value| match value {
            PropertyValue::Sequence(_) => Err(ScalarParseError::Unsupported),
            PropertyValue::Text(text) => T::from_str(text.trim())
                .map(|value| Box::new(value) as BoundValue)
                .map_err(|error| ScalarParseError::Invalid(error.to_string())),
            value => T::from_str(&value.to_string())
                .map(|value| Box::new(value) as BoundValue)
                .map_err(|error| ScalarParseError::Invalid(error.to_string())),
        })
    }

    /// Creates a scalar descriptor using the given parser.
    pub fn scalar<T: 'static>(parse: ScalarParser) -> Self {
        Self::new::<T>(TypeKind::Scalar(ScalarDescriptor {
            parse,
            primitive: false,
        }))
    }

    /// Creates a data object descriptor with lazily computed metadata.
    pub fn data_object<T: 'static>(metadata: fn() -> DataObjectDescriptor) -> Self {
        Self::new::<T>(TypeKind::DataObject(metadata))
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Checks if this describes a primitive scalar, e.g. a number or a boolean.
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Scalar(ScalarDescriptor { primitive: true, .. }))
    }

    /// Checks if this describes a type from the standard library.
    pub fn is_builtin(&self) -> bool {
        ["std::", "core::", "alloc::"]
            .iter()
            .any(|prefix| self.type_name.starts_with(prefix))
    }

    /// Checks if this describes a map, collection or array.
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Map(_) | TypeKind::Collection(_) | TypeKind::Array(_)
        )
    }

    /// Checks if the given value is an instance of the described type.
    #[inline]
    pub fn is_instance(&self, value: &dyn Any) -> bool {
        value.type_id() == self.type_id
    }
}

/// The binding strategy for a type.
#[derive(Clone, Copy)]
pub enum TypeKind {
    Scalar(ScalarDescriptor),
    Wrapper(WrapperDescriptor),
    Map(MapDescriptor),
    Collection(CollectionDescriptor),
    Array(ArrayDescriptor),
    DataObject(fn() -> DataObjectDescriptor),
}

/// A value converted directly from a single property value.
#[derive(Clone, Copy, Derivative)]
#[derivative(Debug)]
pub struct ScalarDescriptor {
    #[derivative(Debug = "ignore")]
    pub parse: ScalarParser,
    pub primitive: bool,
}

/// A transparent wrapper, e.g. [Option] or [Box], bound like the wrapped type.
#[derive(Clone, Copy, Derivative)]
#[derivative(Debug)]
pub struct WrapperDescriptor {
    #[derivative(Debug = "ignore")]
    pub inner: fn() -> TypeDescriptor,
    /// Wraps an inner value.
    #[derivative(Debug = "ignore")]
    pub wrap: fn(BoundValue) -> Option<BoundValue>,
    /// Extracts an inner value from an existing wrapper, if there is one.
    #[derivative(Debug = "ignore")]
    pub unwrap: fn(BoundValue) -> Option<BoundValue>,
    /// Produces the wrapper representing a missing value, if the wrapper has such state.
    #[derivative(Debug = "ignore")]
    pub absent: Option<fn() -> BoundValue>,
}

#[derive(Clone, Copy, Derivative)]
#[derivative(Debug)]
pub struct MapDescriptor {
    #[derivative(Debug = "ignore")]
    pub key: fn() -> TypeDescriptor,
    #[derivative(Debug = "ignore")]
    pub value: fn() -> TypeDescriptor,
    #[derivative(Debug = "ignore")]
    pub create: fn() -> BoundValue,
    #[derivative(Debug = "ignore")]
    pub contains_key: fn(map: &dyn Any, key: &dyn Any) -> bool,
    #[derivative(Debug = "ignore")]
    pub insert: fn(map: &mut dyn Any, key: BoundValue, value: BoundValue),
    #[derivative(Debug = "ignore")]
    pub len: fn(map: &dyn Any) -> usize,
    /// Adds all entries from the second map to the first one, replacing existing keys.
    #[derivative(Debug = "ignore")]
    pub merge: fn(existing: BoundValue, additional: BoundValue) -> BoundValue,
}

#[derive(Clone, Copy, Derivative)]
#[derivative(Debug)]
pub struct CollectionDescriptor {
    #[derivative(Debug = "ignore")]
    pub element: fn() -> TypeDescriptor,
    #[derivative(Debug = "ignore")]
    pub create: fn() -> BoundValue,
    #[derivative(Debug = "ignore")]
    pub push: fn(collection: &mut dyn Any, element: BoundValue),
}

#[derive(Clone, Copy, Derivative)]
#[derivative(Debug)]
pub struct ArrayDescriptor {
    #[derivative(Debug = "ignore")]
    pub element: fn() -> TypeDescriptor,
    pub len: usize,
    /// Builds the array, returning `None` when the number of elements does not match.
    #[derivative(Debug = "ignore")]
    pub from_elements: fn(Vec<BoundValue>) -> Option<BoundValue>,
}

/// Metadata of a data object, which can be created through a constructor taking all properties
/// (a value object), populated property by property (a bean), or both.
#[derive(Clone, Debug, Default)]
pub struct DataObjectDescriptor {
    pub constructor: Option<ConstructorDescriptor>,
    pub bean: Option<BeanDescriptor>,
}

#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct ConstructorDescriptor {
    pub parameters: Vec<ParameterDescriptor>,
    /// Creates an instance from arguments given in parameter order. Returns `None` if a required
    /// argument is missing.
    #[derivative(Debug = "ignore")]
    pub instantiate: fn(Vec<Option<BoundValue>>) -> Option<BoundValue>,
}

#[derive(Clone, Copy, Derivative)]
#[derivative(Debug)]
pub struct ParameterDescriptor {
    /// Name of the property in dashed form, e.g. `max-threads`.
    pub name: &'static str,
    #[derivative(Debug = "ignore")]
    pub type_descriptor: fn() -> TypeDescriptor,
    #[derivative(Debug = "ignore")]
    pub default: Option<fn() -> BoundValue>,
}

#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct BeanDescriptor {
    /// Creates a new instance with default property values.
    #[derivative(Debug = "ignore")]
    pub create: fn() -> BoundValue,
    pub properties: Vec<BeanPropertyDescriptor>,
}

#[derive(Clone, Copy, Derivative)]
#[derivative(Debug)]
pub struct BeanPropertyDescriptor {
    /// Name of the property in dashed form, e.g. `max-threads`.
    pub name: &'static str,
    #[derivative(Debug = "ignore")]
    pub type_descriptor: fn() -> TypeDescriptor,
    /// Returns a copy of the current property value of an instance.
    #[derivative(Debug = "ignore")]
    pub get: Option<fn(instance: &dyn Any) -> Option<BoundValue>>,
    #[derivative(Debug = "ignore")]
    pub set: fn(instance: &mut dyn Any, value: BoundValue),
}

/// Converts a failed scalar parse into a conversion error.
pub(crate) fn scalar_conversion_error(
    error: ScalarParseError,
    value: &PropertyValue,
    target: &TypeDescriptor,
) -> ConversionError {
    match error {
        ScalarParseError::Unsupported => ConversionError::ConverterNotFound {
            source_type: value.type_name().to_string(),
            target_type: target.type_name().to_string(),
        },
        ScalarParseError::Invalid(reason) => ConversionError::ConversionFailed {
            value: value.to_string(),
            target_type: target.type_name().to_string(),
            reason,
        },
    }
}
