use crate::name::ConfigurationPropertyName;
use crate::property::ConfigurationProperty;
use crate::ptr::SharedPtr;
use itertools::Itertools;
use std::error::Error;
use thiserror::Error;

#[cfg(not(feature = "threadsafe"))]
pub type ErrorPtr = SharedPtr<dyn Error>;
#[cfg(feature = "threadsafe")]
pub type ErrorPtr = SharedPtr<dyn Error + Send + Sync>;

/// Errors related to parsing configuration property names.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum ConfigurationPropertyNameError {
    #[error("Configuration property name '{0}' contains an empty element")]
    EmptyElement(String),
    #[error("Configuration property name '{0}' contains an unclosed index bracket")]
    UnclosedIndex(String),
    #[error("Configuration property name '{0}' contains characters directly after an index")]
    MisplacedIndex(String),
    #[error("Configuration property name '{name}' contains invalid character '{character}'")]
    InvalidCharacter { name: String, character: char },
}

/// Errors reported by conversion services.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum ConversionError {
    #[error("No converter found capable of converting from {source_type} to {target_type}")]
    ConverterNotFound {
        source_type: String,
        target_type: String,
    },
    #[error("Failed to convert '{value}' to {target_type}: {reason}")]
    ConversionFailed {
        value: String,
        target_type: String,
        reason: String,
    },
}

impl ConversionError {
    pub fn is_converter_not_found(&self) -> bool {
        matches!(self, ConversionError::ConverterNotFound { .. })
    }
}

/// Errors reported when resolving `${...}` placeholders.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum PlaceholderError {
    #[error("Could not resolve placeholder '{placeholder}' in value \"{value}\"")]
    Unresolvable { placeholder: String, value: String },
    #[error("Circular placeholder reference '{0}' in property definitions")]
    CircularReference(String),
}

/// Error returned when accessing the value of an unbound [BindResult](crate::bind_result::BindResult).
#[derive(Error, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum BindResultError {
    #[error("No value bound")]
    NotBound,
}

/// Main error type reported by the [Binder](crate::binder::Binder). Failures raised while binding
/// are reported wrapped in [BindError::Bind], carrying the name, target and the property being
/// processed when the failure happened.
#[derive(Error, Clone, Debug)]
pub enum BindError {
    #[error("Failed to bind properties under '{name}' to {target_type}{}", .property.as_ref().map(|property| format!(" (property {property})")).unwrap_or_default())]
    Bind {
        name: ConfigurationPropertyName,
        target_type: &'static str,
        property: Option<ConfigurationProperty>,
        #[source]
        source: Box<BindError>,
    },
    #[error(transparent)]
    InvalidName(#[from] ConfigurationPropertyNameError),
    #[error("Cannot bind {actual} as {expected}")]
    IncompatibleTarget {
        expected: &'static str,
        actual: &'static str,
    },
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    Placeholder(#[from] PlaceholderError),
    #[error("Unable to create instance for {0}")]
    UnableToCreateInstance(&'static str),
    #[error("Array {target_type} requires exactly {expected} elements, but {actual} were bound")]
    ArrayLength {
        target_type: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("The elements [{}] were left unbound", .0.iter().map(|property| property.name()).join(","))]
    UnboundProperties(Vec<ConfigurationProperty>),
    #[error("Bind handler error: {0}")]
    Handler(ErrorPtr),
}

impl BindError {
    /// Checks if this error directly represents a missing converter. Errors wrapped in
    /// [BindError::Bind] are not inspected.
    pub fn is_converter_not_found(&self) -> bool {
        matches!(self, BindError::Conversion(error) if error.is_converter_not_found())
    }

    /// Returns the innermost error, skipping [BindError::Bind] wrappers.
    pub fn root_cause(&self) -> &BindError {
        match self {
            BindError::Bind { source, .. } => source.root_cause(),
            error => error,
        }
    }
}
