//! The [Binder] ties names, sources, placeholders, conversion, aggregate and data object binding
//! together.
//!
//! Binding starts at a root name and walks the property tree recursively. For every visited name,
//! the binder looks for a direct property, which is resolved and converted to the target. Targets
//! without a direct property are bound as aggregates or data objects, whose elements and
//! properties are bound recursively with the same algorithm. Every visited name goes through the
//! [BindHandler] hooks.

use crate::aggregate::{AggregateBinder, AggregateElementBinder};
use crate::bind_result::BindResult;
use crate::bindable::{BindMethod, BindRestriction, Bindable};
use crate::context::{BindContext, Context};
use crate::convert::{
    ApplicationConversionService, BindConverter, ConversionServicePtr,
    PropertyEditorConversionService,
};
use crate::data_object::{
    BeanBinder, BindConstructorProviderPtr, DataObjectBinder, DataObjectPropertyBinder,
    DefaultBindConstructorProvider, ValueObjectBinder,
};
use crate::descriptor::{Bind, BoundValue, DataObjectDescriptor, TypeKind};
use crate::error::BindError;
use crate::handler::{BindHandler, BindHandlerPtr, DefaultBindHandler};
use crate::name::ConfigurationPropertyName;
use crate::placeholder::{
    NoOpPlaceholdersResolver, PlaceholdersResolver, PlaceholdersResolverPtr,
    PropertySourcesPlaceholdersResolver,
};
use crate::property::ConfigurationProperty;
use crate::ptr::SharedPtr;
use crate::source::{ConfigurationPropertyState, PropertySourcePtr};
use dashmap::DashMap;
use fxhash::FxBuildHasher;
use itertools::Itertools;
use std::any::{type_name, TypeId};
use std::fmt::Display;
use tracing::{debug, trace};

const DATA_OBJECT_DESCRIPTOR_CACHE_CAPACITY: usize = 256;

/// Builder for [Binder] with sensible defaults: no sources, no placeholder resolution, the
/// [ApplicationConversionService] and [DefaultBindHandler].
pub struct BinderBuilder {
    sources: Vec<PropertySourcePtr>,
    placeholders_resolver: Option<PlaceholdersResolverPtr>,
    source_placeholders: bool,
    conversion_services: Option<Vec<ConversionServicePtr>>,
    property_editors: PropertyEditorConversionService,
    default_bind_handler: BindHandlerPtr,
    constructor_provider: BindConstructorProviderPtr,
}

impl BinderBuilder {
    pub fn new() -> Self {
        Self {
            sources: vec![],
            placeholders_resolver: None,
            source_placeholders: false,
            conversion_services: None,
            property_editors: Default::default(),
            default_bind_handler: SharedPtr::new(DefaultBindHandler),
            constructor_provider: SharedPtr::new(DefaultBindConstructorProvider),
        }
    }

    /// Adds a source with lower precedence than already added ones.
    pub fn with_source(mut self, source: PropertySourcePtr) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_sources(mut self, sources: impl IntoIterator<Item = PropertySourcePtr>) -> Self {
        self.sources.extend(sources);
        self
    }

    pub fn with_placeholders_resolver(
        mut self,
        placeholders_resolver: PlaceholdersResolverPtr,
    ) -> Self {
        self.placeholders_resolver = Some(placeholders_resolver);
        self.source_placeholders = false;
        self
    }

    /// Resolves placeholders against the binder sources.
    pub fn with_source_placeholders(mut self) -> Self {
        self.placeholders_resolver = None;
        self.source_placeholders = true;
        self
    }

    /// Replaces the default conversion services. Services are consulted in order.
    pub fn with_conversion_services(mut self, services: Vec<ConversionServicePtr>) -> Self {
        self.conversion_services = Some(services);
        self
    }

    /// Registers a textual editor for the given type, consulted before other conversion services.
    pub fn with_property_editor<T: 'static, E: Display>(
        mut self,
        editor: impl Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    ) -> Self {
        self.property_editors.register_editor(editor);
        self
    }

    /// Sets the handler used when none is passed to a bind operation.
    pub fn with_default_bind_handler(mut self, handler: BindHandlerPtr) -> Self {
        self.default_bind_handler = handler;
        self
    }

    pub fn with_constructor_provider(mut self, provider: BindConstructorProviderPtr) -> Self {
        self.constructor_provider = provider;
        self
    }

    pub fn build(self) -> Binder {
        let placeholders_resolver = match self.placeholders_resolver {
            Some(resolver) => resolver,
            None if self.source_placeholders => SharedPtr::new(
                PropertySourcesPlaceholdersResolver::new(self.sources.clone()),
            ),
            None => SharedPtr::new(NoOpPlaceholdersResolver),
        };

        let mut services = self.conversion_services.unwrap_or_else(|| {
            vec![SharedPtr::new(ApplicationConversionService::new()) as ConversionServicePtr]
        });
        if !self.property_editors.is_empty() {
            services.insert(0, SharedPtr::new(self.property_editors));
        }

        Binder {
            sources: self.sources,
            placeholders_resolver,
            converter: BindConverter::new(services),
            default_bind_handler: self.default_bind_handler,
            value_object_binder: ValueObjectBinder::new(self.constructor_provider),
            bean_binder: BeanBinder,
            data_object_descriptors: Default::default(),
        }
    }
}

impl Default for BinderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Binds objects from one or more [ConfigurationPropertySource](crate::source::ConfigurationPropertySource)s.
///
/// Sources are consulted in order, so earlier sources take precedence. A binder can be shared and
/// used for any number of bind operations, each having its own [BindContext].
pub struct Binder {
    sources: Vec<PropertySourcePtr>,
    placeholders_resolver: PlaceholdersResolverPtr,
    converter: BindConverter,
    default_bind_handler: BindHandlerPtr,
    value_object_binder: ValueObjectBinder,
    bean_binder: BeanBinder,
    data_object_descriptors: DashMap<TypeId, SharedPtr<DataObjectDescriptor>, FxBuildHasher>,
}

impl Binder {
    /// Creates a binder with default configuration for given sources.
    pub fn new(sources: Vec<PropertySourcePtr>) -> Self {
        Self::builder().with_sources(sources).build()
    }

    #[inline]
    pub fn builder() -> BinderBuilder {
        BinderBuilder::new()
    }

    #[inline]
    pub fn sources(&self) -> &[PropertySourcePtr] {
        &self.sources
    }

    /// Binds `T` under given name using the default handler.
    pub fn bind<T: Bind>(&self, name: &str) -> Result<BindResult<T>, BindError> {
        let name = ConfigurationPropertyName::of(name)?;
        self.bind_with(&name, Bindable::of::<T>(), None)
    }

    /// Binds the target under given name. The target must describe `T`. The default handler is
    /// used, if none is given.
    pub fn bind_with<T: Bind>(
        &self,
        name: &ConfigurationPropertyName,
        target: Bindable,
        handler: Option<&dyn BindHandler>,
    ) -> Result<BindResult<T>, BindError> {
        Self::check_target::<T>(&target)?;

        self.bind_root(name, target, handler, false)?
            .map(Self::downcast::<T>)
            .transpose()
            .map(BindResult::of)
    }

    /// Binds `T` under given name, creating a default instance if nothing was bound.
    pub fn bind_or_create<T: Bind>(&self, name: &str) -> Result<T, BindError> {
        let name = ConfigurationPropertyName::of(name)?;
        self.bind_or_create_with(&name, Bindable::of::<T>(), None)
    }

    /// Binds the target under given name, creating a default instance if nothing was bound. Fails
    /// with [BindError::UnableToCreateInstance] if the target cannot be created.
    pub fn bind_or_create_with<T: Bind>(
        &self,
        name: &ConfigurationPropertyName,
        target: Bindable,
        handler: Option<&dyn BindHandler>,
    ) -> Result<T, BindError> {
        Self::check_target::<T>(&target)?;

        self.bind_root(name, target, handler, true)?
            .ok_or(BindError::UnableToCreateInstance(type_name::<T>()))
            .and_then(Self::downcast::<T>)
    }

    #[inline]
    pub(crate) fn converter(&self) -> &BindConverter {
        &self.converter
    }

    #[inline]
    pub(crate) fn placeholders_resolver(&self) -> &dyn PlaceholdersResolver {
        self.placeholders_resolver.as_ref()
    }

    /// Returns data object metadata, computing it on first use. The cache is bounded, so metadata
    /// might be computed more than once.
    pub(crate) fn data_object_descriptor(
        &self,
        type_id: TypeId,
        metadata: fn() -> DataObjectDescriptor,
    ) -> SharedPtr<DataObjectDescriptor> {
        if let Some(descriptor) = self.data_object_descriptors.get(&type_id) {
            return SharedPtr::clone(descriptor.value());
        }

        if self.data_object_descriptors.len() >= DATA_OBJECT_DESCRIPTOR_CACHE_CAPACITY {
            trace!("Evicting data object descriptor cache");
            self.data_object_descriptors.clear();
        }

        let descriptor = SharedPtr::new(metadata());
        self.data_object_descriptors
            .insert(type_id, SharedPtr::clone(&descriptor));
        descriptor
    }

    fn check_target<T: Bind>(target: &Bindable) -> Result<(), BindError> {
        if target.type_descriptor().type_id() == TypeId::of::<T>() {
            Ok(())
        } else {
            Err(BindError::IncompatibleTarget {
                expected: type_name::<T>(),
                actual: target.type_descriptor().type_name(),
            })
        }
    }

    fn downcast<T: 'static>(value: BoundValue) -> Result<T, BindError> {
        value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| BindError::IncompatibleTarget {
                expected: type_name::<T>(),
                actual: "bound value",
            })
    }

    fn bind_root(
        &self,
        name: &ConfigurationPropertyName,
        target: Bindable,
        handler: Option<&dyn BindHandler>,
        create: bool,
    ) -> Result<Option<BoundValue>, BindError> {
        let handler: &dyn BindHandler = match handler {
            Some(handler) => handler,
            None => self.default_bind_handler.as_ref(),
        };

        debug!(
            %name,
            target_type = target.type_descriptor().type_name(),
            create,
            "Binding configuration properties"
        );

        let _cache_overrides = self
            .sources
            .iter()
            .filter_map(|source| source.caching())
            .map(|cache| cache.override_caching())
            .collect_vec();

        let mut context = Context::new(self);
        self.bind_internal(name, target, handler, &mut context, false, create)
    }

    fn bind_internal(
        &self,
        name: &ConfigurationPropertyName,
        target: Bindable,
        handler: &dyn BindHandler,
        context: &mut Context<'_>,
        allow_recursive_binding: bool,
        create: bool,
    ) -> Result<Option<BoundValue>, BindError> {
        let original = target.clone();
        let target = match handler.on_start(name, target, &*context) {
            Ok(Some(target)) => target,
            Ok(None) => {
                return match self.handle_bind_result(name, &original, handler, context, None, create)
                {
                    Ok(result) => Ok(result),
                    Err(error) => self.handle_bind_error(name, &original, handler, context, error),
                }
            }
            Err(error) => return self.handle_bind_error(name, &original, handler, context, error),
        };

        let result = self
            .bind_object(name, &target, handler, context, allow_recursive_binding)
            .and_then(|bound| self.handle_bind_result(name, &target, handler, context, bound, create));

        match result {
            Ok(result) => Ok(result),
            Err(error) => self.handle_bind_error(name, &target, handler, context, error),
        }
    }

    fn handle_bind_result(
        &self,
        name: &ConfigurationPropertyName,
        target: &Bindable,
        handler: &dyn BindHandler,
        context: &mut Context<'_>,
        result: Option<BoundValue>,
        create: bool,
    ) -> Result<Option<BoundValue>, BindError> {
        let result = match result {
            Some(result) => Some(handler.on_success(name, target, &*context, result)?),
            None => None,
        };

        let result = match result {
            Some(result) => Some(
                self.converter
                    .convert_bound(result, target.type_descriptor())?,
            ),
            None if create => {
                let result = self.create(target, context)?;
                let result = handler.on_create(name, target, &*context, result)?;
                Some(
                    self.converter
                        .convert_bound(result, target.type_descriptor())?,
                )
            }
            None => None,
        };

        handler.on_finish(name, target, &*context, result.as_ref())?;
        Ok(result)
    }

    fn handle_bind_error(
        &self,
        name: &ConfigurationPropertyName,
        target: &Bindable,
        handler: &dyn BindHandler,
        context: &mut Context<'_>,
        error: BindError,
    ) -> Result<Option<BoundValue>, BindError> {
        let result = handler
            .on_failure(name, target, &*context, error)
            .and_then(|result| {
                result
                    .map(|result| {
                        self.converter
                            .convert_bound(result, target.type_descriptor())
                            .map_err(BindError::from)
                    })
                    .transpose()
            });

        result.map_err(|error| match error {
            BindError::Bind { .. } => error,
            error => BindError::Bind {
                name: name.clone(),
                target_type: target.type_descriptor().type_name(),
                property: context.configuration_property().cloned(),
                source: Box::new(error),
            },
        })
    }

    /// Creates an empty instance of the target.
    fn create(&self, target: &Bindable, context: &mut Context<'_>) -> Result<BoundValue, BindError> {
        let unable_to_create =
            || BindError::UnableToCreateInstance(target.type_descriptor().type_name());

        match target.type_descriptor().kind() {
            TypeKind::Wrapper(wrapper) => {
                if let Some(absent) = wrapper.absent {
                    return Ok(absent());
                }

                let inner = self.create(&target.with_type((wrapper.inner)()), context)?;
                return (wrapper.wrap)(inner).ok_or_else(unable_to_create);
            }
            TypeKind::Map(map) => return Ok((map.create)()),
            TypeKind::Collection(collection) => return Ok((collection.create)()),
            TypeKind::Array(array) => {
                return (array.from_elements)(vec![]).ok_or_else(unable_to_create)
            }
            _ => {}
        }

        let data_object_binders = self.data_object_binders(target);
        if let Some(instance) = data_object_binders
            .iter()
            .find_map(|binder| binder.create(target, context))
        {
            return Ok(instance);
        }

        for binder in &data_object_binders {
            binder.on_unable_to_create_instance(target, context);
        }

        Err(unable_to_create())
    }

    fn bind_object(
        &self,
        name: &ConfigurationPropertyName,
        target: &Bindable,
        handler: &dyn BindHandler,
        context: &mut Context<'_>,
        allow_recursive_binding: bool,
    ) -> Result<Option<BoundValue>, BindError> {
        let property = Self::find_property(name, target, context);
        if property.is_none()
            && context.depth() != 0
            && Self::contains_no_descendant_of(context.sources(), name)
        {
            return Ok(None);
        }

        if let TypeKind::Wrapper(wrapper) = target.type_descriptor().kind() {
            let mut inner_target = target.with_type((wrapper.inner)());
            if let Some(inner) = target.take_value().and_then(wrapper.unwrap) {
                inner_target = inner_target.with_value(inner);
            }

            return Ok(self
                .bind_object(name, &inner_target, handler, context, allow_recursive_binding)?
                .and_then(wrapper.wrap));
        }

        if let Some(aggregate_binder) = AggregateBinder::for_target(target) {
            let element_binder = ElementBinder {
                binder: self,
                handler,
                aggregate_binder,
            };

            return context.with_increased_depth(|context| {
                aggregate_binder.bind(context, name, target, &element_binder)
            });
        }

        if let Some(property) = property {
            return match self.bind_property(target, context, property) {
                Err(error) if error.is_converter_not_found() => {
                    trace!(%name, "No converter for property - trying data object binding");
                    match self.bind_data_object(
                        name,
                        target,
                        handler,
                        context,
                        allow_recursive_binding,
                    )? {
                        Some(instance) => Ok(Some(instance)),
                        None => Err(error),
                    }
                }
                result => result.map(Some),
            };
        }

        self.bind_data_object(name, target, handler, context, allow_recursive_binding)
    }

    fn find_property(
        name: &ConfigurationPropertyName,
        target: &Bindable,
        context: &Context<'_>,
    ) -> Option<ConfigurationProperty> {
        if name.is_empty() || target.has_bind_restriction(BindRestriction::NoDirectProperty) {
            return None;
        }

        context
            .sources()
            .iter()
            .find_map(|source| source.configuration_property(name))
    }

    fn contains_no_descendant_of(
        sources: &[PropertySourcePtr],
        name: &ConfigurationPropertyName,
    ) -> bool {
        sources
            .iter()
            .all(|source| source.contains_descendant_of(name) == ConfigurationPropertyState::Absent)
    }

    fn bind_property(
        &self,
        target: &Bindable,
        context: &mut Context<'_>,
        property: ConfigurationProperty,
    ) -> Result<BoundValue, BindError> {
        let value = property.value().clone();
        context.set_configuration_property(property);

        let value = self.placeholders_resolver.resolve_placeholders(value)?;
        Ok(self.converter.convert(&value, target)?)
    }

    fn bind_data_object(
        &self,
        name: &ConfigurationPropertyName,
        target: &Bindable,
        handler: &dyn BindHandler,
        context: &mut Context<'_>,
        allow_recursive_binding: bool,
    ) -> Result<Option<BoundValue>, BindError> {
        if Self::is_unbindable_data_object(name, target, context) {
            return Ok(None);
        }

        let type_id = target.type_descriptor().type_id();
        if !allow_recursive_binding && context.is_binding_data_object(type_id) {
            trace!(
                %name,
                target_type = target.type_descriptor().type_name(),
                "Skipping recursive data object binding"
            );
            return Ok(None);
        }

        let property_binder = PropertyBinder {
            binder: self,
            handler,
            name,
        };

        context.with_data_object(type_id, |context| {
            for data_object_binder in self.data_object_binders(target) {
                if let Some(instance) =
                    data_object_binder.bind(name, target, context, &property_binder)?
                {
                    return Ok(Some(instance));
                }
            }

            Ok(None)
        })
    }

    fn is_unbindable_data_object(
        name: &ConfigurationPropertyName,
        target: &Bindable,
        context: &Context<'_>,
    ) -> bool {
        if context
            .sources()
            .iter()
            .any(|source| source.contains_descendant_of(name) == ConfigurationPropertyState::Present)
        {
            return false;
        }

        let type_descriptor = target.type_descriptor();
        type_descriptor.is_primitive() || type_descriptor.is_builtin()
    }

    fn data_object_binders(&self, target: &Bindable) -> Vec<&dyn DataObjectBinder> {
        let value_object_binder: &dyn DataObjectBinder = &self.value_object_binder;
        let bean_binder: &dyn DataObjectBinder = &self.bean_binder;

        match target.bind_method() {
            Some(BindMethod::ValueObject) => vec![value_object_binder],
            Some(BindMethod::Bean) => vec![bean_binder],
            None => vec![value_object_binder, bean_binder],
        }
    }
}

struct ElementBinder<'a> {
    binder: &'a Binder,
    handler: &'a dyn BindHandler,
    aggregate_binder: AggregateBinder,
}

impl AggregateElementBinder for ElementBinder<'_> {
    fn bind_element(
        &self,
        context: &mut Context<'_>,
        name: &ConfigurationPropertyName,
        target: Bindable,
        source: Option<&PropertySourcePtr>,
    ) -> Result<Option<BoundValue>, BindError> {
        let allow_recursive_binding = self.aggregate_binder.is_allow_recursive_binding(source);
        context.with_source(source.cloned(), |context| {
            self.binder.bind_internal(
                name,
                target,
                self.handler,
                context,
                allow_recursive_binding,
                false,
            )
        })
    }
}

struct PropertyBinder<'a> {
    binder: &'a Binder,
    handler: &'a dyn BindHandler,
    name: &'a ConfigurationPropertyName,
}

impl DataObjectPropertyBinder for PropertyBinder<'_> {
    fn bind_property(
        &self,
        context: &mut Context<'_>,
        property_name: &str,
        target: Bindable,
    ) -> Result<Option<BoundValue>, BindError> {
        let name = self.name.append(property_name)?;
        self.binder
            .bind_internal(&name, target, self.handler, context, false, false)
    }
}

#[cfg(test)]
mod tests {
    use crate::bindable::Bindable;
    use crate::binder::Binder;
    use crate::data_object::MockBindConstructorProvider;
    use crate::descriptor::{
        Bind, BoundValue, ConstructorDescriptor, DataObjectDescriptor, ParameterDescriptor,
        TypeDescriptor,
    };
    use crate::error::{BindError, ConversionError};
    use crate::name::ConfigurationPropertyName;
    use crate::property::ConfigurationProperty;
    use crate::ptr::SharedPtr;
    use crate::source::map::MapConfigurationPropertySource;
    use crate::source::{MockConfigurationPropertySource, PropertySourcePtr};
    use std::any::TypeId;

    #[derive(PartialEq, Debug)]
    struct Endpoint {
        host: String,
        port: Option<u16>,
    }

    impl Bind for Endpoint {
        fn type_descriptor() -> TypeDescriptor {
            TypeDescriptor::data_object::<Self>(|| DataObjectDescriptor {
                constructor: Some(ConstructorDescriptor {
                    parameters: vec![
                        ParameterDescriptor {
                            name: "host",
                            type_descriptor: TypeDescriptor::of::<String>,
                            default: None,
                        },
                        ParameterDescriptor {
                            name: "port",
                            type_descriptor: TypeDescriptor::of::<Option<u16>>,
                            default: None,
                        },
                    ],
                    instantiate: |arguments| {
                        let mut arguments = arguments.into_iter();
                        Some(Box::new(Endpoint {
                            host: *arguments.next()??.downcast::<String>().ok()?,
                            port: *arguments.next()??.downcast::<Option<u16>>().ok()?,
                        }) as BoundValue)
                    },
                }),
                bean: None,
            })
        }
    }

    fn binder(properties: &[(&str, &str)]) -> Binder {
        let source: MapConfigurationPropertySource = properties.iter().copied().collect();
        Binder::new(vec![SharedPtr::new(source) as PropertySourcePtr])
    }

    #[test]
    fn should_bind_scalar_from_non_iterable_source() {
        let mut source = MockConfigurationPropertySource::new();
        source.expect_caching().returning(|| None);
        source
            .expect_configuration_property()
            .returning(|name| {
                (name.to_string() == "server.port").then(|| {
                    ConfigurationProperty::new(name.clone(), "8080".into(), None)
                })
            });

        let binder = Binder::new(vec![SharedPtr::new(source) as PropertySourcePtr]);
        assert_eq!(binder.bind::<u16>("server.port").unwrap().get().unwrap(), 8080);
    }

    #[test]
    fn should_bind_data_object() {
        let binder = binder(&[("endpoint.host", "localhost")]);
        assert_eq!(
            binder.bind::<Endpoint>("endpoint").unwrap().get().unwrap(),
            Endpoint {
                host: "localhost".to_string(),
                port: None
            }
        );

        let binder = self::binder(&[("endpoint.port", "80")]);
        assert!(!binder.bind::<Endpoint>("endpoint").unwrap().is_bound());
    }

    #[test]
    fn should_prefer_earlier_sources() {
        let first: MapConfigurationPropertySource = [("port", "1")].into_iter().collect();
        let second: MapConfigurationPropertySource =
            [("port", "2"), ("host", "x")].into_iter().collect();
        let binder = Binder::new(vec![
            SharedPtr::new(first) as PropertySourcePtr,
            SharedPtr::new(second) as PropertySourcePtr,
        ]);

        assert_eq!(binder.bind::<u8>("port").unwrap().get().unwrap(), 1);
        assert_eq!(binder.bind::<String>("host").unwrap().get().unwrap(), "x");
    }

    #[test]
    fn should_reject_incompatible_target() {
        let binder = binder(&[]);
        let result = binder.bind_with::<u16>(
            &ConfigurationPropertyName::empty(),
            Bindable::of::<String>(),
            None,
        );

        assert!(matches!(result, Err(BindError::IncompatibleTarget { .. })));
    }

    #[test]
    fn should_report_conversion_failures_with_context() {
        let binder = binder(&[("endpoint.host", "h"), ("endpoint.port", "high")]);
        let error = binder.bind::<Endpoint>("endpoint").unwrap_err();

        let BindError::Bind { name, property, .. } = &error else {
            panic!("Unexpected error: {error:?}");
        };
        assert_eq!(name.to_string(), "endpoint.port");
        assert_eq!(property.as_ref().unwrap().value().to_string(), "high");
        assert!(matches!(
            error.root_cause(),
            BindError::Conversion(ConversionError::ConversionFailed { .. })
        ));
    }

    #[test]
    fn should_use_property_editors_first() {
        let source: MapConfigurationPropertySource =
            [("endpoint", "example.com:443")].into_iter().collect();
        let binder = Binder::builder()
            .with_source(SharedPtr::new(source))
            .with_property_editor(|value: &str| {
                value
                    .split_once(':')
                    .ok_or("missing port")
                    .and_then(|(host, port)| {
                        port.parse()
                            .map(|port| Endpoint {
                                host: host.to_string(),
                                port: Some(port),
                            })
                            .map_err(|_| "invalid port")
                    })
            })
            .build();

        assert_eq!(
            binder.bind::<Endpoint>("endpoint").unwrap().get().unwrap(),
            Endpoint {
                host: "example.com".to_string(),
                port: Some(443)
            }
        );
    }

    #[test]
    fn should_use_constructor_provider() {
        let source: MapConfigurationPropertySource =
            [("endpoint.host", "localhost")].into_iter().collect();

        let mut provider = MockBindConstructorProvider::new();
        provider
            .expect_bind_constructor()
            .times(1)
            .returning(|_, _, _| None);

        let binder = Binder::builder()
            .with_source(SharedPtr::new(source))
            .with_constructor_provider(SharedPtr::new(provider))
            .build();

        assert!(!binder.bind::<Endpoint>("endpoint").unwrap().is_bound());
    }

    #[test]
    fn should_cache_data_object_descriptors() {
        let binder = binder(&[]);
        let first = binder.data_object_descriptor(TypeId::of::<Endpoint>(), || {
            DataObjectDescriptor::default()
        });
        let second = binder.data_object_descriptor(TypeId::of::<Endpoint>(), || {
            DataObjectDescriptor::default()
        });

        assert!(SharedPtr::ptr_eq(&first, &second));
    }
}
