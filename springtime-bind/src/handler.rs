//! Hooks into the binding process.
//!
//! A [BindHandler] is notified about the start, outcome and end of binding of every name visited
//! while binding an object graph, not only the root. Handlers can replace targets, post-process
//! results, recover from failures and validate the final outcome. Built-in handlers delegate to a
//! parent handler, so they can be chained.

use crate::bindable::Bindable;
use crate::context::BindContext;
use crate::descriptor::BoundValue;
use crate::error::BindError;
use crate::name::ConfigurationPropertyName;
use crate::property::ConfigurationProperty;
use crate::ptr::SharedPtr;
use fxhash::FxHashSet;
use parking_lot::Mutex;
use tracing::{debug, warn};

#[cfg(not(feature = "threadsafe"))]
pub type BindHandlerPtr = SharedPtr<dyn BindHandler>;
#[cfg(feature = "threadsafe")]
pub type BindHandlerPtr = SharedPtr<dyn BindHandler + Send + Sync>;

/// Callbacks invoked while binding. All of them have pass-through default implementations.
pub trait BindHandler {
    /// Called before binding a name. Returning `None` skips binding, while returning a different
    /// target replaces the original one.
    fn on_start(
        &self,
        _name: &ConfigurationPropertyName,
        target: Bindable,
        _context: &dyn BindContext,
    ) -> Result<Option<Bindable>, BindError> {
        Ok(Some(target))
    }

    /// Called when a value has been bound. The returned value replaces the bound one.
    fn on_success(
        &self,
        _name: &ConfigurationPropertyName,
        _target: &Bindable,
        _context: &dyn BindContext,
        result: BoundValue,
    ) -> Result<BoundValue, BindError> {
        Ok(result)
    }

    /// Called when a value has been created because nothing was bound, but creation was requested.
    fn on_create(
        &self,
        _name: &ConfigurationPropertyName,
        _target: &Bindable,
        _context: &dyn BindContext,
        result: BoundValue,
    ) -> Result<BoundValue, BindError> {
        Ok(result)
    }

    /// Called when binding fails. Returning `Ok` recovers from the failure with the given value, or
    /// with nothing bound.
    fn on_failure(
        &self,
        _name: &ConfigurationPropertyName,
        _target: &Bindable,
        _context: &dyn BindContext,
        error: BindError,
    ) -> Result<Option<BoundValue>, BindError> {
        Err(error)
    }

    /// Called when binding of a name finishes without an error, whether anything was bound or not.
    fn on_finish(
        &self,
        _name: &ConfigurationPropertyName,
        _target: &Bindable,
        _context: &dyn BindContext,
        _result: Option<&BoundValue>,
    ) -> Result<(), BindError> {
        Ok(())
    }
}

/// Handler which does nothing.
#[derive(Clone, Copy, Default, Debug)]
pub struct DefaultBindHandler;

impl BindHandler for DefaultBindHandler {}

fn default_parent() -> BindHandlerPtr {
    SharedPtr::new(DefaultBindHandler)
}

macro_rules! delegate_to_parent {
    (on_start) => {
        fn on_start(
            &self,
            name: &ConfigurationPropertyName,
            target: Bindable,
            context: &dyn BindContext,
        ) -> Result<Option<Bindable>, BindError> {
            self.parent.on_start(name, target, context)
        }
    };
    (on_success) => {
        fn on_success(
            &self,
            name: &ConfigurationPropertyName,
            target: &Bindable,
            context: &dyn BindContext,
            result: BoundValue,
        ) -> Result<BoundValue, BindError> {
            self.parent.on_success(name, target, context, result)
        }
    };
    (on_create) => {
        fn on_create(
            &self,
            name: &ConfigurationPropertyName,
            target: &Bindable,
            context: &dyn BindContext,
            result: BoundValue,
        ) -> Result<BoundValue, BindError> {
            self.parent.on_create(name, target, context, result)
        }
    };
    (on_finish) => {
        fn on_finish(
            &self,
            name: &ConfigurationPropertyName,
            target: &Bindable,
            context: &dyn BindContext,
            result: Option<&BoundValue>,
        ) -> Result<(), BindError> {
            self.parent.on_finish(name, target, context, result)
        }
    };
}

/// Ignores all binding failures, falling back to the existing value of the target, if any.
#[derive(Clone)]
pub struct IgnoreErrorsBindHandler {
    parent: BindHandlerPtr,
}

impl IgnoreErrorsBindHandler {
    pub fn new() -> Self {
        Self::with_parent(default_parent())
    }

    pub fn with_parent(parent: BindHandlerPtr) -> Self {
        Self { parent }
    }
}

impl Default for IgnoreErrorsBindHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl BindHandler for IgnoreErrorsBindHandler {
    delegate_to_parent!(on_start);
    delegate_to_parent!(on_success);
    delegate_to_parent!(on_create);
    delegate_to_parent!(on_finish);

    fn on_failure(
        &self,
        name: &ConfigurationPropertyName,
        target: &Bindable,
        _context: &dyn BindContext,
        error: BindError,
    ) -> Result<Option<BoundValue>, BindError> {
        debug!(%name, %error, "Ignoring bind error");
        Ok(target.take_value())
    }
}

/// Ignores failures caused by a missing converter for the root name, so a direct property which
/// cannot be converted to the root target does not fail binding.
#[derive(Clone)]
pub struct IgnoreTopLevelConverterNotFoundBindHandler {
    parent: BindHandlerPtr,
}

impl IgnoreTopLevelConverterNotFoundBindHandler {
    pub fn new() -> Self {
        Self::with_parent(default_parent())
    }

    pub fn with_parent(parent: BindHandlerPtr) -> Self {
        Self { parent }
    }
}

impl Default for IgnoreTopLevelConverterNotFoundBindHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl BindHandler for IgnoreTopLevelConverterNotFoundBindHandler {
    delegate_to_parent!(on_start);
    delegate_to_parent!(on_success);
    delegate_to_parent!(on_create);
    delegate_to_parent!(on_finish);

    fn on_failure(
        &self,
        name: &ConfigurationPropertyName,
        target: &Bindable,
        context: &dyn BindContext,
        error: BindError,
    ) -> Result<Option<BoundValue>, BindError> {
        if context.depth() == 0 && error.is_converter_not_found() {
            return Ok(None);
        }

        self.parent.on_failure(name, target, context, error)
    }
}

/// Fails binding if any property under the root name was left unbound, e.g. because of a typo in
/// a property name. Only iterable sources are checked.
pub struct NoUnboundElementsBindHandler {
    parent: BindHandlerPtr,
    bound_names: Mutex<FxHashSet<ConfigurationPropertyName>>,
    attempted_names: Mutex<FxHashSet<ConfigurationPropertyName>>,
}

impl NoUnboundElementsBindHandler {
    pub fn new() -> Self {
        Self::with_parent(default_parent())
    }

    pub fn with_parent(parent: BindHandlerPtr) -> Self {
        Self {
            parent,
            bound_names: Default::default(),
            attempted_names: Default::default(),
        }
    }

    fn check_no_unbound_elements(
        &self,
        name: &ConfigurationPropertyName,
        context: &dyn BindContext,
    ) -> Result<(), BindError> {
        let bound_names = self.bound_names.lock();
        let attempted_names = self.attempted_names.lock();

        let mut unbound: Vec<ConfigurationProperty> = vec![];
        for source in context.sources() {
            let Some(names) = source.property_names() else {
                continue;
            };

            for candidate in names.iter().filter(|candidate| name.is_ancestor_of(candidate)) {
                if bound_names.contains(candidate)
                    || attempted_names.contains(candidate)
                    || Self::is_overridden_collection_element(name, candidate, &bound_names)
                {
                    continue;
                }

                if let Some(property) = source.configuration_property(candidate) {
                    if !unbound
                        .iter()
                        .any(|existing| existing.name() == property.name())
                    {
                        unbound.push(property);
                    }
                }
            }
        }

        if unbound.is_empty() {
            Ok(())
        } else {
            warn!(%name, count = unbound.len(), "Found unbound configuration properties");
            Err(BindError::UnboundProperties(unbound))
        }
    }

    fn is_overridden_collection_element(
        root: &ConfigurationPropertyName,
        candidate: &ConfigurationPropertyName,
        bound_names: &FxHashSet<ConfigurationPropertyName>,
    ) -> bool {
        (root.len() + 1..candidate.len())
            .any(|position| candidate.is_indexed(position) && bound_names.contains(&candidate.chop(position)))
    }
}

impl Default for NoUnboundElementsBindHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl BindHandler for NoUnboundElementsBindHandler {
    delegate_to_parent!(on_start);
    delegate_to_parent!(on_create);

    fn on_success(
        &self,
        name: &ConfigurationPropertyName,
        target: &Bindable,
        context: &dyn BindContext,
        result: BoundValue,
    ) -> Result<BoundValue, BindError> {
        self.bound_names.lock().insert(name.clone());
        self.parent.on_success(name, target, context, result)
    }

    fn on_failure(
        &self,
        name: &ConfigurationPropertyName,
        target: &Bindable,
        context: &dyn BindContext,
        error: BindError,
    ) -> Result<Option<BoundValue>, BindError> {
        let result = self.parent.on_failure(name, target, context, error);
        if matches!(result, Ok(None)) {
            self.attempted_names.lock().insert(name.clone());
        }

        result
    }

    fn on_finish(
        &self,
        name: &ConfigurationPropertyName,
        target: &Bindable,
        context: &dyn BindContext,
        result: Option<&BoundValue>,
    ) -> Result<(), BindError> {
        if context.depth() == 0 {
            self.check_no_unbound_elements(name, context)?;
        }

        self.parent.on_finish(name, target, context, result)
    }
}

/// Traces every step of binding with [tracing] at the debug level.
#[derive(Clone)]
pub struct TracingBindHandler {
    parent: BindHandlerPtr,
}

impl TracingBindHandler {
    pub fn new() -> Self {
        Self::with_parent(default_parent())
    }

    pub fn with_parent(parent: BindHandlerPtr) -> Self {
        Self { parent }
    }
}

impl Default for TracingBindHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl BindHandler for TracingBindHandler {
    fn on_start(
        &self,
        name: &ConfigurationPropertyName,
        target: Bindable,
        context: &dyn BindContext,
    ) -> Result<Option<Bindable>, BindError> {
        debug!(
            %name,
            target_type = target.type_descriptor().type_name(),
            depth = context.depth(),
            "Binding started"
        );
        self.parent.on_start(name, target, context)
    }

    fn on_success(
        &self,
        name: &ConfigurationPropertyName,
        target: &Bindable,
        context: &dyn BindContext,
        result: BoundValue,
    ) -> Result<BoundValue, BindError> {
        debug!(
            %name,
            property = ?context.configuration_property(),
            "Binding succeeded"
        );
        self.parent.on_success(name, target, context, result)
    }

    fn on_create(
        &self,
        name: &ConfigurationPropertyName,
        target: &Bindable,
        context: &dyn BindContext,
        result: BoundValue,
    ) -> Result<BoundValue, BindError> {
        debug!(%name, "Created default instance");
        self.parent.on_create(name, target, context, result)
    }

    fn on_failure(
        &self,
        name: &ConfigurationPropertyName,
        target: &Bindable,
        context: &dyn BindContext,
        error: BindError,
    ) -> Result<Option<BoundValue>, BindError> {
        debug!(%name, %error, "Binding failed");
        self.parent.on_failure(name, target, context, error)
    }

    delegate_to_parent!(on_finish);
}
