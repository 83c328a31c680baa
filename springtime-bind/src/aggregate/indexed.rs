use crate::aggregate::AggregateElementBinder;
use crate::bindable::{BindRestriction, Bindable};
use crate::context::{BindContext, Context};
use crate::descriptor::{BoundValue, TypeDescriptor};
use crate::error::BindError;
use crate::name::ConfigurationPropertyName;
use crate::property::PropertyValue;
use crate::source::PropertySourcePtr;
use std::collections::BTreeMap;
use tracing::debug;

/// Binds elements of a collection or an array. Sources are consulted in order, and the first one
/// which supplies anything wins.
pub(super) fn bind(
    context: &mut Context<'_>,
    name: &ConfigurationPropertyName,
    target: &Bindable,
    element_type: TypeDescriptor,
    element_binder: &dyn AggregateElementBinder,
) -> Result<Option<Vec<BoundValue>>, BindError> {
    let sources = context.sources().to_vec();
    for source in &sources {
        let elements =
            bind_from_source(context, source, name, target, element_type, element_binder)?;
        if elements.is_some() {
            return Ok(elements);
        }
    }

    debug!(
        %name,
        target_type = target.type_descriptor().type_name(),
        "No elements found"
    );
    Ok(None)
}

fn bind_from_source(
    context: &mut Context<'_>,
    source: &PropertySourcePtr,
    name: &ConfigurationPropertyName,
    target: &Bindable,
    element_type: TypeDescriptor,
    element_binder: &dyn AggregateElementBinder,
) -> Result<Option<Vec<BoundValue>>, BindError> {
    if !target.has_bind_restriction(BindRestriction::NoDirectProperty) {
        if let Some(property) = source.configuration_property(name) {
            let value = property.value().clone();
            context.set_configuration_property(property);
            return bind_value(context, value, &element_type).map(Some);
        }
    }

    bind_indexed(context, source, name, element_type, element_binder)
}

/// Binds a whole aggregate given as a single value: a delimited text or a native sequence.
fn bind_value(
    context: &Context<'_>,
    value: PropertyValue,
    element_type: &TypeDescriptor,
) -> Result<Vec<BoundValue>, BindError> {
    if value.is_empty_text() {
        return Ok(vec![]);
    }

    let value = context.placeholders_resolver().resolve_placeholders(value)?;
    value
        .into_elements()
        .iter()
        .map(|element| {
            context
                .converter()
                .convert_to(element, element_type)
                .map_err(BindError::from)
        })
        .collect()
}

fn bind_indexed(
    context: &mut Context<'_>,
    source: &PropertySourcePtr,
    root: &ConfigurationPropertyName,
    element_type: TypeDescriptor,
    element_binder: &dyn AggregateElementBinder,
) -> Result<Option<Vec<BoundValue>>, BindError> {
    let mut known_children = known_indexed_children(source, root);
    let mut elements: Option<Vec<BoundValue>> = None;

    for index in 0usize.. {
        let name = root.append_index(index);
        let Some(element) = element_binder.bind_element(
            context,
            &name,
            Bindable::of_type(element_type),
            Some(source),
        )?
        else {
            break;
        };

        known_children.remove(&(index as u64));
        elements.get_or_insert_with(Vec::new).push(element);
    }

    // indexes after a gap, in ascending order
    for (index, name) in known_children {
        debug!(%name, index, "Binding element after a gap in indexes");

        if let Some(element) = element_binder.bind_element(
            context,
            &name,
            Bindable::of_type(element_type),
            Some(source),
        )? {
            elements.get_or_insert_with(Vec::new).push(element);
        }
    }

    Ok(elements)
}

fn known_indexed_children(
    source: &PropertySourcePtr,
    root: &ConfigurationPropertyName,
) -> BTreeMap<u64, ConfigurationPropertyName> {
    let Some(names) = source.property_names() else {
        return BTreeMap::new();
    };

    names
        .iter()
        .filter(|name| root.is_ancestor_of(name))
        .filter_map(|name| {
            let child = name.chop(root.len() + 1);
            child.numeric_index(root.len()).map(|index| (index, child))
        })
        .collect()
}
