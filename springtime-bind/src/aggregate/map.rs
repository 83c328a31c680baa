use crate::aggregate::AggregateElementBinder;
use crate::bindable::{BindRestriction, Bindable};
use crate::context::{BindContext, Context};
use crate::descriptor::{BoundValue, MapDescriptor, TypeDescriptor, TypeKind};
use crate::error::BindError;
use crate::name::ConfigurationPropertyName;
use crate::property::PropertyValue;
use crate::source::{ConfigurationPropertyState, PropertySourcePtr};
use itertools::Itertools;

pub(super) fn bind(
    descriptor: &MapDescriptor,
    context: &mut Context<'_>,
    name: &ConfigurationPropertyName,
    target: &Bindable,
    element_binder: &dyn AggregateElementBinder,
) -> Result<Option<BoundValue>, BindError> {
    let sources = context.sources().to_vec();

    let has_descendants = sources.iter().any(|source| {
        source.contains_descendant_of(name) == ConfigurationPropertyState::Present
    });

    if !has_descendants
        && !name.is_empty()
        && !target.has_bind_restriction(BindRestriction::NoDirectProperty)
    {
        for source in &sources {
            if let Some(property) = source.configuration_property(name) {
                let value = context
                    .placeholders_resolver()
                    .resolve_placeholders(property.value().clone())?;
                context.set_configuration_property(property);
                return Ok(Some(context.converter().convert(&value, target)?));
            }
        }
    }

    let key_type = (descriptor.key)();
    let value_type = (descriptor.value)();
    let mut map = (descriptor.create)();

    for source in &sources {
        let Some(names) = source.property_names() else {
            continue;
        };

        for property_name in names
            .iter()
            .filter(|property_name| name.is_ancestor_of(property_name))
        {
            let entry_name = entry_name(context, source, name, property_name, &value_type);
            let key = context.converter().convert_to(
                &PropertyValue::Text(key_name(name, &entry_name)),
                &key_type,
            )?;

            if (descriptor.contains_key)(map.as_ref(), key.as_ref()) {
                continue;
            }

            if let Some(value) = element_binder.bind_element(
                context,
                &entry_name,
                Bindable::of_type(value_type),
                None,
            )? {
                (descriptor.insert)(map.as_mut(), key, value);
            }
        }
    }

    Ok(((descriptor.len)(map.as_ref()) > 0).then_some(map))
}

/// Computes the name under which a map value is bound. Aggregate values are bound up to their
/// first numeric index, scalar values under the full name, and other values under the first element
/// following the map name.
fn entry_name(
    context: &Context<'_>,
    source: &PropertySourcePtr,
    root: &ConfigurationPropertyName,
    name: &ConfigurationPropertyName,
    value_type: &TypeDescriptor,
) -> ConfigurationPropertyName {
    if is_aggregate(value_type) {
        return chop_at_numeric_index(root, name);
    }

    if !root.is_parent_of(name) && !is_scalar_value(context, source, name, value_type) {
        return name.chop(root.len() + 1);
    }

    name.clone()
}

fn is_aggregate(value_type: &TypeDescriptor) -> bool {
    match value_type.kind() {
        TypeKind::Wrapper(wrapper) => is_aggregate(&(wrapper.inner)()),
        TypeKind::Collection(_) | TypeKind::Array(_) => true,
        _ => false,
    }
}

fn is_scalar_value(
    context: &Context<'_>,
    source: &PropertySourcePtr,
    name: &ConfigurationPropertyName,
    value_type: &TypeDescriptor,
) -> bool {
    let is_scalar = match value_type.kind() {
        TypeKind::Scalar(_) => true,
        TypeKind::Wrapper(wrapper) => matches!((wrapper.inner)().kind(), TypeKind::Scalar(_)),
        _ => false,
    };

    is_scalar
        && source
            .configuration_property(name)
            .map(|property| context.converter().can_convert(property.value(), value_type))
            .unwrap_or_default()
}

fn chop_at_numeric_index(
    root: &ConfigurationPropertyName,
    name: &ConfigurationPropertyName,
) -> ConfigurationPropertyName {
    (root.len() + 1..name.len())
        .find(|position| name.numeric_index(*position).is_some())
        .map(|position| name.chop(position))
        .unwrap_or_else(|| name.clone())
}

fn key_name(root: &ConfigurationPropertyName, entry_name: &ConfigurationPropertyName) -> String {
    entry_name.elements().skip(root.len()).join(".")
}
