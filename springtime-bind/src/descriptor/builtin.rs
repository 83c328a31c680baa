//! [Bind] implementations for standard library types.

use crate::descriptor::{
    ArrayDescriptor, Bind, BoundValue, CollectionDescriptor, MapDescriptor, ScalarDescriptor,
    ScalarParseError, TypeDescriptor, TypeKind, WrapperDescriptor,
};
use crate::property::PropertyValue;
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

#[inline]
fn boxed<T: 'static>(value: T) -> BoundValue {
    Box::new(value)
}

/// Normalizes a name for lenient enum matching: only alphanumeric characters are kept and
/// compared case-insensitively, so `ALWAYS_ON`, `always-on` and `alwaysOn` are equal.
pub fn lenient_enum_name(name: &str) -> String {
    name.chars()
        .filter(|character| character.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_integer_text(text: &str) -> Result<i128, ScalarParseError> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let (radix, digits) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .or_else(|| digits.strip_prefix('#'))
    {
        Some(digits) => (16, digits),
        None => (10, digits),
    };

    // a sign is only allowed before the radix prefix
    if digits.starts_with(['-', '+']) {
        return Err(ScalarParseError::Invalid(format!(
            "'{text}' is not a valid integer"
        )));
    }

    let number = i128::from_str_radix(digits, radix).map_err(|error| {
        ScalarParseError::Invalid(format!("'{text}' is not a valid integer: {error}"))
    })?;

    Ok(if negative { -number } else { number })
}

fn parse_integer<T>(value: &PropertyValue) -> Result<BoundValue, ScalarParseError>
where
    T: TryFrom<i64> + TryFrom<i128> + 'static,
{
    let out_of_range =
        |number: &dyn std::fmt::Display| ScalarParseError::Invalid(format!("{number} is out of range"));

    match value {
        PropertyValue::Integer(number) => T::try_from(*number)
            .map(boxed)
            .map_err(|_| out_of_range(number)),
        PropertyValue::Float(number) if number.is_finite() && number.fract() == 0.0 => {
            T::try_from(*number as i128)
                .map(boxed)
                .map_err(|_| out_of_range(number))
        }
        PropertyValue::Float(number) => Err(ScalarParseError::Invalid(format!(
            "{number} is not an integer"
        ))),
        PropertyValue::Text(text) => {
            let number = parse_integer_text(text.trim())?;
            T::try_from(number)
                .map(boxed)
                .map_err(|_| out_of_range(&number))
        }
        _ => Err(ScalarParseError::Unsupported),
    }
}

macro_rules! integer_bind {
    ($($ty:ty),*) => {
        $(
            impl Bind for $ty {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::new::<$ty>(TypeKind::Scalar(ScalarDescriptor {
                        parse: parse_integer::<$ty>,
                        primitive: true,
                    }))
                }
            }
        )*
    };
}

integer_bind!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! float_bind {
    ($($ty:ty),*) => {
        $(
            impl Bind for $ty {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::new::<$ty>(TypeKind::Scalar(ScalarDescriptor {
                        parse: |value| match value {
                            PropertyValue::Float(number) => Ok(boxed(*number as $ty)),
                            PropertyValue::Integer(number) => Ok(boxed(*number as $ty)),
                            PropertyValue::Text(text) => text
                                .trim()
                                .parse::<$ty>()
                                .map(boxed)
                                .map_err(|error| ScalarParseError::Invalid(error.to_string())),
                            _ => Err(ScalarParseError::Unsupported),
                        },
                        primitive: true,
                    }))
                }
            }
        )*
    };
}

float_bind!(f32, f64);

impl Bind for bool {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<bool>(TypeKind::Scalar(ScalarDescriptor {
            parse: |value| match value {
                PropertyValue::Boolean(value) => Ok(boxed(*value)),
                PropertyValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => Ok(boxed(true)),
                    "false" | "off" | "no" | "0" => Ok(boxed(false)),
                    _ => Err(ScalarParseError::Invalid(format!(
                        "'{text}' is not a valid boolean"
                    ))),
                },
                _ => Err(ScalarParseError::Unsupported),
            },
            primitive: true,
        }))
    }
}

impl Bind for char {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<char>(TypeKind::Scalar(ScalarDescriptor {
            parse: |value| match value {
                PropertyValue::Text(text) => {
                    let mut characters = text.chars();
                    match (characters.next(), characters.next()) {
                        (Some(character), None) => Ok(boxed(character)),
                        _ => Err(ScalarParseError::Invalid(format!(
                            "'{text}' is not a single character"
                        ))),
                    }
                }
                _ => Err(ScalarParseError::Unsupported),
            },
            primitive: true,
        }))
    }
}

impl Bind for String {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::scalar::<String>(|value| Ok(boxed(value.to_string())))
    }
}

impl Bind for PropertyValue {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::scalar::<PropertyValue>(|value| Ok(boxed(value.clone())))
    }
}

macro_rules! parsed_bind {
    ($($ty:ty),*) => {
        $(
            impl Bind for $ty {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::parsed::<$ty>()
                }
            }
        )*
    };
}

parsed_bind!(PathBuf, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);

/// Parses durations in the simple style (`10s`, `500ms`, `2h`, a bare number meaning
/// milliseconds) or the ISO-8601 style (`PT15M`, `P1DT2H`).
fn parse_duration(text: &str) -> Result<Duration, ScalarParseError> {
    let invalid = || ScalarParseError::Invalid(format!("'{text}' is not a valid duration"));

    let text = text.trim();
    if text.starts_with('P') || text.starts_with('p') {
        return parse_iso_duration(&text[1..]).ok_or_else(invalid);
    }

    let split = text
        .find(|character: char| !character.is_ascii_digit())
        .unwrap_or(text.len());
    let (amount, unit) = text.split_at(split);
    let amount: u64 = amount.parse().map_err(|_| invalid())?;

    let seconds = |multiplier: u64| {
        amount
            .checked_mul(multiplier)
            .map(Duration::from_secs)
            .ok_or_else(invalid)
    };

    match unit.trim().to_ascii_lowercase().as_str() {
        "ns" => Ok(Duration::from_nanos(amount)),
        "us" => Ok(Duration::from_micros(amount)),
        "" | "ms" => Ok(Duration::from_millis(amount)),
        "s" => seconds(1),
        "m" => seconds(60),
        "h" => seconds(60 * 60),
        "d" => seconds(60 * 60 * 24),
        _ => Err(invalid()),
    }
}

fn parse_iso_duration(text: &str) -> Option<Duration> {
    let mut duration = Duration::ZERO;
    let mut in_time = false;
    let mut amount = String::new();
    let mut has_component = false;

    for character in text.chars() {
        match character.to_ascii_uppercase() {
            'T' if !in_time && amount.is_empty() => in_time = true,
            digit @ ('0'..='9' | '.') => amount.push(digit),
            unit => {
                let value: f64 = amount.parse().ok()?;
                let seconds = match (unit, in_time) {
                    ('D', false) => value * 86_400.0,
                    ('H', true) => value * 3_600.0,
                    ('M', true) => value * 60.0,
                    ('S', true) => value,
                    _ => return None,
                };

                duration = duration.checked_add(Duration::try_from_secs_f64(seconds).ok()?)?;
                amount.clear();
                has_component = true;
            }
        }
    }

    (amount.is_empty() && has_component).then_some(duration)
}

impl Bind for Duration {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::scalar::<Duration>(|value| match value {
            PropertyValue::Integer(millis) => u64::try_from(*millis)
                .map(|millis| boxed(Duration::from_millis(millis)))
                .map_err(|_| ScalarParseError::Invalid(format!("{millis} is negative"))),
            PropertyValue::Text(text) => parse_duration(text).map(boxed),
            _ => Err(ScalarParseError::Unsupported),
        })
    }
}

impl<T: Bind> Bind for Option<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(TypeKind::Wrapper(WrapperDescriptor {
            inner: T::type_descriptor,
            wrap: |value| value.downcast::<T>().ok().map(|value| boxed(Some(*value))),
            unwrap: |value| {
                value
                    .downcast::<Option<T>>()
                    .ok()
                    .and_then(|value| (*value).map(boxed))
            },
            absent: Some(|| boxed(None::<T>)),
        }))
    }
}

impl<T: Bind> Bind for Box<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(TypeKind::Wrapper(WrapperDescriptor {
            inner: T::type_descriptor,
            wrap: |value| value.downcast::<T>().ok().map(boxed),
            unwrap: |value| value.downcast::<Box<T>>().ok().map(|value| *value as BoundValue),
            absent: None,
        }))
    }
}

impl<T: Bind> Bind for Rc<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(TypeKind::Wrapper(WrapperDescriptor {
            inner: T::type_descriptor,
            wrap: |value| value.downcast::<T>().ok().map(|value| boxed(Rc::new(*value))),
            unwrap: |value| {
                value
                    .downcast::<Rc<T>>()
                    .ok()
                    .and_then(|value| Rc::try_unwrap(*value).ok())
                    .map(boxed)
            },
            absent: None,
        }))
    }
}

impl<T: Bind> Bind for Arc<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(TypeKind::Wrapper(WrapperDescriptor {
            inner: T::type_descriptor,
            wrap: |value| value.downcast::<T>().ok().map(|value| boxed(Arc::new(*value))),
            unwrap: |value| {
                value
                    .downcast::<Arc<T>>()
                    .ok()
                    .and_then(|value| Arc::try_unwrap(*value).ok())
                    .map(boxed)
            },
            absent: None,
        }))
    }
}

trait BindCollection: Default + 'static {
    type Element: Bind;

    fn push_element(&mut self, element: Self::Element);
}

impl<T: Bind> BindCollection for Vec<T> {
    type Element = T;

    fn push_element(&mut self, element: T) {
        self.push(element);
    }
}

impl<T: Bind> BindCollection for VecDeque<T> {
    type Element = T;

    fn push_element(&mut self, element: T) {
        self.push_back(element);
    }
}

impl<T: Bind + Eq + Hash, S: BuildHasher + Default + 'static> BindCollection for HashSet<T, S> {
    type Element = T;

    fn push_element(&mut self, element: T) {
        self.insert(element);
    }
}

impl<T: Bind + Ord> BindCollection for BTreeSet<T> {
    type Element = T;

    fn push_element(&mut self, element: T) {
        self.insert(element);
    }
}

fn collection_descriptor<C: BindCollection>() -> TypeDescriptor {
    TypeDescriptor::new::<C>(TypeKind::Collection(CollectionDescriptor {
        element: <C::Element as Bind>::type_descriptor,
        create: || boxed(C::default()),
        push: |collection, element| {
            if let (Some(collection), Ok(element)) = (
                collection.downcast_mut::<C>(),
                element.downcast::<C::Element>(),
            ) {
                collection.push_element(*element);
            }
        },
    }))
}

impl<T: Bind> Bind for Vec<T> {
    fn type_descriptor() -> TypeDescriptor {
        collection_descriptor::<Self>()
    }
}

impl<T: Bind> Bind for VecDeque<T> {
    fn type_descriptor() -> TypeDescriptor {
        collection_descriptor::<Self>()
    }
}

impl<T: Bind + Eq + Hash, S: BuildHasher + Default + 'static> Bind for HashSet<T, S> {
    fn type_descriptor() -> TypeDescriptor {
        collection_descriptor::<Self>()
    }
}

impl<T: Bind + Ord> Bind for BTreeSet<T> {
    fn type_descriptor() -> TypeDescriptor {
        collection_descriptor::<Self>()
    }
}

trait BindMap: Default + 'static {
    type Key: Bind;
    type Value: Bind;

    fn contains(&self, key: &Self::Key) -> bool;

    fn insert_entry(&mut self, key: Self::Key, value: Self::Value);

    fn entry_count(&self) -> usize;

    fn merge_from(&mut self, other: Self);
}

impl<K: Bind + Eq + Hash, V: Bind, S: BuildHasher + Default + 'static> BindMap
    for HashMap<K, V, S>
{
    type Key = K;
    type Value = V;

    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn merge_from(&mut self, other: Self) {
        self.extend(other);
    }
}

impl<K: Bind + Ord, V: Bind> BindMap for BTreeMap<K, V> {
    type Key = K;
    type Value = V;

    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn merge_from(&mut self, other: Self) {
        self.extend(other);
    }
}

impl<K: Bind + Eq + Hash, V: Bind, S: BuildHasher + Default + 'static> BindMap
    for IndexMap<K, V, S>
{
    type Key = K;
    type Value = V;

    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn merge_from(&mut self, other: Self) {
        self.extend(other);
    }
}

fn map_descriptor<M: BindMap>() -> TypeDescriptor {
    TypeDescriptor::new::<M>(TypeKind::Map(MapDescriptor {
        key: <M::Key as Bind>::type_descriptor,
        value: <M::Value as Bind>::type_descriptor,
        create: || boxed(M::default()),
        contains_key: |map, key| match (map.downcast_ref::<M>(), key.downcast_ref::<M::Key>()) {
            (Some(map), Some(key)) => map.contains(key),
            _ => false,
        },
        insert: |map, key, value| {
            if let (Some(map), Ok(key), Ok(value)) = (
                map.downcast_mut::<M>(),
                key.downcast::<M::Key>(),
                value.downcast::<M::Value>(),
            ) {
                map.insert_entry(*key, *value);
            }
        },
        len: |map| {
            map.downcast_ref::<M>()
                .map(M::entry_count)
                .unwrap_or_default()
        },
        merge: |existing, additional| match existing.downcast::<M>() {
            Ok(mut existing) => match additional.downcast::<M>() {
                Ok(additional) => {
                    existing.merge_from(*additional);
                    existing as BoundValue
                }
                Err(additional) => additional,
            },
            Err(_) => additional,
        },
    }))
}

impl<K: Bind + Eq + Hash, V: Bind, S: BuildHasher + Default + 'static> Bind for HashMap<K, V, S> {
    fn type_descriptor() -> TypeDescriptor {
        map_descriptor::<Self>()
    }
}

impl<K: Bind + Ord, V: Bind> Bind for BTreeMap<K, V> {
    fn type_descriptor() -> TypeDescriptor {
        map_descriptor::<Self>()
    }
}

impl<K: Bind + Eq + Hash, V: Bind, S: BuildHasher + Default + 'static> Bind
    for IndexMap<K, V, S>
{
    fn type_descriptor() -> TypeDescriptor {
        map_descriptor::<Self>()
    }
}

impl<T: Bind, const N: usize> Bind for [T; N] {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(TypeKind::Array(ArrayDescriptor {
            element: T::type_descriptor,
            len: N,
            from_elements: |elements| {
                let elements = elements
                    .into_iter()
                    .map(|element| element.downcast::<T>().ok().map(|element| *element))
                    .collect::<Option<Vec<T>>>()?;

                <[T; N]>::try_from(elements).ok().map(boxed)
            },
        }))
    }
}
