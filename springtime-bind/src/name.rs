//! Hierarchical configuration property names.
//!
//! A [ConfigurationPropertyName] is a sequence of elements, e.g. `server.ports[0]` consists of
//! `server`, `ports` and the index `0`. Identifier elements compare leniently: case, dashes and
//! underscores are not significant, so `server.max-threads`, `server.maxThreads` and
//! `SERVER.MAX_THREADS` all name the same property. Index elements compare exactly, with numeric
//! indexes ordered by value.

use crate::error::ConfigurationPropertyNameError;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Clone, Debug)]
struct Element {
    value: String,
    indexed: bool,
    key: String,
}

impl Element {
    fn identifier(value: String) -> Self {
        let key = value
            .chars()
            .filter(|character| *character != '-' && *character != '_')
            .map(|character| character.to_ascii_lowercase())
            .collect();

        Self {
            value,
            indexed: false,
            key,
        }
    }

    fn index(value: String) -> Self {
        Self {
            key: value.clone(),
            value,
            indexed: true,
        }
    }

    fn numeric(&self) -> Option<u64> {
        if !self.key.is_empty() && self.key.bytes().all(|byte| byte.is_ascii_digit()) {
            self.key.parse().ok()
        } else {
            None
        }
    }

    fn compare(&self, other: &Element) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(left), Some(right)) => left.cmp(&right).then_with(|| self.key.cmp(&other.key)),
            _ => self.key.cmp(&other.key),
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

#[inline]
fn is_valid_character(character: char) -> bool {
    character.is_ascii_alphanumeric() || character == '-' || character == '_'
}

/// A configuration property name composed of identifier and index elements. The empty name is the
/// root of all names.
#[derive(Clone, Default, Debug, PartialEq, Eq, Hash)]
pub struct ConfigurationPropertyName {
    elements: Vec<Element>,
}

impl ConfigurationPropertyName {
    /// Returns the empty (root) name.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a name in its canonical form. Elements are separated with `.` and indexes are
    /// enclosed in `[...]`.
    pub fn of(name: &str) -> Result<Self, ConfigurationPropertyNameError> {
        let bytes = name.as_bytes();
        let mut elements = vec![];
        let mut position = 0;
        let mut expect_element = false;

        while position < bytes.len() {
            match bytes[position] {
                b'[' => {
                    if expect_element {
                        return Err(ConfigurationPropertyNameError::EmptyElement(name.to_string()));
                    }

                    let end = Self::closing_bracket(name, position)?;
                    let content = &name[position + 1..end];
                    if content.is_empty() {
                        return Err(ConfigurationPropertyNameError::EmptyElement(name.to_string()));
                    }

                    elements.push(Element::index(content.to_string()));
                    position = end + 1;

                    match bytes.get(position) {
                        None | Some(b'[') => {}
                        Some(b'.') => {
                            position += 1;
                            expect_element = true;
                        }
                        Some(_) => {
                            return Err(ConfigurationPropertyNameError::MisplacedIndex(
                                name.to_string(),
                            ))
                        }
                    }
                }
                b'.' => {
                    return Err(ConfigurationPropertyNameError::EmptyElement(name.to_string()));
                }
                _ => {
                    let start = position;
                    while position < bytes.len()
                        && bytes[position] != b'.'
                        && bytes[position] != b'['
                    {
                        position += 1;
                    }

                    let value = &name[start..position];
                    if let Some(character) = value.chars().find(|c| !is_valid_character(*c)) {
                        return Err(ConfigurationPropertyNameError::InvalidCharacter {
                            name: name.to_string(),
                            character,
                        });
                    }

                    elements.push(Element::identifier(value.to_string()));
                    expect_element = false;

                    if bytes.get(position) == Some(&b'.') {
                        position += 1;
                        expect_element = true;
                    }
                }
            }
        }

        if expect_element {
            return Err(ConfigurationPropertyNameError::EmptyElement(name.to_string()));
        }

        Ok(Self { elements })
    }

    /// Leniently converts an arbitrary string into a name, splitting elements on the given
    /// separator. Invalid characters and empty elements are dropped instead of reported.
    pub fn adapt(name: &str, separator: char) -> Self {
        let characters: Vec<char> = name.chars().collect();
        let mut elements = vec![];
        let mut current = String::new();
        let mut position = 0;

        while position < characters.len() {
            let character = characters[position];
            if character == '[' {
                if let Some(end) = Self::adapted_closing_bracket(&characters, position) {
                    Self::flush_identifier(&mut current, &mut elements);

                    let content: String = characters[position + 1..end].iter().collect();
                    if !content.is_empty() {
                        elements.push(Element::index(content));
                    }

                    position = end + 1;
                    continue;
                }
            } else if character == separator {
                Self::flush_identifier(&mut current, &mut elements);
            } else if is_valid_character(character) {
                current.push(character);
            }

            position += 1;
        }

        Self::flush_identifier(&mut current, &mut elements);
        Self { elements }
    }

    fn flush_identifier(current: &mut String, elements: &mut Vec<Element>) {
        if !current.is_empty() {
            elements.push(Element::identifier(std::mem::take(current)));
        }
    }

    fn closing_bracket(name: &str, open: usize) -> Result<usize, ConfigurationPropertyNameError> {
        let mut depth = 0usize;
        for (position, byte) in name.bytes().enumerate().skip(open) {
            if byte == b'[' {
                depth += 1;
            } else if byte == b']' {
                depth -= 1;
                if depth == 0 {
                    return Ok(position);
                }
            }
        }

        Err(ConfigurationPropertyNameError::UnclosedIndex(
            name.to_string(),
        ))
    }

    fn adapted_closing_bracket(characters: &[char], open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (position, character) in characters.iter().enumerate().skip(open) {
            if *character == '[' {
                depth += 1;
            } else if *character == ']' {
                depth -= 1;
                if depth == 0 {
                    return Some(position);
                }
            }
        }

        None
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of elements in this name.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns the element at given position in its original form, without index brackets.
    pub fn element(&self, index: usize) -> Option<&str> {
        self.elements.get(index).map(|element| element.value.as_str())
    }

    /// Returns the element at given position in its uniform form, which is the form used for
    /// comparisons.
    pub fn uniform_element(&self, index: usize) -> Option<&str> {
        self.elements.get(index).map(|element| element.key.as_str())
    }

    pub fn last_element(&self) -> Option<&str> {
        self.elements.last().map(|element| element.value.as_str())
    }

    /// Iterates over elements in their original form.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|element| element.value.as_str())
    }

    pub fn is_indexed(&self, index: usize) -> bool {
        self.elements
            .get(index)
            .map(|element| element.indexed)
            .unwrap_or_default()
    }

    pub fn is_last_element_indexed(&self) -> bool {
        self.elements
            .last()
            .map(|element| element.indexed)
            .unwrap_or_default()
    }

    /// Returns the numeric value of an index element, if the element at given position is an
    /// index containing only digits.
    pub fn numeric_index(&self, index: usize) -> Option<u64> {
        self.elements
            .get(index)
            .filter(|element| element.indexed)
            .and_then(Element::numeric)
    }

    /// Returns a new name with elements parsed from the given suffix appended.
    pub fn append(&self, suffix: &str) -> Result<Self, ConfigurationPropertyNameError> {
        if suffix.is_empty() {
            return Ok(self.clone());
        }

        Ok(self.append_name(&Self::of(suffix)?))
    }

    /// Returns a new name with all elements of another name appended.
    pub fn append_name(&self, other: &ConfigurationPropertyName) -> Self {
        let mut elements = Vec::with_capacity(self.elements.len() + other.elements.len());
        elements.extend_from_slice(&self.elements);
        elements.extend_from_slice(&other.elements);
        Self { elements }
    }

    /// Returns a new name with a numeric index element appended.
    pub fn append_index(&self, index: usize) -> Self {
        self.append_key(index.to_string())
    }

    /// Returns a new name with an arbitrary index element appended. The key is used verbatim, so
    /// it can contain characters otherwise not allowed in names, like `.`.
    pub fn append_key(&self, key: impl Into<String>) -> Self {
        let mut elements = Vec::with_capacity(self.elements.len() + 1);
        elements.extend_from_slice(&self.elements);
        elements.push(Element::index(key.into()));
        Self { elements }
    }

    /// Returns a name consisting of at most `size` leading elements.
    pub fn chop(&self, size: usize) -> Self {
        Self {
            elements: self.elements[..size.min(self.elements.len())].to_vec(),
        }
    }

    /// Returns a name consisting of elements starting at given offset.
    pub fn sub_name(&self, offset: usize) -> Self {
        Self {
            elements: self.elements[offset.min(self.elements.len())..].to_vec(),
        }
    }

    /// Returns the parent name, which is empty for single-element and empty names.
    pub fn parent(&self) -> Self {
        self.chop(self.len().saturating_sub(1))
    }

    /// Checks if this name is the immediate parent of another name.
    pub fn is_parent_of(&self, other: &ConfigurationPropertyName) -> bool {
        other.len() == self.len() + 1 && self.is_prefix_of(other)
    }

    /// Checks if this name is a strict ancestor of another name.
    pub fn is_ancestor_of(&self, other: &ConfigurationPropertyName) -> bool {
        other.len() > self.len() && self.is_prefix_of(other)
    }

    fn is_prefix_of(&self, other: &ConfigurationPropertyName) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(left, right)| left == right)
    }
}

impl PartialOrd for ConfigurationPropertyName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ConfigurationPropertyName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .map(|(left, right)| left.compare(right))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or_else(|| self.len().cmp(&other.len()))
    }
}

impl Display for ConfigurationPropertyName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (position, element) in self.elements.iter().enumerate() {
            if element.indexed {
                write!(f, "[{}]", element.value)?;
            } else {
                if position > 0 {
                    f.write_str(".")?;
                }

                for character in element.value.chars() {
                    let character = match character {
                        '_' => '-',
                        character => character.to_ascii_lowercase(),
                    };
                    write!(f, "{character}")?;
                }
            }
        }

        Ok(())
    }
}

impl FromStr for ConfigurationPropertyName {
    type Err = ConfigurationPropertyNameError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::of(name)
    }
}

impl TryFrom<&str> for ConfigurationPropertyName {
    type Error = ConfigurationPropertyNameError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::of(name)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ConfigurationPropertyNameError;
    use crate::name::ConfigurationPropertyName;

    fn name(value: &str) -> ConfigurationPropertyName {
        ConfigurationPropertyName::of(value).unwrap()
    }

    #[test]
    fn should_parse_elements() {
        let name = name("server.ports[0].host");
        assert_eq!(name.len(), 4);
        assert_eq!(name.element(0), Some("server"));
        assert_eq!(name.element(2), Some("0"));
        assert!(name.is_indexed(2));
        assert_eq!(name.numeric_index(2), Some(0));
        assert_eq!(name.last_element(), Some("host"));
    }

    #[test]
    fn should_parse_empty_name() {
        assert!(name("").is_empty());
    }

    #[test]
    fn should_reject_invalid_names() {
        assert!(matches!(
            ConfigurationPropertyName::of("a..b"),
            Err(ConfigurationPropertyNameError::EmptyElement(_))
        ));
        assert!(matches!(
            ConfigurationPropertyName::of("a."),
            Err(ConfigurationPropertyNameError::EmptyElement(_))
        ));
        assert!(matches!(
            ConfigurationPropertyName::of("a[0"),
            Err(ConfigurationPropertyNameError::UnclosedIndex(_))
        ));
        assert!(matches!(
            ConfigurationPropertyName::of("a[0]b"),
            Err(ConfigurationPropertyNameError::MisplacedIndex(_))
        ));
        assert!(matches!(
            ConfigurationPropertyName::of("a.b c"),
            Err(ConfigurationPropertyNameError::InvalidCharacter { character: ' ', .. })
        ));
    }

    #[test]
    fn should_compare_identifiers_leniently() {
        assert_eq!(name("server.max-threads"), name("server.maxThreads"));
        assert_eq!(name("server.max-threads"), name("SERVER.MAX_THREADS"));
        assert_eq!(name("foo.bar"), name("foo[bar]"));
        assert_ne!(name("foo[Bar]"), name("foo[bar]"));
    }

    #[test]
    fn should_order_numeric_indexes_by_value() {
        assert!(name("list[2]") < name("list[10]"));
        assert!(name("a") < name("a.b"));
    }

    #[test]
    fn should_compute_relationships() {
        let parent = name("a.b");
        assert!(parent.is_parent_of(&name("a.b.c")));
        assert!(!parent.is_parent_of(&name("a.b.c.d")));
        assert!(parent.is_ancestor_of(&name("a.b.c.d")));
        assert!(!parent.is_ancestor_of(&name("a.b")));
        assert!(ConfigurationPropertyName::empty().is_ancestor_of(&parent));
        assert_eq!(name("a.b.c").parent(), parent);
        assert_eq!(name("a.b.c").chop(1), name("a"));
        assert_eq!(name("a.b.c").sub_name(1), name("b.c"));
    }

    #[test]
    fn should_append_elements() {
        let base = name("a");
        assert_eq!(base.append("b.c").unwrap(), name("a.b.c"));
        assert_eq!(base.append_index(3), name("a[3]"));
        assert_eq!(base.append_key("x.y").to_string(), "a[x.y]");
        assert_eq!(base.append_key("x.y").len(), 2);
    }

    #[test]
    fn should_adapt_foreign_names() {
        let adapted = ConfigurationPropertyName::adapt("SERVER_MAX_THREADS", '_');
        assert_eq!(adapted, name("server.max.threads"));

        let adapted = ConfigurationPropertyName::adapt("a..b[0] c", '.');
        assert_eq!(adapted, name("a.b[0].c"));
    }

    #[test]
    fn should_display_canonical_form() {
        assert_eq!(name("Server.Max_Threads[0]").to_string(), "server.max-threads[0]");
        assert_eq!(name("").to_string(), "");
    }
}
