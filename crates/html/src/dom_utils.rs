use crate::types::Attribute;
use std::sync::Arc;

/// The simple selectors a placement target may use: `#id`, `.class`, or a
/// bare tag name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Id(String),
    Class(String),
    Tag(String),
}

impl Selector {
    /// Returns `None` for an empty or malformed selector.
    ///
    /// ```
    /// use html::Selector;
    ///
    /// assert_eq!(Selector::parse("#count"), Some(Selector::Id("count".into())));
    /// assert_eq!(Selector::parse(" .hint "), Some(Selector::Class("hint".into())));
    /// assert_eq!(Selector::parse("footer"), Some(Selector::Tag("footer".into())));
    /// assert_eq!(Selector::parse("#"), None);
    /// assert_eq!(Selector::parse("div p"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Selector> {
        let s = s.trim();
        let valid = |name: &str| {
            !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };
        let (ctor, name): (fn(String) -> Selector, &str) = match s.as_bytes().first()? {
            b'#' => (Selector::Id, &s[1..]),
            b'.' => (Selector::Class, &s[1..]),
            _ => (Selector::Tag, s),
        };
        valid(name).then(|| ctor(name.to_string()))
    }

    pub fn matches(&self, name: &str, attributes: &[Attribute]) -> bool {
        match self {
            Selector::Id(id) => attr(attributes, "id") == Some(id.as_str()),
            Selector::Class(class) => has_class(attributes, class),
            Selector::Tag(tag) => name.eq_ignore_ascii_case(tag),
        }
    }
}

pub fn attr<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .and_then(|(_, v)| v.as_deref())
}

pub fn has_class(attributes: &[Attribute], class: &str) -> bool {
    attr(attributes, "class").is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
}

/// Returns the attribute list with `class` added to the class list, or
/// `None` if it is already present (no patch needed).
pub fn with_class(attributes: &[Attribute], class: &str) -> Option<Vec<Attribute>> {
    if class.is_empty() || has_class(attributes, class) {
        return None;
    }
    let mut out = attributes.to_vec();
    match out.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case("class")) {
        Some((_, value)) => {
            let joined = match value.as_deref().map(str::trim) {
                Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
                _ => class.to_string(),
            };
            *value = Some(joined);
        }
        None => out.push((Arc::from("class"), Some(class.to_string()))),
    }
    Some(out)
}

/// Returns the attribute list with `class` removed from the class list, or
/// `None` if it was not present.
pub fn without_class(attributes: &[Attribute], class: &str) -> Option<Vec<Attribute>> {
    if !has_class(attributes, class) {
        return None;
    }
    let mut out = attributes.to_vec();
    for (k, value) in out.iter_mut() {
        if k.eq_ignore_ascii_case("class")
            && let Some(v) = value
        {
            *v = v
                .split_ascii_whitespace()
                .filter(|c| *c != class)
                .collect::<Vec<_>>()
                .join(" ");
        }
    }
    Some(out)
}

/// Returns the attribute list without `name`, or `None` if it was absent.
pub fn without_attr(attributes: &[Attribute], name: &str) -> Option<Vec<Attribute>> {
    if !attributes.iter().any(|(k, _)| k.eq_ignore_ascii_case(name)) {
        return None;
    }
    Some(
        attributes
            .iter()
            .filter(|(k, _)| !k.eq_ignore_ascii_case(name))
            .cloned()
            .collect(),
    )
}
