//! Per-field configuration.
//!
//! [`CountdownOptions`] is what a caller supplies: every field optional,
//! deserializable from TOML. [`CountdownConfig`] is the resolved,
//! immutable result: defaults applied first, the field's `maxlength`
//! attribute feeding the `max_chars` default, user overrides last.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;

pub const DEFAULT_MAX_CHARS: usize = 500;
pub const DEFAULT_LOW_CHARS: usize = 10;
pub const DEFAULT_LOW_CLASS: &str = "low";
pub const DEFAULT_FIELD_CLASS: &str = "has-counter";
pub const DEFAULT_COUNTER_CLASS: &str = "char-counter";
pub const DEFAULT_COUNTER_MESSAGE: &str = "Characters remaining: ";

/// Where the counter display goes relative to its field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Placement {
    /// Immediately preceding the field among its siblings.
    Before,
    /// Immediately following the field among its siblings.
    #[default]
    After,
    /// Appended as the last child of the element the selector names.
    Target(String),
}

impl Placement {
    /// `"before"` and `"after"` are directives; anything else is a target.
    pub fn parse(s: &str) -> Placement {
        match s {
            "before" => Placement::Before,
            "after" => Placement::After,
            other => Placement::Target(other.to_string()),
        }
    }
}

impl From<String> for Placement {
    fn from(s: String) -> Self {
        Placement::parse(&s)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Before => f.write_str("before"),
            Placement::After => f.write_str("after"),
            Placement::Target(selector) => f.write_str(selector),
        }
    }
}

/// A user-supplied maximum: a number, or text that should hold one.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MaxChars {
    Count(i64),
    Text(String),
}

impl MaxChars {
    /// `None` for negative or non-numeric values.
    pub fn resolve(&self) -> Option<usize> {
        match self {
            MaxChars::Count(n) => usize::try_from(*n).ok(),
            MaxChars::Text(s) => parse_int_prefix(s),
        }
    }
}

/// Parse the leading decimal integer of `s`, the way a `maxlength`
/// attribute is read: surrounding whitespace ignored, trailing junk ignored,
/// negative values rejected.
///
/// ```
/// use countdown::config::parse_int_prefix;
///
/// assert_eq!(parse_int_prefix(" 140 "), Some(140));
/// assert_eq!(parse_int_prefix("12abc"), Some(12));
/// assert_eq!(parse_int_prefix("+7"), Some(7));
/// assert_eq!(parse_int_prefix("-1"), None);
/// assert_eq!(parse_int_prefix("abc"), None);
/// ```
pub fn parse_int_prefix(s: &str) -> Option<usize> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: usize = digits[..end].parse().ok()?;
    if negative && value != 0 {
        return None;
    }
    Some(value)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CountdownOptions {
    pub max_chars: Option<MaxChars>,
    pub low_chars: Option<usize>,
    pub allow_overrun: Option<bool>,
    pub low_class: Option<String>,
    pub field_class: Option<String>,
    pub counter_class: Option<String>,
    pub counter_message: Option<String>,
    pub counter_location: Option<Placement>,
}

impl CountdownOptions {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    pub fn with_max_chars(mut self, max: usize) -> Self {
        self.max_chars = Some(MaxChars::Count(i64::try_from(max).unwrap_or(i64::MAX)));
        self
    }

    pub fn with_low_chars(mut self, low: usize) -> Self {
        self.low_chars = Some(low);
        self
    }

    pub fn with_allow_overrun(mut self, allow: bool) -> Self {
        self.allow_overrun = Some(allow);
        self
    }

    pub fn with_counter_location(mut self, placement: Placement) -> Self {
        self.counter_location = Some(placement);
        self
    }

    pub fn with_counter_message(mut self, message: impl Into<String>) -> Self {
        self.counter_message = Some(message.into());
        self
    }
}

/// Resolved configuration, fixed for the lifetime of a field binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountdownConfig {
    max_chars: usize,
    low_chars: usize,
    allow_overrun: bool,
    low_class: String,
    field_class: String,
    counter_class: String,
    counter_message: String,
    counter_location: Placement,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            low_chars: DEFAULT_LOW_CHARS,
            allow_overrun: false,
            low_class: DEFAULT_LOW_CLASS.to_string(),
            field_class: DEFAULT_FIELD_CLASS.to_string(),
            counter_class: DEFAULT_COUNTER_CLASS.to_string(),
            counter_message: DEFAULT_COUNTER_MESSAGE.to_string(),
            counter_location: Placement::After,
        }
    }
}

impl CountdownConfig {
    /// Apply `options` over the defaults. `maxlength` is the field's native
    /// attribute, used when the options carry no usable maximum.
    ///
    /// A `maxlength` of `"0"` is a budget of zero, not a missing attribute:
    /// only an absent, non-numeric or negative value falls back to 500.
    pub fn resolve(options: CountdownOptions, maxlength: Option<&str>) -> Self {
        let defaults = Self::default();

        let user_max = options.max_chars.as_ref().and_then(|m| {
            let resolved = m.resolve();
            if resolved.is_none() {
                log::warn!(
                    target: "countdown.config",
                    "ignoring unusable max_chars {m:?}; falling back to maxlength/default"
                );
            }
            resolved
        });
        let max_chars = user_max
            .or_else(|| maxlength.and_then(parse_int_prefix))
            .unwrap_or(defaults.max_chars);

        Self {
            max_chars,
            low_chars: options.low_chars.unwrap_or(defaults.low_chars),
            allow_overrun: options.allow_overrun.unwrap_or(defaults.allow_overrun),
            low_class: options.low_class.unwrap_or(defaults.low_class),
            field_class: options.field_class.unwrap_or(defaults.field_class),
            counter_class: options.counter_class.unwrap_or(defaults.counter_class),
            counter_message: options.counter_message.unwrap_or(defaults.counter_message),
            counter_location: options.counter_location.unwrap_or(defaults.counter_location),
        }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn low_chars(&self) -> usize {
        self.low_chars
    }

    pub fn allow_overrun(&self) -> bool {
        self.allow_overrun
    }

    pub fn low_class(&self) -> &str {
        &self.low_class
    }

    pub fn field_class(&self) -> &str {
        &self.field_class
    }

    pub fn counter_class(&self) -> &str {
        &self.counter_class
    }

    pub fn counter_message(&self) -> &str {
        &self.counter_message
    }

    pub fn counter_location(&self) -> &Placement {
        &self.counter_location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_attribute_or_options() {
        let config = CountdownConfig::resolve(CountdownOptions::default(), None);
        assert_eq!(config, CountdownConfig::default());
        assert_eq!(config.max_chars(), 500);
        assert_eq!(config.counter_message(), "Characters remaining: ");
    }

    #[test]
    fn maxlength_attribute_feeds_the_default() {
        let config = CountdownConfig::resolve(CountdownOptions::default(), Some("140"));
        assert_eq!(config.max_chars(), 140);

        let config = CountdownConfig::resolve(CountdownOptions::default(), Some("lots"));
        assert_eq!(config.max_chars(), 500);
    }

    #[test]
    fn user_maximum_wins_over_attribute() {
        let options = CountdownOptions::default().with_max_chars(10);
        assert_eq!(CountdownConfig::resolve(options, Some("140")).max_chars(), 10);
    }

    #[test]
    fn unusable_user_maximum_falls_back() {
        let options = CountdownOptions {
            max_chars: Some(MaxChars::Text("many".into())),
            ..Default::default()
        };
        assert_eq!(CountdownConfig::resolve(options.clone(), Some("30")).max_chars(), 30);
        assert_eq!(CountdownConfig::resolve(options, None).max_chars(), 500);

        let negative = CountdownOptions {
            max_chars: Some(MaxChars::Count(-4)),
            ..Default::default()
        };
        assert_eq!(CountdownConfig::resolve(negative, None).max_chars(), 500);
    }

    #[test]
    fn zero_is_a_valid_maximum() {
        let config = CountdownConfig::resolve(CountdownOptions::default(), Some("0"));
        assert_eq!(config.max_chars(), 0);

        let config = CountdownConfig::resolve(CountdownOptions::default(), Some(" 0 "));
        assert_eq!(config.max_chars(), 0);

        let options = CountdownOptions::default().with_max_chars(0);
        assert_eq!(CountdownConfig::resolve(options, Some("140")).max_chars(), 0);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn huge_builder_maximum_saturates() {
        let options = CountdownOptions::default().with_max_chars(usize::MAX);
        assert_eq!(options.max_chars, Some(MaxChars::Count(i64::MAX)));

        let config = CountdownConfig::resolve(options, Some("140"));
        assert_eq!(config.max_chars() as u64, i64::MAX as u64);
    }

    #[test]
    fn placement_parsing() {
        assert_eq!(Placement::parse("before"), Placement::Before);
        assert_eq!(Placement::parse("after"), Placement::After);
        assert_eq!(
            Placement::parse("#counter-slot"),
            Placement::Target("#counter-slot".into())
        );
    }

    #[test]
    fn options_from_toml() {
        let options = CountdownOptions::from_toml_str(
            r##"
            max_chars = "140"
            low_chars = 3
            allow_overrun = true
            counter_location = "#slot"
            counter_message = "Left: "
            "##,
        )
        .unwrap();
        let config = CountdownConfig::resolve(options, None);
        assert_eq!(config.max_chars(), 140);
        assert_eq!(config.low_chars(), 3);
        assert!(config.allow_overrun());
        assert_eq!(config.counter_location(), &Placement::Target("#slot".into()));
        assert_eq!(config.counter_message(), "Left: ");
        assert_eq!(config.low_class(), "low");
    }

    #[test]
    fn unknown_toml_keys_are_rejected() {
        let err = CountdownOptions::from_toml_str("max_char = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
