//! The visible counter: a `<label>` with the message and an emphasized count.
//!
//! ```html
//! <label for="FIELD_ID" class="char-counter" data-charcountdown-generated="true">
//!   Characters remaining: <strong class="low">3</strong>
//! </label>
//! ```

use crate::caret::FieldHost;
use crate::config::{CountdownConfig, Placement};

/// Marker attribute carried by every generated label.
pub const GENERATED_ATTR: &str = "data-charcountdown-generated";

/// Everything needed to build the counter's label once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterLabel {
    /// The field's `id`, for the label's `for` attribute.
    pub field_id: Option<String>,
    pub counter_class: String,
    pub message: String,
    pub low_class: String,
}

impl CounterLabel {
    pub fn new(config: &CountdownConfig, field_id: Option<String>) -> Self {
        Self {
            field_id,
            counter_class: config.counter_class().to_string(),
            message: config.counter_message().to_string(),
            low_class: config.low_class().to_string(),
        }
    }

    /// Class attribute value for the `<strong>` in `state`.
    pub fn count_class(&self, state: CounterState) -> &str {
        if state.low { &self.low_class } else { "" }
    }
}

/// What the counter shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterState {
    pub remaining: i64,
    pub low: bool,
}

impl CounterState {
    pub fn text(self) -> String {
        self.remaining.to_string()
    }
}

/// A host that can show a counter next to its field.
pub trait CounterSurface: FieldHost {
    /// Build the label and insert it per `placement`, removing any label
    /// this host mounted before. Returns `false` when the placement could
    /// not be resolved and nothing was inserted.
    fn mount_counter(
        &mut self,
        label: &CounterLabel,
        placement: &Placement,
        initial: CounterState,
    ) -> Result<bool, Self::Error>;

    /// Update the mounted count text and its low class. No-op when nothing
    /// is mounted.
    fn render_counter(&mut self, state: CounterState) -> Result<(), Self::Error>;
}
