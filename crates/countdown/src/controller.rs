//! Binds a countdown to one field and runs the per-event pass.
//!
//! Each pass is synchronous: count, trim and recount when the text overruns
//! and overrun is not allowed, then update the counter if what it shows
//! changed. Running the pass again on unchanged text changes nothing.

use crate::caret::{CaretMover, SelectionProbe};
use crate::config::{CountdownConfig, CountdownOptions};
use crate::corrector::{Trim, trim_excess};
use crate::count;
use crate::counter::{CounterLabel, CounterState, CounterSurface};
use crate::event::EditEvent;

/// Per-field countdown state.
#[derive(Clone, Debug)]
pub struct CharCountdown {
    config: CountdownConfig,
    probe: SelectionProbe,
    mover: CaretMover,
    /// Field value at the end of the last pass, for diff-based edit points.
    last_value: String,
    state: CounterState,
    mounted: bool,
}

/// What one pass did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditOutcome {
    pub event: EditEvent,
    pub state: CounterState,
    pub trim: Option<Trim>,
}

impl EditOutcome {
    pub fn trimmed(&self) -> bool {
        self.trim.is_some()
    }
}

impl CharCountdown {
    /// Configure `host`'s field and mount its counter.
    ///
    /// The starting value is counted but never trimmed here: a field that
    /// starts over its budget shows a negative count until the first edit.
    pub fn attach<H>(host: &mut H, options: CountdownOptions) -> Result<Self, H::Error>
    where
        H: CounterSurface + ?Sized,
    {
        let maxlength = host.attribute("maxlength");
        let config = CountdownConfig::resolve(options, maxlength.as_deref());

        if config.allow_overrun() && maxlength.is_some() {
            host.remove_attribute("maxlength")?;
        }

        let value = host.value().into_owned();
        let state = state_for(&config, &value);

        host.add_class(config.field_class())?;

        let label = CounterLabel::new(&config, host.attribute("id"));
        let mounted = host.mount_counter(&label, config.counter_location(), state)?;
        if !mounted {
            log::warn!(
                target: "countdown.controller",
                "counter location `{}` did not resolve; counting without a display",
                config.counter_location()
            );
        }

        let probe = SelectionProbe::detect(&*host);
        let mover = CaretMover::detect(&*host);
        log::debug!(
            target: "countdown.controller",
            "attached: max={} low={} overrun={} probe={probe:?} mover={mover:?} remaining={}",
            config.max_chars(),
            config.low_chars(),
            config.allow_overrun(),
            state.remaining
        );

        Ok(Self {
            config,
            probe,
            mover,
            last_value: value,
            state,
            mounted,
        })
    }

    /// Run one pass for `event`.
    pub fn handle<H>(&mut self, host: &mut H, event: EditEvent) -> Result<EditOutcome, H::Error>
    where
        H: CounterSurface + ?Sized,
    {
        let mut value = host.value().into_owned();
        let mut remaining = count::remaining(&value, self.config.max_chars());
        let mut trim = None;

        if remaining < 0 && !self.config.allow_overrun() {
            let excess = usize::try_from(remaining.unsigned_abs()).unwrap_or(usize::MAX);
            let caret = self.probe.caret(&*host, &self.last_value, &value);
            let cut = trim_excess(&value, caret, excess);

            host.set_value(&cut.value)?;
            self.mover.place(host, cut.caret);

            value = host.value().into_owned();
            remaining = count::remaining(&value, self.config.max_chars());
            trim = Some(cut);
        }

        let state = CounterState {
            remaining,
            low: count::is_low(remaining, self.config.low_chars()),
        };
        if state != self.state {
            host.render_counter(state)?;
            self.state = state;
        }
        self.last_value = value;

        log::trace!(
            target: "countdown.controller",
            "{event}: remaining={} low={} trimmed={}",
            state.remaining,
            state.low,
            trim.is_some()
        );

        Ok(EditOutcome { event, state, trim })
    }

    pub fn config(&self) -> &CountdownConfig {
        &self.config
    }

    pub fn state(&self) -> CounterState {
        self.state
    }

    pub fn probe(&self) -> SelectionProbe {
        self.probe
    }

    pub fn mover(&self) -> CaretMover {
        self.mover
    }

    /// Whether a counter display was inserted at attach time.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

fn state_for(config: &CountdownConfig, value: &str) -> CounterState {
    let remaining = count::remaining(value, config.max_chars());
    CounterState {
        remaining,
        low: count::is_low(remaining, config.low_chars()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caret::FieldHost;
    use crate::config::Placement;
    use input_core::{OffsetUnit, SelectionRange};
    use std::borrow::Cow;
    use std::convert::Infallible;

    /// A field that only knows its value and attributes, with a counter
    /// that records every render.
    #[derive(Default)]
    struct Bare {
        value: String,
        attrs: Vec<(String, String)>,
        classes: Vec<String>,
        focused: bool,
        mounted: Option<CounterState>,
        renders: Vec<CounterState>,
    }

    impl FieldHost for Bare {
        type Error = Infallible;

        fn value(&self) -> Cow<'_, str> {
            Cow::Borrowed(&self.value)
        }

        fn set_value(&mut self, value: &str) -> Result<(), Infallible> {
            self.value = value.to_string();
            Ok(())
        }

        fn attribute(&self, name: &str) -> Option<String> {
            self.attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }

        fn remove_attribute(&mut self, name: &str) -> Result<(), Infallible> {
            self.attrs.retain(|(k, _)| k != name);
            Ok(())
        }

        fn add_class(&mut self, class: &str) -> Result<(), Infallible> {
            self.classes.push(class.to_string());
            Ok(())
        }

        fn focus(&mut self) -> Result<(), Infallible> {
            self.focused = true;
            Ok(())
        }

        fn offset_unit(&self) -> OffsetUnit {
            OffsetUnit::Chars
        }

        fn native_selection(&self) -> Option<SelectionRange> {
            None
        }

        fn supports_selection_range(&self) -> bool {
            false
        }

        fn set_native_selection(&mut self, _range: SelectionRange) -> Result<(), Infallible> {
            Ok(())
        }
    }

    impl CounterSurface for Bare {
        fn mount_counter(
            &mut self,
            _label: &CounterLabel,
            placement: &Placement,
            initial: CounterState,
        ) -> Result<bool, Infallible> {
            if matches!(placement, Placement::Target(_)) {
                return Ok(false);
            }
            self.mounted = Some(initial);
            Ok(true)
        }

        fn render_counter(&mut self, state: CounterState) -> Result<(), Infallible> {
            self.renders.push(state);
            Ok(())
        }
    }

    fn bare(value: &str, maxlength: Option<&str>) -> Bare {
        Bare {
            value: value.to_string(),
            attrs: maxlength
                .map(|m| vec![("maxlength".to_string(), m.to_string())])
                .unwrap_or_default(),
            ..Default::default()
        }
    }

    #[test]
    fn attach_uses_maxlength_and_marks_the_field() {
        let mut host = bare("Hello", Some("10"));
        let countdown = CharCountdown::attach(&mut host, CountdownOptions::default()).unwrap();

        assert_eq!(countdown.config().max_chars(), 10);
        assert_eq!(countdown.state(), CounterState { remaining: 5, low: true });
        assert_eq!(host.classes, vec!["has-counter".to_string()]);
        assert_eq!(host.mounted, Some(CounterState { remaining: 5, low: true }));
        assert_eq!(host.attribute("maxlength").as_deref(), Some("10"));
        assert_eq!(countdown.probe(), SelectionProbe::EditDiff);
        assert_eq!(countdown.mover(), CaretMover::FocusOnly);
    }

    #[test]
    fn overrun_removes_native_maxlength() {
        let mut host = bare("", Some("10"));
        let options = CountdownOptions::default().with_allow_overrun(true);
        let countdown = CharCountdown::attach(&mut host, options).unwrap();

        assert_eq!(countdown.config().max_chars(), 10);
        assert_eq!(host.attribute("maxlength"), None);
    }

    #[test]
    fn diff_probe_trims_the_inserted_text() {
        let mut host = bare("abcdefgh", None);
        let options = CountdownOptions::default().with_max_chars(10);
        let mut countdown = CharCountdown::attach(&mut host, options).unwrap();

        host.value = "abcdXYZefgh".to_string();
        let outcome = countdown.handle(&mut host, EditEvent::Input).unwrap();

        assert_eq!(host.value, "abcdXYefgh");
        assert!(host.focused);
        assert_eq!(outcome.state, CounterState { remaining: 0, low: true });
        assert_eq!(outcome.trim.map(|t| t.caret), Some(6));
    }

    #[test]
    fn repeated_events_render_once() {
        let mut host = bare("", None);
        let options = CountdownOptions::default().with_max_chars(20);
        let mut countdown = CharCountdown::attach(&mut host, options).unwrap();

        host.value = "abc".to_string();
        for event in EditEvent::ALL {
            let outcome = countdown.handle(&mut host, event).unwrap();
            assert!(!outcome.trimmed());
            assert_eq!(outcome.state.remaining, 17);
        }
        assert_eq!(host.renders, vec![CounterState { remaining: 17, low: false }]);
    }

    #[test]
    fn unresolved_placement_still_counts() {
        let mut host = bare("", None);
        let options = CountdownOptions::default()
            .with_max_chars(3)
            .with_counter_location(Placement::Target("#nowhere".into()));
        let mut countdown = CharCountdown::attach(&mut host, options).unwrap();
        assert!(!countdown.is_mounted());

        host.value = "abcd".to_string();
        let outcome = countdown.handle(&mut host, EditEvent::KeyUp).unwrap();
        assert_eq!(host.value, "abc");
        assert_eq!(outcome.state.remaining, 0);
    }

    #[test]
    fn starting_overrun_is_shown_not_trimmed() {
        let mut host = bare("abcdef", None);
        let options = CountdownOptions::default().with_max_chars(4);
        let countdown = CharCountdown::attach(&mut host, options).unwrap();

        assert_eq!(countdown.state().remaining, -2);
        assert_eq!(host.value, "abcdef");
    }
}
