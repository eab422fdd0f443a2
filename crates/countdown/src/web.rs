//! Browser host: binds a countdown to a live `<input>` or `<textarea>`.
//!
//! Selection offsets come from `selectionStart`/`selectionEnd` in UTF-16
//! code units, with a line ending counted as one unit; conversion to
//! normalized units happens in the selection probe. Listeners stay
//! registered for as long as the returned [`WebCountdown`] lives.

use crate::caret::FieldHost;
use crate::config::{CountdownOptions, Placement};
use crate::controller::CharCountdown;
use crate::counter::{CounterLabel, CounterState, CounterSurface, GENERATED_ATTR};
use crate::event::EditEvent;
use crate::listeners::{ListenerSet, ListenerTarget};
use input_core::{OffsetUnit, SelectionRange};
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, EventTarget, HtmlElement, HtmlInputElement, HtmlTextAreaElement};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebError(pub String);

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dom call failed: {}", self.0)
    }
}

impl std::error::Error for WebError {}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        WebError(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

#[derive(Clone, Debug)]
enum WebField {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
}

impl WebField {
    fn from_element(element: &Element) -> Option<Self> {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            return Some(WebField::Input(input.clone()));
        }
        element
            .dyn_ref::<HtmlTextAreaElement>()
            .map(|area| WebField::TextArea(area.clone()))
    }

    fn element(&self) -> &HtmlElement {
        match self {
            WebField::Input(input) => input,
            WebField::TextArea(area) => area,
        }
    }

    fn value(&self) -> String {
        match self {
            WebField::Input(input) => input.value(),
            WebField::TextArea(area) => area.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            WebField::Input(input) => input.set_value(value),
            WebField::TextArea(area) => area.set_value(value),
        }
    }

    /// `None` for input types without a selection API (`email`, `number`).
    fn selection(&self) -> Option<(u32, u32)> {
        let (start, end) = match self {
            WebField::Input(input) => (input.selection_start(), input.selection_end()),
            WebField::TextArea(area) => (area.selection_start(), area.selection_end()),
        };
        Some((start.ok()??, end.ok()??))
    }

    fn set_selection_range(&self, start: u32, end: u32) -> Result<(), JsValue> {
        match self {
            WebField::Input(input) => input.set_selection_range(start, end),
            WebField::TextArea(area) => area.set_selection_range(start, end),
        }
    }
}

/// A live field plus the counter nodes created for it.
#[derive(Debug)]
pub struct WebHost {
    field: WebField,
    label: Option<Element>,
    count: Option<Element>,
    low_class: String,
}

impl WebHost {
    fn new(field: WebField) -> Self {
        Self {
            field,
            label: None,
            count: None,
            low_class: String::new(),
        }
    }
}

impl FieldHost for WebHost {
    type Error = WebError;

    fn value(&self) -> Cow<'_, str> {
        Cow::Owned(self.field.value())
    }

    fn set_value(&mut self, value: &str) -> Result<(), WebError> {
        self.field.set_value(value);
        Ok(())
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.field.element().get_attribute(name)
    }

    fn remove_attribute(&mut self, name: &str) -> Result<(), WebError> {
        Ok(self.field.element().remove_attribute(name)?)
    }

    fn add_class(&mut self, class: &str) -> Result<(), WebError> {
        if class.is_empty() {
            return Ok(());
        }
        Ok(self.field.element().class_list().add_1(class)?)
    }

    fn focus(&mut self) -> Result<(), WebError> {
        Ok(self.field.element().focus()?)
    }

    fn offset_unit(&self) -> OffsetUnit {
        OffsetUnit::Utf16
    }

    fn native_selection(&self) -> Option<SelectionRange> {
        let (start, end) = self.field.selection()?;
        Some(SelectionRange::new(start as usize, end as usize))
    }

    fn supports_selection_range(&self) -> bool {
        self.field.selection().is_some()
    }

    fn set_native_selection(&mut self, range: SelectionRange) -> Result<(), WebError> {
        let start = u32::try_from(range.start).unwrap_or(u32::MAX);
        let end = u32::try_from(range.end).unwrap_or(u32::MAX);
        Ok(self.field.set_selection_range(start, end)?)
    }
}

impl CounterSurface for WebHost {
    fn mount_counter(
        &mut self,
        label: &CounterLabel,
        placement: &Placement,
        initial: CounterState,
    ) -> Result<bool, WebError> {
        if let Some(old) = self.label.take() {
            old.remove();
        }
        self.count = None;

        let field = self.field.element();
        let document = field
            .owner_document()
            .ok_or_else(|| WebError("field has no owner document".into()))?;

        let label_el = document.create_element("label")?;
        if let Some(id) = label.field_id.as_deref().filter(|id| !id.is_empty()) {
            label_el.set_attribute("for", id)?;
        }
        label_el.set_attribute("class", &label.counter_class)?;
        label_el.set_attribute(GENERATED_ATTR, "true")?;
        label_el.set_text_content(Some(&label.message));

        let strong = document.create_element("strong")?;
        strong.set_attribute("class", label.count_class(initial))?;
        strong.set_text_content(Some(&initial.text()));
        label_el.append_child(&strong)?;

        let placed = match placement {
            Placement::Before | Placement::After if field.parent_node().is_none() => false,
            Placement::Before => {
                field.before_with_node_1(&label_el)?;
                true
            }
            Placement::After => {
                field.after_with_node_1(&label_el)?;
                true
            }
            Placement::Target(selector) => match document.query_selector(selector) {
                Ok(Some(target)) => {
                    target.append_child(&label_el)?;
                    true
                }
                Ok(None) => false,
                Err(err) => {
                    log::warn!(
                        target: "countdown.web",
                        "invalid counter selector {selector:?}: {}",
                        WebError::from(err)
                    );
                    false
                }
            },
        };

        if placed {
            self.label = Some(label_el);
            self.count = Some(strong);
            self.low_class = label.low_class.clone();
        }
        Ok(placed)
    }

    fn render_counter(&mut self, state: CounterState) -> Result<(), WebError> {
        let Some(count) = &self.count else {
            return Ok(());
        };
        count.set_text_content(Some(&state.text()));
        if !self.low_class.is_empty() {
            count
                .class_list()
                .toggle_with_force(&self.low_class, state.low)?;
        }
        Ok(())
    }
}

struct Bound {
    countdown: CharCountdown,
    host: WebHost,
}

type Listener = Closure<dyn FnMut(Event)>;

impl ListenerTarget for EventTarget {
    type Listener = Listener;
    type Error = WebError;

    fn add_listener(&self, event: EditEvent, listener: &Listener) -> Result<(), WebError> {
        Ok(self.add_event_listener_with_callback(
            event.dom_name(),
            listener.as_ref().unchecked_ref(),
        )?)
    }

    fn remove_listener(&self, event: EditEvent, listener: &Listener) -> Result<(), WebError> {
        Ok(self.remove_event_listener_with_callback(
            event.dom_name(),
            listener.as_ref().unchecked_ref(),
        )?)
    }
}

/// A countdown bound to a live element. Dropping it removes the listeners.
pub struct WebCountdown {
    bound: Rc<RefCell<Bound>>,
    listeners: ListenerSet<EventTarget>,
}

/// Attach a countdown to `element`, which must be an `<input>` or a
/// `<textarea>`.
pub fn attach(element: &Element, options: CountdownOptions) -> Result<WebCountdown, WebError> {
    let field = WebField::from_element(element)
        .ok_or_else(|| WebError("element is not an input or textarea".into()))?;
    let mut host = WebHost::new(field);
    let countdown = CharCountdown::attach(&mut host, options)?;
    let bound = Rc::new(RefCell::new(Bound { countdown, host }));

    let target: EventTarget = element.clone().unchecked_into();
    let listeners = ListenerSet::register(target, EditEvent::ALL, |event| {
        let bound = Rc::clone(&bound);
        Listener::new(move |_: Event| {
            let Ok(mut guard) = bound.try_borrow_mut() else {
                log::trace!(target: "countdown.web", "{event} while a pass is running; skipped");
                return;
            };
            let Bound { countdown, host } = &mut *guard;
            if let Err(err) = countdown.handle(host, event) {
                log::warn!(target: "countdown.web", "{event} pass failed: {err}");
            }
        })
    })?;

    Ok(WebCountdown { bound, listeners })
}

impl WebCountdown {
    pub fn state(&self) -> CounterState {
        self.bound.borrow().countdown.state()
    }

    /// Remove the listeners. The counter label stays in the page.
    pub fn detach(self) {}

    /// Keep the listeners for the lifetime of the page.
    pub fn forget(self) {
        for (_, closure) in self.listeners.into_listeners() {
            closure.forget();
        }
    }
}
