use super::{CounterNodes, HostProfile, field_id};
use crate::caret::FieldHost;
use crate::config::Placement;
use crate::counter::{CounterLabel, CounterState, CounterSurface, GENERATED_ATTR};
use html::dom_utils::{with_class, without_attr, without_class};
use html::{Attribute, DomPatch, DomPatchError, DomStore, Id, PatchKey, Selector};
use input_core::{
    FieldValueStore, OffsetUnit, SelectionRange, byte_offset_floor, native_to_normalized,
};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// One field of a [`Document`](super::Document), seen as a countdown host.
///
/// Field text lives in the value store; everything structural goes through
/// patches against the DOM store.
pub struct Binding<'a> {
    dom: &'a mut DomStore,
    fields: &'a mut FieldValueStore,
    counters: &'a mut HashMap<Id, CounterNodes>,
    profile: HostProfile,
    field: Id,
}

impl<'a> Binding<'a> {
    pub(crate) fn new(
        dom: &'a mut DomStore,
        fields: &'a mut FieldValueStore,
        counters: &'a mut HashMap<Id, CounterNodes>,
        profile: HostProfile,
        field: Id,
    ) -> Self {
        Self {
            dom,
            fields,
            counters,
            profile,
            field,
        }
    }

    fn key(&self) -> PatchKey {
        PatchKey::from_id(self.field)
    }

    fn update_attributes(
        &mut self,
        key: PatchKey,
        edit: impl FnOnce(&[Attribute]) -> Option<Vec<Attribute>>,
    ) -> Result<(), DomPatchError> {
        let attributes = self
            .dom
            .attributes(key)
            .ok_or(DomPatchError::WrongNodeKind(key))?;
        if let Some(attributes) = edit(attributes) {
            self.dom
                .apply(&[DomPatch::SetAttributes { key, attributes }])?;
        }
        Ok(())
    }

    /// Where the label goes: `(parent, insert_before)`. `None` when the
    /// placement cannot be resolved.
    fn resolve_placement(&self, placement: &Placement) -> Option<(PatchKey, Option<PatchKey>)> {
        let field = self.key();
        match placement {
            Placement::Before => {
                let parent = self.dom.parent(field)?;
                Some((parent, Some(field)))
            }
            Placement::After => {
                let parent = self.dom.parent(field)?;
                let siblings = self.dom.children(parent);
                let next = siblings
                    .iter()
                    .position(|k| *k == field)
                    .and_then(|i| siblings.get(i + 1))
                    .copied();
                Some((parent, next))
            }
            Placement::Target(selector) => {
                let Some(parsed) = Selector::parse(selector) else {
                    log::warn!(
                        target: "countdown.document",
                        "unsupported counter selector {selector:?}"
                    );
                    return None;
                };
                self.dom.find_first(&parsed).map(|target| (target, None))
            }
        }
    }
}

fn attribute(name: &str, value: &str) -> Attribute {
    (Arc::from(name), Some(value.to_string()))
}

impl FieldHost for Binding<'_> {
    type Error = DomPatchError;

    fn value(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.fields.get(field_id(self.field)).unwrap_or(""))
    }

    fn set_value(&mut self, value: &str) -> Result<(), DomPatchError> {
        self.fields.set(field_id(self.field), value.to_string());
        Ok(())
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.dom.attr(self.key(), name).map(str::to_string)
    }

    fn remove_attribute(&mut self, name: &str) -> Result<(), DomPatchError> {
        self.update_attributes(self.key(), |attrs| without_attr(attrs, name))
    }

    fn add_class(&mut self, class: &str) -> Result<(), DomPatchError> {
        self.update_attributes(self.key(), |attrs| with_class(attrs, class))
    }

    fn focus(&mut self) -> Result<(), DomPatchError> {
        self.fields.focus(field_id(self.field));
        Ok(())
    }

    fn offset_unit(&self) -> OffsetUnit {
        self.profile.unit
    }

    fn native_selection(&self) -> Option<SelectionRange> {
        if !self.profile.selection_offsets {
            return None;
        }
        let fid = field_id(self.field);
        let value = self.fields.get(fid)?;
        let unit = self.profile.unit;
        let measure = |byte: usize| value.get(..byte).map_or(0, |s| unit.measure(s));
        let range = self.fields.selection(fid)?;
        Some(range.map(measure))
    }

    fn supports_selection_range(&self) -> bool {
        self.profile.selection_range
    }

    fn set_native_selection(&mut self, range: SelectionRange) -> Result<(), DomPatchError> {
        if !self.profile.selection_range {
            return Ok(());
        }
        let fid = field_id(self.field);
        let Some(value) = self.fields.get(fid) else {
            return Ok(());
        };
        let unit = self.profile.unit;
        let bytes = range.map(|n| byte_offset_floor(value, native_to_normalized(value, n, unit)));
        if bytes.is_empty() {
            self.fields.set_caret(fid, bytes.start, false);
        } else {
            self.fields.select_range(fid, bytes.start, bytes.end);
        }
        Ok(())
    }
}

impl CounterSurface for Binding<'_> {
    fn mount_counter(
        &mut self,
        label: &CounterLabel,
        placement: &Placement,
        initial: CounterState,
    ) -> Result<bool, DomPatchError> {
        // The old label goes first so placement never resolves against it.
        if let Some(old) = self.counters.remove(&self.field)
            && self.dom.contains(old.label)
        {
            self.dom.apply(&[DomPatch::RemoveNode { key: old.label }])?;
        }

        let Some((parent, before)) = self.resolve_placement(placement) else {
            return Ok(false);
        };

        let mut label_attrs = Vec::with_capacity(3);
        if let Some(id) = &label.field_id {
            label_attrs.push(attribute("for", id));
        }
        label_attrs.push(attribute("class", &label.counter_class));
        label_attrs.push(attribute(GENERATED_ATTR, "true"));

        let label_key = self.dom.allocate_key();
        let message_key = self.dom.allocate_key();
        let strong_key = self.dom.allocate_key();
        let count_key = self.dom.allocate_key();

        let mut patches = vec![
            DomPatch::CreateElement {
                key: label_key,
                name: Arc::from("label"),
                attributes: label_attrs,
            },
            DomPatch::CreateText {
                key: message_key,
                text: label.message.clone(),
            },
            DomPatch::AppendChild {
                parent: label_key,
                child: message_key,
            },
            DomPatch::CreateElement {
                key: strong_key,
                name: Arc::from("strong"),
                attributes: vec![attribute("class", label.count_class(initial))],
            },
            DomPatch::CreateText {
                key: count_key,
                text: initial.text(),
            },
            DomPatch::AppendChild {
                parent: strong_key,
                child: count_key,
            },
            DomPatch::AppendChild {
                parent: label_key,
                child: strong_key,
            },
        ];
        patches.push(match before {
            Some(before) => DomPatch::InsertBefore {
                parent,
                child: label_key,
                before,
            },
            None => DomPatch::AppendChild {
                parent,
                child: label_key,
            },
        });
        self.dom.apply(&patches)?;

        self.counters.insert(
            self.field,
            CounterNodes {
                label: label_key,
                strong: strong_key,
                count_text: count_key,
                low_class: label.low_class.clone(),
            },
        );
        Ok(true)
    }

    fn render_counter(&mut self, state: CounterState) -> Result<(), DomPatchError> {
        let Some(nodes) = self.counters.get(&self.field).cloned() else {
            return Ok(());
        };
        self.dom.apply(&[DomPatch::SetText {
            key: nodes.count_text,
            text: state.text(),
        }])?;
        self.update_attributes(nodes.strong, |attrs| {
            if state.low {
                with_class(attrs, &nodes.low_class)
            } else {
                without_class(attrs, &nodes.low_class)
            }
        })
    }
}
