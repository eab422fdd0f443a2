use super::field_id;
use html::{Id, Node};
use input_core::{FieldValueStore, normalize_newlines};
use std::collections::HashMap;

/// The text controls a countdown can attach to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextControl {
    /// Single-line `<input>`.
    Input,
    TextArea,
}

impl TextControl {
    pub fn is_multiline(self) -> bool {
        matches!(self, TextControl::TextArea)
    }
}

/// `<input>` types that take free text.
const TEXT_INPUT_TYPES: &[&str] = &["text", "search", "email", "url", "tel", "password"];

pub fn text_control_kind(node: &Node) -> Option<TextControl> {
    let Node::Element {
        name, attributes, ..
    } = node
    else {
        return None;
    };

    if name.eq_ignore_ascii_case("textarea") {
        return Some(TextControl::TextArea);
    }
    if !name.eq_ignore_ascii_case("input") {
        return None;
    }

    let ty = html::dom_utils::attr(attributes, "type")
        .map(str::trim)
        .filter(|s| !s.is_empty());
    match ty {
        // missing type defaults to text
        None => Some(TextControl::Input),
        Some(t) if TEXT_INPUT_TYPES.iter().any(|k| t.eq_ignore_ascii_case(k)) => {
            Some(TextControl::Input)
        }
        Some(_) => None,
    }
}

/// Seed `store` with the initial value of every text control under `dom`.
/// Fields already present keep their current value.
pub fn seed_text_controls(store: &mut FieldValueStore, dom: &Node) -> HashMap<Id, TextControl> {
    fn collect_text(nodes: &[Node], out: &mut String) {
        for n in nodes {
            match n {
                Node::Text { text, .. } => out.push_str(text),
                Node::Element { children, .. } | Node::Document { children, .. } => {
                    collect_text(children, out);
                }
                Node::Comment { .. } => {}
            }
        }
    }

    fn initial_value(node: &Node, kind: TextControl) -> String {
        match (kind, node) {
            (TextControl::TextArea, Node::Element { children, .. }) => {
                let mut raw = String::new();
                collect_text(children, &mut raw);
                let mut initial = normalize_newlines(&raw).into_owned();
                // A newline right after the start tag is not part of the value.
                if initial.starts_with('\n') {
                    initial.remove(0);
                }
                initial
            }
            (TextControl::Input, Node::Element { attributes, .. }) => {
                html::dom_utils::attr(attributes, "value")
                    .unwrap_or("")
                    .to_string()
            }
            _ => String::new(),
        }
    }

    fn walk(store: &mut FieldValueStore, node: &Node, out: &mut HashMap<Id, TextControl>) {
        if let Some(kind) = text_control_kind(node) {
            let id = node.id();
            let fid = field_id(id);
            if !store.has(fid) {
                store.ensure_initial(fid, initial_value(node, kind), kind.is_multiline());
            }
            out.insert(id, kind);
            return;
        }
        for child in node.children() {
            walk(store, child, out);
        }
    }

    let mut out = HashMap::new();
    walk(store, dom, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn elem(id: u32, name: &str, attrs: &[(&str, &str)], children: Vec<Node>) -> Node {
        Node::Element {
            id: Id(id),
            name: Arc::from(name),
            attributes: attrs
                .iter()
                .map(|(k, v)| (Arc::from(*k), Some(v.to_string())))
                .collect(),
            children,
        }
    }

    fn text(id: u32, text: &str) -> Node {
        Node::Text {
            id: Id(id),
            text: text.to_string(),
        }
    }

    #[test]
    fn classifies_controls() {
        assert_eq!(
            text_control_kind(&elem(1, "input", &[], vec![])),
            Some(TextControl::Input)
        );
        assert_eq!(
            text_control_kind(&elem(1, "INPUT", &[("type", " Email ")], vec![])),
            Some(TextControl::Input)
        );
        assert_eq!(
            text_control_kind(&elem(1, "input", &[("type", "checkbox")], vec![])),
            None
        );
        assert_eq!(
            text_control_kind(&elem(1, "textarea", &[], vec![])),
            Some(TextControl::TextArea)
        );
        assert_eq!(text_control_kind(&elem(1, "div", &[], vec![])), None);
    }

    #[test]
    fn seeds_input_value_and_textarea_text() {
        let dom = Node::Document {
            id: Id(1),
            doctype: None,
            children: vec![elem(
                2,
                "form",
                &[],
                vec![
                    elem(3, "input", &[("value", "hi")], vec![]),
                    elem(4, "textarea", &[], vec![text(5, "\r\nfirst\r\nsecond\rthird")]),
                    elem(6, "input", &[("type", "radio")], vec![]),
                ],
            )],
        };

        let mut store = FieldValueStore::new();
        let controls = seed_text_controls(&mut store, &dom);

        assert_eq!(controls.len(), 2);
        assert_eq!(store.get(field_id(Id(3))), Some("hi"));
        assert_eq!(
            store.get(field_id(Id(4))),
            Some("first\nsecond\nthird")
        );
        assert!(store.is_multiline(field_id(Id(4))));
        assert!(!store.has(field_id(Id(6))));
    }
}
