use super::*;
use crate::caret::{CaretMover, SelectionProbe};
use crate::config::Placement;
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

fn doc(children: Vec<Node>) -> Node {
    Node::Document {
        id: Id(1),
        doctype: None,
        children,
    }
}

/// `<p>` holding an input (id 3) followed by a `<span>`, plus an empty
/// `<div id="slot">`.
fn form_page(input_attrs: &[(&str, &str)]) -> Node {
    doc(vec![
        elem(
            2,
            "p",
            &[],
            vec![
                elem(3, "input", input_attrs, vec![]),
                elem(4, "span", &[], vec![]),
            ],
        ),
        elem(5, "div", &[("id", "slot")], vec![]),
    ])
}

const FIELD: Id = Id(3);

fn loaded(root: &Node, profile: HostProfile) -> Document {
    let mut document = Document::with_profile(profile);
    document.load(root).unwrap();
    document
}

fn max(n: usize) -> CountdownOptions {
    CountdownOptions::default().with_max_chars(n)
}

#[test]
fn counter_markup_follows_the_field() {
    let root = doc(vec![elem(
        2,
        "p",
        &[],
        vec![elem(3, "input", &[("id", "name"), ("value", "Hello"), ("maxlength", "10")], vec![])],
    )]);
    let mut document = loaded(&root, HostProfile::modern());

    let state = document.attach(FIELD, CountdownOptions::default()).unwrap();
    assert_eq!(state, CounterState { remaining: 5, low: true });

    let expected = [
        "#document",
        "  <p>",
        "    <input id=\"name\" value=\"Hello\" maxlength=\"10\" class=\"has-counter\">",
        "    <label for=\"name\" class=\"char-counter\" data-charcountdown-generated=\"true\">",
        "      \"Characters remaining: \"",
        "      <strong class=\"low\">",
        "        \"5\"",
    ];
    assert_eq!(document.snapshot().unwrap().as_lines(), expected);
    assert_eq!(
        document.counter_text(FIELD).as_deref(),
        Some("Characters remaining: 5")
    );
}

#[test]
fn placement_directives() {
    let root = form_page(&[]);

    let mut after = loaded(&root, HostProfile::modern());
    after.attach(FIELD, max(10)).unwrap();
    assert_eq!(after.counter_position(FIELD), Some((PatchKey(2), 1)));

    let mut before = loaded(&root, HostProfile::modern());
    before
        .attach(FIELD, max(10).with_counter_location(Placement::Before))
        .unwrap();
    assert_eq!(before.counter_position(FIELD), Some((PatchKey(2), 0)));
    assert_eq!(before.dom().children(PatchKey(2))[1], PatchKey(3));

    let mut target = loaded(&root, HostProfile::modern());
    target
        .attach(FIELD, max(10).with_counter_location(Placement::parse("#slot")))
        .unwrap();
    assert_eq!(target.counter_position(FIELD), Some((PatchKey(5), 0)));
}

#[test]
fn unresolved_target_counts_without_a_label() {
    let mut document = loaded(&form_page(&[]), HostProfile::modern());
    document
        .attach(FIELD, max(3).with_counter_location(Placement::parse(".missing")))
        .unwrap();

    assert_eq!(document.counter_text(FIELD), None);
    assert!(document.countdown(FIELD).is_some_and(|c| !c.is_mounted()));

    document.type_text(FIELD, "abcd").unwrap();
    assert_eq!(document.value(FIELD), Some("abc"));
}

#[test]
fn typing_past_the_limit_trims_at_the_caret() {
    let mut document = loaded(&form_page(&[("value", "Hello")]), HostProfile::modern());
    document.attach(FIELD, max(10).with_low_chars(3)).unwrap();
    assert!(!document.counter_is_low(FIELD));
    assert_eq!(document.counter_count(FIELD).as_deref(), Some("5"));

    document.set_caret(FIELD, 5);
    document.type_text(FIELD, " World").unwrap();

    assert_eq!(document.value(FIELD), Some("Hello Worl"));
    assert_eq!(document.caret(FIELD), Some(10));
    assert_eq!(document.counter_count(FIELD).as_deref(), Some("0"));
    assert!(document.counter_is_low(FIELD));
}

#[test]
fn paste_in_the_middle_loses_its_own_tail() {
    let mut document = loaded(&form_page(&[("value", "abcdef")]), HostProfile::modern());
    document.attach(FIELD, max(8)).unwrap();

    document.set_caret(FIELD, 2);
    document.paste(FIELD, "XYZ").unwrap();

    assert_eq!(document.value(FIELD), Some("abXYcdef"));
    assert_eq!(document.caret(FIELD), Some(4));
}

#[test]
fn legacy_host_derives_the_edit_point_from_the_diff() {
    let mut document = loaded(&form_page(&[("value", "abcdef")]), HostProfile::legacy());
    document.attach(FIELD, max(8)).unwrap();

    let countdown = document.countdown(FIELD).unwrap();
    assert_eq!(countdown.probe(), SelectionProbe::EditDiff);
    assert_eq!(countdown.mover(), CaretMover::FocusOnly);

    document.set_caret(FIELD, 2);
    document.paste(FIELD, "XYZ").unwrap();

    assert_eq!(document.value(FIELD), Some("abXYcdef"));
    // The caret stays where the programmatic assignment left it.
    assert_eq!(document.caret(FIELD), Some(8));
    assert!(document.fields().is_focused(field_id(FIELD)));
}

#[test]
fn native_maxlength_undercounts_line_endings() {
    let root = doc(vec![elem(
        2,
        "form",
        &[],
        vec![elem(3, "textarea", &[("maxlength", "5")], vec![])],
    )]);
    let mut document = loaded(&root, HostProfile::modern());
    document.attach(FIELD, CountdownOptions::default()).unwrap();

    // Native enforcement alone would accept "ab\ncd" (five stored characters).
    document.type_text(FIELD, "ab\ncde").unwrap();

    assert_eq!(document.value(FIELD), Some("ab\nc"));
    assert_eq!(document.caret(FIELD), Some(5));
    assert_eq!(document.counter_count(FIELD).as_deref(), Some("0"));
}

#[test]
fn textarea_line_breaks_count_two() {
    let root = doc(vec![elem(
        2,
        "form",
        &[],
        vec![elem(3, "textarea", &[], vec![text(4, "a\nb")])],
    )]);
    let mut document = loaded(&root, HostProfile::modern());

    let state = document.attach(FIELD, max(20)).unwrap();
    assert_eq!(state.remaining, 16);
}

#[test]
fn overrun_shows_negative_counts_and_drops_maxlength() {
    let mut document = loaded(
        &form_page(&[("value", "Hello"), ("maxlength", "10")]),
        HostProfile::modern(),
    );
    document
        .attach(FIELD, CountdownOptions::default().with_allow_overrun(true))
        .unwrap();
    assert_eq!(document.dom().attr(PatchKey(3), "maxlength"), None);

    document.set_caret(FIELD, 5);
    document.type_text(FIELD, " World!").unwrap();

    assert_eq!(document.value(FIELD), Some("Hello World!"));
    assert_eq!(document.counter_count(FIELD).as_deref(), Some("-2"));
    assert!(document.counter_is_low(FIELD));
}

#[test]
fn low_class_toggles_at_the_threshold() {
    let mut document = loaded(&form_page(&[]), HostProfile::modern());
    document.attach(FIELD, max(5).with_low_chars(1)).unwrap();

    document.type_text(FIELD, "abc").unwrap();
    assert!(!document.counter_is_low(FIELD));

    document.type_text(FIELD, "d").unwrap();
    assert!(document.counter_is_low(FIELD));

    document.backspace(FIELD).unwrap();
    assert!(!document.counter_is_low(FIELD));
    assert_eq!(
        document.dom().attr(PatchKey(3), "class"),
        Some("has-counter")
    );
}

#[test]
fn repeated_dispatch_is_idempotent() {
    let mut document = loaded(&form_page(&[("value", "abc")]), HostProfile::modern());
    document.attach(FIELD, max(5)).unwrap();
    document.set_value(FIELD, "abcdefg").unwrap();

    let first = document.dispatch(FIELD, EditEvent::Input).unwrap().unwrap();
    assert!(first.trimmed());
    let value = document.value(FIELD).map(str::to_string);

    for event in EditEvent::ALL {
        let again = document.dispatch(FIELD, event).unwrap().unwrap();
        assert!(!again.trimmed());
        assert_eq!(again.state, first.state);
        assert_eq!(document.value(FIELD).map(str::to_string), value);
    }
}

#[test]
fn reattaching_replaces_the_counter() {
    let mut document = loaded(&form_page(&[]), HostProfile::modern());
    document.attach(FIELD, max(10)).unwrap();
    document.attach(FIELD, max(20)).unwrap();

    let labels = document
        .snapshot()
        .unwrap()
        .as_lines()
        .iter()
        .filter(|line| line.contains(crate::counter::GENERATED_ATTR))
        .count();
    assert_eq!(labels, 1);
    assert_eq!(document.counter_count(FIELD).as_deref(), Some("20"));
}

fn tree_size(node: &Node) -> usize {
    1 + node.children().iter().map(tree_size).sum::<usize>()
}

#[test]
fn reattaching_keeps_one_live_counter_for_every_placement() {
    let placements = [
        (Placement::After, (PatchKey(2), 1)),
        (Placement::Before, (PatchKey(2), 0)),
        (Placement::parse("#slot"), (PatchKey(5), 0)),
    ];
    for (placement, position) in placements {
        let mut document = loaded(&form_page(&[]), HostProfile::modern());
        document
            .attach(FIELD, max(10).with_counter_location(placement.clone()))
            .unwrap();
        document
            .attach(FIELD, max(20).with_counter_location(placement.clone()))
            .unwrap();

        let labels = document
            .snapshot()
            .unwrap()
            .as_lines()
            .iter()
            .filter(|line| line.contains(crate::counter::GENERATED_ATTR))
            .count();
        assert_eq!(labels, 1, "{placement}");
        assert_eq!(document.counter_position(FIELD), Some(position), "{placement}");

        // Every live node is reachable from the root.
        let tree = document.dom().materialize().unwrap();
        assert_eq!(document.dom().len(), tree_size(&tree), "{placement}");

        document.type_text(FIELD, "abc").unwrap();
        assert_eq!(document.counter_count(FIELD).as_deref(), Some("17"), "{placement}");
    }
}

#[test]
fn reattaching_can_move_the_counter() {
    let mut document = loaded(&form_page(&[]), HostProfile::modern());
    document.attach(FIELD, max(10)).unwrap();
    document
        .attach(FIELD, max(10).with_counter_location(Placement::parse("#slot")))
        .unwrap();
    assert_eq!(document.counter_position(FIELD), Some((PatchKey(5), 0)));
    assert_eq!(document.dom().children(PatchKey(2)), &[PatchKey(3), PatchKey(4)]);

    document
        .attach(FIELD, max(10).with_counter_location(Placement::parse(".missing")))
        .unwrap();
    assert_eq!(document.counter_text(FIELD), None);
    assert!(document.dom().children(PatchKey(5)).is_empty());
}

#[test]
fn only_text_controls_take_a_countdown() {
    let mut document = loaded(&form_page(&[]), HostProfile::modern());
    assert_eq!(
        document.attach(Id(4), CountdownOptions::default()),
        Err(DocumentError::NotATextControl(Id(4)))
    );
    assert_eq!(document.dispatch(FIELD, EditEvent::Input), Ok(None));
}
