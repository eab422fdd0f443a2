use std::fmt;

/// The edit notifications a countdown reacts to. All of them run the same
/// pass; a single logical edit may deliver more than one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditEvent {
    /// Text input, fired as the value changes.
    Input,
    /// Key release.
    KeyUp,
    /// Committed value change, including pointer-driven paste.
    Change,
}

impl EditEvent {
    pub const ALL: [EditEvent; 3] = [EditEvent::Input, EditEvent::KeyUp, EditEvent::Change];

    /// DOM event type name.
    pub fn dom_name(self) -> &'static str {
        match self {
            EditEvent::Input => "input",
            EditEvent::KeyUp => "keyup",
            EditEvent::Change => "change",
        }
    }

    pub fn from_dom_name(name: &str) -> Option<EditEvent> {
        EditEvent::ALL.into_iter().find(|e| e.dom_name() == name)
    }
}

impl fmt::Display for EditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dom_name())
    }
}
