//! Live character countdown for text inputs and textareas.
//!
//! A [`CharCountdown`] is attached to one field. On every edit event it
//! recomputes the remaining allowance, trims an overrun at the caret when
//! overrun is not allowed, and updates a counter label next to the field.
//!
//! Lengths are normalized: each line ending counts as two characters, the
//! way it is submitted with a form, whatever the host stores.
//!
//! Hosts plug in through [`FieldHost`] and [`CounterSurface`]. Two are
//! provided: the in-memory [`document::Document`], and on `wasm32` a
//! `web-sys` binding in [`web`].

pub mod caret;
pub mod config;
pub mod controller;
pub mod corrector;
pub mod count;
pub mod counter;
pub mod document;
mod error;
pub mod event;
pub mod listeners;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use caret::{CaretMover, FieldHost, SelectionProbe};
pub use config::{CountdownConfig, CountdownOptions, MaxChars, Placement};
pub use controller::{CharCountdown, EditOutcome};
pub use corrector::{Trim, trim_excess};
pub use counter::{CounterLabel, CounterState, CounterSurface};
pub use document::{Document, DocumentError, HostProfile};
pub use error::ConfigError;
pub use event::EditEvent;
pub use listeners::{ListenerSet, ListenerTarget};
