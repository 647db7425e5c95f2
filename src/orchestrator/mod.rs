//! Application-level orchestration.
//!
//! This module owns the catalog session state, the reducer that moves it, and the
//! controller that performs requests on its behalf. UI and CLI layers only send
//! intents in and read state back out.

mod controller;
mod reducer;
mod state;

pub(crate) use controller::{run_controller, Controller, Snapshot, UiCommand};
pub(crate) use reducer::{reduce, Intent};
pub(crate) use state::{coerce_number, AppState, FieldInput, Modal, ProductField, StagedProduct};
