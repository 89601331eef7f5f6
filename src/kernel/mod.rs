//! Headless application core (state/action/effect).

pub mod action;
pub mod effect;
pub mod services;
pub mod state;
pub mod store;

pub use action::{Action, SaveTrigger};
pub use effect::{Effect, Notice, NoticeLevel};
pub use state::{AppState, SaveBatch, SaveRerun, SaveState, Session};
pub use store::{DispatchResult, Store};
