//! Session Logic Module
//!
//! The session loop is split into focused components:
//! - `state`: everything the loop owns (store, listener, publisher, counters)
//! - `handlers`: one function per command or event
//! - `task`: the `SessionLogicTask` event loop
//!
//! All mutation of display state happens on this one task. Transports and the
//! UI only ever reach it through channels, so the store needs no lock: the
//! loop serializes concurrent producers into one total order.

pub mod handlers;
pub mod state;
pub mod task;

pub use handlers::SessionHandlers;
pub use state::{SessionState, SessionStats};
pub use task::SessionLogicTask;
