//! Model lifecycle events
//!
//! Listeners fire synchronously and in registration order. A listener on a
//! "before" event can veto the operation; "after" listeners cannot.

mod dispatcher;
mod event;

pub use dispatcher::{EventDispatcher, Listener};
pub use event::{ListenerResponse, ModelEvent};
