//! # Model Lifecycle Events
//!
//! Notifications fired around state-changing record operations. "Before"
//! events may veto the pending operation; "after" events are notifications
//! only.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle events fired by the publishable behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelEvent {
    /// Before `published_at` is stamped; cancellable
    Publishing,
    /// After a publish was saved
    Published,
    /// Before `expired_at` is stamped; cancellable
    Expiring,
    /// After an expiry was saved
    Expired,
}

impl ModelEvent {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelEvent::Publishing => "publishing",
            ModelEvent::Published => "published",
            ModelEvent::Expiring => "expiring",
            ModelEvent::Expired => "expired",
        }
    }

    /// Returns true for events whose listeners may cancel the operation
    pub fn is_before(&self) -> bool {
        matches!(self, ModelEvent::Publishing | ModelEvent::Expiring)
    }

    /// The "after" event paired with a "before" event
    pub fn completion(&self) -> ModelEvent {
        match self {
            ModelEvent::Publishing | ModelEvent::Published => ModelEvent::Published,
            ModelEvent::Expiring | ModelEvent::Expired => ModelEvent::Expired,
        }
    }
}

impl fmt::Display for ModelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a listener asks the dispatcher to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenerResponse {
    /// Let the operation (and remaining listeners) proceed
    #[default]
    Continue,
    /// Veto the operation; only honored for "before" events
    Cancel,
}

impl ListenerResponse {
    pub fn is_cancel(&self) -> bool {
        matches!(self, ListenerResponse::Cancel)
    }
}

impl From<bool> for ListenerResponse {
    /// `false` cancels, mirroring hooks that return a boolean verdict
    fn from(proceed: bool) -> Self {
        if proceed {
            ListenerResponse::Continue
        } else {
            ListenerResponse::Cancel
        }
    }
}

impl From<()> for ListenerResponse {
    fn from(_: ()) -> Self {
        ListenerResponse::Continue
    }
}
