//! Presentation channel
//!
//! This module defines the trait through which a running session talks to
//! whatever presents it (a terminal, a web page, a test). The session never
//! waits on the presentation layer; it only pushes messages.

use super::{SyncMessage, UpdateMessage};

/// Trait for sending messages to the presentation layer
///
/// Implementations might forward to a WebSocket, a channel or a log. They
/// must not block.
pub trait Tunnel {
    /// Sends an incremental update
    ///
    /// # Arguments
    ///
    /// * `message` - The update message to send
    fn send_message(&self, message: &UpdateMessage);

    /// Sends a complete description of the current state
    ///
    /// Used when a view attaches to a running session.
    ///
    /// # Arguments
    ///
    /// * `state` - The synchronization message to send
    fn send_state(&self, state: &SyncMessage);

    /// Closes the channel once the session is over
    fn close(self);
}
