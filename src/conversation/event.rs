//! Events that can occur in a conversation

use crate::api::NormalizedResponse;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// User pressed send
    UserSubmit { text: String },

    /// The in-flight request finished, successfully or not
    ResponseReceived { response: NormalizedResponse },
}
