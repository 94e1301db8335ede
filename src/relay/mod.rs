//! Relay module
//!
//! Turns one client request into one webhook call and relays the answer.

pub mod forwarder;
pub mod logging;
pub mod outbound;
pub mod request;

pub use forwarder::{RelayResponse, WebhookForwarder};
pub use logging::RelayContext;
pub use outbound::OutboundBody;
pub use request::RelayRequest;
