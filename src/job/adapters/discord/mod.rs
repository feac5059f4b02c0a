//! Discord adapters built on serenity.
//!
//! The transport posts tagged prompts; the event handler turns messages of
//! the watched channel into completion events.

mod handler;
mod transport;

pub use handler::CompletionEventHandler;
pub use transport::SerenityChatTransport;
