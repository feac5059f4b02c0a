//! In-memory adapters for the job lifecycle.
//!
//! The store is the production store (state is process-resident by design).
//! The recording transport, recording notifier and manual clock model the
//! outer world deterministically for tests and local dry runs.

mod chat;
mod clock;
mod notifier;
mod store;

pub use chat::RecordingChatTransport;
pub use clock::ManualClock;
pub use notifier::{RecordedNotification, RecordingWebhookNotifier};
pub use store::InMemoryJobStore;
