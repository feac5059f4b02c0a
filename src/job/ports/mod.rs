//! Port contracts for the job lifecycle.
//!
//! Ports define infrastructure-agnostic interfaces used by job services.

pub mod chat;
pub mod notifier;
pub mod store;

pub use chat::{ChatTransport, ChatTransportError, ChatTransportResult, PostPromptCommand};
pub use notifier::{NotificationError, NotificationResult, WebhookNotifier};
pub use store::{JobStore, JobStoreError, JobStoreResult};
