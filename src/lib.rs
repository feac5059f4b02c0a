//! Imagine relay: HTTP front door for a chat-based image generation bot.
//!
//! Automation callers submit prompts over HTTP. The relay posts each prompt
//! into a chat channel tagged with a job identifier, watches the channel for
//! the generated image, attributes it back to the job and notifies the
//! caller's webhook.
//!
//! # Architecture
//!
//! The relay follows hexagonal architecture principles:
//!
//! - **Domain**: Pure job lifecycle logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the store, chat and webhooks
//! - **Adapters**: Concrete implementations (in-memory store, serenity, axum,
//!   reqwest)
//!
//! # Modules
//!
//! - [`job`]: Job identifiers, correlation and lifecycle
//! - [`config`]: Command-line and environment configuration

pub mod config;
pub mod job;
