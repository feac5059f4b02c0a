//! Prompt job correlation and lifecycle.
//!
//! Callers submit prompts over HTTP; each prompt becomes a pending job whose
//! identifier is tagged into the message posted to the generation channel.
//! Result images arriving later in that channel are attributed back to their
//! job from the surrounding history, the job is completed, and the caller's
//! webhook is notified once. Abandoned and finished jobs are reclaimed by a
//! periodic sweep. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
