//! Adapter implementations for job lifecycle ports and surfaces.

pub mod discord;
pub mod http;
pub mod memory;
pub mod webhook;
