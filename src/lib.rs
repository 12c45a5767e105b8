//! MAJOR-BOT: Multi-account daily rewards runner
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod accounts;
pub mod api;
pub mod config;
pub mod console;
pub mod engine;
pub mod types;
