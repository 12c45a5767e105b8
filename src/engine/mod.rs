//! Core engine: the per-account sequence and the pass loop around it.

pub mod pacing;
pub mod processor;
pub mod runner;
