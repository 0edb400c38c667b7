//! Domain logic for the boardroom idea pipeline.
//!
//! Pure, synchronous code only: the idea lifecycle state machine, input
//! validation, and the shared types every other crate builds on. Anything
//! that touches the network or the database lives in the sibling crates.

pub mod error;
pub mod idea;
pub mod roles;
pub mod types;
