//! Integration test utilities for the gateway client
//!
//! This crate provides a fake gateway server and a recording OpenApi so
//! sessions can be driven end to end without the real platform.

pub mod helpers;
pub mod fixtures;

pub use helpers::*;
pub use fixtures::*;
