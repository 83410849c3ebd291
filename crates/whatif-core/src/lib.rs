//! Core types, the narrative generator, and the store trait for whatif.
//!
//! This crate is free of HTTP and database dependencies. The generator is a
//! pure function of its template pools and an injected random source.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod analytics;
pub mod error;
pub mod generator;
pub mod reality;
pub mod session;
pub mod store;
pub mod tree;

pub use error::{Error, Result};
