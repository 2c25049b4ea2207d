//! Core types and trait definitions for the lifestream aggregator.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The store, ingest, and API crates all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod record;
pub mod source;
pub mod store;
pub mod zone;

pub use error::{Error, Result};
pub use record::{Engagement, NewRecord, Record};
pub use source::SourceKind;
pub use zone::CanonicalZone;
