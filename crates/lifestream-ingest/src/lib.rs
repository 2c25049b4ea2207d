//! Ingest jobs for the lifestream aggregator.
//!
//! A job reads one upstream feed ([`source`]), keeps only what the store has
//! not seen ([`novelty`]), and pages until the feed's policy says stop
//! ([`driver`]). [`run::run_job`] wires one job from configuration.

#![allow(async_fn_in_trait)]

pub mod config;
pub mod driver;
pub mod error;
pub mod http;
pub mod novelty;
pub mod rss;
pub mod run;
pub mod source;

pub use config::IngestConfig;
pub use driver::RunStats;
pub use error::{Error, FetchError, Result};
pub use http::{HttpClient, ReqwestClient};
pub use run::run_job;
