//! Source adapters for cfip.
//!
//! This crate provides the [`SourceClient`] that fetches and parses every kind of
//! configured source, the [`aggregate`] stage that merges them in configuration
//! order, and the line-file [`store`].
//!
//! Adapter failures never escape [`SourceClient::fetch_and_parse`]: a failing
//! source is logged and contributes no records.

#![doc(html_root_url = "https://docs.rs/cfip-sources/0.3.0")]

mod aggregate;
mod client;
mod error;
pub mod adapters;
pub mod store;

pub use aggregate::{aggregate, SourceFetcher};
pub use client::{SourceClient, SourceClientBuilder};
pub use error::{SourceError, SourceResult};
