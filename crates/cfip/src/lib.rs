//! Collect, filter and classify Cloudflare edge IP candidates.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cfip::{LatencyOptions, Pipeline, PipelineConfig, RegionClassifier, SourceSelection};
//!
//! #[tokio::main]
//! async fn main() -> cfip::Result<()> {
//!     let pipeline = Pipeline::new(PipelineConfig::default(), RegionClassifier::unavailable())?;
//!
//!     let output = pipeline
//!         .run_latency(&SourceSelection::All, LatencyOptions::default())
//!         .await;
//!
//!     for ip in &output.addresses {
//!         println!("{ip}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Region filtering needs a registry lookup:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cfip::{RdapClient, RegionClassifier, RegionCode, RegionOptions};
//!
//! let classifier = RegionClassifier::with_lookup(Arc::new(RdapClient::new()?));
//! let pipeline = Pipeline::new(PipelineConfig::default(), classifier)?;
//! let output = pipeline
//!     .run_regions(&SourceSelection::All, &[RegionCode::new("SG")], RegionOptions::default())
//!     .await;
//! ```
//!
//! # Features
//!
//! - `default` - rustls and RDAP lookups
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS
//! - `rdap` - RDAP registry client for region classification

#![doc(html_root_url = "https://docs.rs/cfip/0.3.0")]

mod config;
mod pipeline;

pub use config::{
    default_sources, PipelineConfig, DEFAULT_API_URL, DEFAULT_LOCAL_FILE, DEFAULT_MARKUP_SOURCES,
    DEFAULT_TEXT_SOURCES,
};
pub use pipeline::{LatencyOptions, Pipeline, PipelineOutput, RegionOptions, SourceSelection};

// Re-export core types
pub use cfip_core::*;

// Re-export adapters and the line store
pub use cfip_sources::{store, SourceClient, SourceClientBuilder, SourceError, SourceFetcher};

// Re-export region classification
pub use cfip_region::{LookupError, RdapNetwork, RdapRecord, RegionClassifier, RegistryLookup};

#[cfg(feature = "rdap")]
pub use cfip_region::{RateLimitConfig, RdapClient, RdapClientBuilder};

// Re-export runtime for convenience
pub use serde_json;
pub use tokio;
