//! Core types and filters for cfip.
//!
//! This crate provides the foundational types shared by every cfip crate:
//!
//! - **Types**: the [`Candidate`] record grammar, region tables and source descriptors
//! - **Filters**: deduplication, latency filtering and bare-address extraction
//! - **Errors**: the top-level [`CfipError`]
//!
//! # Example
//!
//! ```rust
//! use cfip_core::{filter, Candidate};
//!
//! let records: Vec<Candidate> = ["1.1.1.1#CT-25ms", "3.3.3.3-80ms"]
//!     .into_iter()
//!     .map(Candidate::parse)
//!     .collect();
//!
//! let fast = filter::filter_by_latency(records, 50.0, true);
//! assert_eq!(filter::extract_addresses(&fast), vec!["1.1.1.1"]);
//! ```

#![doc(html_root_url = "https://docs.rs/cfip-core/0.3.0")]

mod error;
pub mod filter;
pub mod types;

pub use error::{CfipError, Result};
pub use types::*;
