//! Region classification for cfip candidates.
//!
//! A [`RegionClassifier`] resolves each candidate's address to a region through a
//! [`RegistryLookup`] capability and keeps only candidates in the target regions.
//! When no capability is configured, filtering fails closed and returns nothing.

#![doc(html_root_url = "https://docs.rs/cfip-region/0.3.0")]

mod classifier;
mod error;
mod lookup;

#[cfg(feature = "rdap")]
pub mod rdap;

pub use classifier::RegionClassifier;
pub use error::{LookupError, LookupResult};
pub use lookup::{RdapNetwork, RdapRecord, RegistryLookup};

#[cfg(feature = "rdap")]
pub use rdap::{RdapClient, RdapClientBuilder, RateLimitConfig};
