//! The registry lookup capability and the record shape it returns.

use crate::error::LookupResult;
use async_trait::async_trait;
use std::net::IpAddr;

/// Network object of a registry record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RdapNetwork {
    /// Two-letter country code, when the registry publishes one
    pub country: Option<String>,
    /// Network display name (e.g. `APNIC-LABS`)
    pub name: Option<String>,
}

/// Ownership/contact data for one address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RdapRecord {
    /// The network object
    pub network: Option<RdapNetwork>,
    /// Free-text postal addresses of all contact entities
    pub contact_addresses: Vec<String>,
}

/// Address-registry query capability (IP to ownership/contact record)
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    /// Look up one address
    async fn lookup(&self, ip: IpAddr) -> LookupResult<RdapRecord>;
}
