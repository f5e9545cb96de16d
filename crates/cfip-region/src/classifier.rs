//! Region classification and the bounded, fail-closed region filter.

use crate::lookup::{RdapRecord, RegistryLookup};
use cfip_core::{extract_ip, Candidate, RegionCode, RegionTable};
use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Resolves addresses to regions through an optional [`RegistryLookup`].
#[derive(Clone)]
pub struct RegionClassifier {
    lookup: Option<Arc<dyn RegistryLookup>>,
    table: Arc<RegionTable>,
}

impl std::fmt::Debug for RegionClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionClassifier")
            .field("available", &self.is_available())
            .field("regions", &self.table.regions().len())
            .finish()
    }
}

impl RegionClassifier {
    /// Create a classifier over the default region table
    #[must_use]
    pub fn new(lookup: Option<Arc<dyn RegistryLookup>>) -> Self {
        Self {
            lookup,
            table: Arc::new(RegionTable::default()),
        }
    }

    /// Create a classifier with a working lookup capability
    #[must_use]
    pub fn with_lookup(lookup: Arc<dyn RegistryLookup>) -> Self {
        Self::new(Some(lookup))
    }

    /// A classifier with no lookup capability. Every filter returns nothing.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(None)
    }

    /// Replace the region keyword table
    #[must_use]
    pub fn with_table(mut self, table: RegionTable) -> Self {
        self.table = Arc::new(table);
        self
    }

    /// Whether a lookup capability is configured
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.lookup.is_some()
    }

    /// The region keyword table in use
    #[must_use]
    pub fn table(&self) -> &RegionTable {
        &self.table
    }

    /// Classify an already fetched registry record.
    ///
    /// Country first, then contact addresses, then the network name.
    #[must_use]
    pub fn classify_record(&self, record: &RdapRecord) -> Option<RegionCode> {
        classify_with(&self.table, record)
    }

    /// Classify one address. Any lookup failure yields `None`.
    pub async fn classify(&self, ip: IpAddr) -> Option<RegionCode> {
        let lookup = self.lookup.as_ref()?;
        classify_one(lookup.as_ref(), &self.table, ip).await
    }

    /// Keep only records whose address classifies into one of `targets`.
    ///
    /// Returns nothing when no lookup capability is configured or `targets` is
    /// empty. At most `max_concurrency` lookups are in flight (0 counts as 1),
    /// and each distinct address is looked up once. Output order is unspecified.
    pub async fn filter_by_regions(
        &self,
        records: Vec<Candidate>,
        targets: &[RegionCode],
        max_concurrency: usize,
    ) -> Vec<Candidate> {
        let Some(lookup) = self.lookup.clone() else {
            warn!("no registry lookup available, region filter returns nothing");
            return Vec::new();
        };
        if targets.is_empty() {
            warn!("no target regions, region filter returns nothing");
            return Vec::new();
        }

        let keyed: Vec<(IpAddr, Candidate)> = records
            .into_iter()
            .filter_map(|record| match parse_address(record.as_str()) {
                Some(ip) => Some((ip, record)),
                None => {
                    debug!(record = %record, "dropping record without a parseable address");
                    None
                }
            })
            .collect();

        let unique: HashSet<IpAddr> = keyed.iter().map(|(ip, _)| *ip).collect();
        let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
        let mut handles = Vec::with_capacity(unique.len());

        for ip in unique {
            let sem = Arc::clone(&semaphore);
            let lookup = Arc::clone(&lookup);
            let table = Arc::clone(&self.table);

            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire().await.ok()?;
                let region = classify_one(lookup.as_ref(), &table, ip).await?;
                Some((ip, region))
            }));
        }

        let mut regions: HashMap<IpAddr, RegionCode> = HashMap::new();
        for handle in handles {
            match handle.await {
                Ok(Some((ip, region))) => {
                    regions.insert(ip, region);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "region lookup task failed"),
            }
        }

        // Targets go through the same country resolution as registry results
        let wanted: HashSet<RegionCode> = targets
            .iter()
            .map(|target| self.table.resolve_country(target.as_str()))
            .collect();
        let kept: Vec<Candidate> = keyed
            .into_iter()
            .filter(|(ip, _)| regions.get(ip).is_some_and(|r| wanted.contains(r)))
            .map(|(_, record)| record)
            .collect();

        info!(
            classified = regions.len(),
            count = kept.len(),
            "region filter complete"
        );
        kept
    }
}

async fn classify_one(
    lookup: &dyn RegistryLookup,
    table: &RegionTable,
    ip: IpAddr,
) -> Option<RegionCode> {
    match lookup.lookup(ip).await {
        Ok(record) => {
            let region = classify_with(table, &record);
            debug!(%ip, region = ?region, "classified");
            region
        }
        Err(e) => {
            debug!(%ip, error = %e, "registry lookup failed");
            None
        }
    }
}

fn classify_with(table: &RegionTable, record: &RdapRecord) -> Option<RegionCode> {
    let network = record.network.as_ref();

    if let Some(country) = network
        .and_then(|n| n.country.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        return Some(table.resolve_country(country));
    }

    if let Some(code) = record
        .contact_addresses
        .iter()
        .find_map(|address| table.match_text(address))
    {
        return Some(code.clone());
    }

    network
        .and_then(|n| n.name.as_deref())
        .and_then(|name| table.match_text(name))
        .cloned()
}

/// Address of a record, accepting `ip:port` forms as well.
fn parse_address(record: &str) -> Option<IpAddr> {
    let text = extract_ip(record)?;
    text.parse::<IpAddr>()
        .ok()
        .or_else(|| text.parse::<SocketAddr>().ok().map(|s| s.ip()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LookupError, LookupResult};
    use crate::lookup::RdapNetwork;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Lookup backed by a fixed map; unknown addresses are "not found".
    #[derive(Default)]
    struct FakeLookup {
        records: HashMap<IpAddr, RdapRecord>,
        calls: Mutex<Vec<IpAddr>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        delay: Option<Duration>,
    }

    impl FakeLookup {
        fn with_country(mut self, ip: &str, country: &str) -> Self {
            self.records.insert(
                ip.parse().unwrap(),
                RdapRecord {
                    network: Some(RdapNetwork {
                        country: Some(country.to_string()),
                        name: None,
                    }),
                    contact_addresses: Vec::new(),
                },
            );
            self
        }

        fn calls(&self) -> Vec<IpAddr> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RegistryLookup for FakeLookup {
        async fn lookup(&self, ip: IpAddr) -> LookupResult<RdapRecord> {
            self.calls.lock().unwrap().push(ip);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.records
                .get(&ip)
                .cloned()
                .ok_or_else(|| LookupError::NotFound(ip.to_string()))
        }
    }

    fn records(lines: &[&str]) -> Vec<Candidate> {
        lines.iter().map(|l| Candidate::parse(l)).collect()
    }

    fn sorted(v: Vec<Candidate>) -> Vec<String> {
        let mut out: Vec<String> = v.into_iter().map(String::from).collect();
        out.sort();
        out
    }

    #[test]
    fn test_precedence_country_first() {
        let classifier = RegionClassifier::unavailable();
        let record = RdapRecord {
            network: Some(RdapNetwork {
                country: Some("jp".to_string()),
                name: Some("SINGAPORE-NET".to_string()),
            }),
            contact_addresses: vec!["1 Main St, Taipei, Taiwan".to_string()],
        };
        assert_eq!(classifier.classify_record(&record), Some(RegionCode::new("JP")));
    }

    #[test]
    fn test_precedence_addresses_then_name() {
        let classifier = RegionClassifier::unavailable();
        let by_address = RdapRecord {
            network: Some(RdapNetwork {
                country: None,
                name: Some("HK-NET".to_string()),
            }),
            contact_addresses: vec!["Level 2, Singapore 048616".to_string()],
        };
        assert_eq!(
            classifier.classify_record(&by_address),
            Some(RegionCode::new("SG"))
        );

        let by_name = RdapRecord {
            network: Some(RdapNetwork {
                country: Some(String::new()),
                name: Some("Hong Kong Telecom".to_string()),
            }),
            contact_addresses: Vec::new(),
        };
        assert_eq!(classifier.classify_record(&by_name), Some(RegionCode::new("HK")));

        assert_eq!(classifier.classify_record(&RdapRecord::default()), None);
    }

    #[test]
    fn test_country_resolved_through_table() {
        let classifier = RegionClassifier::unavailable();
        let record = RdapRecord {
            network: Some(RdapNetwork {
                country: Some("GB".to_string()),
                name: None,
            }),
            contact_addresses: Vec::new(),
        };
        assert_eq!(classifier.classify_record(&record), Some(RegionCode::new("UK")));
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("1.1.1.1#SG-50ms"), "1.1.1.1".parse().ok());
        assert_eq!(parse_address("1.0.0.1:443#HK"), "1.0.0.1".parse().ok());
        assert_eq!(parse_address("2606:4700::1111"), "2606:4700::1111".parse().ok());
        assert_eq!(parse_address("not-an-ip"), None);
    }

    #[tokio::test]
    async fn test_unavailable_fails_closed() {
        let classifier = RegionClassifier::unavailable();
        let out = classifier
            .filter_by_regions(records(&["1.1.1.1"]), &[RegionCode::new("SG")], 4)
            .await;
        assert!(out.is_empty());
        assert_eq!(classifier.classify("1.1.1.1".parse().unwrap()).await, None);
    }

    #[tokio::test]
    async fn test_empty_targets_fail_closed() {
        let fake = Arc::new(FakeLookup::default().with_country("1.1.1.1", "SG"));
        let classifier = RegionClassifier::with_lookup(fake.clone());
        let out = classifier.filter_by_regions(records(&["1.1.1.1"]), &[], 4).await;
        assert!(out.is_empty());
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_filter_keeps_target_regions() {
        let fake = Arc::new(
            FakeLookup::default()
                .with_country("1.1.1.1", "SG")
                .with_country("1.0.0.1", "US")
                .with_country("8.8.8.8", "JP"),
        );
        let classifier = RegionClassifier::with_lookup(fake);
        let out = classifier
            .filter_by_regions(
                records(&["1.1.1.1#a-40ms", "1.0.0.1", "8.8.8.8#b", "9.9.9.9", "junk"]),
                &[RegionCode::new("SG"), RegionCode::new("JP")],
                2,
            )
            .await;
        assert_eq!(sorted(out), vec!["1.1.1.1#a-40ms", "8.8.8.8#b"]);
    }

    #[tokio::test]
    async fn test_iso_country_target_matches_resolved_region() {
        let fake = Arc::new(
            FakeLookup::default()
                .with_country("1.1.1.1", "GB")
                .with_country("1.0.0.1", "DE"),
        );
        let classifier = RegionClassifier::with_lookup(fake);
        let out = classifier
            .filter_by_regions(records(&["1.1.1.1", "1.0.0.1"]), &[RegionCode::new("GB")], 2)
            .await;
        assert_eq!(sorted(out), vec!["1.1.1.1"]);
    }

    #[tokio::test]
    async fn test_same_address_looked_up_once() {
        let fake = Arc::new(FakeLookup::default().with_country("1.1.1.1", "SG"));
        let classifier = RegionClassifier::with_lookup(fake.clone());
        let out = classifier
            .filter_by_regions(
                records(&["1.1.1.1#x-10ms", "1.1.1.1#y-20ms"]),
                &[RegionCode::new("SG")],
                4,
            )
            .await;
        assert_eq!(out.len(), 2);
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let mut fake = FakeLookup::default();
        let mut lines = Vec::new();
        for i in 1..=12 {
            let ip = format!("10.0.0.{i}");
            fake = fake.with_country(&ip, "SG");
            lines.push(ip);
        }
        fake.delay = Some(Duration::from_millis(20));
        let fake = Arc::new(fake);

        let classifier = RegionClassifier::with_lookup(fake.clone());
        let input: Vec<Candidate> = lines.iter().map(|l| Candidate::parse(l)).collect();
        let out = classifier
            .filter_by_regions(input, &[RegionCode::new("SG")], 3)
            .await;

        assert_eq!(out.len(), 12);
        assert!(fake.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_zero_concurrency_treated_as_one() {
        let fake = Arc::new(FakeLookup::default().with_country("1.1.1.1", "SG"));
        let classifier = RegionClassifier::with_lookup(fake);
        let out = classifier
            .filter_by_regions(records(&["1.1.1.1"]), &[RegionCode::new("SG")], 0)
            .await;
        assert_eq!(out.len(), 1);
    }
}
