//! The collection pipelines: latency-only and region-filtered.

use crate::config::PipelineConfig;
use cfip_core::filter::{dedup_with_stats, extract_addresses, filter_by_latency};
use cfip_core::{Candidate, RegionCode, Result, SourceDescriptor, SourceKind};
use cfip_region::RegionClassifier;
use cfip_sources::{aggregate, SourceClient, SourceFetcher};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Which configured sources to fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceSelection {
    /// Every configured source
    #[default]
    All,
    /// Only sources of these kinds
    Kinds(BTreeSet<SourceKind>),
}

impl SourceSelection {
    /// Select sources of the given kinds
    pub fn kinds(kinds: impl IntoIterator<Item = SourceKind>) -> Self {
        Self::Kinds(kinds.into_iter().collect())
    }

    /// Whether a descriptor is selected
    #[must_use]
    pub fn includes(&self, descriptor: &SourceDescriptor) -> bool {
        match self {
            Self::All => true,
            Self::Kinds(kinds) => kinds.contains(&descriptor.kind()),
        }
    }
}

/// Options for [`Pipeline::run_latency`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyOptions {
    /// Keep records strictly faster than this (ms)
    pub max_latency: f64,
    /// Keep records without a usable latency
    pub keep_no_latency: bool,
    /// Deduplicate before filtering
    pub remove_duplicates: bool,
    /// Truncate the address list
    pub limit: Option<usize>,
}

impl Default for LatencyOptions {
    fn default() -> Self {
        Self {
            max_latency: 100.0,
            keep_no_latency: true,
            remove_duplicates: true,
            limit: None,
        }
    }
}

/// Options for [`Pipeline::run_regions`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionOptions {
    /// Keep records strictly faster than this (ms)
    pub max_latency: f64,
    /// Concurrent registry lookups
    pub max_concurrency: usize,
}

impl Default for RegionOptions {
    fn default() -> Self {
        Self {
            max_latency: 200.0,
            max_concurrency: 10,
        }
    }
}

/// Final records and their bare addresses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOutput {
    /// Full candidate records
    pub records: Vec<Candidate>,
    /// Bare addresses extracted from `records`
    pub addresses: Vec<String>,
}

impl PipelineOutput {
    fn from_records(records: Vec<Candidate>) -> Self {
        let addresses = extract_addresses(&records);
        Self { records, addresses }
    }

    /// Whether the run produced nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.addresses.is_empty()
    }

    /// The `(records, addresses)` pair
    #[must_use]
    pub fn into_parts(self) -> (Vec<Candidate>, Vec<String>) {
        (self.records, self.addresses)
    }
}

/// Orchestrates fetching, filtering and classification
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    fetcher: Arc<dyn SourceFetcher>,
    classifier: RegionClassifier,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("sources", &self.config.sources.len())
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Create a pipeline fetching with a default [`SourceClient`]
    pub fn new(config: PipelineConfig, classifier: RegionClassifier) -> Result<Self> {
        let client = SourceClient::new()?;
        Ok(Self::with_fetcher(config, classifier, Arc::new(client)))
    }

    /// Create a pipeline with an explicit fetcher
    #[must_use]
    pub fn with_fetcher(
        config: PipelineConfig,
        classifier: RegionClassifier,
        fetcher: Arc<dyn SourceFetcher>,
    ) -> Self {
        let classifier = classifier.with_table(config.regions.clone());
        Self {
            config: Arc::new(config),
            fetcher,
            classifier,
        }
    }

    /// The configuration in use
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The region classifier in use
    #[must_use]
    pub const fn classifier(&self) -> &RegionClassifier {
        &self.classifier
    }

    /// Descriptors chosen by `selection`, in configured order
    #[must_use]
    pub fn select(&self, selection: &SourceSelection) -> Vec<SourceDescriptor> {
        self.config
            .sources
            .iter()
            .filter(|d| selection.includes(d))
            .cloned()
            .collect()
    }

    /// Fetch the selected sources concurrently and merge them in order
    pub async fn collect(&self, selection: &SourceSelection) -> Vec<Candidate> {
        let descriptors = self.select(selection);
        aggregate(self.fetcher.as_ref(), &descriptors).await
    }

    /// Aggregate, deduplicate, filter by latency and extract addresses.
    #[instrument(skip(self), fields(max_latency = options.max_latency))]
    pub async fn run_latency(
        &self,
        selection: &SourceSelection,
        options: LatencyOptions,
    ) -> PipelineOutput {
        let mut records = self.collect(selection).await;

        if options.remove_duplicates {
            let (unique, stats) = dedup_with_stats(records);
            info!(before = stats.before, after = stats.after, "removed duplicates");
            records = unique;
        }

        let filtered = filter_by_latency(records, options.max_latency, options.keep_no_latency);
        let mut output = PipelineOutput::from_records(filtered);

        if let Some(limit) = options.limit {
            output.addresses.truncate(limit);
        }

        info!(
            records = output.records.len(),
            addresses = output.addresses.len(),
            "latency pipeline complete"
        );
        output
    }

    /// Aggregate, deduplicate, filter by latency, then keep only `targets`.
    ///
    /// Returns an empty output, without fetching anything, when `targets` is
    /// empty or the classifier has no lookup capability.
    #[instrument(skip(self, targets), fields(targets = targets.len()))]
    pub async fn run_regions(
        &self,
        selection: &SourceSelection,
        targets: &[RegionCode],
        options: RegionOptions,
    ) -> PipelineOutput {
        if targets.is_empty() {
            warn!("no target regions given");
            return PipelineOutput::default();
        }
        if !self.classifier.is_available() {
            warn!("region lookup unavailable, skipping region pipeline");
            return PipelineOutput::default();
        }

        let records = self.collect(selection).await;
        if records.is_empty() {
            warn!("no candidates from any source");
            return PipelineOutput::default();
        }

        let (unique, stats) = dedup_with_stats(records);
        info!(before = stats.before, after = stats.after, "removed duplicates");

        let fast = filter_by_latency(unique, options.max_latency, true);
        let kept = self
            .classifier
            .filter_by_regions(fast, targets, options.max_concurrency)
            .await;

        let output = PipelineOutput::from_records(kept);
        info!(
            records = output.records.len(),
            addresses = output.addresses.len(),
            "region pipeline complete"
        );
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cfip_region::{LookupError, LookupResult, RdapNetwork, RdapRecord, RegistryLookup};
    use std::collections::HashMap;
    use std::net::IpAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves fixed records per source label and counts fetches
    #[derive(Default)]
    struct StaticFetcher {
        responses: HashMap<String, Vec<&'static str>>,
        fetches: AtomicUsize,
    }

    impl StaticFetcher {
        fn with(mut self, label: &str, records: &[&'static str]) -> Self {
            self.responses.insert(label.to_string(), records.to_vec());
            self
        }
    }

    #[async_trait]
    impl SourceFetcher for StaticFetcher {
        async fn fetch(&self, descriptor: &SourceDescriptor) -> Vec<Candidate> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(&descriptor.label())
                .map(|records| records.iter().copied().map(Candidate::parse).collect())
                .unwrap_or_default()
        }
    }

    struct CountryLookup(HashMap<IpAddr, &'static str>);

    #[async_trait]
    impl RegistryLookup for CountryLookup {
        async fn lookup(&self, ip: IpAddr) -> LookupResult<RdapRecord> {
            let country = self
                .0
                .get(&ip)
                .ok_or_else(|| LookupError::NotFound(ip.to_string()))?;
            Ok(RdapRecord {
                network: Some(RdapNetwork {
                    country: Some((*country).to_string()),
                    name: None,
                }),
                contact_addresses: Vec::new(),
            })
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig::with_sources(vec![
            SourceDescriptor::text_list("https://a.example/list.txt"),
            SourceDescriptor::local_file("local.txt"),
        ])
    }

    fn sorted(mut items: Vec<String>) -> Vec<String> {
        items.sort();
        items
    }

    #[tokio::test]
    async fn test_latency_pipeline() {
        let fetcher = Arc::new(StaticFetcher::default().with(
            "https://a.example/list.txt",
            &["1.1.1.1#CT-25ms", "2.2.2.2#CU-45ms", "1.1.1.1#CT-25ms", "3.3.3.3-80ms"],
        ));
        let pipeline = Pipeline::with_fetcher(config(), RegionClassifier::unavailable(), fetcher);

        let options = LatencyOptions {
            max_latency: 50.0,
            ..LatencyOptions::default()
        };
        let output = pipeline.run_latency(&SourceSelection::All, options).await;

        let records: Vec<String> = output.records.iter().map(ToString::to_string).collect();
        assert_eq!(sorted(records), vec!["1.1.1.1#CT-25ms", "2.2.2.2#CU-45ms"]);
        assert_eq!(sorted(output.addresses), vec!["1.1.1.1", "2.2.2.2"]);
    }

    #[tokio::test]
    async fn test_latency_pipeline_keeps_duplicates_when_asked() {
        let fetcher = Arc::new(
            StaticFetcher::default().with("https://a.example/list.txt", &["4.4.4.4", "4.4.4.4"]),
        );
        let pipeline = Pipeline::with_fetcher(config(), RegionClassifier::unavailable(), fetcher);

        let options = LatencyOptions {
            remove_duplicates: false,
            ..LatencyOptions::default()
        };
        let output = pipeline.run_latency(&SourceSelection::All, options).await;
        assert_eq!(output.addresses, vec!["4.4.4.4", "4.4.4.4"]);
    }

    #[tokio::test]
    async fn test_latency_pipeline_limit() {
        let fetcher = Arc::new(StaticFetcher::default().with(
            "https://a.example/list.txt",
            &["5.5.5.5-1ms", "6.6.6.6-2ms", "7.7.7.7-3ms"],
        ));
        let pipeline = Pipeline::with_fetcher(config(), RegionClassifier::unavailable(), fetcher);

        let options = LatencyOptions {
            limit: Some(2),
            ..LatencyOptions::default()
        };
        let output = pipeline.run_latency(&SourceSelection::All, options).await;
        assert_eq!(output.records.len(), 3);
        assert_eq!(output.addresses.len(), 2);
    }

    #[tokio::test]
    async fn test_selection_preserves_config_order() {
        let fetcher = Arc::new(
            StaticFetcher::default()
                .with("https://a.example/list.txt", &["1.1.1.1"])
                .with("local.txt", &["2.2.2.2"]),
        );
        let pipeline = Pipeline::with_fetcher(config(), RegionClassifier::unavailable(), fetcher);

        let all = pipeline.collect(&SourceSelection::All).await;
        let texts: Vec<&str> = all.iter().map(Candidate::as_str).collect();
        assert_eq!(texts, vec!["1.1.1.1", "2.2.2.2"]);

        let local = pipeline
            .collect(&SourceSelection::kinds([SourceKind::LocalFile]))
            .await;
        let texts: Vec<&str> = local.iter().map(Candidate::as_str).collect();
        assert_eq!(texts, vec!["2.2.2.2"]);
    }

    #[tokio::test]
    async fn test_region_pipeline_without_targets_fetches_nothing() {
        let fetcher = Arc::new(StaticFetcher::default().with("local.txt", &["1.1.1.1"]));
        let lookup = Arc::new(CountryLookup(HashMap::new()));
        let pipeline = Pipeline::with_fetcher(
            config(),
            RegionClassifier::with_lookup(lookup),
            fetcher.clone(),
        );

        let output = pipeline
            .run_regions(&SourceSelection::All, &[], RegionOptions::default())
            .await;
        assert!(output.is_empty());
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_region_pipeline_unavailable_fetches_nothing() {
        let fetcher = Arc::new(StaticFetcher::default().with("local.txt", &["1.1.1.1"]));
        let pipeline =
            Pipeline::with_fetcher(config(), RegionClassifier::unavailable(), fetcher.clone());

        let output = pipeline
            .run_regions(
                &SourceSelection::All,
                &[RegionCode::new("SG")],
                RegionOptions::default(),
            )
            .await;
        assert!(output.is_empty());
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_region_pipeline_empty_aggregate() {
        let fetcher = Arc::new(StaticFetcher::default());
        let lookup = Arc::new(CountryLookup(HashMap::new()));
        let pipeline =
            Pipeline::with_fetcher(config(), RegionClassifier::with_lookup(lookup), fetcher);

        let output = pipeline
            .run_regions(
                &SourceSelection::All,
                &[RegionCode::new("SG")],
                RegionOptions::default(),
            )
            .await;
        assert_eq!(output.into_parts(), (Vec::new(), Vec::new()));
    }

    #[tokio::test]
    async fn test_region_pipeline_end_to_end() {
        let fetcher = Arc::new(
            StaticFetcher::default()
                .with(
                    "https://a.example/list.txt",
                    &["1.1.1.1#SG-40ms", "8.8.8.8#US-30ms", "9.9.9.9#TW-500ms"],
                )
                .with("local.txt", &["1.0.0.1", "1.1.1.1#SG-40ms"]),
        );
        let mut countries: HashMap<IpAddr, &str> = HashMap::new();
        countries.insert("1.1.1.1".parse().unwrap(), "SG");
        countries.insert("1.0.0.1".parse().unwrap(), "TW");
        countries.insert("8.8.8.8".parse().unwrap(), "US");
        countries.insert("9.9.9.9".parse().unwrap(), "TW");
        let lookup = Arc::new(CountryLookup(countries));

        let pipeline =
            Pipeline::with_fetcher(config(), RegionClassifier::with_lookup(lookup), fetcher);
        let output = pipeline
            .run_regions(
                &SourceSelection::All,
                &[RegionCode::new("SG"), RegionCode::new("TW")],
                RegionOptions::default(),
            )
            .await;

        // 9.9.9.9 is in TW but too slow; 8.8.8.8 is outside the targets.
        assert_eq!(sorted(output.addresses), vec!["1.0.0.1", "1.1.1.1"]);
    }
}
