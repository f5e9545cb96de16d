//! Concurrent fetching of all active sources, merged in configuration order.

use async_trait::async_trait;
use cfip_core::{Candidate, SourceDescriptor};
use futures_util::future::join_all;
use tracing::{debug, info};

/// Anything that can turn a source descriptor into candidate records
///
/// Implementations must not fail: a broken source yields an empty list.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch and parse one source
    async fn fetch(&self, descriptor: &SourceDescriptor) -> Vec<Candidate>;
}

/// Fetch every descriptor concurrently and concatenate the results.
///
/// Records of an earlier descriptor always precede those of a later one,
/// whatever order the fetches complete in.
pub async fn aggregate<F>(fetcher: &F, descriptors: &[SourceDescriptor]) -> Vec<Candidate>
where
    F: SourceFetcher + ?Sized,
{
    let results = join_all(descriptors.iter().map(|d| fetcher.fetch(d))).await;

    let mut all = Vec::with_capacity(results.iter().map(Vec::len).sum());
    for (descriptor, records) in descriptors.iter().zip(results) {
        debug!(source = %descriptor, count = records.len(), "merging source records");
        all.extend(records);
    }

    info!(sources = descriptors.len(), total = all.len(), "aggregated candidates");
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceClient;
    use std::collections::HashMap;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Serves canned records per label, with an optional delay
    struct FakeFetcher {
        responses: HashMap<String, (Vec<&'static str>, Duration)>,
    }

    #[async_trait]
    impl SourceFetcher for FakeFetcher {
        async fn fetch(&self, descriptor: &SourceDescriptor) -> Vec<Candidate> {
            let Some((records, delay)) = self.responses.get(&descriptor.label()) else {
                return Vec::new();
            };
            tokio::time::sleep(*delay).await;
            records.iter().copied().map(Candidate::parse).collect()
        }
    }

    #[tokio::test]
    async fn test_order_follows_descriptors_not_completion() {
        let mut responses = HashMap::new();
        responses.insert("a".to_string(), (vec!["1.1.1.1"], Duration::from_millis(150)));
        responses.insert("b".to_string(), (vec!["2.2.2.2"], Duration::ZERO));
        let fetcher = FakeFetcher { responses };

        let descriptors = [SourceDescriptor::text_list("a"), SourceDescriptor::text_list("b")];
        let records = aggregate(&fetcher, &descriptors).await;
        let texts: Vec<&str> = records.iter().map(Candidate::as_str).collect();
        assert_eq!(texts, vec!["1.1.1.1", "2.2.2.2"]);
    }

    #[tokio::test]
    async fn test_failed_source_contributes_nothing() {
        let mut responses = HashMap::new();
        responses.insert("ok".to_string(), (vec!["3.3.3.3", "4.4.4.4"], Duration::ZERO));
        let fetcher = FakeFetcher { responses };

        let descriptors = [
            SourceDescriptor::text_list("missing"),
            SourceDescriptor::text_list("ok"),
        ];
        let records = aggregate(&fetcher, &descriptors).await;
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_descriptor_list() {
        let fetcher = FakeFetcher {
            responses: HashMap::new(),
        };
        assert!(aggregate(&fetcher, &[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_http_sources_merge_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow.txt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("1.1.1.1\n")
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fast.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("2.2.2.2\n"))
            .mount(&server)
            .await;

        let client = SourceClient::new().unwrap();
        let descriptors = [
            SourceDescriptor::text_list(format!("{}/slow.txt", server.uri())),
            SourceDescriptor::text_list(format!("{}/fast.txt", server.uri())),
            SourceDescriptor::local_file("/nonexistent/cfip/sgcs.txt"),
        ];
        let records = aggregate(&client, &descriptors).await;
        let texts: Vec<&str> = records.iter().map(Candidate::as_str).collect();
        assert_eq!(texts, vec!["1.1.1.1", "2.2.2.2"]);
    }
}
