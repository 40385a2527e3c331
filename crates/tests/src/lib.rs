//! # Integration Tests
//!
//! Cross-crate end-to-end tests.
//!
//! Covers:
//! - configuration file -> registry -> service
//! - slot ordering, fallback and truncation scenarios
//! - per-provider call bounds
//! - deadline behaviour
//! - HTTP round trips over a real socket

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_default_blueprint_roundtrips_through_loader() {
        let blueprint = contracts::ServiceBlueprint::default();
        let toml = config_loader::ConfigLoader::to_toml(&blueprint).unwrap();
        let loaded =
            config_loader::ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml)
                .unwrap();
        assert_eq!(loaded.slots, blueprint.slots);
    }
}

#[cfg(test)]
mod support {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use aggregator::ContentService;
    use contracts::{ContentConfig, ContentItem, ContentProvider, ProviderRegistry};
    use providers::ScriptedProvider;

    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

    /// Service plus handles on its scripted providers
    pub struct Fixture {
        pub service: ContentService,
        providers: HashMap<String, Arc<ScriptedProvider>>,
    }

    impl Fixture {
        pub fn new(
            providers: Vec<ScriptedProvider>,
            configs: Vec<ContentConfig>,
            timeout: Duration,
        ) -> Self {
            let mut builder = ProviderRegistry::builder();
            let mut handles = HashMap::new();

            for provider in providers {
                let provider = Arc::new(provider);
                let id = provider.source().clone();
                handles.insert(id.to_string(), provider.clone());
                let capability: Arc<dyn ContentProvider> = provider;
                builder = builder.register(id, capability).unwrap();
            }

            let service = ContentService::build(configs, builder.build(), timeout).unwrap();
            Self {
                service,
                providers: handles,
            }
        }

        pub fn provider(&self, id: &str) -> &ScriptedProvider {
            &self.providers[id]
        }

        pub fn call_counts(&self) -> Vec<(String, usize)> {
            let mut counts: Vec<_> = self
                .providers
                .iter()
                .map(|(id, p)| (id.clone(), p.calls()))
                .collect();
            counts.sort();
            counts
        }
    }

    pub fn sources(items: &[ContentItem]) -> Vec<&str> {
        items.iter().map(|item| item.source.as_str()).collect()
    }
}

#[cfg(test)]
mod scenario_tests {
    use std::time::{Duration, Instant};

    use aggregator::{ContentError, ContentService};
    use contracts::{ContentConfig, ProviderRegistry};
    use observability::FetchRound;
    use providers::ScriptedProvider;

    use crate::support::{sources, Fixture, DEFAULT_TIMEOUT};

    fn healthy(ids: &[&str]) -> Vec<ScriptedProvider> {
        ids.iter().map(|id| ScriptedProvider::new(*id)).collect()
    }

    #[tokio::test]
    async fn test_no_provider_errors() {
        let configs = vec![
            ContentConfig::new("1"),
            ContentConfig::new("2"),
            ContentConfig::new("3"),
            ContentConfig::new("2"),
        ];

        let cases: [(i64, i64, &[&str]); 9] = [
            (1, 0, &["1"]),
            (2, 0, &["1", "2"]),
            (3, 0, &["1", "2", "3"]),
            (3, 2, &["3", "2", "1"]),
            (10, 0, &["1", "2", "3", "2", "1", "2", "3", "2", "1", "2"]),
            (10, 1, &["2", "3", "2", "1", "2", "3", "2", "1", "2", "3"]),
            (10, 2, &["3", "2", "1", "2", "3", "2", "1", "2", "3", "2"]),
            (10, 10, &["3", "2", "1", "2", "3", "2", "1", "2", "3", "2"]),
            (10, 12, &["1", "2", "3", "2", "1", "2", "3", "2", "1", "2"]),
        ];

        for (count, offset, expected) in cases {
            let fixture = Fixture::new(healthy(&["1", "2", "3"]), configs.clone(), DEFAULT_TIMEOUT);
            let items = fixture
                .service
                .get_content("10.0.0.1", count, offset)
                .await
                .unwrap();

            assert_eq!(sources(&items), expected, "count={count} offset={offset}");
            for (id, calls) in fixture.call_counts() {
                assert!(calls <= 1, "provider {id} called {calls} times (count={count} offset={offset})");
            }
        }
    }

    #[tokio::test]
    async fn test_fallbacks_unused_when_primaries_succeed() {
        let configs = vec![
            ContentConfig::new("1"),
            ContentConfig::with_fallback("2", "1"),
            ContentConfig::new("3"),
            ContentConfig::with_fallback("2", "1"),
        ];
        let fixture = Fixture::new(healthy(&["1", "2", "3"]), configs, DEFAULT_TIMEOUT);

        let items = fixture.service.get_content("10.0.0.1", 10, 2).await.unwrap();

        assert_eq!(
            sources(&items),
            vec!["3", "2", "1", "2", "3", "2", "1", "2", "3", "2"]
        );
        // 12 slots: provider 1 serves 3, provider 2 serves 6, provider 3 serves 3
        assert_eq!(fixture.provider("1").requested_counts(), vec![3]);
        assert_eq!(fixture.provider("2").requested_counts(), vec![6]);
        assert_eq!(fixture.provider("3").requested_counts(), vec![3]);
    }

    #[tokio::test]
    async fn test_provider_errors() {
        let configs = vec![
            ContentConfig::with_fallback("1", "3"),
            ContentConfig::new("2"),
            ContentConfig::new("4"),
            ContentConfig::new("5"),
        ];

        let cases: [(i64, i64, &[&str]); 7] = [
            (1, 0, &["3"]),
            (2, 0, &["3", "2"]),
            (3, 0, &["3", "2"]),
            (10, 0, &["3", "2"]),
            (1, 1, &["2"]),
            (1, 2, &[]),
            (1, 10, &[]),
        ];

        for (count, offset, expected) in cases {
            let providers = vec![
                ScriptedProvider::new("1").failing(),
                ScriptedProvider::new("2"),
                ScriptedProvider::new("3"),
                ScriptedProvider::new("4").failing(),
                ScriptedProvider::new("5"),
            ];
            let fixture = Fixture::new(providers, configs.clone(), DEFAULT_TIMEOUT);

            let items = fixture
                .service
                .get_content("10.0.0.1", count, offset)
                .await
                .unwrap();

            assert_eq!(sources(&items), expected, "count={count} offset={offset}");
            for (id, calls) in fixture.call_counts() {
                assert!(calls <= 1, "provider {id} called {calls} times (count={count} offset={offset})");
            }
        }
    }

    #[tokio::test]
    async fn test_provider_used_in_both_rounds_is_called_twice_at_most() {
        let configs = vec![
            ContentConfig::with_fallback("1", "2"),
            ContentConfig::new("2"),
            ContentConfig::with_fallback("1", "2"),
        ];
        let providers = vec![ScriptedProvider::new("1").failing(), ScriptedProvider::new("2")];
        let fixture = Fixture::new(providers, configs, DEFAULT_TIMEOUT);

        let items = fixture.service.get_content("10.0.0.1", 6, 0).await.unwrap();

        assert_eq!(sources(&items), vec!["2"; 6]);
        assert_eq!(fixture.provider("1").calls(), 1);
        // primary round: slots 1 and 4; fallback round: slots 0, 2, 3 and 5
        assert_eq!(fixture.provider("2").requested_counts(), vec![2, 4]);
    }

    #[tokio::test]
    async fn test_failed_fallback_truncates() {
        let configs = vec![
            ContentConfig::new("2"),
            ContentConfig::with_fallback("1", "3"),
            ContentConfig::new("2"),
        ];
        let providers = vec![
            ScriptedProvider::new("1").failing(),
            ScriptedProvider::new("2"),
            ScriptedProvider::new("3").failing(),
        ];
        let fixture = Fixture::new(providers, configs, DEFAULT_TIMEOUT);

        let items = fixture.service.get_content("10.0.0.1", 3, 0).await.unwrap();

        assert_eq!(sources(&items), vec!["2"]);
        assert_eq!(fixture.provider("3").calls(), 1);
    }

    #[tokio::test]
    async fn test_under_delivery_is_contained() {
        let configs = vec![
            ContentConfig::new("1"),
            ContentConfig::with_fallback("1", "2"),
            ContentConfig::new("1"),
        ];
        let providers = vec![
            ScriptedProvider::new("1").delivering_at_most(1),
            ScriptedProvider::new("2"),
        ];
        let fixture = Fixture::new(providers, configs, DEFAULT_TIMEOUT);

        let items = fixture.service.get_content("10.0.0.1", 3, 0).await.unwrap();

        assert_eq!(sources(&items), vec!["1", "2"]);
        assert_eq!(fixture.provider("1").requested_counts(), vec![3]);
        assert_eq!(fixture.provider("2").requested_counts(), vec![1]);
    }

    #[tokio::test]
    async fn test_items_keep_provider_order_across_pages() {
        let configs = vec![ContentConfig::new("1")];

        let fixture = Fixture::new(healthy(&["1"]), configs.clone(), DEFAULT_TIMEOUT);
        let full = fixture.service.get_content("10.0.0.1", 4, 0).await.unwrap();
        let ids: Vec<_> = full.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["1-0", "1-1", "1-2", "1-3"]);

        let fixture = Fixture::new(healthy(&["1"]), configs, DEFAULT_TIMEOUT);
        let page = fixture.service.get_content("10.0.0.1", 2, 2).await.unwrap();
        let ids: Vec<_> = page.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["1-2", "1-3"]);
    }

    #[tokio::test]
    async fn test_response_timeout() {
        let providers = vec![
            ScriptedProvider::new("1").with_latency(Duration::from_millis(400)),
            ScriptedProvider::new("2").with_latency(Duration::from_millis(800)),
            ScriptedProvider::new("3").with_latency(Duration::from_millis(1200)),
        ];
        let configs = vec![
            ContentConfig::new("1"),
            ContentConfig::new("2"),
            ContentConfig::new("3"),
        ];
        let fixture = Fixture::new(providers, configs, Duration::from_millis(100));

        let started = Instant::now();
        let result = fixture.service.get_content("10.0.0.1", 3, 0).await;
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(ContentError::Timeout { .. })), "got {result:?}");
        assert!(elapsed < Duration::from_millis(400), "waited {elapsed:?}");
    }

    #[tokio::test]
    async fn test_deadline_covers_fallback_round() {
        let providers = vec![
            ScriptedProvider::new("1").failing(),
            ScriptedProvider::new("2").with_latency(Duration::from_millis(400)),
        ];
        let configs = vec![ContentConfig::with_fallback("1", "2")];
        let fixture = Fixture::new(providers, configs, Duration::from_millis(80));

        let started = Instant::now();
        let result = fixture.service.get_content("10.0.0.1", 1, 0).await;
        let elapsed = started.elapsed();

        match result {
            Err(ContentError::Timeout {
                round, provider, ..
            }) => {
                assert_eq!(round, FetchRound::Fallback);
                assert_eq!(provider, "2");
            }
            other => panic!("expected fallback timeout, got {other:?}"),
        }
        assert!(elapsed < Duration::from_millis(400), "waited {elapsed:?}");
        assert_eq!(fixture.provider("1").calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_window_is_rejected_before_dispatch() {
        let fixture = Fixture::new(healthy(&["1"]), vec![ContentConfig::new("1")], DEFAULT_TIMEOUT);

        for (count, offset) in [(0, 0), (-5, 0), (3, -1), (i64::MAX / 2, 0), (1, i64::MAX)] {
            let err = fixture
                .service
                .get_content("10.0.0.1", count, offset)
                .await
                .unwrap_err();
            assert!(err.is_client_error(), "count={count} offset={offset}: {err}");
        }
        assert_eq!(fixture.provider("1").calls(), 0);
    }

    #[test]
    fn test_construction_rejects_unregistered_provider() {
        let registry = ProviderRegistry::builder()
            .register("1", std::sync::Arc::new(ScriptedProvider::new("1")))
            .unwrap()
            .build();

        let err = ContentService::build(
            vec![ContentConfig::with_fallback("1", "9")],
            registry,
            DEFAULT_TIMEOUT,
        )
        .unwrap_err();
        assert!(matches!(err, ContentError::Configuration(_)));
    }

    #[test]
    fn test_construction_rejects_empty_template() {
        let err = ContentService::build(Vec::new(), ProviderRegistry::default(), DEFAULT_TIMEOUT)
            .unwrap_err();
        assert!(matches!(err, ContentError::Configuration(_)));
    }
}

#[cfg(test)]
mod config_e2e_tests {
    use aggregator::ContentService;
    use config_loader::{ConfigFormat, ConfigLoader};

    use crate::support::sources;

    const CONFIG: &str = r#"
[request]
timeout_ms = 2000

[[slots]]
provider = "news"
fallback = "archive"

[[slots]]
provider = "ads"

[[providers]]
id = "news"
kind = "unavailable"

[[providers]]
id = "ads"

[[providers]]
id = "archive"
"#;

    #[tokio::test]
    async fn test_blueprint_to_content() {
        let blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let registry = providers::build_registry(&blueprint.providers).unwrap();
        let service = ContentService::from_blueprint(&blueprint, registry).unwrap();

        let items = service.get_content("192.0.2.1", 4, 0).await.unwrap();

        assert_eq!(sources(&items), vec!["archive", "ads", "archive", "ads"]);
        assert!(items
            .iter()
            .all(|item| item.title == format!("content from provider {}", item.source)));
    }
}

#[cfg(test)]
mod http_e2e_tests {
    use std::time::Duration;

    use aggregator::ContentService;
    use contracts::{ContentConfig, ServiceBlueprint};
    use http_api::{ContentServer, RunningContentServer};
    use providers::ScriptedProvider;
    use reqwest::StatusCode;

    use crate::support::{Fixture, DEFAULT_TIMEOUT};

    async fn start(service: ContentService) -> RunningContentServer {
        ContentServer::new("127.0.0.1:0".parse().unwrap(), service)
            .start()
            .await
            .unwrap()
    }

    fn default_service() -> ContentService {
        let blueprint = ServiceBlueprint::default();
        let registry = providers::build_registry(&blueprint.providers).unwrap();
        ContentService::from_blueprint(&blueprint, registry).unwrap()
    }

    #[tokio::test]
    async fn test_request_validation() {
        let server = start(default_service()).await;
        let base = format!("http://{}", server.bound_address());
        let client = reqwest::Client::new();

        let cases = [
            ("POST", "/", StatusCode::NOT_FOUND),
            ("DELETE", "/", StatusCode::NOT_FOUND),
            ("GET", "/other", StatusCode::NOT_FOUND),
            ("GET", "/", StatusCode::BAD_REQUEST),
            ("GET", "/?count=0", StatusCode::BAD_REQUEST),
            ("GET", "/?count=abc", StatusCode::BAD_REQUEST),
            ("GET", "/?count=-5", StatusCode::BAD_REQUEST),
            ("GET", "/?count=3", StatusCode::OK),
            ("GET", "/?count=3&offset=abc", StatusCode::BAD_REQUEST),
            ("GET", "/?count=3&offset=-5", StatusCode::BAD_REQUEST),
            ("GET", "/?count=3&offset=0", StatusCode::OK),
            ("GET", "/?count=3&offset=5", StatusCode::OK),
            ("GET", "/?count=10000000000", StatusCode::BAD_REQUEST),
            ("GET", "/?count=3&offset=10000000000", StatusCode::BAD_REQUEST),
        ];

        for (method, target, expected) in cases {
            let method = reqwest::Method::from_bytes(method.as_bytes()).unwrap();
            let response = client
                .request(method.clone(), format!("{base}{target}"))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), expected, "{method} {target}");
        }

        server.stop(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_error_bodies() {
        let server = start(default_service()).await;
        let base = format!("http://{}", server.bound_address());

        let body = reqwest::get(format!("{base}/?count=abc"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.contains("invalid count parameter: must be an integer"), "{body}");

        let body = reqwest::get(format!("{base}/?count=4611686018427387903"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "invalid count parameter: is too large");

        let body = reqwest::get(format!("{base}/nope"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.contains("Not found"), "{body}");

        server.stop(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_response_order_with_offset() {
        let blueprint = ServiceBlueprint::default();
        let server = start(default_service()).await;
        let base = format!("http://{}", server.bound_address());

        for offset in [0usize, 5] {
            let response = reqwest::get(format!("{base}/?offset={offset}&count=5"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let items: Vec<serde_json::Value> = response.json().await.unwrap();
            assert_eq!(items.len(), 5);
            for (j, item) in items.iter().enumerate() {
                let expected = &blueprint.slots[(j + offset) % blueprint.slots.len()].provider;
                assert_eq!(item["Source"], expected.as_str(), "position {}", j + offset);
                assert!(item["ID"].is_string());
                assert!(item["Title"].is_string());
                assert!(item["Expiry"].is_string());
            }
        }

        server.stop(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_timeout_maps_to_internal_error() {
        let providers = vec![
            ScriptedProvider::new("1").with_latency(Duration::from_millis(600)),
            ScriptedProvider::new("2").with_latency(Duration::from_millis(1200)),
        ];
        let configs = vec![ContentConfig::new("1"), ContentConfig::new("2")];
        let fixture = Fixture::new(providers, configs, Duration::from_millis(200));
        let server = start(fixture.service.clone()).await;

        let response = tokio::time::timeout(
            Duration::from_millis(600),
            reqwest::get(format!("http://{}/?count=2", server.bound_address())),
        )
        .await
        .expect("request still processing")
        .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.text().await.unwrap();
        assert!(!body.contains("deadline"), "{body}");

        server.stop(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_window_is_empty_array() {
        let providers = vec![ScriptedProvider::new("1"), ScriptedProvider::new("2").failing()];
        let configs = vec![ContentConfig::new("1"), ContentConfig::new("2")];
        let fixture = Fixture::new(providers, configs, DEFAULT_TIMEOUT);
        let server = start(fixture.service.clone()).await;

        let response = reqwest::get(format!("http://{}/?count=1&offset=1", server.bound_address()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "[]");

        server.stop(Duration::from_secs(1)).await.unwrap();
    }
}
