use crate::config::{AppConfig, Endpoints};
use crate::Result;
use bytes::Bytes;
use futures_util::Stream;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    #[serde(rename = "selectedContents")]
    selected_contents: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifyItem {
    pub id: String,
    pub content: String,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    nodes: &'a [ClassifyItem],
}

/// One `{id, m}` pair from the classification endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub id: String,
    pub m: i64,
}

impl Verdict {
    /// Read one response entry. The endpoint relays model output, so `m` may be
    /// any JSON value: the number 1 counts as 1, any other number keeps its
    /// integer value and everything else becomes 0. Entries without a string
    /// `id` yield `None`.
    pub fn from_json(entry: &Value) -> Option<Self> {
        let id = entry.get("id")?.as_str()?.to_string();
        let m = match entry.get("m") {
            Some(m) if m.as_f64() == Some(1.0) => 1,
            Some(m) => m.as_i64().unwrap_or(0),
            None => 0,
        };
        Some(Self { id, m })
    }
}

pub struct BackendClient {
    client: Client,
    endpoints: Endpoints,
    timeout: Duration,
}

impl BackendClient {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoints,
            timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let endpoints = config
            .endpoints()
            .map_err(|e| format!("Invalid backend configuration: {:#}", e))?;
        Ok(Self::new(
            endpoints,
            Duration::from_secs(config.request_timeout_secs),
        ))
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Start a generation request and hand back the raw body stream.
    ///
    /// Fails before any body arrives when the server can't be reached or
    /// answers with a non-success status.
    pub async fn open_generation_stream(
        &self,
        selected_contents: &[String],
    ) -> Result<impl Stream<Item = reqwest::Result<Bytes>>> {
        let request = GenerateRequest { selected_contents };

        log::info!(
            "Requesting prompt generation for {} selected nodes",
            selected_contents.len()
        );

        let response = self
            .client
            .post(self.endpoints.generate.clone())
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                format!(
                    "Cannot reach generation backend at {}: {}",
                    self.endpoints.generate, e
                )
            })?;

        if !response.status().is_success() {
            return Err(format!("Generation request failed: {}", response.status()).into());
        }

        Ok(response.bytes_stream())
    }

    /// Ask the backend to label each node as a distinct idea or a repeat
    pub async fn classify(&self, nodes: &[ClassifyItem]) -> Result<Vec<Verdict>> {
        let request = ClassifyRequest { nodes };

        log::info!("Sending {} nodes for classification", nodes.len());

        let response = self
            .client
            .post(self.endpoints.classify.clone())
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("Classification request failed: {}", response.status()).into());
        }

        let entries: Vec<Value> = response.json().await?;
        let verdicts: Vec<Verdict> = entries.iter().filter_map(Verdict::from_json).collect();
        if verdicts.len() < entries.len() {
            log::warn!(
                "Skipped {} classification entries without a string id",
                entries.len() - verdicts.len()
            );
        }
        log::debug!("Received {} classification verdicts", verdicts.len());
        Ok(verdicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BackendClient {
        let config = AppConfig {
            backend_url: server.uri(),
            request_timeout_secs: 5,
            ..AppConfig::default()
        };
        BackendClient::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_generation_sends_selected_contents() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate-prompt"))
            .and(body_json(json!({ "selectedContents": ["a", "c"] })))
            .respond_with(ResponseTemplate::new(200).set_body_string("Write a haiku"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let stream = client
            .open_generation_stream(&["a".to_string(), "c".to_string()])
            .await
            .unwrap();

        let chunks: Vec<Bytes> = stream.map(|chunk| chunk.unwrap()).collect().await;
        let body: Vec<u8> = chunks.concat();
        assert_eq!(body, b"Write a haiku");
    }

    #[tokio::test]
    async fn test_generation_error_status_opens_no_stream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate-prompt"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.open_generation_stream(&["a".to_string()]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_classify_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/classify-nodes"))
            .and(body_json(json!({
                "nodes": [
                    { "id": "n1", "content": "first" },
                    { "id": "n2", "content": "second" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "n1", "m": 1 },
                { "id": "n2", "m": 0 }
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let verdicts = client
            .classify(&[
                ClassifyItem { id: "n1".to_string(), content: "first".to_string() },
                ClassifyItem { id: "n2".to_string(), content: "second".to_string() },
            ])
            .await
            .unwrap();

        assert_eq!(
            verdicts,
            vec![
                Verdict { id: "n1".to_string(), m: 1 },
                Verdict { id: "n2".to_string(), m: 0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_classify_tolerates_loose_verdicts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/classify-nodes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "n1", "m": 1 },
                { "id": "n2", "m": "0" },
                { "id": "n3", "m": 1.0 },
                { "id": "n4", "m": null },
                { "id": "n5", "m": true },
                { "id": "n6" },
                { "m": 1 },
                { "id": 7, "m": 1 }
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let verdicts = client
            .classify(&[ClassifyItem { id: "n1".to_string(), content: "first".to_string() }])
            .await
            .unwrap();

        let pairs: Vec<(&str, i64)> = verdicts.iter().map(|v| (v.id.as_str(), v.m)).collect();
        assert_eq!(
            pairs,
            vec![("n1", 1), ("n2", 0), ("n3", 1), ("n4", 0), ("n5", 0), ("n6", 0)]
        );
    }

    #[test]
    fn test_verdict_from_json_string_one_is_not_unique() {
        let verdict = Verdict::from_json(&json!({ "id": "n1", "m": "1" })).unwrap();
        assert_eq!(verdict.m, 0);
        assert!(Verdict::from_json(&json!("n1")).is_none());
    }

    #[tokio::test]
    async fn test_classify_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/classify-nodes"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client
            .classify(&[ClassifyItem { id: "n1".to_string(), content: "x".to_string() }])
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let config = AppConfig {
            // Port 9 (discard) is never served in the test environment
            backend_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..AppConfig::default()
        };
        let client = BackendClient::from_config(&config).unwrap();
        assert!(client.open_generation_stream(&["a".to_string()]).await.is_err());
    }
}
