use serde::{Deserialize, Serialize};
use simreport_core::{
    ComparisonRequest, Error, Provenance, Result, ScoreReply, ScoreSet, ScorerBackend, Status,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub mod article;
pub mod credentials;
pub mod explain;
pub mod fallback;
pub mod github;
pub mod highlight;
pub mod paraphrase;
pub mod report;
pub mod session;

/// Base endpoint of the scoring service.
///
/// Allow override for testing/debugging (do not include secrets here).
pub fn api_endpoint_from_env() -> String {
    std::env::var("SIMREPORT_API_ENDPOINT")
        .ok()
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "http://localhost:5000".to_string())
}

/// Shared HTTP client with safety defaults: avoid "hang forever" on DNS/TLS
/// or body stalls. A stalled request blocks only the next comparison, not the
/// caller's whole session.
pub fn default_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent("simreport-local/0.1")
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| Error::Scorer(e.to_string()))
}

#[derive(Debug, Clone, Serialize)]
struct GenerateReportRequest<'a> {
    text1: &'a str,
    text2: &'a str,
    is_code: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateReportResponse {
    #[serde(default)]
    final_score: f64,
    #[serde(default)]
    semantic_similarity: f64,
    #[serde(default)]
    lexical_similarity: f64,
    #[serde(default)]
    structural_similarity: Option<f64>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    highlighted_text1: Option<String>,
    #[serde(default)]
    highlighted_text2: Option<String>,
}

fn parse_status(s: Option<&str>) -> Status {
    match s {
        Some("Original") => Status::Original,
        Some("Plagiarised") => Status::Plagiarised,
        _ => Status::Unknown,
    }
}

/// Client for the remote scoring service's `/generate_report` operation.
#[derive(Debug, Clone)]
pub struct RemoteScorer {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteScorer {
    pub fn from_env(client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: api_endpoint_from_env(),
        }
    }

    pub fn with_endpoint(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    async fn score_inner(&self, req: &ComparisonRequest) -> Result<ScoreReply> {
        let body = GenerateReportRequest {
            text1: req.content_a.trim(),
            text2: req.content_b.trim(),
            is_code: req.mode.is_code(),
        };

        let resp = self
            .client
            .post(self.url("generate_report"))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Scorer(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Scorer(format!("generate_report HTTP {status}")));
        }

        let parsed: GenerateReportResponse =
            resp.json().await.map_err(|e| Error::Scorer(e.to_string()))?;

        let scores = ScoreSet::clamped(
            parsed.semantic_similarity,
            parsed.lexical_similarity,
            parsed.structural_similarity,
            parsed.final_score,
            parse_status(parsed.status.as_deref()),
            Provenance::Remote,
        );
        Ok(ScoreReply {
            scores,
            highlighted_a: parsed.highlighted_text1,
            highlighted_b: parsed.highlighted_text2,
        })
    }
}

#[async_trait::async_trait]
impl ScorerBackend for RemoteScorer {
    async fn score(
        &self,
        req: &ComparisonRequest,
        cancel: &CancellationToken,
    ) -> Result<ScoreReply> {
        // Validation failures never reach the network.
        req.validate()?;
        tracing::debug!(mode = ?req.mode, "dispatching generate_report");

        // Cooperative cancellation: once the token fires, the eventual response
        // is dropped here and never surfaces to the caller.
        tokio::select! {
            _ = cancel.cancelled() => Err(Error::Cancelled),
            r = self.score_inner(req) => r,
        }
    }
}
