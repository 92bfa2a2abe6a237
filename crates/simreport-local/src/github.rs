//! Client for the remote code-search operation.
//!
//! Unlike the scorer, an unreachable search service degrades to the fixed
//! sample match from [`crate::fallback`] rather than an error: the search
//! result is advisory input to a comparison, not the comparison itself. The
//! substitution is logged and the match carries `Provenance::Fallback`.

use serde::{Deserialize, Serialize};
use simreport_core::{clamp_score, CodeMatch, CodeSearchBackend, CodeSearchRequest, Provenance, Result};

use crate::{api_endpoint_from_env, fallback};

#[derive(Debug, Clone, Serialize)]
struct SearchGithubCodeRequest<'a> {
    input_code: &'a str,
    github_token: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchGithubCodeResponse {
    #[serde(default)]
    fetched_code: Option<String>,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GithubCodeSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl GithubCodeSearch {
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

    async fn search_inner(&self, req: &CodeSearchRequest) -> std::result::Result<CodeMatch, String> {
        let body = SearchGithubCodeRequest {
            input_code: req.input_code.trim(),
            github_token: req.github_token.as_deref().unwrap_or(""),
        };

        let resp = self
            .client
            .post(format!("{}/search_github_code", self.endpoint))
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("search_github_code HTTP {status}"));
        }

        let parsed: SearchGithubCodeResponse = resp.json().await.map_err(|e| e.to_string())?;
        Ok(CodeMatch {
            fetched_code: parsed
                .fetched_code
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "No matching code found in GitHub repositories.".to_string()),
            confidence: clamp_score(parsed.confidence),
            source: parsed
                .source
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "No source available".to_string()),
            provenance: Provenance::Remote,
        })
    }
}

#[async_trait::async_trait]
impl CodeSearchBackend for GithubCodeSearch {
    async fn search_code(&self, req: &CodeSearchRequest) -> Result<CodeMatch> {
        req.validate()?;
        tracing::debug!("dispatching search_github_code");

        match self.search_inner(req).await {
            Ok(found) => Ok(found),
            Err(reason) => {
                tracing::warn!(%reason, "code search unavailable, substituting sample match");
                Ok(fallback::fallback_code_match())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_client;
    use axum::{routing::post, Json, Router};
    use simreport_core::Error;
    use std::net::SocketAddr;

    async fn spawn_stub(body: serde_json::Value) -> SocketAddr {
        let app = Router::new().route(
            "/search_github_code",
            post(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn request(code: &str) -> CodeSearchRequest {
        CodeSearchRequest {
            input_code: code.to_string(),
            github_token: Some("ghp_test".to_string()),
        }
    }

    #[tokio::test]
    async fn remote_hits_are_returned_with_remote_provenance() {
        let addr = spawn_stub(serde_json::json!({
            "fetched_code": "def merge_sort(xs): ...",
            "confidence": 91.5,
            "source": "github.com/example/sorting",
        }))
        .await;

        let search = GithubCodeSearch::with_endpoint(default_client().unwrap(), format!("http://{addr}"));
        let hit = search.search_code(&request("def my_sort(xs): ...")).await.unwrap();
        assert_eq!(hit.fetched_code, "def merge_sort(xs): ...");
        assert_eq!(hit.confidence, 91.5);
        assert_eq!(hit.source, "github.com/example/sorting");
        assert_eq!(hit.provenance, Provenance::Remote);
    }

    #[tokio::test]
    async fn empty_fields_get_readable_placeholders() {
        let addr = spawn_stub(serde_json::json!({ "confidence": 130.0 })).await;
        let search = GithubCodeSearch::with_endpoint(default_client().unwrap(), format!("http://{addr}"));
        let hit = search.search_code(&request("print('x')")).await.unwrap();
        assert_eq!(hit.fetched_code, "No matching code found in GitHub repositories.");
        assert_eq!(hit.source, "No source available");
        assert_eq!(hit.confidence, 100.0);
    }

    #[tokio::test]
    async fn unreachable_service_degrades_to_the_sample_match() {
        let search = GithubCodeSearch::with_endpoint(default_client().unwrap(), "http://127.0.0.1:1");
        let hit = search.search_code(&request("print('x')")).await.unwrap();
        assert_eq!(hit.provenance, Provenance::Fallback);
        assert!(hit.fetched_code.contains("bubble_sort"));
    }

    #[tokio::test]
    async fn validation_failures_are_not_papered_over_by_the_fallback() {
        let search = GithubCodeSearch::with_endpoint(default_client().unwrap(), "http://127.0.0.1:1");
        let err = search.search_code(&request("   ")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "got {err:?}");
    }
}
