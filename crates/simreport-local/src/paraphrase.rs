//! Clients for the paraphrase and deplagiarize operations.

use serde::{Deserialize, Serialize};
use simreport_core::{
    clamp_score, DeplagiarizeRequest, DeplagiarizeResult, Error, Mode, ParaphraseBackend,
    ParaphraseRequest, ParaphraseSuggestion, Result,
};

use crate::api_endpoint_from_env;

#[derive(Debug, Clone, Serialize)]
struct ParaphraseWireRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct WireSuggestion {
    #[serde(default)]
    paraphrase: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ParaphraseWireResponse {
    #[serde(default)]
    paraphrases: Vec<WireSuggestion>,
}

#[derive(Debug, Clone, Serialize)]
struct DeplagiarizeWireRequest<'a> {
    input_text: &'a str,
    mode: Mode,
    openrouter_api_key: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct DeplagiarizeWireResponse {
    #[serde(default)]
    paraphrases: Vec<WireSuggestion>,
    #[serde(default)]
    deplagiarized_text: Option<String>,
    #[serde(default)]
    deplagiarized_code: Option<String>,
}

/// The plain paraphrase operation needs no credential; deplagiarize is
/// blocked locally until an OpenRouter key is configured.
#[derive(Debug, Clone)]
pub struct RemoteParaphraser {
    client: reqwest::Client,
    endpoint: String,
    openrouter_api_key: Option<String>,
}

impl RemoteParaphraser {
    pub fn from_env(client: reqwest::Client, openrouter_api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: api_endpoint_from_env(),
            openrouter_api_key,
        }
    }

    pub fn with_endpoint(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        openrouter_api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            openrouter_api_key,
        }
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        let resp = self
            .client
            .post(format!("{}/{path}", self.endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Paraphrase(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Paraphrase(format!("{path} HTTP {status}")));
        }
        resp.json().await.map_err(|e| Error::Paraphrase(e.to_string()))
    }
}

fn suggestions(wire: Vec<WireSuggestion>) -> Vec<ParaphraseSuggestion> {
    wire.into_iter()
        .filter(|s| !s.paraphrase.trim().is_empty())
        .map(|s| ParaphraseSuggestion {
            paraphrase: s.paraphrase,
            score: clamp_score(s.score),
        })
        .collect()
}

#[async_trait::async_trait]
impl ParaphraseBackend for RemoteParaphraser {
    async fn paraphrase(&self, req: &ParaphraseRequest) -> Result<Vec<ParaphraseSuggestion>> {
        req.validate()?;
        tracing::debug!("dispatching paraphrase");

        let body = ParaphraseWireRequest {
            text: req.text.trim(),
        };
        let parsed: ParaphraseWireResponse = self.post_json("paraphrase", &body).await?;
        Ok(suggestions(parsed.paraphrases))
    }

    async fn deplagiarize(&self, req: &DeplagiarizeRequest) -> Result<DeplagiarizeResult> {
        req.validate()?;
        let key = self
            .openrouter_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::NotConfigured("openrouter_api_key".to_string()))?;
        tracing::debug!(mode = ?req.mode, "dispatching deplagiarize");

        let body = DeplagiarizeWireRequest {
            input_text: req.input_text.trim(),
            mode: req.mode,
            openrouter_api_key: key,
        };
        let parsed: DeplagiarizeWireResponse = self.post_json("deplagiarize", &body).await?;

        let paraphrases = suggestions(parsed.paraphrases);
        // Best rewrite: the top-ranked paraphrase, then the rewritten text,
        // then the rewritten code.
        let best = paraphrases
            .first()
            .map(|s| s.paraphrase.clone())
            .or(parsed.deplagiarized_text)
            .or(parsed.deplagiarized_code)
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| Error::Paraphrase("service returned no rewrite".to_string()))?;

        Ok(DeplagiarizeResult { best, paraphrases })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_client;
    use axum::{routing::post, Json, Router};
    use std::net::SocketAddr;

    async fn spawn_stub(path: &'static str, body: serde_json::Value) -> SocketAddr {
        let app = Router::new().route(
            path,
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

    #[tokio::test]
    async fn paraphrase_returns_ranked_suggestions() {
        let addr = spawn_stub(
            "/paraphrase",
            serde_json::json!({
                "input": "How can I learn Python?",
                "paraphrases": [
                    { "paraphrase": "What's the best way to master Python programming?", "score": 85 },
                    { "paraphrase": "How do I get started with learning Python?", "score": 78 },
                    { "paraphrase": "", "score": 70 },
                ]
            }),
        )
        .await;

        let p = RemoteParaphraser::with_endpoint(default_client().unwrap(), format!("http://{addr}"), None);
        let req = ParaphraseRequest {
            text: "How can I learn Python?".to_string(),
        };
        let suggestions = p.paraphrase(&req).await.unwrap();
        // Empty suggestions are dropped.
        assert_eq!(suggestions.len(), 2);
        assert_eq!(
            suggestions[0].paraphrase,
            "What's the best way to master Python programming?"
        );
        assert_eq!(suggestions[0].score, 85.0);
    }

    #[tokio::test]
    async fn deplagiarize_prefers_the_top_paraphrase() {
        let addr = spawn_stub(
            "/deplagiarize",
            serde_json::json!({
                "paraphrases": [{ "paraphrase": "A fresh rewording.", "score": 90 }],
                "deplagiarized_text": "A fallback rewording.",
            }),
        )
        .await;

        let p = RemoteParaphraser::with_endpoint(
            default_client().unwrap(),
            format!("http://{addr}"),
            Some("sk-or-test".to_string()),
        );
        let req = DeplagiarizeRequest {
            input_text: "The original sentence.".to_string(),
            mode: Mode::Text,
        };
        let result = p.deplagiarize(&req).await.unwrap();
        assert_eq!(result.best, "A fresh rewording.");
        assert_eq!(result.paraphrases.len(), 1);
    }

    #[tokio::test]
    async fn deplagiarize_falls_back_to_the_rewritten_field() {
        let addr = spawn_stub(
            "/deplagiarize",
            serde_json::json!({ "deplagiarized_code": "fn rewritten() {}" }),
        )
        .await;

        let p = RemoteParaphraser::with_endpoint(
            default_client().unwrap(),
            format!("http://{addr}"),
            Some("sk-or-test".to_string()),
        );
        let req = DeplagiarizeRequest {
            input_text: "fn original() {}".to_string(),
            mode: Mode::Code,
        };
        let result = p.deplagiarize(&req).await.unwrap();
        assert_eq!(result.best, "fn rewritten() {}");
        assert!(result.paraphrases.is_empty());
    }

    #[tokio::test]
    async fn deplagiarize_without_a_key_is_blocked_locally() {
        let p = RemoteParaphraser::with_endpoint(default_client().unwrap(), "http://127.0.0.1:1", None);
        let req = DeplagiarizeRequest {
            input_text: "anything".to_string(),
            mode: Mode::Text,
        };
        let err = p.deplagiarize(&req).await.unwrap_err();
        assert!(matches!(err, Error::NotConfigured(ref k) if k == "openrouter_api_key"));
    }

    #[tokio::test]
    async fn empty_service_reply_is_a_typed_error() {
        let addr = spawn_stub("/deplagiarize", serde_json::json!({})).await;
        let p = RemoteParaphraser::with_endpoint(
            default_client().unwrap(),
            format!("http://{addr}"),
            Some("sk-or-test".to_string()),
        );
        let req = DeplagiarizeRequest {
            input_text: "anything".to_string(),
            mode: Mode::Text,
        };
        let err = p.deplagiarize(&req).await.unwrap_err();
        assert!(matches!(err, Error::Paraphrase(_)), "got {err:?}");
    }
}
