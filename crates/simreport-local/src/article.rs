//! Client for the remote article originality check.

use serde::{Deserialize, Serialize};
use simreport_core::{
    clamp_score, ArticleCheckRequest, ArticleMatch, ArticleSearchBackend, Error, Result,
    ARTICLE_WARN_CHARS,
};

use crate::api_endpoint_from_env;

/// True once the title enters the soft warning band near the character cap.
pub fn near_limit(article_text: &str) -> bool {
    article_text.chars().count() > ARTICLE_WARN_CHARS
}

#[derive(Debug, Clone, Serialize)]
struct CheckArticleRequest<'a> {
    article_text: &'a str,
    tavily_api_key: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct CheckArticleMatch {
    #[serde(default)]
    similarity: f64,
    #[serde(default)]
    matched_content: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CheckArticleResponse {
    #[serde(default)]
    matches: Vec<CheckArticleMatch>,
}

/// The check is blocked locally when no Tavily key is configured; nothing is
/// sent without one.
#[derive(Debug, Clone)]
pub struct ArticleChecker {
    client: reqwest::Client,
    endpoint: String,
    tavily_api_key: Option<String>,
}

impl ArticleChecker {
    pub fn from_env(client: reqwest::Client, tavily_api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: api_endpoint_from_env(),
            tavily_api_key,
        }
    }

    pub fn with_endpoint(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        tavily_api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            tavily_api_key,
        }
    }
}

#[async_trait::async_trait]
impl ArticleSearchBackend for ArticleChecker {
    async fn check_article(&self, req: &ArticleCheckRequest) -> Result<Vec<ArticleMatch>> {
        req.validate()?;
        let key = self
            .tavily_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::NotConfigured("tavily_api_key".to_string()))?;
        tracing::debug!("dispatching check_article");

        let body = CheckArticleRequest {
            article_text: req.article_text.trim(),
            tavily_api_key: key,
        };
        let resp = self
            .client
            .post(format!("{}/check_article", self.endpoint))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Search(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Search(format!("check_article HTTP {status}")));
        }

        let parsed: CheckArticleResponse =
            resp.json().await.map_err(|e| Error::Search(e.to_string()))?;
        Ok(parsed
            .matches
            .into_iter()
            .map(|m| ArticleMatch {
                similarity: clamp_score(m.similarity),
                matched_content: m.matched_content,
                title: m.title,
                url: m.url,
            })
            .collect())
    }
}
