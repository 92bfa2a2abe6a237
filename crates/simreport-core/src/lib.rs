use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("scorer failed: {0}")]
    Scorer(String),
    #[error("search failed: {0}")]
    Search(String),
    #[error("paraphrase failed: {0}")]
    Paraphrase(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
    #[error("cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Hard cap on whitespace-delimited tokens for comparison inputs.
pub const MAX_COMPARE_WORDS: usize = 1000;
/// Hard cap on article-title length, in characters.
pub const MAX_ARTICLE_CHARS: usize = 400;
/// Soft warning band for article-title length.
pub const ARTICLE_WARN_CHARS: usize = 320;
/// Hard cap on paraphrase input, in whitespace-delimited tokens.
pub const MAX_PARAPHRASE_WORDS: usize = 50;

/// Count whitespace-delimited tokens. A token is any maximal non-whitespace run.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn ensure_word_limit(field: &str, text: &str, limit: usize) -> Result<()> {
    let n = word_count(text);
    if n > limit {
        return Err(Error::Validation(format!(
            "{field} exceeds the {limit}-word limit ({n} words)"
        )));
    }
    Ok(())
}

fn ensure_non_empty(field: &str, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Text,
    Code,
}

impl Mode {
    pub fn is_code(self) -> bool {
        matches!(self, Mode::Code)
    }

    /// Capitalized label used in report headers and download filenames.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Text => "Text",
            Mode::Code => "Code",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Original,
    Plagiarised,
    Unknown,
}

/// Whether a result came from the remote service or was synthesized locally.
///
/// Fallback data stays usable for rendering but must never be mistaken for a
/// genuine score, so provenance rides along with every score-bearing type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Remote,
    Fallback,
}

/// Clamp a similarity score into [0,100]. NaN maps to 0.
pub fn clamp_score(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRequest {
    pub content_a: String,
    pub content_b: String,
    pub mode: Mode,
}

impl ComparisonRequest {
    pub fn new(content_a: impl Into<String>, content_b: impl Into<String>, mode: Mode) -> Self {
        Self {
            content_a: content_a.into(),
            content_b: content_b.into(),
            mode,
        }
    }

    /// Both contents must be non-empty after trimming and within the word cap.
    /// Over-limit input is rejected, never truncated.
    pub fn validate(&self) -> Result<()> {
        ensure_non_empty("content_a", &self.content_a)?;
        ensure_non_empty("content_b", &self.content_b)?;
        ensure_word_limit("content_a", &self.content_a, MAX_COMPARE_WORDS)?;
        ensure_word_limit("content_b", &self.content_b, MAX_COMPARE_WORDS)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSet {
    pub semantic: f64,
    pub lexical: f64,
    /// Absent for plain-text comparisons that skip structural analysis.
    pub structural: Option<f64>,
    /// The remote service's weighted combination; authoritative, never
    /// recomputed locally except by the fallback path.
    pub final_score: f64,
    pub status: Status,
    pub provenance: Provenance,
}

impl ScoreSet {
    /// Build a score set with every numeric field clamped into [0,100].
    pub fn clamped(
        semantic: f64,
        lexical: f64,
        structural: Option<f64>,
        final_score: f64,
        status: Status,
        provenance: Provenance,
    ) -> Self {
        Self {
            semantic: clamp_score(semantic),
            lexical: clamp_score(lexical),
            structural: structural.map(clamp_score),
            final_score: clamp_score(final_score),
            status,
            provenance,
        }
    }
}

/// What the scorer hands back: scores plus, when the service supplies them,
/// pre-highlighted copies of both inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReply {
    pub scores: ScoreSet,
    pub highlighted_a: Option<String>,
    pub highlighted_b: Option<String>,
}

/// A finished comparison, immutable once built. A new comparison always
/// produces a fresh report rather than mutating a prior one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub scores: ScoreSet,
    /// One entry per present scored dimension plus one mode-specific closing
    /// line (3 entries without a structural score, 4 with).
    pub explanation: Vec<String>,
    pub highlighted_a: String,
    pub highlighted_b: String,
    pub raw_a: String,
    pub raw_b: String,
    pub mode: Mode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSearchRequest {
    pub input_code: String,
    pub github_token: Option<String>,
}

impl CodeSearchRequest {
    pub fn validate(&self) -> Result<()> {
        ensure_non_empty("input_code", &self.input_code)?;
        ensure_word_limit("input_code", &self.input_code, MAX_COMPARE_WORDS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeMatch {
    pub fetched_code: String,
    /// Match confidence in [0,100].
    pub confidence: f64,
    pub source: String,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleCheckRequest {
    pub article_text: String,
}

impl ArticleCheckRequest {
    pub fn validate(&self) -> Result<()> {
        ensure_non_empty("article_text", &self.article_text)?;
        let n = self.article_text.chars().count();
        if n > MAX_ARTICLE_CHARS {
            return Err(Error::Validation(format!(
                "article_text exceeds the {MAX_ARTICLE_CHARS}-character limit ({n} characters)"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleMatch {
    pub similarity: f64,
    pub matched_content: String,
    pub title: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParaphraseRequest {
    pub text: String,
}

impl ParaphraseRequest {
    pub fn validate(&self) -> Result<()> {
        ensure_non_empty("text", &self.text)?;
        ensure_word_limit("text", &self.text, MAX_PARAPHRASE_WORDS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParaphraseSuggestion {
    pub paraphrase: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeplagiarizeRequest {
    pub input_text: String,
    pub mode: Mode,
}

impl DeplagiarizeRequest {
    pub fn validate(&self) -> Result<()> {
        ensure_non_empty("input_text", &self.input_text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeplagiarizeResult {
    /// The best rewrite: the top-ranked paraphrase when present, otherwise the
    /// service's mode-specific rewritten field.
    pub best: String,
    pub paraphrases: Vec<ParaphraseSuggestion>,
}

#[async_trait::async_trait]
pub trait ScorerBackend: Send + Sync {
    /// Submit a comparison for scoring. Implementations must observe `cancel`
    /// and return `Error::Cancelled` instead of a result once it fires.
    async fn score(&self, req: &ComparisonRequest, cancel: &CancellationToken)
        -> Result<ScoreReply>;
}

#[async_trait::async_trait]
pub trait CodeSearchBackend: Send + Sync {
    async fn search_code(&self, req: &CodeSearchRequest) -> Result<CodeMatch>;
}

#[async_trait::async_trait]
pub trait ArticleSearchBackend: Send + Sync {
    async fn check_article(&self, req: &ArticleCheckRequest) -> Result<Vec<ArticleMatch>>;
}

#[async_trait::async_trait]
pub trait ParaphraseBackend: Send + Sync {
    async fn paraphrase(&self, req: &ParaphraseRequest) -> Result<Vec<ParaphraseSuggestion>>;
    async fn deplagiarize(&self, req: &DeplagiarizeRequest) -> Result<DeplagiarizeResult>;
}
