use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use simreport_core::{
    ArticleCheckRequest, ArticleSearchBackend, CodeSearchBackend, CodeSearchRequest,
    ComparisonRequest, DeplagiarizeRequest, Mode, ParaphraseBackend, ParaphraseRequest, Provenance,
    ScoreReply, ScorerBackend,
};
use simreport_local::credentials::{self, Credential, CredentialStore};
use simreport_local::{
    article::ArticleChecker, default_client, fallback, github::GithubCodeSearch,
    paraphrase::RemoteParaphraser, report, RemoteScorer,
};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "simreport")]
#[command(about = "Similarity reports against a remote scoring service", long_about = None)]
struct Cli {
    /// Credential file (plain JSON). Defaults to the platform config dir.
    #[arg(long, env = "SIMREPORT_CREDENTIALS_FILE", global = true)]
    credentials_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare two files and write a downloadable plain-text report.
    Compare(CompareCmd),
    /// Search GitHub for code similar to a file's contents.
    CodeSearch(CodeSearchCmd),
    /// Check an article title for published near-duplicates.
    Article(ArticleCmd),
    /// Generate ranked paraphrases of a short sentence.
    Paraphrase(ParaphraseCmd),
    /// Rewrite text or code to lower its similarity.
    Deplagiarize(DeplagiarizeCmd),
    /// Manage stored API credentials.
    Keys(KeysCmd),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Text,
    Code,
}

impl From<ModeArg> for Mode {
    fn from(m: ModeArg) -> Mode {
        match m {
            ModeArg::Text => Mode::Text,
            ModeArg::Code => Mode::Code,
        }
    }
}

#[derive(clap::Args, Debug)]
struct CompareCmd {
    /// Source content (original).
    file_a: PathBuf,
    /// Submitted content (target).
    file_b: PathBuf,
    #[arg(long, value_enum, default_value = "text")]
    mode: ModeArg,
    /// Directory for the report file (default: current directory).
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// On scorer failure, synthesize a clearly-labelled fallback report
    /// instead of exiting with an error.
    #[arg(long)]
    allow_fallback: bool,
}

#[derive(clap::Args, Debug)]
struct CodeSearchCmd {
    /// File whose contents to search for.
    file: PathBuf,
    /// GitHub token (falls back to env, then the credential file).
    #[arg(long)]
    github_token: Option<String>,
}

#[derive(clap::Args, Debug)]
struct ArticleCmd {
    /// Article title to check.
    title: String,
    /// Tavily API key (falls back to env, then the credential file).
    #[arg(long)]
    tavily_api_key: Option<String>,
}

#[derive(clap::Args, Debug)]
struct ParaphraseCmd {
    /// Sentence to paraphrase (50 words max).
    text: String,
}

#[derive(clap::Args, Debug)]
struct DeplagiarizeCmd {
    /// File to rewrite.
    file: PathBuf,
    #[arg(long, value_enum, default_value = "text")]
    mode: ModeArg,
    /// OpenRouter API key (falls back to env, then the credential file).
    #[arg(long)]
    openrouter_api_key: Option<String>,
}

#[derive(clap::Args, Debug)]
struct KeysCmd {
    #[command(subcommand)]
    action: KeysAction,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KeyName {
    Openrouter,
    Github,
    Tavily,
}

impl From<KeyName> for Credential {
    fn from(k: KeyName) -> Credential {
        match k {
            KeyName::Openrouter => Credential::OpenRouter,
            KeyName::Github => Credential::GitHub,
            KeyName::Tavily => Credential::Tavily,
        }
    }
}

#[derive(Subcommand, Debug)]
enum KeysAction {
    /// Store a credential in the credential file.
    Set { name: KeyName, value: String },
    /// List which credentials are configured (never prints values).
    Show,
    /// Remove a stored credential.
    Clear { name: KeyName },
}

fn credentials_path(cli_path: &Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = cli_path {
        return Ok(path.clone());
    }
    let base = dirs::config_dir().context("no config directory on this platform")?;
    Ok(base.join("simreport").join("credentials.json"))
}

/// Token that fires on Ctrl-C, so an in-flight comparison is abandoned
/// cleanly instead of killed mid-request.
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let t = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            t.cancel();
        }
    });
    token
}

async fn run_compare(cmd: CompareCmd) -> Result<()> {
    let raw_a = std::fs::read_to_string(&cmd.file_a)
        .with_context(|| format!("reading {}", cmd.file_a.display()))?;
    let raw_b = std::fs::read_to_string(&cmd.file_b)
        .with_context(|| format!("reading {}", cmd.file_b.display()))?;
    let mode: Mode = cmd.mode.into();

    let req = ComparisonRequest::new(raw_a.clone(), raw_b.clone(), mode);
    let scorer = RemoteScorer::from_env(default_client()?);
    let reply = match scorer.score(&req, &interrupt_token()).await {
        Ok(reply) => reply,
        Err(simreport_core::Error::Validation(msg)) => anyhow::bail!("invalid input: {msg}"),
        Err(simreport_core::Error::Cancelled) => {
            eprintln!("comparison cancelled");
            return Ok(());
        }
        Err(e) if cmd.allow_fallback => {
            tracing::warn!(error = %e, "scorer unavailable, synthesizing fallback report");
            ScoreReply {
                scores: fallback::fallback_scores(None),
                highlighted_a: None,
                highlighted_b: None,
            }
        }
        Err(e) => return Err(e.into()),
    };

    let built = report::build_report(raw_a, raw_b, mode, reply);
    let meta = report::ReportMeta::for_report(&built);
    let filename = report::download_filename(mode, meta.generated_at.date_naive());
    let path = cmd
        .out_dir
        .unwrap_or_else(|| PathBuf::from("."))
        .join(filename);
    std::fs::write(&path, report::render_text(&built, &meta))
        .with_context(|| format!("writing {}", path.display()))?;

    if built.scores.provenance == Provenance::Fallback {
        eprintln!("warning: scoring service unreachable; this report contains synthetic fallback data");
    }
    println!(
        "final score {}% ({:?}) -> {}",
        built.scores.final_score,
        built.scores.status,
        path.display()
    );
    Ok(())
}

async fn run_code_search(cmd: CodeSearchCmd, store: &CredentialStore) -> Result<()> {
    let input_code = std::fs::read_to_string(&cmd.file)
        .with_context(|| format!("reading {}", cmd.file.display()))?;
    let req = CodeSearchRequest {
        input_code,
        github_token: credentials::resolve(Credential::GitHub, cmd.github_token.as_deref(), store),
    };
    let search = GithubCodeSearch::from_env(default_client()?);
    let hit = search.search_code(&req).await?;
    if hit.provenance == Provenance::Fallback {
        eprintln!("warning: code search unreachable; showing a synthetic sample match");
    }
    println!("source: {} ({}% confidence)", hit.source, hit.confidence);
    println!("{}", hit.fetched_code);
    Ok(())
}

async fn run_article(cmd: ArticleCmd, store: &CredentialStore) -> Result<()> {
    let key = credentials::resolve(Credential::Tavily, cmd.tavily_api_key.as_deref(), store);
    if simreport_local::article::near_limit(&cmd.title) {
        eprintln!("warning: title is close to the 400-character limit");
    }
    let checker = ArticleChecker::from_env(default_client()?, key);
    let req = ArticleCheckRequest {
        article_text: cmd.title,
    };
    let matches = checker.check_article(&req).await?;
    if matches.is_empty() {
        println!("no similar published articles found");
        return Ok(());
    }
    for m in matches {
        println!(
            "{:>5.1}%  {}  {}",
            m.similarity,
            m.title.as_deref().unwrap_or("(untitled)"),
            m.url.as_deref().unwrap_or("")
        );
        println!("        {}", m.matched_content);
    }
    Ok(())
}

async fn run_paraphrase(cmd: ParaphraseCmd) -> Result<()> {
    let p = RemoteParaphraser::from_env(default_client()?, None);
    let req = ParaphraseRequest { text: cmd.text };
    let suggestions = p.paraphrase(&req).await?;
    for s in suggestions {
        println!("{:>5.1}%  {}", s.score, s.paraphrase);
    }
    Ok(())
}

async fn run_deplagiarize(cmd: DeplagiarizeCmd, store: &CredentialStore) -> Result<()> {
    let input_text = std::fs::read_to_string(&cmd.file)
        .with_context(|| format!("reading {}", cmd.file.display()))?;
    let key = credentials::resolve(
        Credential::OpenRouter,
        cmd.openrouter_api_key.as_deref(),
        store,
    );
    let p = RemoteParaphraser::from_env(default_client()?, key);
    let req = DeplagiarizeRequest {
        input_text,
        mode: cmd.mode.into(),
    };
    let result = p.deplagiarize(&req).await?;
    println!("{}", result.best);
    if result.paraphrases.len() > 1 {
        eprintln!("({} alternative rewrites available)", result.paraphrases.len() - 1);
    }
    Ok(())
}

fn run_keys(cmd: KeysCmd, path: &PathBuf) -> Result<()> {
    let mut store = CredentialStore::load(path)
        .with_context(|| format!("loading {}", path.display()))?;
    match cmd.action {
        KeysAction::Set { name, value } => {
            store.set(name.into(), value);
            store
                .save(path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("stored {}", Credential::from(name).name());
        }
        KeysAction::Show => {
            for credential in Credential::ALL {
                let state = if store.get(credential).is_some() {
                    "set"
                } else {
                    "unset"
                };
                println!("{:<22} {state}", credential.name());
            }
        }
        KeysAction::Clear { name } => {
            store.clear(name.into());
            store
                .save(path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("cleared {}", Credential::from(name).name());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let path = credentials_path(&cli.credentials_file)?;
    let store = CredentialStore::load(&path)
        .with_context(|| format!("loading {}", path.display()))?;

    match cli.command {
        Commands::Compare(cmd) => run_compare(cmd).await,
        Commands::CodeSearch(cmd) => run_code_search(cmd, &store).await,
        Commands::Article(cmd) => run_article(cmd, &store).await,
        Commands::Paraphrase(cmd) => run_paraphrase(cmd).await,
        Commands::Deplagiarize(cmd) => run_deplagiarize(cmd, &store).await,
        Commands::Keys(cmd) => run_keys(cmd, &path),
    }
}
