use std::io::Write as _;
use std::str::FromStr;

use anyhow::Context as _;
use reqwest::header::{ACCEPT, USER_AGENT};
use url::Url;

use crate::cli::FetchArgs;
use crate::config::FetchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Json,
    Html,
}

impl ResponseKind {
    fn accept(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Html => "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
        }
    }
}

impl FromStr for ResponseKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            other => anyhow::bail!("unsupported response kind: {other:?} (expected json or html)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Json(serde_json::Value),
    Text(String),
}

impl Fetched {
    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }
}

/// Retrieval capability used by the pipeline.
///
/// Implementors only provide the transport. `fetch` owns the decoding and
/// turns every failure into `None` after logging it, so a single bad page
/// never aborts a run.
pub trait Fetcher {
    fn get_text(&self, url: &Url, kind: ResponseKind) -> anyhow::Result<String>;

    fn fetch(&self, url: &Url, kind: ResponseKind) -> Option<Fetched> {
        let body = match self.get_text(url, kind) {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(%url, error = %format!("{err:#}"), "request failed");
                return None;
            }
        };

        match kind {
            ResponseKind::Html => Some(Fetched::Text(body)),
            ResponseKind::Json => match serde_json::from_str(&body) {
                Ok(value) => Some(Fetched::Json(value)),
                Err(err) => {
                    tracing::warn!(%url, %err, "response is not valid JSON");
                    None
                }
            },
        }
    }
}

#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
        })
    }
}

impl Fetcher for HttpFetcher {
    fn get_text(&self, url: &Url, kind: ResponseKind) -> anyhow::Result<String> {
        tracing::debug!(%url, ?kind, "GET");
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, kind.accept())
            .send()
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url}"))?;

        let bytes = response
            .bytes()
            .with_context(|| format!("read response body: {url}"))?;
        String::from_utf8(bytes.to_vec()).with_context(|| format!("decode utf-8 body: {url}"))
    }
}

pub fn run(args: FetchArgs) -> anyhow::Result<()> {
    let url = Url::parse(&args.url).context("parse --url")?;
    let config = FetchConfig::new(url.as_str(), crate::config::DEFAULT_INDEX_PATH)?
        .with_user_agent(args.user_agent);
    let fetcher = HttpFetcher::new(&config)?;

    let fetched = fetcher
        .fetch(&url, args.kind)
        .ok_or_else(|| anyhow::anyhow!("nothing retrieved from {url}"))?;

    let mut stdout = std::io::stdout().lock();
    match fetched {
        Fetched::Json(value) => {
            serde_json::to_writer_pretty(&mut stdout, &value).context("write json")?;
            stdout.write_all(b"\n").context("write newline")?;
        }
        Fetched::Text(text) => stdout.write_all(text.as_bytes()).context("write text")?,
    }
    stdout.flush().context("flush stdout")?;

    Ok(())
}
