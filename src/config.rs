use anyhow::Context as _;
use url::Url;

pub const DEFAULT_INDEX_PATH: &str = "/content_summary_gm.json";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36";

/// Endpoint and header settings shared by every request of one run.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: Url,
    pub index_path: String,
    pub user_agent: String,
}

impl FetchConfig {
    pub fn new(base_url: &str, index_path: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url).context("parse base url")?;
        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            anyhow::bail!("base url must be http/https: {base_url}");
        }
        if base_url.host_str().is_none() {
            anyhow::bail!("base url must have host: {base_url}");
        }

        Ok(Self {
            base_url,
            index_path: index_path.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        })
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        if let Some(user_agent) = user_agent.filter(|ua| !ua.trim().is_empty()) {
            self.user_agent = user_agent;
        }
        self
    }

    pub fn index_url(&self) -> anyhow::Result<Url> {
        self.join(&self.index_path)
    }

    pub fn character_url(&self, path: &str) -> anyhow::Result<Url> {
        self.join(path)
    }

    fn join(&self, path: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("join {path:?} onto {}", self.base_url))
    }
}
