use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::fetch::ResponseKind;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Log at debug level unless `CHARSYNC_LOG`/`RUST_LOG` say otherwise.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Sync(SyncArgs),
    Extract(ExtractArgs),
    Fetch(FetchArgs),
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Campaign root URL (must be http/https).
    #[arg(long)]
    pub base_url: String,

    /// Campaign index path, relative to the base URL.
    #[arg(long, default_value = crate::config::DEFAULT_INDEX_PATH)]
    pub index_path: String,

    /// Mapping directory laid out as `<platform>/<sheet type>.json`.
    #[arg(long, default_value = "mappings")]
    pub mappings: PathBuf,

    /// Output file for the snapshot JSON (default: stdout).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Overwrite `--out` if it already exists.
    #[arg(long)]
    pub force: bool,

    /// User-Agent header sent with every request.
    #[arg(long, env = "CHARSYNC_USER_AGENT")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PageKind {
    /// Campaign root page (platform label).
    Campaign,
    /// Character page (sheet attributes and sheet type).
    Character,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Saved HTML page to scan.
    #[arg(long)]
    pub input: PathBuf,

    /// Which markers to look for.
    #[arg(long, value_enum, default_value_t = PageKind::Character)]
    pub page: PageKind,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Absolute URL to retrieve.
    #[arg(long)]
    pub url: String,

    /// Response decoding: `json` or `html`.
    #[arg(long, default_value = "html")]
    pub kind: ResponseKind,

    /// User-Agent header sent with the request.
    #[arg(long, env = "CHARSYNC_USER_AGENT")]
    pub user_agent: Option<String>,
}
