use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "CHARSYNC_LOG";

/// Installs the stderr subscriber.
///
/// Filter precedence: `CHARSYNC_LOG`, then `RUST_LOG`, then `debug` when
/// `verbose` is set, otherwise `info`. Stdout stays reserved for snapshot
/// output.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(fallback))
        .context("build log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
