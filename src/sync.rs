use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;

use crate::cli::SyncArgs;
use crate::config::FetchConfig;
use crate::fetch::HttpFetcher;
use crate::formats::CampaignSnapshot;
use crate::mapping::MappingDir;
use crate::pipeline::Pipeline;

pub fn run(args: SyncArgs) -> anyhow::Result<()> {
    if let Some(out) = args.out.as_deref()
        && out.exists()
        && !args.force
    {
        anyhow::bail!(
            "snapshot output already exists (use --force to overwrite): {}",
            out.display()
        );
    }
    if !args.mappings.is_dir() {
        tracing::warn!(
            mappings = %args.mappings.display(),
            "mapping directory does not exist; any character with a sheet type will fail the run"
        );
    }

    let config = FetchConfig::new(&args.base_url, &args.index_path)
        .context("build fetch config")?
        .with_user_agent(args.user_agent);
    let fetcher = HttpFetcher::new(&config)?;
    let mappings = MappingDir::new(&args.mappings);

    let snapshot = Pipeline::new(config, fetcher, mappings).run()?;
    let normalized = snapshot
        .characters
        .values()
        .filter(|record| record.standardized_sheet.is_some())
        .count();
    tracing::info!(
        characters = snapshot.characters.len(),
        normalized,
        "sync: done"
    );

    match args.out.as_deref() {
        Some(out) => {
            let mut file = open_output(out, args.force)?;
            write_snapshot(&mut file, &snapshot)
                .with_context(|| format!("write snapshot output: {}", out.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            write_snapshot(&mut stdout, &snapshot).context("write snapshot to stdout")?;
        }
    }

    Ok(())
}

/// Opens `--out` for writing. Without `force` the file must not exist when
/// it is opened, not only when the run started.
fn open_output(path: &Path, force: bool) -> anyhow::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    options
        .open(path)
        .with_context(|| format!("create snapshot output: {}", path.display()))
}

fn write_snapshot<W: std::io::Write>(out: &mut W, snapshot: &CampaignSnapshot) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, snapshot).context("serialize snapshot")?;
    out.write_all(b"\n").context("write snapshot newline")?;
    out.flush().context("flush snapshot")?;
    Ok(())
}
