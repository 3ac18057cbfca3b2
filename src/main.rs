use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    let cli = charsync::cli::Cli::parse();
    charsync::logging::init(cli.verbose).context("init logging")?;
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        charsync::cli::Command::Sync(args) => {
            charsync::sync::run(args).context("sync")?;
        }
        charsync::cli::Command::Extract(args) => {
            charsync::extract::run(args).context("extract")?;
        }
        charsync::cli::Command::Fetch(args) => {
            charsync::fetch::run(args).context("fetch")?;
        }
    }

    Ok(())
}
