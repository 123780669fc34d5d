use std::fs::File;

use anyhow::{Context, Result};
use clap::Parser;

use trajview::cli::Cli;
use trajview::Viewer;

fn init_logging(cli: &Cli) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = &cli.log_file {
        let file = File::create(path).with_context(|| format!("cannot create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = cli.to_config().context("invalid arguments")?;
    log::debug!("{config:?}");

    Viewer::run(config).with_context(|| format!("trajview failed on {}", cli.file))
}
