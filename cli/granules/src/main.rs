//! gf CLI
//!
//! Discover and download scientific data granules from THREDDS catalogs.

use clap::Parser;

mod args;
mod output;
mod run;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Logs go to stderr so stdout only carries listings
    gf_cli_common::init_logging(args.log_level)?;

    let code = run::execute(args).await?;
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
