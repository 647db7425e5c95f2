mod api;
mod cli;
mod listing;
mod logging;
mod model;
mod orchestrator;
mod storage;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logging::init(args.verbose, args.log_file.as_deref(), args.is_interactive())?;

    match cli::run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "command failed");
            Err(e)
        }
    }
}
