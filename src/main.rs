use clap::Parser;
use color_eyre::eyre::Result;

use seedload::cli::Args;
use seedload::{commands, error, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    error::install_hooks()?;

    let args = Args::parse();
    telemetry::init(args.verbose, args.quiet);

    commands::run(args).await
}
