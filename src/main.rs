use clap::Parser;
use synop_wind::cli::{run, Cli};
use synop_wind::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
