// profile-stats entry point.
// Parses the command line, sets up logging, and runs the collection.

use anyhow::Result;
use profile_stats::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_tracing(&cli.log_level);
    cli.execute().await
}
