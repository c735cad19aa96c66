//! Pet query runner
//!
//! Waits for the pet services, seeds them, executes `query.txt` and writes
//! `response.txt` in the working directory.

use clap::Parser;
use pet_query::common::{logging, Config};
use pet_query::runner::Orchestrator;

#[derive(Parser)]
#[command(
    name = "query-runner",
    about = "Replay a command file against the pet store services"
)]
#[command(version, long_about = None)]
struct Cli {}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    logging::init_cli();

    let _cli = Cli::parse();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run() -> pet_query::Result<()> {
    let config = Config::load()?;
    let work_dir = std::env::current_dir()?;
    Orchestrator::new(config, work_dir)?.run().await?;
    Ok(())
}
