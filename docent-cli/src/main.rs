#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::Parser;
use docent_cli::{Cli, run};
use docent_server::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(cli.log_format);
    run(cli).await
}
