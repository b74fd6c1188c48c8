use clap::Parser;
use crudforge::cli::{init_tracing, run_cli, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    run_cli(cli)
}
