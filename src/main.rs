use anyhow::Result;
use gedits::cli::Cli;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    cli.init_logging();
    cli.execute()
}
