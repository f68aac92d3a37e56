use crate::count::EditCounter;
use crate::diag::{Diagnostics, TracingDiagnostics};
use crate::error::EditsError;
use crate::git::SystemRunner;
use crate::model::TimeWindow;
use anyhow::{Context, Result};
use clap::Parser;
use console::{style, Term};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gedits")]
#[command(about = "Count lines added and deleted per contributor across every local branch")]
#[command(version)]
pub struct Cli {
    #[arg(value_name = "ARGS", help = "<repository-directory> <since> <until>")]
    pub args: Vec<String>,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,

    #[arg(long, help = "Output as NDJSON")]
    pub ndjson: bool,

    #[arg(long, value_parser = humantime::parse_duration, help = "Kill any git command running longer than this (e.g. 30s, 5m)")]
    pub timeout: Option<Duration>,

    #[arg(short, long, help = "Log every git command to stderr")]
    pub verbose: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn init_logging(&self) {
        let log_filter = if self.verbose { "gedits=debug" } else { "gedits=warn" };

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| log_filter.into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    pub fn execute(self) -> Result<ExitCode> {
        let [repo, since, until] = match <[String; 3]>::try_from(self.args) {
            Ok(args) => args,
            Err(_) => {
                usage()?;
                return Ok(ExitCode::FAILURE);
            }
        };

        let diag = TracingDiagnostics;
        let repo = PathBuf::from(repo);
        let window = TimeWindow::new(since, until);

        open_repository(&repo, &diag).context("Failed to open repository")?;

        let runner = SystemRunner::new(&repo).with_timeout(self.timeout);
        let outcome = EditCounter::new(&runner, &diag)
            .with_progress(Term::stderr().is_term())
            .run(&window)
            .context("Failed to count edits")?;

        if self.json {
            crate::report::output_json(&outcome, runner.workdir(), &window)?;
        } else if self.ndjson {
            crate::report::output_ndjson(&outcome)?;
        } else {
            crate::report::output_text(&outcome)?;
        }

        Ok(ExitCode::SUCCESS)
    }
}

fn open_repository(path: &Path, diag: &dyn Diagnostics) -> crate::error::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    let err = EditsError::Repository(format!("{} is not a directory", path.display()));
    diag.error("cli (open repository)", &err.to_string());
    Err(err)
}

pub fn usage() -> Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", style("Takes the following params:").bold())?;
    writeln!(out, "-Directory containing repository")?;
    writeln!(out, "-When to start looking at commits, as interpreted by git log's --since")?;
    writeln!(out, "-When to stop looking at commits, as interpreted by git log's --until")?;
    Ok(())
}
