//! Per-branch commit log walking.
//!
//! `git log --format=COMMIT,%ae,%an --numstat` prints one marker line per
//! commit followed by one `<added>\t<deleted>\t<path>` line per changed file:
//!
//! ```text
//! COMMIT,a@x.com,Alice
//! 3	2	src/main.rs
//! -	-	logo.png
//! ```
//!
//! Binary files report `-` instead of counts and are ignored, as is anything
//! else that is neither a marker nor a numeric stat.

use super::runner::{split_lines, CommandRunner};
use crate::diag::{Diagnostics, LogErr};
use crate::error::{EditsError, Result};
use crate::model::{Contributor, EditCounts, TimeWindow};
use regex::Regex;

pub const LOG_FORMAT: &str = "--format=COMMIT,%ae,%an";

const AUTHOR_PATTERN: &str = r"^COMMIT,([^,]*),([^,]*)$";
// ASCII classes only; non-ASCII digits and spaces never make a numstat line.
const STAT_PATTERN: &str = r"^(?-u:\s)*([0-9]+)(?-u:\s)*([0-9]+).*$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    Author(Contributor),
    Stat { added: u64, deleted: u64 },
    Other,
}

/// Line-at-a-time parser for one branch's log output.
#[derive(Debug)]
pub struct LogParser {
    author_re: Regex,
    stat_re: Regex,
    author: Option<String>,
    counts: EditCounts,
}

impl LogParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            author_re: Regex::new(AUTHOR_PATTERN)?,
            stat_re: Regex::new(STAT_PATTERN)?,
            author: None,
            counts: EditCounts::new(),
        })
    }

    pub fn classify(&self, line: &str) -> Result<LogLine> {
        if let Some(caps) = self.author_re.captures(line) {
            return Ok(LogLine::Author(Contributor::new(&caps[1], &caps[2])));
        }
        if let Some(caps) = self.stat_re.captures(line) {
            return Ok(LogLine::Stat {
                added: parse_count(&caps[1], line)?,
                deleted: parse_count(&caps[2], line)?,
            });
        }
        Ok(LogLine::Other)
    }

    pub fn feed(&mut self, line: &str) -> Result<()> {
        match self.classify(line)? {
            LogLine::Author(contributor) => self.author = Some(contributor.key()),
            LogLine::Stat { added, deleted } => {
                let author = self
                    .author
                    .as_deref()
                    .ok_or_else(|| EditsError::MissingAuthorContext(line.to_string()))?;
                let delta = added.checked_add(deleted).ok_or_else(|| {
                    EditsError::Parse(format!("line count overflows u64 in numstat line: {line}"))
                })?;
                self.counts.add(author, delta)?;
            }
            LogLine::Other => {}
        }
        Ok(())
    }

    pub fn finish(self) -> EditCounts {
        self.counts
    }
}

fn parse_count(digits: &str, line: &str) -> Result<u64> {
    digits
        .parse()
        .map_err(|e| EditsError::Parse(format!("{e} in numstat line: {line}")))
}

/// Parse a whole log dump into the edits it attributes to each author.
pub fn parse_log(output: &str) -> Result<EditCounts> {
    let mut parser = LogParser::new()?;
    for line in split_lines(output) {
        parser.feed(line)?;
    }
    Ok(parser.finish())
}

/// Check out `branch` and count the edits in its log over `window`.
///
/// Returns only this branch's delta; the caller decides whether to merge it.
pub fn branch_edits(
    runner: &dyn CommandRunner,
    diag: &dyn Diagnostics,
    branch: &str,
    window: &TimeWindow,
) -> Result<EditCounts> {
    runner
        .run("git", &["checkout", branch])
        .log_at(diag, "branch_edits (checkout)")?;

    let output = runner
        .run(
            "git",
            &[
                "log",
                branch,
                "--since",
                window.since.as_str(),
                "--until",
                window.until.as_str(),
                LOG_FORMAT,
                "--numstat",
            ],
        )
        .log_at(diag, "branch_edits (log)")?;

    parse_log(&output).log_at(diag, "branch_edits (parse)")
}
