use super::runner::{split_lines, CommandRunner};
use crate::diag::{Diagnostics, LogErr};
use crate::error::Result;
use regex::Regex;

const HEAD_PATTERN: &str = r"^[0-9a-f]+(?-u:\s)*refs/heads/(.*)$";

/// Local branch names, in the order git lists them.
pub fn list_branches(
    runner: &dyn CommandRunner,
    diag: &dyn Diagnostics,
) -> Result<Vec<String>> {
    let output = runner
        .run("git", &["ls-remote", "--heads", "."])
        .log_at(diag, "list_branches (ls-remote)")?;
    parse_branch_listing(&output).log_at(diag, "list_branches (parse)")
}

/// Pull branch names out of `<hash> refs/heads/<name>` lines; anything else is skipped.
pub fn parse_branch_listing(output: &str) -> Result<Vec<String>> {
    let head = Regex::new(HEAD_PATTERN)?;
    Ok(split_lines(output)
        .into_iter()
        .filter_map(|line| head.captures(line))
        .map(|caps| caps[1].to_string())
        .collect())
}
