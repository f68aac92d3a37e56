use crate::count::CountOutcome;
use crate::model::{ContributorEdits, EditCounts, EditsOutput, TimeWindow, SCHEMA_VERSION};
use anyhow::Result;
use chrono::Utc;
use std::path::Path;

/// Entries in ascending order of contributor key, zero counts included.
pub fn sorted_entries(counts: &EditCounts) -> Vec<ContributorEdits> {
    let mut entries: Vec<ContributorEdits> = counts
        .iter()
        .map(|(contributor, edits)| ContributorEdits {
            contributor: contributor.to_string(),
            edits,
        })
        .collect();
    entries.sort_by(|a, b| a.contributor.cmp(&b.contributor));
    entries
}

pub fn format_lines(counts: &EditCounts) -> Vec<String> {
    sorted_entries(counts)
        .into_iter()
        .map(|e| format!("{}: {}", e.contributor, e.edits))
        .collect()
}

pub fn output_text(outcome: &CountOutcome) -> Result<()> {
    for line in format_lines(&outcome.counts) {
        println!("{line}");
    }
    Ok(())
}

pub fn build_output(outcome: &CountOutcome, repo: &Path, window: &TimeWindow) -> EditsOutput {
    EditsOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repository_path: repo.to_string_lossy().to_string(),
        since: window.since.clone(),
        until: window.until.clone(),
        branches: outcome.branches.clone(),
        entries: sorted_entries(&outcome.counts),
    }
}

pub fn output_json(outcome: &CountOutcome, repo: &Path, window: &TimeWindow) -> Result<()> {
    let output = build_output(outcome, repo, window);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn output_ndjson(outcome: &CountOutcome) -> Result<()> {
    for entry in sorted_entries(&outcome.counts) {
        println!("{}", serde_json::to_string(&entry)?);
    }
    Ok(())
}
