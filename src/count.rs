use crate::diag::{Diagnostics, LogErr};
use crate::error::{EditsError, Result};
use crate::git::{branch_edits, list_branches, CommandRunner};
use crate::model::{EditCounts, TimeWindow};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Clone)]
pub struct CountOutcome {
    pub branches: Vec<String>,
    pub counts: EditCounts,
}

/// Walks every local branch of one repository and totals edits per contributor.
///
/// Branches are processed strictly one after another: each one is checked out
/// in the shared working tree before its log is read.
pub struct EditCounter<'a> {
    runner: &'a dyn CommandRunner,
    diag: &'a dyn Diagnostics,
    show_progress: bool,
}

impl<'a> EditCounter<'a> {
    pub fn new(runner: &'a dyn CommandRunner, diag: &'a dyn Diagnostics) -> Self {
        Self {
            runner,
            diag,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn run(&self, window: &TimeWindow) -> Result<CountOutcome> {
        self.diag.debug("count_edits", "pulling latest changes");
        self.runner
            .run("git", &["pull"])
            .log_at(self.diag, "count_edits (pull)")?;

        let branches = list_branches(self.runner, self.diag)
            .log_at(self.diag, "count_edits (list_branches)")?;
        if branches.is_empty() {
            self.diag.warn("count_edits", "no local branches found");
        }

        let pb = self.progress_bar(branches.len() as u64);
        let mut counts = EditCounts::new();

        for (index, branch) in branches.iter().enumerate() {
            pb.set_message(branch.clone());
            self.diag
                .debug("count_edits", &format!("counting branch {index}: {branch}"));

            let merged = branch_edits(self.runner, self.diag, branch, window)
                .and_then(|delta| counts.merge(delta));
            if let Err(e) = merged {
                pb.abandon();
                self.diag
                    .error(&format!("count_edits (branch {index})"), &e.to_string());
                return Err(EditsError::Branch {
                    index,
                    branch: branch.clone(),
                    source: Box::new(e),
                });
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(CountOutcome { branches, counts })
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::MemoryDiagnostics;
    use crate::report::format_lines;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Replays canned output keyed by the joined argument list.
    struct Scripted {
        responses: HashMap<String, std::result::Result<String, String>>,
        calls: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn new(responses: &[(&str, std::result::Result<&str, &str>)]) -> Self {
            Self {
                responses: responses
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.map(str::to_string).map_err(str::to_string)))
                    .collect(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for Scripted {
        fn run(&self, program: &str, args: &[&str]) -> Result<String> {
            let key = args.join(" ");
            self.calls.borrow_mut().push(key.clone());
            match self.responses.get(&key) {
                Some(Ok(out)) => Ok(out.clone()),
                Some(Err(msg)) => Err(EditsError::Execution {
                    command: format!("{program} {key}"),
                    message: msg.clone(),
                }),
                None => Ok(String::new()),
            }
        }
    }

    const LOG_A: &str = "log a --since 2024-01-01 --until 2024-02-01 --format=COMMIT,%ae,%an --numstat";
    const LOG_B: &str = "log b --since 2024-01-01 --until 2024-02-01 --format=COMMIT,%ae,%an --numstat";

    fn window() -> TimeWindow {
        TimeWindow::new("2024-01-01", "2024-02-01")
    }

    #[test]
    fn totals_an_author_across_branches() {
        let runner = Scripted::new(&[
            ("ls-remote --heads .", Ok("aa\trefs/heads/a\nbb\trefs/heads/b\n")),
            (LOG_A, Ok("COMMIT,a@x.com,Alice\n3\t2\tfile.go\n")),
            (LOG_B, Ok("COMMIT,a@x.com,Alice\n1\t0\tfile.go\n")),
        ]);
        let diag = MemoryDiagnostics::new();

        let outcome = EditCounter::new(&runner, &diag).run(&window()).unwrap();

        assert_eq!(outcome.branches, vec!["a", "b"]);
        assert_eq!(outcome.counts.get("a@x.com; Alice"), Some(6));
        assert_eq!(outcome.counts.len(), 1);
        assert_eq!(format_lines(&outcome.counts), vec!["a@x.com; Alice: 6"]);
        assert_eq!(
            runner.calls(),
            vec![
                "pull".to_string(),
                "ls-remote --heads .".to_string(),
                "checkout a".to_string(),
                LOG_A.to_string(),
                "checkout b".to_string(),
                LOG_B.to_string(),
            ]
        );
        assert!(diag.errors().is_empty());
    }

    #[test]
    fn pull_failure_stops_before_listing() {
        let runner = Scripted::new(&[("pull", Err("no remote"))]);
        let diag = MemoryDiagnostics::new();

        let err = EditCounter::new(&runner, &diag).run(&window()).unwrap_err();

        assert!(matches!(err, EditsError::Execution { .. }));
        assert_eq!(runner.calls(), vec!["pull".to_string()]);
        assert_eq!(diag.errors()[0].site, "count_edits (pull)");
    }

    #[test]
    fn missing_author_in_later_branch_is_fatal() {
        // Branch a leaves an author behind; branch b must not inherit it.
        let runner = Scripted::new(&[
            ("ls-remote --heads .", Ok("aa\trefs/heads/a\nbb\trefs/heads/b\n")),
            (LOG_A, Ok("COMMIT,a@x.com,Alice\n3\t2\tfile.go\n")),
            (LOG_B, Ok("7\t1\torphan.go\n")),
        ]);
        let diag = MemoryDiagnostics::new();

        let err = EditCounter::new(&runner, &diag).run(&window()).unwrap_err();

        match &err {
            EditsError::Branch { index, branch, .. } => {
                assert_eq!(*index, 1);
                assert_eq!(branch, "b");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(err.root(), EditsError::MissingAuthorContext(_)));

        let sites: Vec<String> = diag.errors().into_iter().map(|d| d.site).collect();
        assert_eq!(
            sites,
            vec![
                "branch_edits (parse)".to_string(),
                "count_edits (branch 1)".to_string(),
            ]
        );
    }

    #[test]
    fn total_overflowing_across_branches_fails_at_that_branch() {
        let runner = Scripted::new(&[
            ("ls-remote --heads .", Ok("aa\trefs/heads/a\nbb\trefs/heads/b\n")),
            (LOG_A, Ok("COMMIT,a@x.com,Alice\n18446744073709551615\t0\tbig.bin\n")),
            (LOG_B, Ok("COMMIT,a@x.com,Alice\n1\t0\tfile.go\n")),
        ]);
        let diag = MemoryDiagnostics::new();

        let err = EditCounter::new(&runner, &diag).run(&window()).unwrap_err();

        assert!(matches!(err, EditsError::Branch { index: 1, .. }));
        assert!(matches!(err.root(), EditsError::Parse(_)));
        assert_eq!(diag.errors()[0].site, "count_edits (branch 1)");
    }

    #[test]
    fn checkout_failure_stops_at_that_branch() {
        let runner = Scripted::new(&[
            ("ls-remote --heads .", Ok("aa\trefs/heads/a\nbb\trefs/heads/b\n")),
            ("checkout a", Err("local changes would be overwritten")),
        ]);
        let diag = MemoryDiagnostics::new();

        let err = EditCounter::new(&runner, &diag).run(&window()).unwrap_err();

        assert!(matches!(err, EditsError::Branch { index: 0, .. }));
        assert!(!runner.calls().iter().any(|c| c == "checkout b"));
    }

    #[test]
    fn no_branches_means_empty_counts() {
        let runner = Scripted::new(&[]);
        let diag = MemoryDiagnostics::new();

        let outcome = EditCounter::new(&runner, &diag).run(&window()).unwrap();

        assert!(outcome.branches.is_empty());
        assert!(outcome.counts.is_empty());
        let warnings = diag
            .entries()
            .into_iter()
            .filter(|d| d.level == tracing::Level::WARN)
            .count();
        assert_eq!(warnings, 1);
    }

    #[test]
    fn reruns_with_same_output_agree() {
        let script: [(&str, std::result::Result<&str, &str>); 2] = [
            ("ls-remote --heads .", Ok("aa\trefs/heads/a\n")),
            (LOG_A, Ok("COMMIT,a@x.com,Alice\n3\t2\tfile.go\nCOMMIT,b@x.com,Bob\n1\t1\tx\n")),
        ];
        let diag = MemoryDiagnostics::new();
        let first = EditCounter::new(&Scripted::new(&script), &diag).run(&window()).unwrap();
        let second = EditCounter::new(&Scripted::new(&script), &diag).run(&window()).unwrap();
        assert_eq!(first.counts, second.counts);
    }
}
