pub mod branches;
pub mod log;
pub mod runner;

pub use branches::{list_branches, parse_branch_listing};
pub use log::{branch_edits, parse_log, LogLine, LogParser};
pub use runner::{split_lines, CommandRunner, SystemRunner};
