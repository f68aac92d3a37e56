pub mod cli;
pub mod count;
pub mod diag;
pub mod error;
pub mod git;
pub mod model;
pub mod report;
