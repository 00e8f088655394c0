//! Prereq - course prerequisite graph and enrollment eligibility

use std::process::ExitCode;

fn main() -> ExitCode {
    prereq::cli::run()
}
