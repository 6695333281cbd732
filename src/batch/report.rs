// In: src/batch/report.rs

//! Per-file outcomes of a batch pass and the console lines that go with them.

use std::path::{Path, PathBuf};

use colored::*;

use crate::error::PatchError;

const INDENTATION: &str = "  ";

pub(crate) fn print_indented(text: &str, depth: usize) {
    println!("{}{}", INDENTATION.repeat(depth), text);
}

/// What happened to one file, as decided by a visitor.
#[derive(Debug)]
pub enum FileOutcome {
    /// The operation succeeded and nothing was compared.
    Done,
    /// The operation succeeded and produced a `(min, max)` difference.
    Compared((i32, i32)),
    Failed(PatchError),
}

impl From<Result<(), PatchError>> for FileOutcome {
    fn from(result: Result<(), PatchError>) -> Self {
        match result {
            Ok(()) => Self::Done,
            Err(e) => Self::Failed(e),
        }
    }
}

impl From<Result<(i32, i32), PatchError>> for FileOutcome {
    fn from(result: Result<(i32, i32), PatchError>) -> Self {
        match result {
            Ok(range) => Self::Compared(range),
            Err(e) => Self::Failed(e),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    /// Missing companion files. The pass continues past them.
    pub warnings: Vec<(PathBuf, String)>,
    pub failures: Vec<(PathBuf, String)>,
    /// Files whose comparison was not `(0, 0)`.
    pub mismatches: Vec<(PathBuf, (i32, i32))>,
}

impl BatchReport {
    /// Files that were visited and matched a suffix.
    pub fn visited(&self) -> usize {
        self.succeeded + self.warnings.len() + self.failures.len() + self.mismatches.len()
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.failures.is_empty() && self.mismatches.is_empty()
    }

    /// Records `outcome` for `path` and prints its console line at `depth`.
    pub fn record(&mut self, path: &Path, depth: usize, outcome: FileOutcome) {
        let text = path.display().to_string();
        match outcome {
            FileOutcome::Done | FileOutcome::Compared((0, 0)) => {
                print_indented(&format!("{} {}", "✔".green(), text), depth);
                self.succeeded += 1;
            }
            FileOutcome::Compared((min, max)) => {
                print_indented(
                    &format!(
                        "{} {}\t({}, {})",
                        "✖".red(),
                        text,
                        min.to_string().blue(),
                        max.to_string().red()
                    ),
                    depth,
                );
                self.mismatches.push((path.to_path_buf(), (min, max)));
            }
            FileOutcome::Failed(e) if e.is_not_found() => {
                print_indented(
                    &format!("{} {}\twarning: {}", "✖".truecolor(255, 165, 0), text, e),
                    depth,
                );
                log::warn!("{}: {}", text, e);
                self.warnings.push((path.to_path_buf(), e.to_string()));
            }
            FileOutcome::Failed(e) => {
                print_indented(&format!("{} {}\terror: {}", "✖".red(), text, e), depth);
                log::error!("{}: {}", text, e);
                self.failures.push((path.to_path_buf(), e.to_string()));
            }
        }
    }

    /// Re-prints failures and mismatches in aggregate after a full pass.
    pub fn print_summary(&self) {
        println!(
            "{} succeeded, {} warnings, {} errors, {} mismatches",
            self.succeeded.to_string().green(),
            self.warnings.len().to_string().truecolor(255, 165, 0),
            self.failures.len().to_string().red(),
            self.mismatches.len().to_string().red()
        );
        if !self.failures.is_empty() {
            println!("Encountered {} errors:", self.failures.len());
            for (path, message) in &self.failures {
                print_indented(&format!("{}: {}", path.display(), message), 1);
            }
        }
        log::info!(
            "batch finished: {} visited, {} succeeded",
            self.visited(),
            self.succeeded
        );
    }
}
