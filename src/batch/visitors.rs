// In: src/batch/visitors.rs

//! One `Visitor` per batch mode. Each walks one tree and finds its companion
//! files in the other trees by relative path.

use std::fs;
use std::path::{Path, PathBuf};

use colored::*;

use super::report::{print_indented, BatchReport, FileOutcome};
use super::Visitor;
use crate::config::PatchConfig;
use crate::error::PatchError;
use crate::pipeline::{apply_patch_file, compare_image_files, create_patch_file};

//==================================================================================
// 1. Shared Helpers
//==================================================================================

/// Prints a directory header with the number of matching files it holds.
fn announce_directory(path: &Path, depth: usize, config: &PatchConfig) {
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let count = fs::read_dir(path)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.path().is_file() && config.matches_suffix(&e.path()))
                .count()
        })
        .unwrap_or(0);
    let text = if count > 0 {
        format!("{} ({})", name, count)
    } else {
        name
    };
    print_indented(&text.bold().magenta().to_string(), depth);
}

/// The path of `path` relative to `root`.
fn relative_to(path: &Path, root: &Path) -> Result<PathBuf, PatchError> {
    path.strip_prefix(root).map(Path::to_path_buf).map_err(|_| {
        PatchError::Io(std::io::Error::other(format!(
            "{} is outside {}",
            path.display(),
            root.display()
        )))
    })
}

//==================================================================================
// 2. Visitors
//==================================================================================

/// Walks the modified tree and writes one patch per modified file.
pub struct CreateVisitor<'a> {
    pub original_root: PathBuf,
    pub modified_root: PathBuf,
    pub patch_root: PathBuf,
    pub config: &'a PatchConfig,
    pub report: BatchReport,
}

impl Visitor for CreateVisitor<'_> {
    fn on_directory(&mut self, path: &Path, depth: usize) {
        announce_directory(path, depth, self.config);
    }

    fn on_file(&mut self, path: &Path, depth: usize) {
        if !self.config.matches_suffix(path) {
            return;
        }
        let outcome = relative_to(path, &self.modified_root).and_then(|relative| {
            create_patch_file(
                &self.original_root.join(&relative),
                path,
                &self.patch_root.join(&relative),
                self.config,
            )
        });
        self.report.record(path, depth, outcome.into());
    }
}

/// Walks the patch tree and writes one patched image per patch. When
/// `modified_root` is set and verification is enabled, every result is
/// compared with its modified counterpart.
pub struct ApplyVisitor<'a> {
    pub original_root: PathBuf,
    pub patch_root: PathBuf,
    pub output_root: PathBuf,
    pub modified_root: Option<PathBuf>,
    pub config: &'a PatchConfig,
    pub report: BatchReport,
}

impl ApplyVisitor<'_> {
    fn apply_one(&self, path: &Path) -> FileOutcome {
        let relative = match relative_to(path, &self.patch_root) {
            Ok(relative) => relative,
            Err(e) => return FileOutcome::Failed(e),
        };
        let output = self.output_root.join(&relative);
        if let Err(e) = apply_patch_file(
            &self.original_root.join(&relative),
            path,
            &output,
            self.config,
        ) {
            return FileOutcome::Failed(e);
        }
        match &self.modified_root {
            Some(modified_root) if self.config.verify_against_modified => {
                compare_image_files(&modified_root.join(&relative), &output, self.config).into()
            }
            _ => FileOutcome::Done,
        }
    }
}

impl Visitor for ApplyVisitor<'_> {
    fn on_directory(&mut self, path: &Path, depth: usize) {
        announce_directory(path, depth, self.config);
    }

    fn on_file(&mut self, path: &Path, depth: usize) {
        if !self.config.matches_suffix(path) {
            return;
        }
        let outcome = self.apply_one(path);
        self.report.record(path, depth, outcome);
    }
}

/// Walks a reference tree and compares each file with the same relative path
/// in `other_root`.
pub struct CompareVisitor<'a> {
    pub reference_root: PathBuf,
    pub other_root: PathBuf,
    pub config: &'a PatchConfig,
    pub report: BatchReport,
}

impl Visitor for CompareVisitor<'_> {
    fn on_directory(&mut self, path: &Path, depth: usize) {
        announce_directory(path, depth, self.config);
    }

    fn on_file(&mut self, path: &Path, depth: usize) {
        if !self.config.matches_suffix(path) {
            return;
        }
        let outcome = relative_to(path, &self.reference_root).and_then(|relative| {
            compare_image_files(path, &self.other_root.join(&relative), self.config)
        });
        self.report.record(path, depth, outcome.into());
    }
}
