// In: src/batch/mod.rs

//! Batch mode: run one pipeline operation per file over whole directory trees.
//!
//! Traversal is separated from what happens at each node. `traverse` walks a
//! tree in sorted order and hands every directory and file to a `Visitor`;
//! each batch mode is one visitor type that pairs the visited file with its
//! companions by relative path and records the outcome in a `BatchReport`.
//! A failing file never stops the pass.

pub mod report;
pub mod visitors;

#[cfg(test)]
mod tests;

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::PatchConfig;
use crate::error::PatchError;

pub use self::report::{BatchReport, FileOutcome};
pub use self::visitors::{ApplyVisitor, CompareVisitor, CreateVisitor};

/// Callbacks invoked by `traverse`.
pub trait Visitor {
    fn on_directory(&mut self, path: &Path, depth: usize);
    fn on_file(&mut self, path: &Path, depth: usize);
}

/// Calls `on_directory` for `root` at depth 0, then walks its children in
/// sorted order: directories recurse at `depth + 1`, files get `on_file` at
/// `depth + 1`.
///
/// # Errors
/// `NotFound` if `root` is missing, `Io` if a directory cannot be listed.
pub fn traverse<V: Visitor + ?Sized>(root: &Path, visitor: &mut V) -> Result<(), PatchError> {
    if !root.is_dir() {
        return Err(PatchError::NotFound(root.to_path_buf()));
    }
    walk(root, 0, visitor)
}

fn walk<V: Visitor + ?Sized>(path: &Path, depth: usize, visitor: &mut V) -> Result<(), PatchError> {
    visitor.on_directory(path, depth);
    let mut children = fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<PathBuf>, _>>()?;
    children.sort();
    for child in children {
        if child.is_dir() {
            walk(&child, depth + 1, visitor)?;
        } else {
            visitor.on_file(&child, depth + 1);
        }
    }
    Ok(())
}

/// Writes a patch for every modified file that has an original.
pub fn create_patch_tree(
    original_root: &Path,
    modified_root: &Path,
    patch_root: &Path,
    config: &PatchConfig,
) -> Result<BatchReport, PatchError> {
    let mut visitor = CreateVisitor {
        original_root: original_root.to_path_buf(),
        modified_root: modified_root.to_path_buf(),
        patch_root: patch_root.to_path_buf(),
        config,
        report: BatchReport::default(),
    };
    traverse(modified_root, &mut visitor)?;
    visitor.report.print_summary();
    Ok(visitor.report)
}

/// Applies every patch under `patch_root`, writing into `output_root`. With a
/// `modified_root`, results are verified against it.
pub fn apply_patch_tree(
    original_root: &Path,
    patch_root: &Path,
    output_root: &Path,
    modified_root: Option<&Path>,
    config: &PatchConfig,
) -> Result<BatchReport, PatchError> {
    let mut visitor = ApplyVisitor {
        original_root: original_root.to_path_buf(),
        patch_root: patch_root.to_path_buf(),
        output_root: output_root.to_path_buf(),
        modified_root: modified_root.map(Path::to_path_buf),
        config,
        report: BatchReport::default(),
    };
    traverse(patch_root, &mut visitor)?;
    visitor.report.print_summary();
    Ok(visitor.report)
}

/// Compares every file under `reference_root` with its counterpart.
pub fn compare_tree(
    reference_root: &Path,
    other_root: &Path,
    config: &PatchConfig,
) -> Result<BatchReport, PatchError> {
    let mut visitor = CompareVisitor {
        reference_root: reference_root.to_path_buf(),
        other_root: other_root.to_path_buf(),
        config,
        report: BatchReport::default(),
    };
    traverse(reference_root, &mut visitor)?;
    visitor.report.print_summary();
    Ok(visitor.report)
}
