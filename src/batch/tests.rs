use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array3;

use super::*;
use crate::config::PatchConfig;
use crate::filters::FilterKind;
use crate::pipeline::{read_image, write_image};
use crate::types::{BitDepth, Image};

// Test Helpers
fn textured(salt: usize) -> Image {
    let samples = Array3::from_shape_fn((6, 5, 3), |(y, x, c)| ((y * 53 + x * 29 + c * 11 + salt * 17) % 256) as u16);
    Image::new(samples, BitDepth::Eight).unwrap()
}

struct Recorder {
    events: Vec<(String, usize)>,
}

impl Visitor for Recorder {
    fn on_directory(&mut self, path: &Path, depth: usize) {
        let name = path.file_name().unwrap().to_string_lossy();
        self.events.push((format!("dir:{}", name), depth));
    }

    fn on_file(&mut self, path: &Path, depth: usize) {
        let name = path.file_name().unwrap().to_string_lossy();
        self.events.push((format!("file:{}", name), depth));
    }
}

/// original/{a.png, sub/b.png}, modified/{a.png, sub/b.png, sub/orphan.png, notes.txt}
fn build_trees(root: &Path) -> (PathBuf, PathBuf) {
    let original = root.join("original");
    let modified = root.join("modified");
    write_image(&original.join("a.png"), &textured(1)).unwrap();
    write_image(&original.join("sub/b.png"), &textured(2)).unwrap();
    write_image(&modified.join("a.png"), &textured(3)).unwrap();
    write_image(&modified.join("sub/b.png"), &textured(4)).unwrap();
    write_image(&modified.join("sub/orphan.png"), &textured(5)).unwrap();
    fs::write(modified.join("notes.txt"), "not an image").unwrap();
    (original, modified)
}

#[test]
fn test_traverse_is_sorted_and_depth_aware() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir_all(root.join("b_dir/inner")).unwrap();
    fs::write(root.join("c.txt"), "").unwrap();
    fs::write(root.join("a.txt"), "").unwrap();
    fs::write(root.join("b_dir/inner/deep.txt"), "").unwrap();

    let mut recorder = Recorder { events: Vec::new() };
    traverse(&root, &mut recorder).unwrap();

    let expected = vec![
        ("dir:tree".to_string(), 0),
        ("file:a.txt".to_string(), 1),
        ("dir:b_dir".to_string(), 1),
        ("dir:inner".to_string(), 2),
        ("file:deep.txt".to_string(), 3),
        ("file:c.txt".to_string(), 1),
    ];
    assert_eq!(recorder.events, expected);
}

#[test]
fn test_traverse_missing_root_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut recorder = Recorder { events: Vec::new() };
    let err = traverse(&dir.path().join("nope"), &mut recorder).unwrap_err();
    assert!(err.is_not_found());
    assert!(recorder.events.is_empty());
}

#[test]
fn test_missing_original_is_a_single_warning() {
    let dir = tempfile::tempdir().unwrap();
    let (original, modified) = build_trees(dir.path());
    let patches = dir.path().join("patches");
    let config = PatchConfig::default();

    let report = create_patch_tree(&original, &modified, &patches, &config).unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].0.ends_with("sub/orphan.png"));
    assert!(report.failures.is_empty());
    assert!(patches.join("a.png").is_file());
    assert!(patches.join("sub/b.png").is_file());
    assert!(!patches.join("sub/orphan.png").exists());
    assert!(!patches.join("notes.txt").exists());
}

#[test]
fn test_create_then_apply_tree_verifies_against_modified() {
    let dir = tempfile::tempdir().unwrap();
    let (original, modified) = build_trees(dir.path());
    let patches = dir.path().join("patches");
    let output = dir.path().join("patched");
    let config = PatchConfig {
        filters: vec![FilterKind::RollHorizontal, FilterKind::RollVertical],
        ..PatchConfig::default()
    };

    create_patch_tree(&original, &modified, &patches, &config).unwrap();
    let report = apply_patch_tree(&original, &patches, &output, Some(&modified), &config).unwrap();

    assert_eq!(report.succeeded, 2);
    assert!(report.is_clean());
    assert_eq!(
        read_image(&output.join("sub/b.png")).unwrap(),
        read_image(&modified.join("sub/b.png")).unwrap()
    );
}

#[test]
fn test_apply_tree_records_a_failure_and_keeps_going() {
    let dir = tempfile::tempdir().unwrap();
    let (original, modified) = build_trees(dir.path());
    let patches = dir.path().join("patches");
    let output = dir.path().join("patched");
    let config = PatchConfig::default();
    create_patch_tree(&original, &modified, &patches, &config).unwrap();

    // A plain image is not a container.
    write_image(&patches.join("a.png"), &textured(9)).unwrap();

    let report = apply_patch_tree(&original, &patches, &output, None, &config).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].0.ends_with("a.png"));
    assert_eq!(report.succeeded, 1);
    assert!(output.join("sub/b.png").is_file());
}

#[test]
fn test_compare_tree_reports_mismatches() {
    let dir = tempfile::tempdir().unwrap();
    let (original, modified) = build_trees(dir.path());
    let config = PatchConfig::default();

    let same = compare_tree(&original, &original, &config).unwrap();
    assert_eq!(same.succeeded, 2);
    assert!(same.is_clean());

    let different = compare_tree(&original, &modified, &config).unwrap();
    assert_eq!(different.mismatches.len(), 2);
    assert_eq!(different.visited(), 2);
}
