//! Unit tests for the module locator.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

struct SearchTree {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl SearchTree {
    fn file(&self, relative: &str) -> Utf8PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directories");
        }
        fs::write(&path, b"module").expect("write module file");
        path
    }

    fn directory(&self, relative: &str) -> Utf8PathBuf {
        let path = self.root.join(relative);
        fs::create_dir_all(&path).expect("create directory");
        path
    }
}

#[fixture]
fn tree() -> SearchTree {
    let dir = TempDir::new().expect("create temporary directory");
    let root = Utf8Path::from_path(dir.path())
        .expect("temporary directory is UTF-8")
        .to_owned();
    SearchTree { _dir: dir, root }
}

fn locator() -> ModuleLocator {
    ModuleLocator::with_extension("so")
}

#[rstest]
fn finds_module_in_child_directory(tree: SearchTree) {
    let expected = tree.file("bin/SampleLib.so");
    let found = locator().find(&tree.root, "SampleLib").expect("module found");
    assert_eq!(found, expected);
}

#[rstest]
fn finds_deeply_nested_module(tree: SearchTree) {
    let expected = tree.file("a/b/c/SampleLib.so");
    let found = locator().find(&tree.root, "SampleLib").expect("module found");
    assert_eq!(found, expected);
}

#[rstest]
fn file_name_comparison_ignores_case(tree: SearchTree) {
    let expected = tree.file("bin/samplelib.SO");
    let found = locator().find(&tree.root, "SampleLib").expect("module found");
    assert_eq!(found, expected);
}

#[rstest]
fn module_directly_in_root_is_not_found(tree: SearchTree) {
    tree.file("SampleLib.so");
    tree.directory("empty");
    let error = locator()
        .find(&tree.root, "SampleLib")
        .expect_err("root is never scanned");
    assert!(matches!(error, LocateError::NotFound { .. }), "{error:?}");
}

#[rstest]
fn missing_module_reports_not_found(tree: SearchTree) {
    tree.file("bin/Other.so");
    let error = locator()
        .find(&tree.root, "SampleLib")
        .expect_err("module is absent");
    let LocateError::NotFound { module, root } = error else {
        panic!("expected NotFound, got {error:?}");
    };
    assert_eq!(module, "SampleLib");
    assert_eq!(root, tree.root);
}

#[rstest]
fn other_extensions_are_ignored(tree: SearchTree) {
    tree.file("bin/SampleLib.dll");
    tree.file("bin/SampleLib.so.bak");
    let error = locator()
        .find(&tree.root, "SampleLib")
        .expect_err("extension does not match");
    assert!(matches!(error, LocateError::NotFound { .. }), "{error:?}");
}

#[rstest]
fn directory_named_like_module_is_descended(tree: SearchTree) {
    let expected = tree.file("bin/SampleLib.so/inner/SampleLib.so");
    let found = locator().find(&tree.root, "SampleLib").expect("module found");
    assert_eq!(found, expected);
}

#[rstest]
fn siblings_are_visited_in_lexicographic_order(tree: SearchTree) {
    tree.file("zeta/SampleLib.so");
    let expected = tree.file("alpha/SampleLib.so");
    tree.file("mid/SampleLib.so");
    let found = locator().find(&tree.root, "SampleLib").expect("module found");
    assert_eq!(found, expected);
}

#[rstest]
fn depth_first_match_wins_over_later_sibling(tree: SearchTree) {
    let expected = tree.file("a/deep/SampleLib.so");
    tree.file("b/SampleLib.so");
    let found = locator().find(&tree.root, "SampleLib").expect("module found");
    assert_eq!(found, expected);
}

#[rstest]
#[cfg_attr(
    any(target_os = "macos", target_os = "windows"),
    ignore = "requires a case-sensitive filesystem"
)]
fn several_matches_in_one_directory_are_ambiguous(tree: SearchTree) {
    let first = tree.file("bin/SampleLib.so");
    let second = tree.file("bin/samplelib.so");
    let error = locator()
        .find(&tree.root, "SampleLib")
        .expect_err("two candidates");
    let LocateError::Ambiguous {
        directory,
        candidates,
        ..
    } = &error
    else {
        panic!("expected Ambiguous, got {error:?}");
    };
    assert_eq!(directory, &tree.root.join("bin"));
    assert_eq!(candidates.len(), 2);
    assert!(candidates.contains(&first) && candidates.contains(&second));
    assert!(error.to_string().contains("2 candidates"), "{error}");
}

#[rstest]
#[cfg(unix)]
fn symlinked_directories_are_not_followed(tree: SearchTree) {
    let outside = TempDir::new().expect("create second directory");
    let target = outside.path().join("lib");
    fs::create_dir_all(&target).expect("create target directory");
    fs::write(target.join("SampleLib.so"), b"module").expect("write module file");
    std::os::unix::fs::symlink(&target, tree.root.join("linked")).expect("create symlink");

    let error = locator()
        .find(&tree.root, "SampleLib")
        .expect_err("symlink is not traversed");
    assert!(matches!(error, LocateError::NotFound { .. }), "{error:?}");
}

#[test]
fn missing_root_reports_io_error() {
    let error = locator()
        .find(Utf8Path::new("/definitely/not/a/real/root"), "SampleLib")
        .expect_err("root does not exist");
    assert!(matches!(error, LocateError::Io { .. }), "{error:?}");
}

#[test]
fn default_locator_uses_platform_extension() {
    let locator = ModuleLocator::new();
    assert_eq!(locator.extension(), std::env::consts::DLL_EXTENSION);
    assert_eq!(
        locator.file_name("SampleLib"),
        format!("SampleLib.{}", std::env::consts::DLL_EXTENSION)
    );
}

#[test]
fn ambiguity_message_lists_every_candidate() {
    let error = LocateError::Ambiguous {
        module: "SampleLib".to_owned(),
        root: Utf8PathBuf::from("/srv"),
        directory: Utf8PathBuf::from("/srv/bin"),
        candidates: vec![
            Utf8PathBuf::from("/srv/bin/SampleLib.so"),
            Utf8PathBuf::from("/srv/bin/samplelib.so"),
        ],
    };
    assert_eq!(
        error.to_string(),
        "module 'SampleLib' is ambiguous below '/srv': '/srv/bin' holds 2 candidates \
         (/srv/bin/SampleLib.so, /srv/bin/samplelib.so)"
    );
}
