// crates/walk/tests/walk.rs
#![cfg(unix)]

use std::fs;
use std::path::PathBuf;

use filters::Matcher;
use tempfile::tempdir;
use walk::{walk, WalkEvent};

fn files_of(events: &[WalkEvent]) -> Vec<PathBuf> {
    events
        .iter()
        .filter_map(|e| match e {
            WalkEvent::File(f) => Some(f.path.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn walk_yields_dirs_and_regular_files() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir(root.join("dir")).unwrap();
    fs::write(root.join("dir/inner.txt"), b"hello").unwrap();
    fs::write(root.join("top.txt"), b"world").unwrap();
    std::os::unix::fs::symlink(root.join("top.txt"), root.join("link.txt")).unwrap();

    let matcher = Matcher::default();
    let events: Vec<_> = walk(&[root.to_path_buf()], &matcher, false).collect();

    let dirs = events
        .iter()
        .filter(|e| matches!(e, WalkEvent::Directory(_)))
        .count();
    assert_eq!(dirs, 2, "root and dir");

    let files = files_of(&events);
    assert_eq!(files, vec![root.join("dir/inner.txt"), root.join("top.txt")]);
}

#[test]
fn excluded_directories_are_pruned_whole() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("keep")).unwrap();
    fs::create_dir_all(root.join("skip/sub")).unwrap();
    fs::write(root.join("keep/a"), b"a").unwrap();
    fs::write(root.join("skip/b"), b"b").unwrap();
    fs::write(root.join("skip/sub/c"), b"c").unwrap();

    let matcher = Matcher::new(&[], &["^skip$".to_string()]).unwrap();
    let events: Vec<_> = walk(&[root.to_path_buf()], &matcher, false).collect();

    assert_eq!(files_of(&events), vec![root.join("keep/a")]);
    let excluded = events
        .iter()
        .filter(|e| matches!(e, WalkEvent::ExcludedDir(_)))
        .count();
    assert_eq!(excluded, 1, "only the top of the pruned tree is reported");
}

#[test]
fn match_and_exclude_apply_to_basenames() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::write(root.join("a.iso"), b"x").unwrap();
    fs::write(root.join("b.iso"), b"x").unwrap();
    fs::write(root.join("c.txt"), b"x").unwrap();
    fs::write(root.join("b.iso.bak"), b"x").unwrap();

    let matcher = Matcher::new(&[r"\.iso$".to_string()], &[r"^b".to_string()]).unwrap();
    let events: Vec<_> = walk(&[root.to_path_buf()], &matcher, false).collect();

    assert_eq!(files_of(&events), vec![root.join("a.iso")]);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, WalkEvent::ExcludedFile(_)))
            .count(),
        2
    );
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, WalkEvent::UnmatchedFile(_)))
            .count(),
        1
    );
}

#[test]
fn multiple_roots_preserve_argument_order() {
    let tmp = tempdir().unwrap();
    let one = tmp.path().join("one");
    let two = tmp.path().join("two");
    fs::create_dir(&one).unwrap();
    fs::create_dir(&two).unwrap();
    fs::write(one.join("f"), b"1").unwrap();
    fs::write(two.join("f"), b"2").unwrap();

    let matcher = Matcher::default();
    let files = files_of(&walk(&[two.clone(), one.clone()], &matcher, false).collect::<Vec<_>>());
    assert_eq!(files, vec![two.join("f"), one.join("f")]);
}

#[test]
fn walk_is_deterministic() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    for name in ["zeta", "alpha", "mid"] {
        fs::write(root.join(name), name.as_bytes()).unwrap();
    }

    let matcher = Matcher::default();
    let first = files_of(&walk(&[root.to_path_buf()], &matcher, false).collect::<Vec<_>>());
    let second = files_of(&walk(&[root.to_path_buf()], &matcher, false).collect::<Vec<_>>());
    assert_eq!(first, second);
    assert_eq!(
        first,
        vec![root.join("alpha"), root.join("mid"), root.join("zeta")]
    );
}
