use treescope_core::scanner::progress::ScanProgress;
/// End-to-end tree-building tests.
///
/// These tests exercise the real `TreeBuilder` and `start_scan` code paths
/// against a real temporary filesystem, verifying that the builder
/// enumerates every directory exactly once, keeps sizes exact, degrades
/// unreadable directories, and terminates on symlink cycles.
use treescope_core::analysis::{flat_report, total_size, SizeIndex, SortKey};
use treescope_core::scanner::start_scan;
use treescope_core::{DirectoryNode, NodeStatus, ScanError, ScanOptions, TreeBuilder};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Create a reproducible directory tree:
///
/// ```text
/// root/
///   alpha/
///     a.txt   (100 bytes)
///     b.rs    (200 bytes)
///     inner/
///       deep/
///         e.log (50 bytes)
///   beta/
///     c.png   (300 bytes)
///   empty/
///   d.zip     (400 bytes)
/// ```
///
/// 6 directories, 1 050 file bytes.
fn build_test_tree(root: &Path) {
    let alpha = root.join("alpha");
    let beta = root.join("beta");
    fs::create_dir_all(alpha.join("inner").join("deep")).unwrap();
    fs::create_dir_all(&beta).unwrap();
    fs::create_dir_all(root.join("empty")).unwrap();

    write_bytes(&alpha.join("a.txt"), 100);
    write_bytes(&alpha.join("b.rs"), 200);
    write_bytes(&alpha.join("inner").join("deep").join("e.log"), 50);
    write_bytes(&beta.join("c.png"), 300);
    write_bytes(&root.join("d.zip"), 400);
}

fn write_bytes(path: &Path, n: usize) {
    let mut f = fs::File::create(path).unwrap();
    f.write_all(&vec![0u8; n]).unwrap();
}

fn builder() -> TreeBuilder {
    let options = ScanOptions {
        max_workers: 4,
        ..ScanOptions::default()
    };
    TreeBuilder::new(&options).expect("failed to create builder")
}

/// Sum every file size below `dir` with plain `std::fs`, independent of the
/// code under test.
fn manual_total(dir: &Path) -> u64 {
    let mut total = 0;
    for entry in fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        let meta = entry.metadata().unwrap();
        if meta.is_dir() {
            total += manual_total(&entry.path());
        } else {
            total += meta.len();
        }
    }
    total
}

/// A comparable, order-independent summary of a tree.
fn shape(tree: &DirectoryNode) -> Vec<(PathBuf, Vec<(String, u64)>)> {
    let mut out: Vec<_> = tree
        .flatten()
        .map(|n| {
            let mut files: Vec<_> = n
                .files()
                .iter()
                .map(|f| (f.name.to_string(), f.size))
                .collect();
            files.sort();
            (n.path().to_path_buf(), files)
        })
        .collect();
    out.sort();
    out
}

/// Give `wide00..` each an `alias` link to `root/target`.
#[cfg(unix)]
fn link_into(root: &Path, target: &str, count: usize) {
    for i in 0..count {
        let link = root.join(format!("wide{i:02}")).join("alias");
        std::os::unix::fs::symlink(root.join(target), link).unwrap();
    }
}

#[cfg(not(unix))]
fn link_into(_root: &Path, _target: &str, _count: usize) {}

/// Whether permission bits are actually enforced for this process.
#[cfg(unix)]
fn permissions_enforced(locked: &Path) -> bool {
    fs::read_dir(locked).is_err()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// Every directory appears exactly once in the flattened tree.
#[test]
fn flatten_yields_each_directory_once() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_test_tree(tmp.path());

    let tree = builder().build(tmp.path()).unwrap();
    let paths: Vec<PathBuf> = tree.flatten().map(|n| n.path().to_path_buf()).collect();
    let unique: HashSet<&PathBuf> = paths.iter().collect();

    assert_eq!(paths.len(), 6);
    assert_eq!(unique.len(), 6);
    assert!(paths.contains(&tmp.path().join("empty")));
    assert!(tree.flatten().all(|n| n.status() == NodeStatus::Ok));
}

/// The aggregated total matches an independent walk.
#[test]
fn total_size_matches_manual_traversal() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_test_tree(tmp.path());

    let tree = builder().build(tmp.path()).unwrap();
    let index = SizeIndex::compute(&tree);

    assert_eq!(index.total_size(), 1_050);
    assert_eq!(index.total_size(), manual_total(tmp.path()));
    assert_eq!(total_size(&tree), index.total_size());
    assert!(!index.root().incomplete);
}

/// `/r/a` (f1 = 10) and `/r/b` (f2 = 20) give a total of 30 over 3 nodes.
#[test]
fn two_sibling_scenario() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    fs::create_dir(tmp.path().join("a")).unwrap();
    fs::create_dir(tmp.path().join("b")).unwrap();
    write_bytes(&tmp.path().join("a").join("f1"), 10);
    write_bytes(&tmp.path().join("b").join("f2"), 20);

    let tree = builder().build(tmp.path()).unwrap();
    assert_eq!(total_size(&tree), 30);

    let mut paths: Vec<PathBuf> = tree.flatten().map(|n| n.path().to_path_buf()).collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            tmp.path().to_path_buf(),
            tmp.path().join("a"),
            tmp.path().join("b")
        ]
    );
}

/// Sorting by own size puts the 500-byte directory first.
#[test]
fn flat_report_sorted_by_own_size() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    for (name, size) in [("five", 5), ("fifty", 50), ("five_hundred", 500)] {
        fs::create_dir(tmp.path().join(name)).unwrap();
        write_bytes(&tmp.path().join(name).join("data.bin"), size);
    }

    let tree = builder().build(tmp.path()).unwrap();
    let index = SizeIndex::compute(&tree);
    let rows = flat_report(&index, SortKey::OwnSize);

    assert_eq!(rows[0].path, tmp.path().join("five_hundred"));
    assert_eq!(rows[0].own_size, 500);
    assert_eq!(rows[1].own_size, 50);
    assert_eq!(rows[2].own_size, 5);
}

/// Two builds of an unchanged tree are structurally identical, links to
/// a real directory included.
#[test]
fn rebuild_is_deterministic() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_test_tree(tmp.path());
    for i in 0..20 {
        let dir = tmp.path().join(format!("wide{i:02}"));
        fs::create_dir(&dir).unwrap();
        write_bytes(&dir.join("x.bin"), i * 3);
    }

    link_into(tmp.path(), "alpha", 4);

    let first = builder().build(tmp.path()).unwrap();
    let second = builder().build(tmp.path()).unwrap();

    assert_eq!(shape(&first), shape(&second));
    assert_eq!(total_size(&first), total_size(&second));
    // read_dir order is stable for an unchanged directory, so the trees
    // are equal node for node.
    assert_eq!(first, second);
}

/// Building a missing root or a file fails before any work starts.
#[test]
fn invalid_root_is_reported() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    write_bytes(&tmp.path().join("file.txt"), 1);

    let missing = builder().build(&tmp.path().join("nope"));
    assert!(matches!(missing, Err(ScanError::InvalidRoot { .. })));

    let not_dir = builder().build(&tmp.path().join("file.txt"));
    assert!(matches!(not_dir, Err(ScanError::InvalidRoot { .. })));

    let via_handle = start_scan(tmp.path().join("nope"), &ScanOptions::default());
    assert!(matches!(via_handle, Err(ScanError::InvalidRoot { .. })));
}

/// A symlink cycle terminates and no canonical path is entered twice.
#[cfg(unix)]
#[test]
fn symlink_cycle_terminates() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_test_tree(tmp.path());
    std::os::unix::fs::symlink(tmp.path(), tmp.path().join("alpha").join("back_to_root")).unwrap();
    std::os::unix::fs::symlink(tmp.path().join("alpha"), tmp.path().join("beta").join("to_alpha"))
        .unwrap();

    let tree = builder().build(tmp.path()).unwrap();

    let entered: Vec<PathBuf> = tree
        .flatten()
        .filter(|n| n.status() == NodeStatus::Ok)
        .map(|n| fs::canonicalize(n.path()).unwrap())
        .collect();
    let unique: HashSet<&PathBuf> = entered.iter().collect();
    assert_eq!(entered.len(), unique.len(), "a canonical path was entered twice");
    assert_eq!(entered.len(), 6);

    // Real directories keep their contents; both links are leaves.
    let status_of = |p: PathBuf| {
        tree.flatten()
            .find(|n| n.path() == p.as_path())
            .map(|n| n.status())
    };
    assert_eq!(status_of(tmp.path().join("alpha")), Some(NodeStatus::Ok));
    assert_eq!(
        status_of(tmp.path().join("alpha").join("back_to_root")),
        Some(NodeStatus::AlreadyVisited)
    );
    assert_eq!(
        status_of(tmp.path().join("beta").join("to_alpha")),
        Some(NodeStatus::AlreadyVisited)
    );
    // Files are never double counted.
    assert_eq!(total_size(&tree), 1_050);
}

/// Many links to one real directory never take it over, however the
/// workers are scheduled.
#[cfg(unix)]
#[test]
fn aliased_links_never_own_the_real_directory() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let real = tmp.path().join("real");
    fs::create_dir_all(real.join("deep")).unwrap();
    write_bytes(&real.join("f.bin"), 70);
    write_bytes(&real.join("deep").join("g.bin"), 30);
    for i in 0..8 {
        let holder = tmp.path().join(format!("x{i}"));
        fs::create_dir(&holder).unwrap();
        std::os::unix::fs::symlink(&real, holder.join("alias")).unwrap();
    }

    let options = ScanOptions {
        max_workers: 8,
        ..ScanOptions::default()
    };
    let b = TreeBuilder::new(&options).unwrap();
    let first = b.build(tmp.path()).unwrap();

    let owner = first
        .flatten()
        .find(|n| n.path() == real.as_path())
        .expect("real directory missing");
    assert_eq!(owner.status(), NodeStatus::Ok);
    assert_eq!(total_size(owner), 100);
    let aliases: Vec<&DirectoryNode> = first
        .flatten()
        .filter(|n| n.path().ends_with("alias"))
        .collect();
    assert_eq!(aliases.len(), 8);
    assert!(aliases
        .iter()
        .all(|n| n.status() == NodeStatus::AlreadyVisited));

    for _ in 0..40 {
        assert_eq!(b.build(tmp.path()).unwrap(), first);
    }
}

/// Of two links into the same outside tree, the one reaching its top owns
/// it, whichever is listed first.
#[cfg(unix)]
#[test]
fn outside_links_claim_the_shallower_target() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let out = TempDir::new().expect("failed to create temp dir");
    fs::create_dir(out.path().join("inner")).unwrap();
    write_bytes(&out.path().join("o.bin"), 5);
    write_bytes(&out.path().join("inner").join("i.bin"), 7);
    fs::create_dir(tmp.path().join("a")).unwrap();
    fs::create_dir(tmp.path().join("b")).unwrap();
    std::os::unix::fs::symlink(out.path().join("inner"), tmp.path().join("a").join("l1")).unwrap();
    std::os::unix::fs::symlink(out.path(), tmp.path().join("b").join("l2")).unwrap();

    let tree = builder().build(tmp.path()).unwrap();
    let l1 = tmp.path().join("a").join("l1");
    let l2 = tmp.path().join("b").join("l2");
    let find = |p: &Path| tree.flatten().find(|n| n.path() == p).unwrap();

    assert_eq!(find(l1.as_path()).status(), NodeStatus::AlreadyVisited);
    assert_eq!(find(l2.as_path()).status(), NodeStatus::Ok);
    assert_eq!(find(&*l2.join("inner")).status(), NodeStatus::Ok);
    assert_eq!(total_size(&tree), 12);
}

/// With link following disabled, directory symlinks are plain entries.
#[cfg(unix)]
#[test]
fn no_follow_links_skips_symlinked_dirs() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_test_tree(tmp.path());
    std::os::unix::fs::symlink(tmp.path(), tmp.path().join("loop")).unwrap();

    let options = ScanOptions {
        follow_links: false,
        ..ScanOptions::default()
    };
    let tree = TreeBuilder::new(&options).unwrap().build(tmp.path()).unwrap();
    assert_eq!(tree.count_nodes(), 6);
    assert!(tree.files().iter().any(|f| f.name == "loop"));
}

/// An unreadable directory is kept, empty, and contributes nothing.
#[cfg(unix)]
#[test]
fn access_denied_directory_is_degraded() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().expect("failed to create temp dir");
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    fs::create_dir(&a).unwrap();
    fs::create_dir(&b).unwrap();
    write_bytes(&a.join("f1"), 10);
    write_bytes(&b.join("f2"), 20);
    fs::set_permissions(&a, fs::Permissions::from_mode(0o000)).unwrap();

    if !permissions_enforced(&a) {
        // Running with privileges that bypass permission bits.
        fs::set_permissions(&a, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = builder().build(tmp.path());
    fs::set_permissions(&a, fs::Permissions::from_mode(0o755)).unwrap();
    let tree = result.unwrap();

    let denied: Vec<&DirectoryNode> = tree
        .flatten()
        .filter(|n| n.path() == a.as_path())
        .collect();
    assert_eq!(denied.len(), 1);
    assert_eq!(denied[0].status(), NodeStatus::AccessDenied);
    assert!(denied[0].children().is_empty());
    assert!(denied[0].files().is_empty());

    let index = SizeIndex::compute(&tree);
    assert_eq!(index.total_size(), 20);
    assert!(index.root().incomplete);
    assert_eq!(index.degraded_count(), 1);
}

/// A link whose target cannot be read is kept as a file entry and leaves
/// its directory intact.
#[cfg(unix)]
#[test]
fn unreadable_link_target_does_not_degrade_parent() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().expect("failed to create temp dir");
    build_test_tree(tmp.path());
    let outside = TempDir::new().expect("failed to create temp dir");
    let secret = outside.path().join("secret");
    fs::create_dir_all(secret.join("inner")).unwrap();
    std::os::unix::fs::symlink(secret.join("inner"), tmp.path().join("peek")).unwrap();
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

    if !permissions_enforced(&secret) {
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = builder().build(tmp.path());
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o755)).unwrap();
    let tree = result.unwrap();

    assert_eq!(tree.status(), NodeStatus::Ok);
    assert_eq!(tree.count_nodes(), 6);
    assert!(tree.flatten().all(|n| n.status() == NodeStatus::Ok));
    assert!(tree.files().iter().any(|f| f.name == "d.zip"));
    assert!(tree.files().iter().any(|f| f.name == "peek"));
    assert!(!SizeIndex::compute(&tree).root().incomplete);
}

/// The background handle delivers a terminal message and the finished tree.
#[test]
fn start_scan_reports_progress_and_returns_tree() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_test_tree(tmp.path());

    let handle = start_scan(tmp.path().to_path_buf(), &ScanOptions::default()).unwrap();
    let rx = handle.progress_rx.clone();
    let tree = handle.wait().unwrap();

    let msgs: Vec<ScanProgress> = rx.try_iter().collect();
    match msgs.last() {
        Some(ScanProgress::Complete {
            dirs_found,
            files_found,
            degraded,
            ..
        }) => {
            assert_eq!(*dirs_found, 6);
            assert_eq!(*files_found, 5);
            assert_eq!(*degraded, 0);
        }
        other => panic!("expected Complete, got {other:?}"),
    }
    assert_eq!(tree.count_nodes(), 6);
}

/// Cancellation must end the build with either `Cancelled` or a finished
/// tree (the build may already be done when the flag is read).
#[test]
fn cancellation_stops_the_build() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_test_tree(tmp.path());

    let handle = start_scan(tmp.path().to_path_buf(), &ScanOptions::default()).unwrap();
    handle.cancel();
    assert!(handle.is_cancelled());

    let rx = handle.progress_rx.clone();
    match handle.wait() {
        Ok(tree) => assert_eq!(tree.count_nodes(), 6),
        Err(ScanError::Cancelled) => {
            assert!(rx.try_iter().any(|m| m == ScanProgress::Cancelled));
        }
        Err(other) => panic!("unexpected error: {other}"),
    }
}

/// Non-canonical roots are accepted and keep their spelling in node paths.
#[test]
fn non_canonical_root_paths_are_preserved() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_test_tree(tmp.path());
    let rel = tmp.path().join("alpha").join("..").join("beta");

    let tree = builder().build(&rel).unwrap();
    assert_eq!(tree.path(), rel.as_path());
    assert_eq!(total_size(&tree), 300);
}
