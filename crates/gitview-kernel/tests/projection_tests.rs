//! End-to-end tests against real git repositories.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::{Oid, Repository, Signature};
use gitview_kernel::store::GitStore;
use gitview_kernel::vfs::{Filesystem, ProjectionVfs};
use gitview_kernel::{BufferSink, Diagnostics, ProjectionFs, RootSpec, Severity};
use gitview_types::{FileKind, FsStatus, S_IFDIR, S_IFREG};
use rstest::rstest;
use tempfile::TempDir;

/// A file to put in a fixture tree: (path, raw mode, content).
type Fixture<'a> = &'a [(&'a str, i32, &'a [u8])];

/// Write a nested tree for `files` and return its id.
fn write_tree(repo: &Repository, files: Fixture<'_>) -> Oid {
    let mut here = repo.treebuilder(None).unwrap();
    let mut subdirs: Vec<(&str, Vec<(&str, i32, &[u8])>)> = Vec::new();

    for (path, mode, content) in files {
        match path.split_once('/') {
            None => {
                let blob = repo.blob(content).unwrap();
                here.insert(*path, blob, *mode).unwrap();
            }
            Some((dir, rest)) => match subdirs.iter_mut().find(|(d, _)| *d == dir) {
                Some((_, entries)) => entries.push((rest, *mode, *content)),
                None => subdirs.push((dir, vec![(rest, *mode, *content)])),
            },
        }
    }
    for (dir, entries) in subdirs {
        let sub = write_tree(repo, &entries);
        here.insert(dir, sub, 0o040000).unwrap();
    }
    here.write().unwrap()
}

/// Commit `files` as a root commit and point `refname` at it, moving it if needed.
fn commit(repo: &Repository, refname: &str, files: Fixture<'_>) -> Oid {
    let tree_id = write_tree(repo, files);
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::now("Test User", "test@example.com").unwrap();
    let commit = repo.commit(None, &sig, &sig, "fixture", &tree, &[]).unwrap();
    if refname == "HEAD" {
        repo.set_head_detached(commit).unwrap();
    } else {
        repo.reference(refname, commit, true, "fixture").unwrap();
    }
    tree_id
}

struct TestRepo {
    dir: TempDir,
    fs: ProjectionFs,
    sink: Arc<BufferSink>,
}

impl TestRepo {
    fn new(files: Fixture<'_>) -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit(&repo, "HEAD", files);
        Self::open(dir, &RootSpec::default())
    }

    fn open(dir: TempDir, spec: &RootSpec) -> Self {
        let sink = Arc::new(BufferSink::new());
        let store = GitStore::open(dir.path()).unwrap();
        let fs = ProjectionFs::open(Arc::new(store), spec, Diagnostics::with_sink(sink.clone()))
            .unwrap();
        Self { dir, fs, sink }
    }

    fn object_path(&self, id: Oid) -> PathBuf {
        let hex = id.to_string();
        self.dir
            .path()
            .join(".git/objects")
            .join(&hex[..2])
            .join(&hex[2..])
    }
}

const SCENARIO: Fixture<'static> = &[
    ("docs/readme.txt", 0o100644, b"read me\n"),
    ("run.sh", 0o100755, b"#!/bin/sh\necho run\n"),
];

#[test]
fn scenario_docs_and_run_sh() {
    let repo = TestRepo::new(SCENARIO);

    let listing: Vec<_> = repo
        .fs
        .list_directory("")
        .unwrap()
        .into_iter()
        .map(|e| (e.name.clone(), e.mode()))
        .collect();
    assert_eq!(
        listing,
        vec![
            ("docs".to_string(), S_IFDIR | 0o555),
            ("run.sh".to_string(), S_IFREG | 0o555),
        ]
    );

    let readme = repo.fs.get_attributes("docs/readme.txt").unwrap();
    assert_eq!(readme.kind, FileKind::RegularFile);
    assert_eq!(readme.perm, 0o444);
    assert_eq!(readme.size, 8);

    assert_eq!(
        repo.fs.resolve("docs/missing.txt").unwrap_err().status(),
        FsStatus::NotFound
    );
    assert_eq!(repo.fs.resolve("run.sh/x").unwrap_err().status(), FsStatus::NotFound);
    assert!(repo.sink.records().is_empty());
}

#[rstest]
#[case::plain("docs/readme.txt")]
#[case::trailing_newline("../elsewhere\n")]
#[case::spaces("a dir/with spaces")]
#[case::absolute("/usr/bin/env")]
#[case::unicode("données/ファイル")]
fn symlink_round_trip(#[case] target: &str) {
    let repo = TestRepo::new(&[("link", 0o120000, target.as_bytes())]);

    assert_eq!(repo.fs.read_symlink("link").unwrap(), PathBuf::from(target));
    let attr = repo.fs.get_attributes("link").unwrap();
    assert_eq!(attr.kind, FileKind::Symlink);
    assert_eq!(attr.size, target.len() as u64);
}

#[test]
fn listing_and_getattr_agree() {
    let repo = TestRepo::new(&[
        ("a/b/c.txt", 0o100644, b"c"),
        ("a/tool", 0o100755, b"t"),
        ("a/link", 0o120000, b"b/c.txt"),
        ("top.txt", 0o100644, b"top"),
    ]);

    let mut stack = vec![String::new()];
    let mut seen = 0;
    while let Some(dir) = stack.pop() {
        for entry in repo.fs.list_directory(&dir).unwrap() {
            let path = if dir.is_empty() {
                entry.name.clone()
            } else {
                format!("{}/{}", dir, entry.name)
            };
            let attr = repo.fs.get_attributes(&path).unwrap();
            assert_eq!(attr.mode(), entry.mode(), "{}", path);
            if entry.is_dir() {
                stack.push(path);
            }
            seen += 1;
        }
    }
    assert_eq!(seen, 6);
}

#[test]
fn missing_subtree_fails_only_that_directory() {
    let repo = TestRepo::new(SCENARIO);
    let git = Repository::open(repo.dir.path()).unwrap();
    let root = git.head().unwrap().peel_to_tree().unwrap();
    let docs = root.get_name("docs").unwrap().id();
    std::fs::remove_file(repo.object_path(docs)).unwrap();

    // Lazy: the root listing never reads `docs`.
    assert_eq!(repo.fs.list_directory("").unwrap().len(), 2);
    assert!(repo.fs.get_attributes("docs").unwrap().is_dir());

    let err = repo.fs.list_directory("docs").unwrap_err();
    assert_eq!(err.status(), FsStatus::Io);
    assert!(err.is_unexpected());
    let err = repo.fs.get_attributes("docs/readme.txt").unwrap_err();
    assert_eq!(err.status(), FsStatus::Io);

    assert_eq!(repo.sink.count(Severity::Unexpected), 2);
    assert!(repo.fs.open_file("run.sh").is_ok());
}

#[test]
fn submodule_is_hidden() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let tree_id = {
        let blob = repo.blob(b"x").unwrap();
        let mut builder = repo.treebuilder(None).unwrap();
        builder.insert("file", blob, 0o100644).unwrap();
        // A gitlink points at a commit in another repository.
        let foreign = Oid::from_str("0123456789abcdef0123456789abcdef01234567").unwrap();
        builder.insert("vendor", foreign, 0o160000).unwrap();
        builder.write().unwrap()
    };
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::now("Test User", "test@example.com").unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "submodule", &tree, &[])
        .unwrap();
    drop(tree);

    let repo = TestRepo::open(dir, &RootSpec::default());
    let names: Vec<_> = repo
        .fs
        .list_directory("")
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["file"]);
    assert_eq!(
        repo.fs.get_attributes("vendor").unwrap_err().status(),
        FsStatus::NotFound
    );
    assert_eq!(repo.sink.count(Severity::Skipped), 2);
    assert_eq!(repo.sink.count(Severity::Unexpected), 0);
}

#[test]
fn refs_projection_pins_tips() {
    let dir = TempDir::new().unwrap();
    let git = Repository::init(dir.path()).unwrap();
    commit(&git, "refs/heads/main", &[("v", 0o100644, b"one")]);
    commit(&git, "refs/heads/feature/x", &[("v", 0o100644, b"feature")]);
    commit(&git, "refs/tags/v1", &[("v", 0o100644, b"tagged")]);

    let repo = TestRepo::open(
        dir,
        &RootSpec::Refs(vec!["refs/heads/*".into(), "v1".into()]),
    );

    // Advance main after the projection exists.
    commit(&git, "refs/heads/main", &[("v", 0o100644, b"two")]);

    let read = |path: &str| repo.fs.open_file(path).unwrap().read_all().unwrap();
    assert_eq!(read("refs/heads/main/v"), b"one");
    assert_eq!(read("refs/heads/feature/x/v"), b"feature");
    assert_eq!(read("refs/tags/v1/v"), b"tagged");

    let heads: Vec<_> = repo
        .fs
        .list_directory("refs/heads")
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(heads, vec!["feature", "main"]);
}

#[test]
fn unresolvable_root_cannot_be_built() {
    let dir = TempDir::new().unwrap();
    Repository::init(dir.path()).unwrap();
    let store = GitStore::open(dir.path()).unwrap();

    // Unborn HEAD: nothing to project.
    let err = ProjectionFs::open(Arc::new(store), &RootSpec::default(), Diagnostics::new())
        .unwrap_err();
    assert_eq!(err.status(), FsStatus::Io);
    assert!(err.is_unexpected());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn vfs_concurrent_reads() {
    let repo = TestRepo::new(SCENARIO);
    let vfs = ProjectionVfs::new(Arc::new(repo.fs));

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let vfs = vfs.clone();
            tokio::spawn(async move {
                if i % 2 == 0 {
                    vfs.read(Path::new("/docs/readme.txt")).await.unwrap()
                } else {
                    vfs.read(Path::new("/run.sh")).await.unwrap()
                }
            })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let data = task.await.unwrap();
        if i % 2 == 0 {
            assert_eq!(data, b"read me\n");
        } else {
            assert_eq!(data, b"#!/bin/sh\necho run\n");
        }
    }
}
