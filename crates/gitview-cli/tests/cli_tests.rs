//! Subcommands run end to end against a fixture repository.

use clap::Parser;
use git2::{Repository, Signature};
use gitview_cli::Cli;
use rstest::rstest;
use tempfile::TempDir;

/// A repository with `docs/readme.txt`, `bin/tool`, a link and `run.sh` on HEAD.
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    let mut docs = repo.treebuilder(None).unwrap();
    docs.insert("readme.txt", repo.blob(b"read me\n").unwrap(), 0o100644)
        .unwrap();
    let docs = docs.write().unwrap();

    let mut bin = repo.treebuilder(None).unwrap();
    bin.insert("tool", repo.blob(b"#!/bin/sh\n").unwrap(), 0o100755)
        .unwrap();
    let bin = bin.write().unwrap();

    let mut root = repo.treebuilder(None).unwrap();
    root.insert("docs", docs, 0o040000).unwrap();
    root.insert("bin", bin, 0o040000).unwrap();
    root.insert("current", repo.blob(b"bin/tool").unwrap(), 0o120000)
        .unwrap();
    root.insert("run.sh", repo.blob(b"echo run\n").unwrap(), 0o100755)
        .unwrap();
    let tree = repo.find_tree(root.write().unwrap()).unwrap();

    let sig = Signature::now("Test User", "test@example.com").unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "fixture", &tree, &[])
        .unwrap();
    dir
}

async fn run(dir: &TempDir, args: &[&str]) -> anyhow::Result<String> {
    let repo = dir.path().to_str().unwrap();
    let mut argv = vec!["gitview", "--repo", repo];
    argv.extend_from_slice(args);
    let cli = Cli::parse_from(argv);

    let mut out = Vec::new();
    gitview_cli::run(&cli, &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn ls_root() {
    let dir = fixture();
    let out = run(&dir, &["ls"]).await.unwrap();
    assert_eq!(out, "bin\ncurrent\ndocs\nrun.sh\n");
}

#[tokio::test]
async fn ls_long_shows_modes_and_targets() {
    let dir = fixture();
    let out = run(&dir, &["ls", "-l"]).await.unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("dr-xr-xr-x  2"));
    assert!(lines[1].starts_with("lr--r--r--  1"));
    assert!(lines[1].ends_with("current -> bin/tool"));
    assert!(lines[3].starts_with("-r-xr-xr-x  1"));
}

#[tokio::test]
async fn cat_prints_exact_bytes() {
    let dir = fixture();
    let out = run(&dir, &["cat", "/docs/readme.txt"]).await.unwrap();
    assert_eq!(out, "read me\n");
}

#[rstest]
#[case(&["stat", "current"], "Type: symbolic link")]
#[case(&["stat", "-L", "current"], "Type: regular file")]
#[case(&["stat", "docs"], "Mode: 0040555 (dr-xr-xr-x)")]
#[case(&["stat", "docs/readme.txt"], "Size: 8")]
#[tokio::test]
async fn stat_output(#[case] args: &[&str], #[case] expected: &str) {
    let dir = fixture();
    let out = run(&dir, args).await.unwrap();
    assert!(out.contains(expected), "{out}");
}

#[tokio::test]
async fn readlink_prints_target() {
    let dir = fixture();
    let out = run(&dir, &["readlink", "current"]).await.unwrap();
    assert_eq!(out, "bin/tool\n");
}

#[tokio::test]
async fn tree_draws_hierarchy() {
    let dir = fixture();
    let out = run(&dir, &["tree"]).await.unwrap();
    let expected = "\
.
├── bin
│   └── tool
├── current -> bin/tool
├── docs
│   └── readme.txt
└── run.sh

2 directories, 4 files
";
    assert_eq!(out, expected);
}

#[tokio::test]
async fn tree_respects_depth() {
    let dir = fixture();
    let out = run(&dir, &["tree", "-L", "1"]).await.unwrap();
    assert!(!out.contains("readme.txt"));
    assert!(out.ends_with("2 directories, 2 files\n"));
}

#[rstest]
#[case(&["cat", "docs"], "cat docs")]
#[case(&["ls", "run.sh"], "ls run.sh")]
#[case(&["readlink", "run.sh"], "readlink run.sh")]
#[case(&["stat", "missing"], "stat missing")]
#[tokio::test]
async fn errors_carry_context(#[case] args: &[&str], #[case] context: &str) {
    let dir = fixture();
    let err = run(&dir, args).await.unwrap_err();
    assert_eq!(err.to_string(), context);
    assert!(err.chain().count() >= 2);
}

#[tokio::test]
async fn bad_revision_fails_to_open() {
    let dir = fixture();
    let err = run(&dir, &["--rev", "no-such-branch", "ls"]).await.unwrap_err();
    assert!(err.to_string().starts_with("cannot project"));
}
