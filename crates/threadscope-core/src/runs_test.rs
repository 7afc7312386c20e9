use std::io::Write;

use super::*;

fn parse(yaml: &str) -> RunsFile {
    serde_yaml::from_str(yaml).expect("yaml should parse")
}

#[test]
fn sort_order_defaults_to_hot() {
    let file = parse(
        r"
runs:
  - subreddit: computerscience
    posts: posts.json
    comments: comments.json
",
    );
    assert_eq!(file.runs[0].sort_order, SortOrder::Hot);
    assert!(file.runs[0].max_posts.is_none());
    assert!(validate_runs(&file).is_ok());
}

#[test]
fn empty_run_list_is_rejected() {
    let file = parse("runs: []");
    assert!(matches!(
        validate_runs(&file),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn duplicate_subreddit_and_sort_is_rejected() {
    let file = parse(
        r"
runs:
  - subreddit: rust
    sort_order: new
    posts: a.json
    comments: b.json
  - subreddit: Rust
    sort_order: new
    posts: c.json
    comments: d.json
",
    );
    let err = validate_runs(&file).unwrap_err();
    assert!(
        matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate")),
        "expected duplicate validation error, got: {err:?}"
    );
}

#[test]
fn same_subreddit_with_different_sort_is_allowed() {
    let file = parse(
        r"
runs:
  - subreddit: rust
    sort_order: new
    posts: a.json
    comments: b.json
  - subreddit: rust
    sort_order: top
    posts: c.json
    comments: d.json
",
    );
    assert!(validate_runs(&file).is_ok());
}

#[test]
fn zero_max_posts_is_rejected() {
    let file = parse(
        r"
runs:
  - subreddit: rust
    posts: a.json
    comments: b.json
    max_posts: 0
",
    );
    assert!(matches!(
        validate_runs(&file),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn load_runs_resolves_paths_relative_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runs.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "runs:\n  - subreddit: rust\n    posts: raw/posts.json\n    comments: /abs/comments.json"
    )
    .unwrap();

    let runs = load_runs(&path).unwrap();
    assert_eq!(runs.runs[0].posts, dir.path().join("raw/posts.json"));
    assert_eq!(runs.runs[0].comments, Path::new("/abs/comments.json"));
}

#[test]
fn load_runs_reports_missing_file() {
    let err = load_runs(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::RunsFileIo { .. }));
}
