//! End-to-end checks of the `git-deps` binary (`spec.md` §6), driving the
//! compiled binary against a throwaway repository the way a user would.

mod common;

use assert_cmd::Command;
use common::{build_linear_history, TestRepo};

#[test]
fn text_mode_prints_the_immediate_dependency() {
    let repo = TestRepo::new();
    let (_a, b, c) = build_linear_history(&repo);

    Command::cargo_bin("git-deps")
        .unwrap()
        .current_dir(repo.path())
        .args(["--context-lines", "0", c.as_str()])
        .assert()
        .success()
        .stdout(format!("{}\n", b));
}

#[test]
fn json_mode_emits_a_commits_and_dependencies_graph() {
    let repo = TestRepo::new();
    let (_a, b, c) = build_linear_history(&repo);

    let output = Command::cargo_bin("git-deps")
        .unwrap()
        .current_dir(repo.path())
        .args(["--context-lines", "0", "--json", c.as_str()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let graph: serde_json::Value = serde_json::from_slice(&output).expect("stdout should be JSON");

    let commit_shas: Vec<String> = graph["commits"]
        .as_array()
        .expect("commits should be an array")
        .iter()
        .map(|c| c["sha1"].as_str().unwrap().to_string())
        .collect();
    assert!(commit_shas.contains(&c.to_string()));
    assert!(commit_shas.contains(&b.to_string()));

    let dependencies = graph["dependencies"].as_array().unwrap();
    assert!(dependencies
        .iter()
        .any(|d| d["parent"] == c.to_string() && d["child"] == b.to_string()));

    assert_eq!(graph["root"]["sha1"], c.to_string());
}

#[test]
fn missing_commitish_is_an_error() {
    let repo = TestRepo::new();

    Command::cargo_bin("git-deps")
        .unwrap()
        .current_dir(repo.path())
        .assert()
        .failure();
}
