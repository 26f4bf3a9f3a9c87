//! Integration tests for CLI

use assert_cmd::Command;
use git2::{Repository, Signature};
use predicates::prelude::*;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread;
use tempfile::TempDir;

fn repo_flow() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("repo-flow"));
    for var in ["PORT", "OPENAI_API_KEY", "OPENAI_BASE_URL", "GITHUB_TOKEN", "REPO_FLOW_SERVER"] {
        cmd.env_remove(var);
    }
    cmd
}

/// Git checkout with one API route, one component and a README committed.
fn sample_checkout() -> TempDir {
    let tmp = TempDir::new().expect("tmp");
    let root = tmp.path();
    fs::create_dir_all(root.join("pages/api")).expect("mkdir");
    fs::create_dir_all(root.join("src/components")).expect("mkdir");
    fs::write(root.join("pages/api/contact.js"), "export default () => {}\n").expect("write");
    fs::write(root.join("src/components/Header.tsx"), "export const Header = 1;\n")
        .expect("write");
    fs::write(root.join("README.md"), "# Demo\n").expect("write");
    commit_all(root);
    tmp
}

fn commit_all(root: &Path) {
    let repo = Repository::init(root).expect("init");
    let mut index = repo.index().expect("index");
    index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None).expect("add");
    index.write().expect("write index");
    let tree_id = index.write_tree().expect("write tree");
    let tree = repo.find_tree(tree_id).expect("tree");
    let sig = Signature::now("Test", "test@example.com").expect("sig");
    repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[]).expect("commit");
}

#[test]
fn test_cli_version() {
    let mut cmd = repo_flow();
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("repo-flow"));
}

#[test]
fn test_cli_help() {
    let mut cmd = repo_flow();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("graph"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_graph_requires_path_or_repo() {
    let mut cmd = repo_flow();
    cmd.arg("graph");
    cmd.assert().failure().stderr(predicate::str::contains("--repo"));
}

#[test]
fn test_graph_rejects_both_path_and_repo() {
    let mut cmd = repo_flow();
    cmd.args(["graph", "--path", ".", "--repo", "https://github.com/test/test"]);
    cmd.assert().failure().stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_graph_rejects_malformed_url() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = repo_flow();
    cmd.current_dir(tmp.path()).args(["graph", "--repo", "not a url"]);
    cmd.assert().failure().stderr(predicate::str::contains("Invalid repository URL"));
}

#[test]
fn test_graph_renders_local_checkout() {
    let checkout = sample_checkout();
    let mut cmd = repo_flow();
    cmd.current_dir(checkout.path()).args(["graph", "--path", "."]);
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("flowchart TD\n"))
        .stdout(predicate::str::contains("subgraph group_API_Routes[\"API Routes\"]"))
        .stdout(predicate::str::contains("subgraph group_Components[\"Components\"]"))
        .stdout(predicate::str::contains("n_pages_api -->|handles request| n_pages_api_contact_js"))
        .stdout(predicate::str::contains(
            "n_src_components -->|imports component| n_src_components_Header_tsx",
        ));
}

#[test]
fn test_graph_applies_configured_override() {
    let checkout = sample_checkout();
    fs::write(
        checkout.path().join("repo-flow.toml"),
        "[[graph.edge_overrides]]\nparent = \"pages/api\"\nchild = \"pages/api/contact.js\"\nlabel = \"forwards email\"\n",
    )
    .expect("write");

    let mut cmd = repo_flow();
    cmd.current_dir(checkout.path()).args(["graph", "--path", ".", "--direction", "LR"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("flowchart LR\n"))
        .stdout(predicate::str::contains("n_pages_api -->|forwards email| n_pages_api_contact_js"));
}

#[test]
fn test_graph_json_output_to_file() {
    let checkout = sample_checkout();
    let out = checkout.path().join("graph.json");
    let mut cmd = repo_flow();
    cmd.current_dir(checkout.path()).args([
        "graph",
        "--path",
        ".",
        "--format",
        "json",
        "--output",
        out.to_str().expect("utf8 path"),
    ]);
    cmd.assert().success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).expect("read")).expect("json");
    assert_eq!(json["direction"], "TD");
    let names: Vec<&str> =
        json["buckets"].as_array().expect("buckets").iter().filter_map(|b| b["name"].as_str()).collect();
    assert_eq!(names.first(), Some(&"API Routes"));
    assert!(names.contains(&"Docs"));
}

#[test]
fn test_explicit_bad_config_is_fatal() {
    let checkout = sample_checkout();
    let bad = checkout.path().join("bad.toml");
    fs::write(&bad, "[server]\nport = \"nope\"\n").expect("write");

    let mut cmd = repo_flow();
    cmd.current_dir(checkout.path()).args([
        "--config",
        bad.to_str().expect("utf8 path"),
        "graph",
        "--path",
        ".",
    ]);
    cmd.assert().failure().stderr(predicate::str::contains("Invalid TOML config"));
}

#[test]
fn test_ask_falls_back_when_relay_is_down() {
    let checkout = sample_checkout();
    let mut cmd = repo_flow();
    cmd.current_dir(checkout.path()).args([
        "ask",
        "--path",
        ".",
        "--server",
        "http://127.0.0.1:9",
        "What is the file structure?",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("**Files in"))
        .stderr(predicate::str::contains("relay unavailable"));
}

/// One-shot relay that streams a fragment and then hangs up without `[DONE]`.
fn truncated_relay() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    thread::spawn(move || {
        let (mut socket, _) = listener.accept().expect("accept");
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).expect("read");
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        if name.eq_ignore_ascii_case("content-length") {
                            value.trim().parse::<usize>().ok()
                        } else {
                            None
                        }
                    })
                    .unwrap_or(0);
                if request.len() >= header_end + 4 + length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\ndata: partial answer\n\n",
            )
            .expect("write");
    });
    format!("http://{addr}")
}

#[test]
fn test_ask_separates_discarded_partial_answer() {
    let checkout = sample_checkout();
    let relay = truncated_relay();
    let mut cmd = repo_flow();
    cmd.current_dir(checkout.path()).args([
        "ask",
        "--path",
        ".",
        "--server",
        &relay,
        "Which files matter?",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "partial answer\n--- partial answer discarded ---\n**Files in",
        ))
        .stderr(predicate::str::contains("relay unavailable"));
}

#[test]
fn test_ask_rejects_blank_question_before_fetching() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("repo-flow.toml"), "[github]\napi_base = \"http://127.0.0.1:9\"\n")
        .expect("write");

    let mut cmd = repo_flow();
    cmd.current_dir(tmp.path()).args(["ask", "--repo", "https://github.com/acme/site", "   "]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a question"))
        .stderr(predicate::str::contains("Listing request failed").not());
}

#[test]
fn test_completions_for_bash() {
    let mut cmd = repo_flow();
    cmd.args(["completions", "bash"]);
    cmd.assert().success().stdout(predicate::str::contains("repo-flow"));
}
