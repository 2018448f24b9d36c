use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const APOLOGY: &str = "Sorry, I encountered an error while trying to generate an answer.";

#[allow(deprecated)]
fn ragdesk(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ragdesk").expect("binary");
    cmd.current_dir(workdir)
        .env("HOME", workdir)
        .env("XDG_CONFIG_HOME", workdir.join(".config"))
        .env("RAGDESK_STORE_DIR", workdir.join("store"))
        .env("RAGDESK_EMBEDDING_MODE", "hash")
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_BASE_URL")
        .env_remove("RUST_LOG")
        .arg("--quiet");
    cmd
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command run");
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn ingest_copies_into_uploads_and_status_reports_it() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let docs = root.join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("notes.txt"), "x".repeat(1200)).unwrap();

    let report = json_output(
        ragdesk(root)
            .arg("ingest")
            .arg(docs.join("notes.txt"))
            .arg("--json"),
    );
    assert_eq!(report["outcomes"][0]["status"], "indexed");
    assert_eq!(report["outcomes"][0]["chunks"], 3);
    assert!(root.join("data/uploads/notes.txt").is_file());

    let status = json_output(ragdesk(root).arg("status").arg("--json"));
    assert_eq!(status["chunks"], 3);
    assert_eq!(status["sources"]["notes.txt"], 3);
    assert_eq!(status["restore"]["status"], "loaded");
}

#[test]
fn unsupported_files_are_skipped_without_failing() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("slides.pptx"), "not really slides").unwrap();

    ragdesk(root)
        .arg("ingest")
        .arg("slides.pptx")
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped slides.pptx"));
}

#[test]
fn missing_file_fails_the_run() {
    let temp = tempdir().unwrap();

    ragdesk(temp.path())
        .arg("ingest")
        .arg("nowhere.txt")
        .assert()
        .failure()
        .stdout(predicate::str::contains("failed"));
}

#[test]
fn search_ranks_the_matching_document_first() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("rust.txt"), "ownership borrowing lifetimes in rust").unwrap();
    fs::write(root.join("bread.txt"), "flour yeast dough oven bread").unwrap();

    ragdesk(root)
        .args(["ingest", "rust.txt", "bread.txt"])
        .assert()
        .success();

    let hits = json_output(ragdesk(root).args(["search", "yeast dough", "-k", "1", "--json"]));
    let hits = hits.as_array().expect("hits array");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["chunk"]["source"], "bread.txt");
}

#[test]
fn ask_without_api_key_prints_the_apology() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("a.txt"), "some indexed text").unwrap();
    ragdesk(root).args(["ingest", "a.txt"]).assert().success();

    ragdesk(root)
        .args(["ask", "what is indexed?"])
        .assert()
        .success()
        .stdout(predicate::str::contains(APOLOGY));
}

#[test]
fn reset_empties_the_store() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("a.txt"), "some indexed text").unwrap();
    ragdesk(root).args(["ingest", "a.txt"]).assert().success();

    ragdesk(root).arg("reset").assert().success();

    let status = json_output(ragdesk(root).arg("status").arg("--json"));
    assert_eq!(status["chunks"], 0);
    assert_eq!(status["restore"]["status"], "fresh");
    assert!(!root.join("store/index.bin").exists());
}

#[test]
fn invalid_config_is_rejected() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("ragdesk.toml"), "[chunking]\nsize = 0\n").unwrap();

    ragdesk(root)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("chunk size"));
}
