use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::{tempdir, TempDir};

fn setup_artifacts() -> TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let files = [
        ("correspondences.txt", "river\triver\t1\nrivers\triver\t1\nbank\tbank\t2\n"),
        ("top_pi.txt", "row:1\tcol:1\t0:0.5\nrow:2\tcol:2\t1:0.8\n"),
        (
            "top_pi_layers.txt",
            "layer:1\trow:1\tcol:1\t0:0.5\t1:0.2\nlayer:1\trow:2\tcol:2\t1:0.6\n",
        ),
        ("words.txt", "id:1\t1:3\nid:2\t1:1\t2:4\n"),
        ("docmap.txt", "row:1\tcol:1\t1:0.8:1\t2:0.4:1\nrow:2\tcol:2\t2:0.6:1\n"),
        (
            "database.txt",
            "id:1\ttitle:Rivers\tabstract:nan\tlayer:1\tfeature:0.2\tsource:web\n\
             id:2\ttitle:Banks\tabstract:Money\tlayer:1\n",
        ),
        ("colors_browser.txt", "1\t1\t0\t0\t1\n"),
        ("legend.txt", "Calm\t0\t0\t1\t1\t1\t1\tStormy\t1\t0\t0\n"),
    ];
    for (name, text) in files {
        fs::write(root.join(name), text).unwrap();
    }
    temp
}

#[allow(deprecated)]
fn browsecloud() -> Command {
    let mut cmd = Command::cargo_bin("browsecloud").expect("binary");
    cmd.arg("--quiet");
    cmd
}

fn run_json(args: &[&str]) -> Value {
    let output = browsecloud().args(args).output().expect("command run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn inspect_reports_grid_shape() {
    let temp = setup_artifacts();
    let dir = temp.path().to_str().unwrap();

    let summary = run_json(&["inspect", dir]);
    assert_eq!(summary["rows"], 2);
    assert_eq!(summary["columns"], 2);
    assert_eq!(summary["layers"], 1);
    assert_eq!(summary["documents"], 2);
    assert_eq!(summary["has_legend"], true);
}

#[test]
fn grid_lays_out_labels() {
    let temp = setup_artifacts();
    let dir = temp.path().to_str().unwrap();

    let out = run_json(&["grid", dir, "--width", "200", "--height", "100"]);
    assert_eq!(out["row_distance"], 50.0);
    assert_eq!(out["col_distance"], 100.0);

    let labels = out["word_labels"].as_array().unwrap();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[1]["word"], "bank");
    assert_eq!(labels[1]["scaled_weight"], 1.0);
}

#[test]
fn grid_reports_unknown_search_words() {
    let temp = setup_artifacts();
    let dir = temp.path().to_str().unwrap();

    let out = run_json(&["grid", dir, "--search", "rivers,zebra"]);
    assert_eq!(out["search"]["resolved"][0]["word"], "river");
    assert_eq!(out["search"]["unresolved"][0], "zebra");
}

#[test]
fn docs_ranks_cell_documents() {
    let temp = setup_artifacts();
    let dir = temp.path().to_str().unwrap();

    let out = run_json(&["docs", dir, "--row", "1", "--col", "1"]);
    let documents = out["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["title"], "Rivers");
    assert_eq!(documents[1]["title"], "Banks");
}

#[test]
fn docs_with_search_highlights_surface_forms() {
    let temp = setup_artifacts();
    let dir = temp.path().to_str().unwrap();

    let out = run_json(&["docs", dir, "--row", "1", "--col", "1", "-s", "river"]);
    let highlights: Vec<&str> = out["highlight_words"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(highlights, vec!["river", "rivers"]);
}

#[test]
fn docs_exports_csv() {
    let temp = setup_artifacts();
    let dir = temp.path().to_str().unwrap();

    browsecloud()
        .args(["docs", dir, "--row", "1", "--col", "1", "--csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Title,Text,Relevance,Link,Feature,source\r\n",
        ))
        .stdout(predicate::str::contains("Rivers,,2,,0.2,web\r\n"))
        .stdout(predicate::str::contains("Banks,Money,1,,,\r\n"));
}

#[test]
fn lookup_resolves_words_and_entries() {
    let temp = setup_artifacts();
    let dir = temp.path().to_str().unwrap();

    let word = run_json(&["lookup", dir, "--word", "rivers"]);
    assert_eq!(word["word_id"], 0);
    assert_eq!(word["lexicon"]["word"], "river");
    assert_eq!(word["surface_forms"].as_array().unwrap().len(), 2);

    let entry = run_json(&["lookup", dir, "--entry", "0"]);
    assert_eq!(entry["entry"]["title"], "Rivers");
    assert_eq!(entry["position"]["row"], 1);
    assert_eq!(entry["legend_color"]["blue"], 255.0);
}

#[test]
fn unpopulated_cell_fails() {
    let temp = setup_artifacts();
    let dir = temp.path().to_str().unwrap();

    browsecloud()
        .args(["docs", dir, "--row", "2", "--col", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Failed to rank documents of cell (2, 1)",
        ));
}

#[test]
fn malformed_artifact_fails() {
    let temp = setup_artifacts();
    let docmap = temp.path().join("docmap.txt");
    fs::write(docmap, "row:1\t1:0.8:1\n").unwrap();
    let dir = temp.path().to_str().unwrap();

    browsecloud()
        .args(["inspect", dir])
        .assert()
        .failure()
        .stderr(predicate::str::contains("docmap.txt improperly formatted."));
}

#[test]
fn config_file_is_applied() {
    let temp = setup_artifacts();
    let config = temp.path().join("grid.toml");
    fs::write(&config, "keep_floor_labels = false\n").unwrap();
    let dir = temp.path().to_str().unwrap();

    let out = run_json(&[
        "--config",
        config.to_str().unwrap(),
        "grid",
        dir,
        "--width",
        "200",
        "--height",
        "100",
    ]);
    let labels = out["word_labels"].as_array().unwrap();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0]["word"], "bank");
}
