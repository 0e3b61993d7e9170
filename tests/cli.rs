use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/three_tier.json")
}

#[test]
fn renders_svg_from_model_file() -> Result<(), Box<dyn std::error::Error>> {
    assert!(fixture().exists(), "fixture graph model should exist");

    let tmp = tempdir()?;
    let output_path = tmp.path().join("topology.svg");

    let mut cmd = Command::cargo_bin("topograph")?;
    cmd.arg("--input")
        .arg(fixture())
        .arg("--output")
        .arg(&output_path)
        .arg("--layout")
        .arg("dagre");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("rendered 7 nodes and 5 edges"));

    let svg_contents = fs::read_to_string(&output_path)?;
    assert!(
        svg_contents.contains("<svg"),
        "output should contain an <svg> element"
    );
    assert!(
        svg_contents.contains("stroke-dasharray"),
        "expanded groups render as dashed containers"
    );
    assert!(
        svg_contents.contains(">api<"),
        "node labels should survive into the SVG"
    );
    Ok(())
}

#[test]
fn reads_stdin_and_writes_stdout_with_dashes() -> Result<(), Box<dyn std::error::Error>> {
    let model = fs::read_to_string(fixture())?;

    let mut cmd = Command::cargo_bin("topograph")?;
    cmd.arg("--input")
        .arg("-")
        .arg("--output")
        .arg("-")
        .arg("--layout")
        .arg("cola")
        .write_stdin(model);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("<?xml"))
        .stdout(predicate::str::contains("</svg>"));
    Ok(())
}

#[test]
fn quiet_flag_suppresses_the_summary_line() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let output_path = tmp.path().join("topology.svg");

    let mut cmd = Command::cargo_bin("topograph")?;
    cmd.arg("--input")
        .arg(fixture())
        .arg("--output")
        .arg(&output_path)
        .arg("--quiet");

    cmd.assert().success().stdout(predicate::str::is_empty());
    assert!(output_path.exists());
    Ok(())
}

#[test]
fn rejects_a_model_with_dangling_edges() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("topograph")?;
    cmd.arg("--input")
        .arg("-")
        .write_stdin(r#"{"nodes": [{"id": "a"}], "edges": [{"id": "e", "source": "a", "target": "ghost"}]}"#);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
    Ok(())
}

#[test]
fn rejects_malformed_json() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("topograph")?;
    cmd.arg("--input").arg("-").write_stdin("not json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse graph model"));
    Ok(())
}

#[test]
fn each_layout_engine_is_selectable() -> Result<(), Box<dyn std::error::Error>> {
    let model = fs::read_to_string(fixture())?;
    for layout in ["force", "dagre", "cola"] {
        let mut cmd = Command::cargo_bin("topograph")?;
        cmd.arg("--layout")
            .arg(layout)
            .arg("--output")
            .arg("-")
            .write_stdin(model.clone());
        cmd.assert()
            .success()
            .stdout(predicate::str::contains("</svg>"));
    }
    Ok(())
}
