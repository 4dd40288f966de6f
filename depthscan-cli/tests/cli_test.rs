use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn create_test_files(dir: &TempDir, files: &[(&str, &str)]) -> Result<()> {
    for (name, content) in files {
        let file_path = dir.path().join(name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(file_path, content)?;
    }
    Ok(())
}

fn depthscan(root: &Path) -> Result<Command> {
    let mut cmd = Command::cargo_bin("depthscan-cli")?;
    cmd.env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .current_dir(root)
        .arg("-d")
        .arg(root);
    Ok(cmd)
}

#[test]
fn test_text_output() -> Result<()> {
    let temp_dir = tempdir()?;
    create_test_files(
        &temp_dir,
        &[
            ("a/b/x.txt", "first\nsecond\ncall TODO later\n"),
            ("top.txt", "TODO at the top\r\n"),
            ("quiet.txt", "nothing to see\n"),
        ],
    )?;

    depthscan(temp_dir.path())?
        .arg("*TODO*")
        .assert()
        .success()
        .stdout(predicate::str::contains("x.txt [windows-1252, LF]"))
        .stdout(predicate::str::contains("3: call TODO later"))
        .stdout(predicate::str::contains("top.txt [windows-1252, CRLF]"))
        .stdout(predicate::str::contains("quiet.txt").not())
        .stdout(predicate::str::contains("Found 2 matches in 2 files"));
    Ok(())
}

#[test]
fn test_deepest_file_printed_first() -> Result<()> {
    let temp_dir = tempdir()?;
    create_test_files(
        &temp_dir,
        &[("shallow.txt", "TODO"), ("one/two/three/deep.txt", "TODO")],
    )?;

    let output = depthscan(temp_dir.path())?.arg("TODO").output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let deep = stdout.find("deep.txt").unwrap();
    let shallow = stdout.find("shallow.txt").unwrap();
    assert!(deep < shallow);
    Ok(())
}

#[test]
fn test_include_and_exclude() -> Result<()> {
    let temp_dir = tempdir()?;
    create_test_files(
        &temp_dir,
        &[
            ("src/main.cs", "// TODO: one"),
            ("src/gen_out/auto.cs", "// TODO: two"),
            ("notes.md", "TODO: three"),
        ],
    )?;

    depthscan(temp_dir.path())?
        .args(["-i", "*.cs", "-x", "*gen_out*", "*TODO*"])
        .assert()
        .success()
        .stdout(predicate::str::contains("main.cs"))
        .stdout(predicate::str::contains("auto.cs").not())
        .stdout(predicate::str::contains("notes.md").not())
        .stdout(predicate::str::contains("Found 1 matches in 1 files"));
    Ok(())
}

#[test]
fn test_json_output() -> Result<()> {
    let temp_dir = tempdir()?;
    create_test_files(&temp_dir, &[("a.txt", "alpha\nTODO beta\n")])?;

    let output = depthscan(temp_dir.path())?
        .args(["--json", "*TODO*"])
        .output()?;
    assert!(output.status.success());

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["file_name"], "a.txt");
    assert_eq!(reports[0]["encoding"], "windows-1252");
    assert_eq!(reports[0]["newline"], "Lf");
    assert_eq!(reports[0]["lines"][0]["line_number"], 2);
    assert_eq!(reports[0]["lines"][0]["snippet"], "TODO beta");
    Ok(())
}

#[test]
fn test_stats_only() -> Result<()> {
    let temp_dir = tempdir()?;
    create_test_files(
        &temp_dir,
        &[("a.txt", "TODO\nTODO\n"), ("b.txt", "TODO\n"), ("c.txt", "done\n")],
    )?;

    depthscan(temp_dir.path())?
        .args(["--stats", "TODO"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 matches in 2 files"))
        .stdout(predicate::str::contains("Scanned 3 of 3 files"))
        .stdout(predicate::str::contains("a.txt").not());
    Ok(())
}

#[test]
fn test_encoding_fallback_flag() -> Result<()> {
    let temp_dir = tempdir()?;
    let wide: Vec<u8> = "first\r\nwide TODO\r\n"
        .encode_utf16()
        .flat_map(|u| u.to_le_bytes())
        .collect();
    fs::write(temp_dir.path().join("wide.txt"), wide)?;

    depthscan(temp_dir.path())?
        .arg("*TODO*")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 0 matches in 0 files"));

    depthscan(temp_dir.path())?
        .args(["--encoding-fallback", "*TODO*"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wide.txt [UTF-16LE, CRLF]"))
        .stdout(predicate::str::contains("2: wide TODO"));
    Ok(())
}

#[test]
fn test_max_snippet() -> Result<()> {
    let temp_dir = tempdir()?;
    let line = format!("{}TODO{}", "a".repeat(100), "b".repeat(100));
    create_test_files(&temp_dir, &[("long.txt", &line)])?;

    depthscan(temp_dir.path())?
        .args(["--max-snippet", "20", "*TODO*"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1: ...aaaaaaaaTODObbbbbbbb..."));
    Ok(())
}

#[test]
fn test_config_file() -> Result<()> {
    let temp_dir = tempdir()?;
    create_test_files(
        &temp_dir,
        &[
            ("keep.log", "FIXME: from config"),
            ("skip.txt", "FIXME: wrong extension"),
            (
                "search.yaml",
                "include_patterns: [\"*.log\"]\ntext_pattern: \"FIXME*\"\n",
            ),
        ],
    )?;

    depthscan(temp_dir.path())?
        .arg("--config")
        .arg(temp_dir.path().join("search.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("keep.log"))
        .stdout(predicate::str::contains("skip.txt").not());
    Ok(())
}

#[test]
fn test_command_line_beats_config_even_at_default_values() -> Result<()> {
    let temp_dir = tempdir()?;
    let line = format!("{}TODO{}", "a".repeat(100), "b".repeat(100));
    let wide: Vec<u8> = "wide TODO\r\n"
        .encode_utf16()
        .flat_map(|u| u.to_le_bytes())
        .collect();
    create_test_files(
        &temp_dir,
        &[
            ("long.txt", &line),
            (
                "search.yaml",
                "options:\n  max_snippet_chars: 20\n  allow_encoding_fallback: true\n",
            ),
        ],
    )?;
    fs::write(temp_dir.path().join("wide.txt"), wide)?;
    let config = temp_dir.path().join("search.yaml");

    depthscan(temp_dir.path())?
        .arg("--config")
        .arg(&config)
        .arg("*TODO*")
        .assert()
        .success()
        .stdout(predicate::str::contains("1: ...aaaaaaaaTODObbbbbbbb..."))
        .stdout(predicate::str::contains("wide.txt [UTF-16LE, CRLF]"));

    depthscan(temp_dir.path())?
        .arg("--config")
        .arg(&config)
        .args(["--max-snippet", "256", "--no-encoding-fallback", "*TODO*"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("1: {}", line)))
        .stdout(predicate::str::contains("wide.txt").not())
        .stdout(predicate::str::contains("Found 1 matches in 1 files"));
    Ok(())
}

#[test]
fn test_debug_logging_goes_to_stderr() -> Result<()> {
    let temp_dir = tempdir()?;
    create_test_files(&temp_dir, &[("a.txt", "TODO")])?;

    depthscan(temp_dir.path())?
        .args(["--log-level", "debug", "TODO"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Effective configuration").not())
        .stderr(predicate::str::contains("Effective configuration"));
    Ok(())
}

#[test]
fn test_unknown_log_level_fails() -> Result<()> {
    let temp_dir = tempdir()?;
    create_test_files(&temp_dir, &[("a.txt", "TODO")])?;

    depthscan(temp_dir.path())?
        .args(["--log-level", "chatty", "TODO"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ConfigError"))
        .stderr(predicate::str::contains("chatty"));
    Ok(())
}

#[test]
fn test_invalid_root_fails() -> Result<()> {
    let temp_dir = tempdir()?;
    let missing = temp_dir.path().join("missing");

    Command::cargo_bin("depthscan-cli")?
        .current_dir(temp_dir.path())
        .arg("-d")
        .arg(&missing)
        .arg("*TODO*")
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidRoot"));
    Ok(())
}

#[test]
fn test_missing_text_pattern_fails() -> Result<()> {
    let temp_dir = tempdir()?;
    create_test_files(&temp_dir, &[("a.txt", "TODO")])?;

    depthscan(temp_dir.path())?
        .assert()
        .failure()
        .stderr(predicate::str::contains("EmptyPattern"));
    Ok(())
}
