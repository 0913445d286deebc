//! End-to-end CLI tests for `namedraw`.

use anyhow::ensure;
use namedraw::draw::Assignment;
use namedraw::export::{self, UTF8_BOM};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::tempdir;

fn namedraw(args: &[&str], stdin: &str) -> anyhow::Result<Output> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_namedraw"))
        .args(args)
        .env_remove("NAMEDRAW_FORMAT")
        .env_remove("NAMEDRAW_OUT_DIR")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    if let Some(mut input) = child.stdin.take() {
        input.write_all(stdin.as_bytes())?;
    }
    Ok(child.wait_with_output()?)
}

fn run_ok(args: &[&str], stdin: &str) -> anyhow::Result<String> {
    let output = namedraw(args, stdin)?;
    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "namedraw failed: {}",
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    Ok(String::from_utf8(output.stdout)?)
}

fn run_json(args: &[&str], stdin: &str) -> anyhow::Result<Value> {
    let mut all = args.to_vec();
    all.push("--json");
    Ok(serde_json::from_str(&run_ok(&all, stdin)?)?)
}

/// Parse `N.) Name` lines into (number, name) pairs.
fn numbered_lines(text: &str) -> anyhow::Result<Vec<(u32, String)>> {
    text.lines()
        .map(|line| -> anyhow::Result<(u32, String)> {
            let (n, name) = line
                .split_once(".) ")
                .ok_or_else(|| anyhow::anyhow!("unexpected line {line:?}"))?;
            Ok((n.parse()?, name.to_string()))
        })
        .collect()
}

#[test]
fn draw_prints_numbered_results_in_order() -> anyhow::Result<()> {
    let out = run_ok(&["draw", "--names", "Ann, Bo", "-n", "Cy"], "")?;
    let lines = numbered_lines(&out)?;
    ensure!(lines.iter().map(|(n, _)| *n).eq(1..=3), "got {out:?}");

    let names: HashSet<&str> = lines.iter().map(|(_, name)| name.as_str()).collect();
    ensure!(names == HashSet::from(["Ann", "Bo", "Cy"]));
    Ok(())
}

#[test]
fn draw_reads_names_from_stdin() -> anyhow::Result<()> {
    let out = run_ok(&["draw", "--format", "csv"], "Ann\r\nBo\n\n; Ann\n")?;
    let mut rows: Vec<(String, u32)> = Vec::new();
    for line in out.lines() {
        let (name, n) = line
            .rsplit_once(',')
            .ok_or_else(|| anyhow::anyhow!("unexpected line {line:?}"))?;
        rows.push((name.to_string(), n.parse()?));
    }
    ensure!(rows.len() == 3);
    ensure!(rows.iter().map(|(_, n)| *n).eq(1..=3));
    ensure!(rows.iter().filter(|(name, _)| name == "Ann").count() == 2);
    Ok(())
}

#[test]
fn draw_with_no_names_prints_nothing() -> anyhow::Result<()> {
    let out = run_ok(&["draw", "--names", " ,; "], "")?;
    ensure!(out.is_empty());

    let doc = run_json(&["draw", "--names", ""], "")?;
    ensure!(doc.get("assignments").and_then(Value::as_array).is_some_and(Vec::is_empty));
    ensure!(doc.get("drawn_at").is_some_and(Value::is_null));
    Ok(())
}

#[test]
fn draw_json_reports_bijection() -> anyhow::Result<()> {
    let doc = run_json(&["draw", "--names", "Ann;Bo;Cy;Dee"], "")?;
    let assignments: Vec<Assignment> = serde_json::from_value(
        doc.get("assignments")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing assignments"))?,
    )?;
    ensure!(assignments.iter().map(|a| a.number).eq(1..=4));
    let names: HashSet<&str> = assignments.iter().map(|a| a.name.as_str()).collect();
    ensure!(names.len() == 4);
    ensure!(doc.get("drawn_at").and_then(Value::as_str).is_some());
    Ok(())
}

#[test]
fn draw_writes_csv_and_clipboard_file() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let out_dir = dir.path().join("exports");
    let clip = dir.path().join("clip.txt");
    let out = run_ok(
        &[
            "draw",
            "--names",
            "Ann, \"Bo\" Jr, Cy",
            "--out-dir",
            out_dir.to_str().unwrap_or_default(),
            "--copy-to",
            clip.to_str().unwrap_or_default(),
        ],
        "",
    )?;

    let printed = numbered_lines(&out)?;
    let copied = fs::read_to_string(&clip)?;
    ensure!(copied == out.trim_end());

    let bytes = fs::read(out_dir.join("draw.csv"))?;
    ensure!(bytes.starts_with(UTF8_BOM));
    let parsed = export::parse_csv(&bytes)?;
    let from_csv: Vec<(u32, String)> = parsed.into_iter().map(|a| (a.number, a.name)).collect();
    ensure!(from_csv == printed);
    Ok(())
}

#[test]
fn copy_falls_back_to_stderr_when_file_unwritable() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let clip = dir.path().join("missing").join("clip.txt");
    let output = namedraw(
        &[
            "draw",
            "--names",
            "Solo",
            "--copy-to",
            clip.to_str().unwrap_or_default(),
        ],
        "",
    )?;
    ensure!(output.status.success());
    ensure!(String::from_utf8(output.stdout)? == "1.) Solo\n");
    ensure!(String::from_utf8(output.stderr)?.contains("1.) Solo"));
    Ok(())
}

#[test]
fn missing_names_file_is_an_error() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let missing = dir.path().join("nope.txt");
    let output = namedraw(&["draw", "--file", missing.to_str().unwrap_or_default()], "")?;
    ensure!(!output.status.success());
    ensure!(String::from_utf8(output.stderr)?.contains("read names file"));
    Ok(())
}

#[test]
fn shuffle_prints_permutation() -> anyhow::Result<()> {
    let out = run_ok(&["shuffle", "--count", "25"], "")?;
    let mut numbers: Vec<u32> = out.lines().map(str::parse::<u32>).collect::<Result<_, _>>()?;
    numbers.sort_unstable();
    ensure!(numbers.into_iter().eq(1..=25));

    let doc = run_json(&["shuffle", "--count", "0"], "")?;
    ensure!(doc.as_array().is_some_and(Vec::is_empty));
    Ok(())
}

#[test]
fn session_locks_after_draw_until_reset() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let script = "Ann, Bo\n:draw\nCy\n:list\n:csv\n:reset\nDee\n:rm 1\n:rm 1\n:oops\n:quit\n";
    let output = namedraw(
        &["session", "--out-dir", dir.path().to_str().unwrap_or_default()],
        script,
    )?;
    ensure!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let stderr = String::from_utf8(output.stderr)?;
    ensure!(stdout.contains("-- 2 names added."));
    ensure!(stdout.contains("-- Draw complete. 2 assignments."));
    ensure!(!stdout.contains("Cy"), "locked list accepted a name: {stdout}");
    ensure!(stdout.contains("-- Reset complete"));
    ensure!(stdout.contains("[1] Dee"));
    ensure!(stderr.contains("saved "));
    ensure!(stderr.contains("cannot remove #1"));
    ensure!(stderr.contains("unknown command `:oops`"));

    let parsed = export::parse_csv(&fs::read(dir.path().join("draw.csv"))?)?;
    ensure!(parsed.iter().map(|a| a.number).eq(1..=2));
    Ok(())
}

#[test]
fn session_copy_uses_env_format() -> anyhow::Result<()> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_namedraw"))
        .arg("session")
        .env("NAMEDRAW_FORMAT", "csv")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    if let Some(mut input) = child.stdin.take() {
        input.write_all(b"Solo\n:draw\n:copy\n")?;
    }
    let output = child.wait_with_output()?;
    ensure!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    ensure!(stdout.lines().any(|l| l == "Solo,1"), "got {stdout:?}");
    ensure!(stdout.contains("-- Copied to clipboard"));
    Ok(())
}
