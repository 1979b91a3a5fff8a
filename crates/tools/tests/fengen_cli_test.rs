use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const GAMES: &str = r#"[Event "cli"]
[White "Alpha"]
[Black "Beta"]
[Result "1-0"]

1. e4 {0.30/14} e5 {0.25/13} 2. Nf3 {0.35/15} Nc6 {0.30/15} 1-0

[Event "cli"]
[White "Beta"]
[Black "Alpha"]
[Result "1/2-1/2"]

1. d4 {0.20/14} d5 {0.15/14} 2. c4 {book} e6 {0.20/14} 1/2-1/2

[Event "cli"]
[White "Alpha"]
[Black "Beta"]
[Result "*"]

1. c4 {0.10/10} *
"#;

fn write_pgn(tmp: &TempDir, name: &str, text: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, text).expect("write pgn");
    p
}

fn fengen() -> Command {
    Command::cargo_bin("fengen").expect("binary exists")
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("output exists")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn missing_input_is_rejected_before_processing() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    fengen()
        .args(["--output", out.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no input"));
    assert!(!out.exists());
}

#[test]
fn missing_output_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let input = write_pgn(&tmp, "games.pgn", GAMES);
    fengen()
        .args(["--input", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no output"));
}

#[test]
fn negative_limit_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let input = write_pgn(&tmp, "games.pgn", GAMES);
    let out = tmp.path().join("out");
    fengen()
        .args(["--input", input.to_str().unwrap(), "--output", out.to_str().unwrap()])
        .args(["--limit", "-3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-negative"));
}

#[test]
fn directory_output_writes_one_part_per_lane() {
    let tmp = TempDir::new().unwrap();
    let input = write_pgn(&tmp, "games.pgn", GAMES);
    let out = tmp.path().join("out");
    fengen()
        .args(["--input", input.to_str().unwrap(), "--output", out.to_str().unwrap()])
        .args(["--lanes", "2", "--limit", "10000"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 7 FENs"));

    let part1 = read_lines(&out.join("part-1.epd"));
    let part2 = read_lines(&out.join("part-2.epd"));
    // 1 局目と 3 局目がレーン 1、2 局目がレーン 2
    assert_eq!(part1.len(), 4);
    assert_eq!(part2.len(), 3);
    assert!(part1.iter().all(|l| l.ends_with(";outcome:1.0")));
    assert!(part2.iter().all(|l| l.ends_with(";outcome:0.5")));
    assert!(part1[0].starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1;score:30;"));

    let meta = fs::read_to_string(out.join("fengen-meta.json")).expect("meta exists");
    let meta: serde_json::Value = serde_json::from_str(&meta).unwrap();
    assert_eq!(meta["summary"]["samples"], 7);
    assert_eq!(meta["summary"]["unlabeled_games"], 1);
    assert_eq!(meta["lanes"], 2);
}

#[test]
fn malformed_annotation_fails_the_run() {
    let tmp = TempDir::new().unwrap();
    let bad = format!("{GAMES}\n[Result \"0-1\"]\n\n1. e4 {{xyz/3}} 0-1\n");
    let input = write_pgn(&tmp, "bad.pgn", &bad);
    let out = tmp.path().join("out");
    fengen()
        .args(["--input", input.to_str().unwrap(), "--output", out.to_str().unwrap()])
        .args(["--lanes", "2", "--limit", "10000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("xyz/3"))
        .stderr(predicate::str::contains("Wrote").not());
    assert!(!out.join("fengen-meta.json").exists());
}

#[test]
fn skip_policy_keeps_going() {
    let tmp = TempDir::new().unwrap();
    let bad = format!("{GAMES}\n[Result \"0-1\"]\n\n1. e4 {{xyz/3}} 0-1\n");
    let input = write_pgn(&tmp, "bad.pgn", &bad);
    let out = tmp.path().join("out");
    fengen()
        .args(["--input", input.to_str().unwrap(), "--output", out.to_str().unwrap()])
        .args(["--lanes", "1", "--limit", "10000", "--on-malformed", "skip"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 7 FENs"));
}

#[test]
fn stdout_output_with_gzip_input_and_glob() {
    let tmp = TempDir::new().unwrap();
    let gz = tmp.path().join("a.pgn.gz");
    let mut enc = flate2::write::GzEncoder::new(
        fs::File::create(&gz).unwrap(),
        flate2::Compression::default(),
    );
    enc.write_all(GAMES.as_bytes()).unwrap();
    enc.finish().unwrap();
    write_pgn(&tmp, "b.pgn", GAMES);
    let pattern = format!("{}/*.pgn*", tmp.path().display());

    let assert = fengen()
        .args(["--input", &pattern, "--output", "-", "--lanes", "1", "--limit", "10000"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 14 FENs"));
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 14);
}

#[test]
fn stream_output_requires_one_lane() {
    let tmp = TempDir::new().unwrap();
    let input = write_pgn(&tmp, "games.pgn", GAMES);
    fengen()
        .args(["--input", input.to_str().unwrap(), "--output", "-", "--lanes", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--lanes 1"));
}

#[test]
fn gzip_directory_output_and_config_file() {
    let tmp = TempDir::new().unwrap();
    let input = write_pgn(&tmp, "games.pgn", GAMES);
    let out = tmp.path().join("gz-out");
    let config = tmp.path().join("fengen.toml");
    fs::write(
        &config,
        format!(
            "limit = 10000\ninput = [{:?}]\noutput = {:?}\nlanes = 1\ngzip = true\nignore_players = [\"Beta\"]\n",
            input.display().to_string(),
            out.display().to_string(),
        ),
    )
    .unwrap();

    fengen()
        .args(["--config", config.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 4 FENs"));

    let mut text = String::new();
    flate2::read::GzDecoder::new(fs::File::open(out.join("part-1.epd.gz")).unwrap())
        .read_to_string(&mut text)
        .unwrap();
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn stream_output_without_lanes_uses_one_lane() {
    let tmp = TempDir::new().unwrap();
    let input = write_pgn(&tmp, "games.pgn", GAMES);
    let assert = fengen()
        .args(["--input", input.to_str().unwrap(), "--output", "-", "--limit", "10000"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 7 FENs"));
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 7);

    let file = tmp.path().join("samples.epd");
    fengen()
        .args(["--input", input.to_str().unwrap(), "--output", file.to_str().unwrap()])
        .args(["--limit", "10000"])
        .assert()
        .success();
    assert_eq!(read_lines(&file).len(), 7);
}

#[test]
fn ignored_player_name_may_contain_a_comma() {
    let tmp = TempDir::new().unwrap();
    let input = write_pgn(
        &tmp,
        "named.pgn",
        "[White \"Carlsen, Magnus\"]\n[Black \"Beta\"]\n[Result \"1-0\"]\n\n\
         1. e4 {0.30/10} e5 {0.25/10} 2. Nf3 {0.3/10} Nc6 {0.2/10} 1-0\n",
    );
    let assert = fengen()
        .args(["--input", input.to_str().unwrap(), "--output", "-", "--limit", "10000"])
        .args(["--ignore-players", "Carlsen, Magnus", "--ignore-players", "Nobody"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 2 FENs"));
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.lines().all(|l| l.contains(" w ")), "{stdout}");
}
