use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Runs the binary from inside `dir` so no stray config.toml is picked up.
fn match_score<S: AsRef<OsStr>>(dir: &Path, args: &[S], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_match-score"));
    cmd.current_dir(dir).args(args).env_remove("RUST_ENV").env_remove("RUST_LOG").env_remove("MODEL_DIR");
    for (k, v) in envs { cmd.env(k, v); }
    cmd.output().expect("spawn match-score")
}

fn fake<S: AsRef<OsStr>>(dir: &Path, args: &[S]) -> Output {
    match_score(dir, args, &[("APP_USE_FAKE_EMBEDDINGS", "1")])
}

fn parse_score(out: &Output) -> f32 {
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 1, "exactly one line on stdout: {stdout:?}");
    stdout.trim().parse().expect("stdout is a plain decimal")
}

#[test]
fn identical_files_score_one() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("resume.txt");
    let b = tmp.path().join("jd.txt");
    fs::write(&a, "Senior backend engineer with distributed systems experience").unwrap();
    fs::write(&b, "Senior backend engineer with distributed systems experience").unwrap();

    let score = parse_score(&fake(tmp.path(), &[&a, &b]));
    assert!((score - 1.0).abs() < 1e-5, "score={score}");
}

#[test]
fn score_is_bounded_symmetric_and_deterministic() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("resume.txt");
    let b = tmp.path().join("jd.txt");
    fs::write(&a, "Professional oil painter and muralist, backend curious").unwrap();
    fs::write(&b, "Seeking a Java backend developer").unwrap();

    let ab = fake(tmp.path(), &[&a, &b]);
    let ba = fake(tmp.path(), &[&b, &a]);
    let ab_again = fake(tmp.path(), &[&a, &b]);

    let s_ab = parse_score(&ab);
    assert!((-1.0..=1.0).contains(&s_ab), "score={s_ab}");
    assert!((s_ab - parse_score(&ba)).abs() < 1e-6);
    assert_eq!(ab.stdout, ab_again.stdout);
}

#[test]
fn missing_resume_fails_with_nothing_on_stdout() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("missing.txt");
    let jd = tmp.path().join("jd.txt");
    fs::write(&jd, "Seeking a Java backend developer").unwrap();

    let out = fake(tmp.path(), &[&missing, &jd]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("missing.txt"));
}

#[test]
fn directory_argument_is_an_io_error() {
    let tmp = TempDir::new().unwrap();
    let jd = tmp.path().join("jd.txt");
    fs::write(&jd, "Seeking a Java backend developer").unwrap();

    let out = fake(tmp.path(), &[tmp.path(), jd.as_path()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
}

#[test]
fn empty_file_is_degenerate_input() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("resume.txt");
    let b = tmp.path().join("jd.txt");
    fs::write(&a, "Senior backend engineer").unwrap();
    fs::write(&b, "  \n\t\n").unwrap();

    let out = fake(tmp.path(), &[&a, &b]);
    assert_eq!(out.status.code(), Some(4));
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("empty"));
}

#[test]
fn wrong_argument_count_is_a_usage_error() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("resume.txt");
    fs::write(&a, "Senior backend engineer").unwrap();

    let out = fake(tmp.path(), &[&a]);
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty());
}

#[test]
fn unavailable_model_offline_is_a_model_load_error() {
    let tmp = TempDir::new().unwrap();
    let cache = tmp.path().join("cache");
    let a = tmp.path().join("resume.txt");
    let b = tmp.path().join("jd.txt");
    fs::write(&a, "Senior backend engineer").unwrap();
    fs::write(&b, "Java developer").unwrap();

    let out = match_score(
        tmp.path(),
        &[&a, &b],
        &[
            ("APP_USE_FAKE_EMBEDDINGS", "0"),
            ("APP_OFFLINE", "true"),
            ("APP_MODEL_ID", "nobody/no-such-model"),
            ("APP_CACHE_DIR", cache.to_str().unwrap()),
        ],
    );
    assert_eq!(out.status.code(), Some(3), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(out.stdout.is_empty());
}

#[test]
fn corrupt_model_dir_is_a_model_load_error() {
    let tmp = TempDir::new().unwrap();
    let model = tmp.path().join("broken-model");
    fs::create_dir(&model).unwrap();
    fs::write(model.join("config.json"), "{ not json").unwrap();
    fs::write(model.join("tokenizer.json"), "garbage").unwrap();
    fs::write(model.join("model.safetensors"), b"\x00\x01not weights").unwrap();
    let a = tmp.path().join("resume.txt");
    let b = tmp.path().join("jd.txt");
    fs::write(&a, "Senior backend engineer").unwrap();
    fs::write(&b, "Java developer").unwrap();

    let out = match_score(
        tmp.path(),
        &[&a, &b],
        &[("APP_MODEL_DIR", model.to_str().unwrap()), ("APP_OFFLINE", "true")],
    );
    assert_eq!(out.status.code(), Some(3), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("broken-model"));
}

#[test]
fn invalid_utf8_input_is_an_io_error() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("resume.txt");
    let b = tmp.path().join("jd.txt");
    fs::write(&a, b"caf\xe9 backend engineer").unwrap();
    fs::write(&b, "Java developer").unwrap();

    let out = fake(tmp.path(), &[&a, &b]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
}

#[test]
fn invalid_config_file_exits_with_config_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "max_len = 0\n").unwrap();
    let a = tmp.path().join("resume.txt");
    fs::write(&a, "Senior backend engineer").unwrap();

    let out = fake(tmp.path(), &[&a, &a]);
    assert_eq!(out.status.code(), Some(5));
    assert!(out.stdout.is_empty());
}

#[test]
#[ignore = "Requires model download"]
fn real_model_related_pair_scores_high() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("resume.txt");
    let b = tmp.path().join("jd.txt");
    fs::write(&a, "Senior backend engineer with distributed systems experience").unwrap();
    fs::write(&b, "Looking for a backend engineer familiar with distributed systems").unwrap();

    let score = parse_score(&match_score(tmp.path(), &[&a, &b], &[]));
    assert!(score > 0.7, "score={score}");
}

#[test]
#[ignore = "Requires model download"]
fn real_model_unrelated_pair_scores_low() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("resume.txt");
    let b = tmp.path().join("jd.txt");
    fs::write(&a, "Professional oil painter and muralist").unwrap();
    fs::write(&b, "Seeking a Java backend developer").unwrap();

    let score = parse_score(&match_score(tmp.path(), &[&a, &b], &[]));
    assert!(score < 0.3, "score={score}");
}
