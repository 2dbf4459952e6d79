mod common;

use common::{EXPORT, run_cli, workspace};

#[test]
fn missing_input_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &[]);
    assert_eq!(code, 1);
    assert!(stderr.contains("could not find transcript2.html"), "{stderr}");
    assert!(!dir.path().join("transcript_simplified.html").exists());
}

#[test]
fn missing_input_is_reported_before_path_collision() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["gone.html", "-o", "gone.html"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("could not find gone.html"), "{stderr}");
    assert!(!stderr.contains("overwrite"), "{stderr}");
    assert!(!dir.path().join("gone.html").exists());
}

#[test]
fn export_without_turns_fails_without_output() {
    let dir = workspace("<html><body><p>Sign in to continue</p></body></html>");
    let (code, _, stderr) = run_cli(dir.path(), &[]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no <user-query> or <model-response> elements found"), "{stderr}");
    assert!(stderr.contains("transcript2.html"), "{stderr}");
    assert!(!dir.path().join("transcript_simplified.html").exists());
}

#[test]
fn refuses_to_overwrite_input() {
    let dir = workspace(EXPORT);
    let (code, _, stderr) = run_cli(dir.path(), &["transcript2.html", "-o", "./transcript2.html"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("would overwrite the input"), "{stderr}");
    let input = std::fs::read_to_string(dir.path().join("transcript2.html")).unwrap();
    assert_eq!(input, EXPORT);
}

#[test]
fn bad_noise_selector_in_config_is_reported() {
    let dir = workspace(EXPORT);
    std::fs::write(
        dir.path().join("simplify.toml"),
        "extra_noise_selectors = [\"main > p\"]\n",
    )
    .unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["-c", "simplify.toml"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("main > p"), "{stderr}");
    assert!(!dir.path().join("transcript_simplified.html").exists());
}

#[test]
fn verbose_and_quiet_conflict() {
    let dir = workspace(EXPORT);
    let (code, _, _) = run_cli(dir.path(), &["-v", "-q"]);
    assert_ne!(code, 0);
}
