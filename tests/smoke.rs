use assert_cmd::Command;

#[test]
fn cli_help_runs() {
    let mut cmd = Command::cargo_bin("physician-notetaker").expect("binary exists");
    cmd.arg("--help").assert().success();
}

#[test]
fn soap_without_key_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let transcript = dir.path().join("visit.txt");
    std::fs::write(&transcript, "Patient: my neck hurts\n").unwrap();

    let mut cmd = Command::cargo_bin("physician-notetaker").expect("binary exists");
    cmd.env_remove("GOOGLE_API_KEY")
        .env("OUTPUTS_DIR", dir.path().join("out"))
        .args(["soap", "--transcript"])
        .arg(&transcript)
        .assert()
        .failure();
    assert!(!dir.path().join("out").join("soap_note.json").exists());
}
