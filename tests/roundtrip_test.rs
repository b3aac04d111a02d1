//! End-to-end runs against a real gpg. Skipped when gpg is not installed.

use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn jibberscramble(home: &assert_fs::TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("jibberscramble");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("JIBBERSCRAMBLE_CONFIG");
    cmd
}

fn gpg_available() -> bool {
    StdCommand::new("gpg")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

fn gpg(home: &Path, args: &[&str]) -> Vec<u8> {
    let out = StdCommand::new("gpg")
        .arg("--homedir")
        .arg(home)
        .args(["--batch", "--pinentry-mode", "loopback", "--passphrase", ""])
        .args(args)
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "gpg {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    out.stdout
}

/// Write `public.asc` and `secret.asc` for a fresh passphrase-less key into `dir`.
fn write_key_pair(dir: &assert_fs::TempDir) {
    let home = tempfile::tempdir().unwrap();
    let uid = "Roundtrip <roundtrip@example.com>";
    gpg(home.path(), &["--quick-generate-key", uid, "default", "default", "never"]);
    let public = gpg(home.path(), &["--armor", "--export", uid]);
    let secret = gpg(home.path(), &["--armor", "--export-secret-keys", uid]);
    let _ = StdCommand::new("gpgconf")
        .arg("--homedir")
        .arg(home.path())
        .args(["--kill", "all"])
        .status();

    dir.child("public.asc").write_binary(&public).unwrap();
    dir.child("secret.asc").write_binary(&secret).unwrap();
}

fn round_trip(compression: &str, ciphertext_name: &str) {
    if !gpg_available() {
        eprintln!("gpg not installed, skipping");
        return;
    }
    let dir = assert_fs::TempDir::new().unwrap();
    write_key_pair(&dir);
    dir.child("docs/a.txt").write_str("hello").unwrap();
    dir.child("docs/nested/b.txt").write_str("world").unwrap();

    jibberscramble(&dir)
        .args([
            "encrypt",
            "--public-key",
            "public.asc",
            "--compression",
            compression,
            "-o",
            ciphertext_name,
            "docs",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Encrypted docs"))
        .stdout(predicate::str::contains("SHA-256"));

    dir.child(ciphertext_name)
        .assert(predicate::str::contains("-----BEGIN PGP MESSAGE-----"));

    jibberscramble(&dir)
        .args(["decrypt", "--private-key", "secret.asc", "--output-dir", "restored"])
        .arg(ciphertext_name)
        .assert()
        .success()
        .stdout(predicate::str::contains("Decrypted"));

    dir.child("restored/docs/a.txt").assert("hello");
    dir.child("restored/docs/nested/b.txt").assert("world");
}

#[test]
fn zip_round_trip() {
    round_trip("zip", "docs.zip.gpg");
}

#[test]
fn tar_gz_round_trip() {
    round_trip("tar.gz", "docs.tar.gz.gpg");
}

#[test]
fn format_is_detected_from_content_not_name() {
    round_trip("tar.gz", "payload.bin");
}

#[test]
fn decrypt_with_public_key_only_fails() {
    if !gpg_available() {
        eprintln!("gpg not installed, skipping");
        return;
    }
    let dir = assert_fs::TempDir::new().unwrap();
    write_key_pair(&dir);
    dir.child("docs/a.txt").write_str("hello").unwrap();

    jibberscramble(&dir)
        .args(["encrypt", "--public-key", "public.asc", "-o", "docs.gpg", "docs"])
        .assert()
        .success();

    jibberscramble(&dir)
        .args(["decrypt", "--private-key", "public.asc", "--output-dir", "restored", "docs.gpg"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("decrypt failed"));

    dir.child("restored/docs").assert(predicate::path::missing());
}

#[test]
fn quiet_mode_prints_nothing_on_success() {
    if !gpg_available() {
        eprintln!("gpg not installed, skipping");
        return;
    }
    let dir = assert_fs::TempDir::new().unwrap();
    write_key_pair(&dir);
    dir.child("docs/a.txt").write_str("hello").unwrap();

    jibberscramble(&dir)
        .args(["-q", "encrypt", "--public-key", "public.asc", "-o", "docs.gpg", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
