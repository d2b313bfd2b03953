//! Integration tests for the m16c-dis CLI.

use env_logger as _;
use log as _;
use m16c_arch as _;
use m16c_dis as _;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_m16c-dis"))
}

fn create_image(dir: &std::path::Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn disassembles_image_at_base() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = create_image(temp_dir.path(), "rom.bin", &[0x04, 0xD9, 0x72, 0xF3]);

    let output = Command::new(binary_path())
        .args([image.to_str().unwrap(), "--base", "0xF0000"])
        .output()
        .expect("failed to run m16c-dis");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("F0000:"));
    assert!(lines[1].ends_with("MOV.W:Q #7, R2"));
    assert!(lines[2].starts_with("F0003:"));
    assert!(lines[2].ends_with("RTS"));
}

#[test]
fn no_suffix_and_il_flags() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = create_image(temp_dir.path(), "rom.bin", &[0xC8, 0xF4]);

    let output = Command::new(binary_path())
        .args([image.to_str().unwrap(), "--no-suffix", "--il"])
        .output()
        .expect("failed to run m16c-dis");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("ADD.B #-1, A0"));
    assert!(!stdout.contains(":Q"));
    assert!(stdout.contains("    ; SetRegister"));
}

#[test]
fn invalid_bytes_are_listed_not_fatal() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = create_image(temp_dir.path(), "junk.bin", &[0x01, 0x02, 0x04]);

    let output = Command::new(binary_path())
        .arg(image.to_str().unwrap())
        .output()
        .expect("failed to run m16c-dis");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(".byte 0x01"));
    assert!(stdout.contains(".byte 0x02"));
    assert!(stdout.contains("NOP"));
}

#[test]
fn missing_file_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("absent.bin");

    let output = Command::new(binary_path())
        .arg(missing.to_str().unwrap())
        .output()
        .expect("failed to run m16c-dis");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("failed to read"));
}

#[test]
fn help_prints_usage() {
    let output = Command::new(binary_path())
        .arg("--help")
        .output()
        .expect("failed to run m16c-dis");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Usage: m16c-dis"));
}
