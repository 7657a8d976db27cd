use std::path::Path;

use minigame_kiosk::catalog::manifest::{Manifest, MANIFEST_FILE};
use minigame_kiosk::AppError;

const VALID: &str = r#"
title = "Block Breaker"
description = "Break every block."
author = "alice"
game_exe_name = "breaker"
"#;

#[test]
fn parses_valid_manifest() {
    let manifest = Manifest::parse(VALID, Path::new("games/breaker")).expect("should parse");

    assert_eq!(manifest.title, "Block Breaker");
    assert_eq!(manifest.description, "Break every block.");
    assert_eq!(manifest.author, "alice");
    assert_eq!(manifest.game_exe_name, "breaker");
}

#[test]
fn unknown_keys_are_ignored() {
    let raw = format!("{VALID}\nversion = 3\n");
    assert!(Manifest::parse(&raw, Path::new("g")).is_ok());
}

#[test]
fn missing_key_is_invalid() {
    let raw = "title = \"x\"\ndescription = \"y\"\nauthor = \"z\"\n";
    let result = Manifest::parse(raw, Path::new("games/x"));

    match result {
        Err(AppError::InvalidManifest(msg)) => {
            assert!(msg.contains("games/x"), "message should name the directory: {msg}");
        }
        other => panic!("expected invalid manifest, got {other:?}"),
    }
}

#[test]
fn blank_executable_name_is_invalid() {
    let raw = "title = \"x\"\ndescription = \"\"\nauthor = \"\"\ngame_exe_name = \"  \"\n";
    let result = Manifest::parse(raw, Path::new("g"));

    match result {
        Err(AppError::InvalidManifest(msg)) => assert!(msg.contains("game_exe_name")),
        other => panic!("expected invalid manifest, got {other:?}"),
    }
}

#[test]
fn malformed_toml_is_invalid() {
    let result = Manifest::parse("title = ", Path::new("g"));
    assert!(matches!(result, Err(AppError::InvalidManifest(_))));
}

#[test]
fn executable_carries_platform_suffix() {
    let manifest = Manifest::parse(VALID, Path::new("g")).expect("should parse");
    let exe = manifest.executable_in(Path::new("games/breaker"));

    assert_eq!(
        exe,
        Path::new("games/breaker").join(format!("breaker{}", std::env::consts::EXE_SUFFIX))
    );
}

#[test]
fn read_reports_missing_manifest() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = Manifest::read(dir.path());

    match result {
        Err(AppError::MissingManifest(msg)) => assert!(msg.contains(MANIFEST_FILE)),
        other => panic!("expected missing manifest, got {other:?}"),
    }
}

#[test]
fn read_loads_manifest_from_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join(MANIFEST_FILE), VALID).expect("write manifest");

    let manifest = Manifest::read(dir.path()).expect("should read");
    assert_eq!(manifest.title, "Block Breaker");
}
