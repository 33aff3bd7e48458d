use clap::Parser;
use dupecat::cli::Cli;
use dupecat::duplicates::DetectError;
use dupecat::error::ExitCode;
use dupecat::run_app;
use std::fs;
use tempfile::tempdir;

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["dupecat", "-q", "--no-color"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_search_exit_codes() {
    let dir = tempdir().unwrap();
    let path = dir.path().to_str().unwrap();

    assert_eq!(run(&["-p", path, "search"]).unwrap(), ExitCode::NoFiles);

    fs::write(dir.path().join("a"), b"one").unwrap();
    fs::write(dir.path().join("b"), b"two!").unwrap();
    assert_eq!(run(&["-p", path, "search"]).unwrap(), ExitCode::NoDuplicates);

    fs::write(dir.path().join("c"), b"one").unwrap();
    assert_eq!(run(&["-p", path, "search"]).unwrap(), ExitCode::Success);
    assert_eq!(
        run(&["-p", path, "search", "--output", "json"]).unwrap(),
        ExitCode::Success
    );
    assert_eq!(run(&["-p", path, "analyse"]).unwrap(), ExitCode::Success);
}

#[test]
fn test_missing_path_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let err = run(&["-p", missing.to_str().unwrap(), "search"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DetectError>(),
        Some(DetectError::PathNotFound(_))
    ));
    assert_eq!(ExitCode::from_error(&err), ExitCode::InvalidPath);
}

#[test]
fn test_delete_with_yes() {
    let dir = tempdir().unwrap();
    let path = dir.path().to_str().unwrap();
    fs::write(dir.path().join("1.txt"), b"same").unwrap();
    fs::write(dir.path().join("2.txt"), b"same").unwrap();

    assert_eq!(run(&["-p", path, "delete", "--yes"]).unwrap(), ExitCode::Success);
    assert!(dir.path().join("1.txt").exists());
    assert!(!dir.path().join("2.txt").exists());

    // One file left: scanned fine, nothing duplicated
    assert_eq!(
        run(&["-p", path, "delete", "--yes"]).unwrap(),
        ExitCode::NoDuplicates
    );
}

#[test]
fn test_no_recurse_flag() {
    let dir = tempdir().unwrap();
    let path = dir.path().to_str().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/a"), b"dup").unwrap();
    fs::write(dir.path().join("sub/b"), b"dup").unwrap();

    assert_eq!(run(&["-p", path, "search"]).unwrap(), ExitCode::Success);
    assert_eq!(
        run(&["-p", path, "--no-recurse", "search"]).unwrap(),
        ExitCode::NoFiles
    );
}

#[test]
fn test_config_subcommand() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("dupecat.toml");
    fs::write(&config_path, "workers = 3\n").unwrap();

    assert_eq!(
        run(&["--config", config_path.to_str().unwrap(), "config"]).unwrap(),
        ExitCode::Success
    );

    fs::write(&config_path, "workers = [").unwrap();
    assert!(run(&["--config", config_path.to_str().unwrap(), "config"]).is_err());
}
