use clap::Parser;
use mkproject::cli::Args;
use mkproject::conflict::ConflictPolicy;
use std::ffi::OsString;
use std::path::PathBuf;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("mkproject")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_basic_args() {
    let args = make_args(&["./structure.yaml", "./output"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.structure, "./structure.yaml");
    assert_eq!(parsed.output_dir, PathBuf::from("./output"));
    assert!(parsed.title.is_none());
    assert!(parsed.on_conflict.is_none());
    assert!(!parsed.dry_run);
    assert!(!parsed.verbose);
}

#[test]
fn test_all_flags() {
    let args = make_args(&[
        "--title",
        "Shop",
        "--description",
        "Online store",
        "--config",
        "mkproject.yaml",
        "--file-templates",
        "./templates",
        "--project-templates",
        "./projects",
        "--on-conflict",
        "keep-both",
        "--dry-run",
        "--verbose",
        "rust-crate",
        "./output",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.structure, "rust-crate");
    assert_eq!(parsed.title.as_deref(), Some("Shop"));
    assert_eq!(parsed.description.as_deref(), Some("Online store"));
    assert_eq!(parsed.config, Some(PathBuf::from("mkproject.yaml")));
    assert_eq!(parsed.file_templates, Some(PathBuf::from("./templates")));
    assert_eq!(parsed.project_templates, Some(PathBuf::from("./projects")));
    assert_eq!(parsed.on_conflict, Some(ConflictPolicy::KeepBoth));
    assert!(parsed.dry_run);
    assert!(parsed.verbose);
}

#[test]
fn test_short_flags() {
    let args = make_args(&["-t", "Shop", "-d", "Store", "-c", "cfg.json", "-v", "s.yaml", "out"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.title.as_deref(), Some("Shop"));
    assert_eq!(parsed.description.as_deref(), Some("Store"));
    assert_eq!(parsed.config, Some(PathBuf::from("cfg.json")));
    assert!(parsed.verbose);
}

#[test]
fn test_invalid_conflict_policy() {
    let args = make_args(&["--on-conflict", "shred", "./structure.yaml", "./output"]);
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn test_missing_args() {
    let args = make_args(&["./structure.yaml"]);
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn test_too_many_args() {
    let args = make_args(&["./structure.yaml", "./output", "extra"]);
    assert!(Args::try_parse_from(args).is_err());
}
