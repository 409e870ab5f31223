use std::io;
use std::path::PathBuf;

use mkproject::error::{Error, TemplateKind};

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ConfigError("invalid config".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid config.");

    let err = Error::UnknownTokenError { name: "email".to_string() };
    assert_eq!(err.to_string(), "Unknown token \"email\".");

    let err = Error::TemplateNotFoundError {
        kind: TemplateKind::Folder,
        name: "latex".to_string(),
    };
    assert_eq!(err.to_string(), "Folder template \"latex\" not found.");

    let err = Error::CyclicTemplateError {
        name: "a".to_string(),
        chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
    };
    assert_eq!(err.to_string(), "Recursive project template include \"a\": a -> b -> a.");
}

#[test]
fn test_parse_error_line() {
    let err = Error::ParseError { message: "invalid YAML".to_string(), line: Some(3) };
    assert_eq!(err.to_string(), "Invalid structure: invalid YAML (line 3).");

    let err = Error::ParseError { message: "bad item".to_string(), line: None };
    assert_eq!(err.to_string(), "Invalid structure: bad item.");
}

#[test]
fn test_write_error_keeps_path() {
    let err = Error::WriteError {
        path: PathBuf::from("out/README.md"),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    };
    assert_eq!(err.to_string(), "Failed to write 'out/README.md': denied.");
}
