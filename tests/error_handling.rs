// tests/error_handling.rs

use std::io::Write;

use tempfile::NamedTempFile;
use neuroforge::config::load_and_validate;
use neuroforge::errors::{GraphError, NeuroforgeError};
use neuroforge::pipeline::compile;

fn manifest_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_duplicate_tensor_id_returns_config_error() {
    let file = manifest_file(
        r#"
[graph]
name = "dup"

[[tensor]]
id = "x"

[[tensor]]
id = "x"

[[operator]]
id = "f"
op_type = "relu"
inputs = ["x"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(NeuroforgeError::ConfigError(msg)) => {
            assert!(msg.contains("duplicate tensor id 'x'"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_graph_output_returns_config_error() {
    let file = manifest_file(
        r#"
[graph]
name = "io"
outputs = ["missing"]

[[tensor]]
id = "x"

[[operator]]
id = "f"
op_type = "relu"
inputs = ["x"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(NeuroforgeError::ConfigError(msg)) => {
            assert!(msg.contains("[graph].outputs"));
            assert!(msg.contains("missing"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_missing_file_returns_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_and_validate(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(NeuroforgeError::IoError(_))));
}

#[test]
fn test_malformed_toml_returns_toml_error() {
    let file = manifest_file("[graph\nname = ");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(NeuroforgeError::TomlError(_))
    ));
}

#[test]
fn test_cyclic_manifest_fails_compilation_with_cycle_error() {
    let file = manifest_file(
        r#"
[graph]
name = "loop"

[[tensor]]
id = "x"

[[tensor]]
id = "y"

[[operator]]
id = "a"
op_type = "relu"
inputs = ["y"]
outputs = ["x"]

[[operator]]
id = "b"
op_type = "relu"
inputs = ["x"]
outputs = ["y"]
"#,
    );

    let manifest = load_and_validate(file.path()).unwrap();
    match compile(&manifest) {
        Err(NeuroforgeError::GraphError(GraphError::CycleDetected { cycle, .. })) => {
            assert_eq!(cycle, vec!["a", "b"]);
        }
        Err(e) => panic!("Expected CycleDetected, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_two_writers_in_manifest_fail_with_conflicting_producer() {
    let file = manifest_file(
        r#"
[graph]
name = "writers"

[[tensor]]
id = "in"

[[tensor]]
id = "out"

[[operator]]
id = "first"
op_type = "relu"
inputs = ["in"]
outputs = ["out"]

[[operator]]
id = "second"
op_type = "relu"
inputs = ["in"]
outputs = ["out"]
"#,
    );

    let manifest = load_and_validate(file.path()).unwrap();
    let err = compile(&manifest).unwrap_err();
    assert!(matches!(
        err,
        NeuroforgeError::GraphError(GraphError::ConflictingProducer { .. })
    ));
    assert!(err.to_string().contains("already has producer 'first'"));
}
