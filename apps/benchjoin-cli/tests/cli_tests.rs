//! Command-line tests for the benchjoin binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn benchjoin(args: &[&str]) -> Output {
    benchjoin_with_log(args, None)
}

fn benchjoin_with_log(args: &[&str], rust_log: Option<&str>) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_benchjoin"));
    command.args(args).env_remove("RUST_LOG");
    if let Some(directives) = rust_log {
        command.env("RUST_LOG", directives);
    }
    command.output().expect("failed to run benchjoin")
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn mpi_tree(root: &Path) {
    write(
        &root.join("MPI/Node_1/run.csv"),
        "Processes,Total(s)\n2,1.0\n2,1.0\n",
    );
    write(
        &root.join("MPI/Node_2/run.csv"),
        "Processes,Total(s)\n2,0.5\n2,0.5\n",
    );
}

#[test]
fn test_join_writes_summary() {
    let dir = TempDir::new().unwrap();
    mpi_tree(dir.path());
    let input = dir.path().join("MPI");
    let output = dir.path().join("MPI/joinedData.csv");

    let result = benchjoin(&[
        "join",
        "mpi",
        "--input",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--nodes",
        "1,2",
    ]);

    assert!(result.status.success());
    let stdout = String::from_utf8(result.stdout).unwrap();
    assert!(stdout.starts_with("[OK] MPI data joined successfully"));
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Label,Nodes,Processes,Total(s)\n\
         \"MPI: N 1, Prc 2\",1,2,1.0\n\
         \"MPI: N 2, Prc 2\",2,2,0.5\n"
    );
}

#[test]
fn test_failed_join_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("joinedData.csv");

    let result = benchjoin(&[
        "join",
        "openmp",
        "--input",
        dir.path().to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);

    assert!(!result.status.success());
    let stdout = String::from_utf8(result.stdout).unwrap();
    assert!(stdout.starts_with("[ERROR] Error joining OpenMP data"));
    assert!(stdout.contains("time_read-pgm.csv"));
    assert!(!output.exists());
}

#[test]
fn test_run_config_with_json_report() {
    let dir = TempDir::new().unwrap();
    mpi_tree(dir.path());
    let config = dir.path().join("join.toml");
    write(
        &config,
        "[[jobs]]\nmodel = \"mpi\"\ninput = \"MPI\"\noutput = \"out/mpi.csv\"\n",
    );

    let result = benchjoin(&[
        "run",
        "--config",
        config.to_str().unwrap(),
        "--format",
        "json",
    ]);

    assert!(result.status.success());
    let stdout = String::from_utf8(result.stdout).unwrap();
    assert!(stdout.contains("\"model\":\"mpi\""));
    assert!(stdout.contains("\"groups\":2"));
    assert!(dir.path().join("out/mpi.csv").exists());
}

#[test]
fn test_run_with_unmatched_job_filter() {
    let dir = TempDir::new().unwrap();
    mpi_tree(dir.path());
    let config = dir.path().join("join.toml");
    write(
        &config,
        "[[jobs]]\nmodel = \"mpi\"\ninput = \"MPI\"\noutput = \"out/mpi.csv\"\n",
    );

    let result = benchjoin(&[
        "run",
        "--config",
        config.to_str().unwrap(),
        "--job",
        "sequential",
    ]);

    assert!(!result.status.success());
    assert!(!dir.path().join("out/mpi.csv").exists());
}

#[test]
fn test_rust_log_overrides_default_level() {
    let dir = TempDir::new().unwrap();
    mpi_tree(dir.path());
    let input = dir.path().join("MPI");
    let output = dir.path().join("MPI/joinedData.csv");
    let args = [
        "join",
        "mpi",
        "--input",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ];

    let default = benchjoin_with_log(&args, None);
    assert!(default.status.success());
    assert!(String::from_utf8(default.stderr).unwrap().contains("INFO"));

    let quiet = benchjoin_with_log(&args, Some("error"));
    assert!(quiet.status.success());
    assert!(!String::from_utf8(quiet.stderr).unwrap().contains("INFO"));

    let chatty = benchjoin_with_log(&args, Some("debug"));
    assert!(chatty.status.success());
    assert!(String::from_utf8(chatty.stderr).unwrap().contains("DEBUG"));
}
