//! Integration tests for the command runners.

use std::sync::Arc;

use kf_runner::{CliRunner, CommandRunner, CommandSpec, MockResponse, MockRunner};

fn run_through(runner: Arc<dyn CommandRunner>, spec: &CommandSpec) -> String {
    runner.run(spec).unwrap().combined_output()
}

#[test]
fn test_mock_runner_as_trait_object() {
    let mock = MockRunner::new().on(
        "aws sts get-caller-identity",
        MockResponse::success(r#"{"Account": "111111111111"}"#),
    );
    let runner: Arc<dyn CommandRunner> = Arc::new(mock.clone());

    let output = run_through(
        runner,
        &CommandSpec::new("aws").args(["sts", "get-caller-identity"]),
    );

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["Account"], "111111111111");
    assert_eq!(mock.call_count(), 1);
}

#[cfg(unix)]
#[test]
fn test_cli_runner_respects_workdir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("kustomization.yaml"), "resources: []\n").unwrap();

    let runner: Arc<dyn CommandRunner> = Arc::new(CliRunner::default());
    let output = run_through(
        runner,
        &CommandSpec::new("ls").workdir(dir.path()),
    );

    assert!(output.contains("kustomization.yaml"));
}

#[cfg(unix)]
#[test]
fn test_cli_runner_passes_env() {
    let runner = CliRunner::default();
    let spec = CommandSpec::new("sh")
        .args(["-c", "printf %s \"$AWS_REGION\""])
        .env("AWS_REGION", "eu-central-1");

    let result = runner.run(&spec).unwrap();
    assert_eq!(result.stdout, "eu-central-1");
}
