//! Integration tests for template processing against the resolver pipeline.

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use kf_aws::{AwsConfig, AwsResourceResolver, CachedResolver, SessionManager};
use kf_runner::{MockResponse, MockRunner};
use kf_templates::{discover_templates, output_path_for, DiffFormatter, FileChange, TemplateProcessor, TemplateRenderer};
use tempfile::tempdir;

const REPOSITORY: &str = r#"{"repositories": [{"repositoryName": "myapp",
    "repositoryUri": "123.dkr.ecr.region.amazonaws.com/myapp"}]}"#;

fn cached_resolver(runner: &MockRunner) -> CachedResolver<AwsResourceResolver> {
    let sessions = SessionManager::new("us-east-1", AwsConfig::default(), Arc::new(runner.clone()));
    CachedResolver::new(AwsResourceResolver::new(sessions))
}

#[test]
fn test_ecr_reference_end_to_end() {
    let runner = MockRunner::new().on("aws ecr describe-repositories", MockResponse::success(REPOSITORY));
    let mut resolver = cached_resolver(&runner);
    let renderer = TemplateRenderer::new();

    let out = renderer.substitute(
        "image: {{ aws:ecr:name=myapp,attr=url }}\nsidecar: {{ aws:ecr:name=myapp,attr=url }}",
        &HashMap::new(),
        &mut resolver,
    );

    assert_eq!(
        out,
        "image: 123.dkr.ecr.region.amazonaws.com/myapp\nsidecar: 123.dkr.ecr.region.amazonaws.com/myapp"
    );
    assert_eq!(runner.count_matching("aws ecr"), 1);
}

#[test]
fn test_denied_reference_stays_visible() {
    let runner = MockRunner::new().on(
        "aws secretsmanager",
        MockResponse::failure(
            254,
            "An error occurred (AccessDeniedException) when calling the GetSecretValue operation: denied",
        ),
    );
    let mut resolver = cached_resolver(&runner);

    let template = "password: {{ aws:secret:name=db,key=password }}";
    let out = TemplateRenderer::new().substitute(template, &HashMap::new(), &mut resolver);
    assert_eq!(out, template);
}

#[test]
fn test_directory_render_and_diff() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join(".deployment.yaml.template"),
        "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: {{ app }}\nspec:\n  image: {{ aws:ecr:name=myapp }}\n",
    )
    .unwrap();

    let runner = MockRunner::new().on("aws ecr", MockResponse::success(REPOSITORY));
    let mut resolver = cached_resolver(&runner);
    let renderer = TemplateRenderer::new();
    let variables: HashMap<String, String> = [("app".to_string(), "web".to_string())].into();

    let changes: Vec<FileChange> = discover_templates(dir.path())
        .into_iter()
        .map(|template| {
            let content = fs::read_to_string(&template).unwrap();
            let output = output_path_for(&template).unwrap();
            let processed = renderer.substitute(&content, &variables, &mut resolver);
            FileChange::new(template, output, content, processed)
        })
        .collect();

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].output_path, dir.path().join("deployment.yaml"));
    assert!(changes[0].processed_content.contains("name: web"));

    let diff = DiffFormatter::new()
        .with_color(false)
        .with_base_dir(dir.path())
        .create_diff(&changes[0]);
    assert!(diff.starts_with("--- Template: .deployment.yaml.template\n+++ Generated: deployment.yaml"));
    assert!(diff.contains("+  image: 123.dkr.ecr.region.amazonaws.com/myapp"));
}

#[test]
fn test_processor_with_resolver_pipeline() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("app.yaml.template");
    fs::write(&template, "image: ${aws:ecr:name=myapp}\n").unwrap();

    let runner = MockRunner::new().on("aws ecr", MockResponse::success(REPOSITORY));
    let mut processor = TemplateProcessor::new(Box::new(cached_resolver(&runner)));

    let changes = processor.process_templates(&[template]).unwrap();
    assert_eq!(changes[0].processed_content, "image: 123.dkr.ecr.region.amazonaws.com/myapp\n");
    assert_eq!(changes[0].output_path, dir.path().join("app.yaml"));
    assert_eq!(processor.resolver().supported_types().len(), 7);
}
