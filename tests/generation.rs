//! End-to-end generation: source files in, scaffold files out.

use std::fs;

use anyhow::Result;
use tempfile::tempdir;
use testforge::core::pipeline::SourceDocument;
use testforge::io::writer::PERSIST_STAGE;
use testforge::{TestforgeConfig, TestforgeEngine, TestforgeError};

const MY_CLASS: &str = include_str!("fixtures/csharp/MyClass.cs");
const ORDER_SERVICE: &str = include_str!("fixtures/csharp/OrderService.cs");

fn fixture_path(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/csharp")
        .join(name)
}

#[tokio::test]
async fn same_named_artifacts_get_distinct_paths() -> Result<()> {
    let out = tempdir()?;
    let engine = TestforgeEngine::new(TestforgeConfig::default().with_output_directory(out.path()))?;

    let documents = (0..3)
        .map(|i| SourceDocument::new(format!("copy{i}"), MY_CLASS))
        .collect();
    let report = engine.run_documents(documents).await?;

    assert!(report.is_success());
    assert_eq!(report.written.len(), 3);

    let mut names: Vec<String> = report
        .written
        .iter()
        .filter_map(|p| p.file_name()?.to_str().map(str::to_string))
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec!["MyClassTests.cs", "MyClassTests0.cs", "MyClassTests1.cs"]
    );

    // identical inputs generate identical text
    let contents: Vec<String> = report
        .written
        .iter()
        .map(fs::read_to_string)
        .collect::<std::io::Result<_>>()?;
    assert!(contents.iter().all(|c| c == &contents[0]));
    Ok(())
}

#[tokio::test]
async fn existing_files_are_never_overwritten() -> Result<()> {
    let out = tempdir()?;
    fs::write(out.path().join("MyClassTests.cs"), "hand written")?;
    let engine = TestforgeEngine::new(TestforgeConfig::default().with_output_directory(out.path()))?;

    let report = engine.run(vec![fixture_path("MyClass.cs")]).await?;

    assert_eq!(report.written, vec![out.path().join("MyClassTests0.cs")]);
    assert_eq!(
        fs::read_to_string(out.path().join("MyClassTests.cs"))?,
        "hand written"
    );
    Ok(())
}

#[tokio::test]
async fn unit_without_namespace_writes_nothing() -> Result<()> {
    let dir = tempdir()?;
    let out = dir.path().join("generated");
    let engine = TestforgeEngine::new(TestforgeConfig::default().with_output_directory(&out))?;

    let report = engine.run(vec![fixture_path("NoNamespace.cs")]).await?;

    assert!(report.is_success());
    assert!(report.written.is_empty());
    assert_eq!(report.dropped_empty, 1);
    assert!(!out.exists());
    Ok(())
}

#[tokio::test]
async fn dependencies_are_mocked_or_defaulted() -> Result<()> {
    let out = tempdir()?;
    let engine = TestforgeEngine::new(TestforgeConfig::default().with_output_directory(out.path()))?;

    let report = engine
        .run_documents(vec![SourceDocument::new("orders", ORDER_SERVICE)])
        .await?;
    let content = fs::read_to_string(&report.written[0])?;

    assert!(report.written[0].ends_with("OrderServiceTests.cs"));
    assert!(content.contains("namespace Shop.Orders.Tests"));
    assert!(content.contains("private Mock<IOrderRepository> _repository;"));
    assert!(!content.contains("IOrderRepository _repository ="));
    assert!(content.contains("private int _retries = 0;"));
    assert!(content.contains("private string _region = null;"));
    assert!(content.contains("_repository = new Mock<IOrderRepository>();"));
    assert!(content.contains("_orderService = new OrderService(_repository.Object, _retries, _region);"));
    assert!(content.contains("decimal actual = _orderService.Total(orderId, includeTax);"));
    assert!(content.contains("_orderService.Cancel(orderId);"));
    assert_eq!(content.matches("Assert.Fail(\"autogenerated\");").count(), 2);
    Ok(())
}

#[tokio::test]
async fn mixed_batch_reports_each_outcome() -> Result<()> {
    let dir = tempdir()?;
    let engine = TestforgeEngine::new(
        TestforgeConfig::default().with_output_directory(dir.path().join("out")),
    )?;

    let report = engine
        .run(vec![
            fixture_path("MyClass.cs"),
            fixture_path("NoNamespace.cs"),
            fixture_path("DoesNotExist.cs"),
            fixture_path("OrderService.cs"),
        ])
        .await?;

    assert_eq!(report.written.len(), 2);
    assert_eq!(report.dropped_empty, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].item.ends_with("DoesNotExist.cs"));
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn failed_write_is_reported_and_others_still_write() -> Result<()> {
    let out = tempdir()?;
    // dangling link: the name is free on disk but writing through it fails
    std::os::unix::fs::symlink(
        out.path().join("missing/Broken.cs"),
        out.path().join("BrokenTests.cs"),
    )?;
    let engine = TestforgeEngine::new(TestforgeConfig::default().with_output_directory(out.path()))?;

    let report = engine
        .run_documents(vec![
            SourceDocument::new("broken", "namespace B { public class Broken { } }"),
            SourceDocument::new("fine", "namespace F { public class Fine { } }"),
        ])
        .await?;

    assert_eq!(report.written, vec![out.path().join("FineTests.cs")]);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.stage, PERSIST_STAGE);
    assert_eq!(failure.item, "Broken");
    assert!(matches!(failure.error, TestforgeError::Write { .. }));
    Ok(())
}
