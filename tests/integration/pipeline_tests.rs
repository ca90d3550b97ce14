/*!
 * Integration tests for full validation runs
 */

use anyhow::Result;
use std::sync::Arc;

use locheck::app_config::{CheckKind, Config};
use locheck::checks::{Diagnostic, StructureError};
use locheck::errors::ConfigError;
use locheck::parsers::FileType;
use locheck::pipeline::Pipeline;
use crate::common;
use crate::common::mock_fetcher::MockFetcher;

fn docs_config(checks: Vec<CheckKind>) -> Config {
    Config {
        source: format!("{}/{{lang}}/*.md", common::test_resource_path("docs").display()),
        parameters: common::lang("en"),
        checks,
        ..Config::default()
    }
}

/// Test the bundled docs: one divergent and one missing translation
#[tokio::test]
async fn test_run_withDocsFixture_shouldReportOnlyTest2() -> Result<()> {
    common::init_logger();
    let fetcher = Arc::new(MockFetcher::new());
    let pipeline = Pipeline::from_config_with_fetcher(
        &docs_config(vec![CheckKind::Structure]),
        fetcher,
    )?;

    assert_eq!(pipeline.file_sets().len(), 2);
    let diagnostics = pipeline.run().await;

    let docs = common::test_resource_path("docs");
    assert_eq!(
        diagnostics,
        vec![
            Diagnostic::StructureMismatch {
                base_path: docs.join("en/test2.md"),
                other_path: docs.join("de/test2.md"),
                errors: vec![StructureError::TagCount { base: 2, other: 3 }],
            },
            Diagnostic::MissingFile {
                path: docs.join("fr/test2.md"),
            },
        ]
    );
    Ok(())
}

/// Test that test1.md, identical in structure everywhere, yields nothing
#[tokio::test]
async fn test_run_withMatchingTranslations_shouldBeClean() -> Result<()> {
    let mut config = docs_config(vec![CheckKind::Structure, CheckKind::Urls]);
    config.source = format!("{}/{{lang}}/test1.md", common::test_resource_path("docs").display());

    let fetcher = Arc::new(MockFetcher::new());
    let pipeline = Pipeline::from_config_with_fetcher(&config, fetcher.clone())?;
    let diagnostics = pipeline.run().await;

    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    // the shared guide link is requested once for all three locales
    assert_eq!(fetcher.calls_for("https://example.com/guide"), 1);
    Ok(())
}

/// Test that a broken link is reported with every file that references it
#[tokio::test]
async fn test_run_withDeadLink_shouldListAllLocales() -> Result<()> {
    let fetcher = Arc::new(MockFetcher::new().script("https://example.com/guide", &[404]));
    let pipeline = Pipeline::from_config_with_fetcher(&docs_config(vec![CheckKind::Urls]), fetcher)?;

    let diagnostics = pipeline.run().await;

    let docs = common::test_resource_path("docs");
    let url_diagnostics: Vec<&Diagnostic> = diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::UrlInvalid { .. }))
        .collect();
    assert_eq!(url_diagnostics.len(), 1);
    match url_diagnostics[0] {
        Diagnostic::UrlInvalid { status, files, .. } => {
            assert_eq!(*status, 404);
            assert_eq!(
                files,
                &vec![docs.join("en/test1.md"), docs.join("de/test1.md"), docs.join("fr/test1.md")]
            );
        }
        other => panic!("unexpected diagnostic {other:?}"),
    }
    Ok(())
}

/// Test that a file missing for two checks is reported once
#[tokio::test]
async fn test_run_withTwoChecks_shouldReportMissingFileOnce() -> Result<()> {
    let fetcher = Arc::new(MockFetcher::new());
    let pipeline = Pipeline::from_config_with_fetcher(
        &docs_config(vec![CheckKind::Urls, CheckKind::Structure]),
        fetcher,
    )?;

    let diagnostics = pipeline.run().await;

    let missing = diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::MissingFile { .. }))
        .count();
    assert_eq!(missing, 1);
    Ok(())
}

/// Test batch mode: links are deduplicated across the whole tree
#[tokio::test]
async fn test_run_withBatch_shouldRequestEachUrlOnce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "notes/a.txt", "http://shared.example.com")?;
    common::create_test_file(root, "notes/b.txt", "http://shared.example.com")?;

    let config = Config {
        source: common::pattern_in(root, "notes/*.txt"),
        parameters: Default::default(),
        filetype: FileType::Txt,
        checks: vec![CheckKind::Urls],
        batch: true,
        ..Config::default()
    };
    let fetcher = Arc::new(MockFetcher::new());
    let pipeline = Pipeline::from_config_with_fetcher(&config, fetcher.clone())?;

    let progress = std::sync::Mutex::new(Vec::new());
    let diagnostics = pipeline
        .run_with_progress(|done, total| progress.lock().unwrap().push((done, total)))
        .await;

    assert!(diagnostics.is_empty());
    assert_eq!(fetcher.total_calls(), 1);
    assert_eq!(*progress.lock().unwrap(), vec![(2, 2)]);
    Ok(())
}

/// Test that progress is reported once per file set
#[tokio::test]
async fn test_runWithProgress_shouldTickPerFileSet() -> Result<()> {
    let fetcher = Arc::new(MockFetcher::new());
    let pipeline = Pipeline::from_config_with_fetcher(&docs_config(vec![CheckKind::Structure]), fetcher)?;

    let progress = std::sync::Mutex::new(Vec::new());
    pipeline
        .run_with_progress(|done, total| progress.lock().unwrap().push((done, total)))
        .await;

    assert_eq!(*progress.lock().unwrap(), vec![(1, 2), (2, 2)]);
    Ok(())
}

/// Test the format check on Android-style string resources
#[tokio::test]
async fn test_run_withFormatCheckOnStrings_shouldReportDroppedArgument() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(
        root,
        "res/values-en/strings.xml",
        r#"<resources><string name="hi">Hi %1$s</string><string name="app">@string/brand</string></resources>"#,
    )?;
    common::create_test_file(
        root,
        "res/values-de/strings.xml",
        r#"<resources><string name="hi">Hallo %1$s</string><string name="app">@string/brand</string></resources>"#,
    )?;
    common::create_test_file(
        root,
        "res/values-fr/strings.xml",
        r#"<resources><string name="hi">Salut</string><string name="app">Marque</string></resources>"#,
    )?;

    let config = Config {
        source: common::pattern_in(root, "res/values-{lang}/strings.xml"),
        parameters: common::lang("en"),
        filetype: FileType::Xml,
        query: Some(".//string".to_string()),
        checks: vec![CheckKind::Format],
        ..Config::default()
    };
    let pipeline = Pipeline::from_config_with_fetcher(&config, Arc::new(MockFetcher::new()))?;

    let diagnostics = pipeline.run().await;

    assert_eq!(
        diagnostics,
        vec![Diagnostic::StructureMismatch {
            base_path: root.join("res/values-en/strings.xml"),
            other_path: root.join("res/values-fr/strings.xml"),
            errors: vec![
                StructureError::ArgumentCount { base: 1, other: 0 },
                StructureError::ReferenceMismatch {
                    base: vec!["@string/brand".to_string()],
                    other: vec![],
                },
            ],
        }]
    );
    Ok(())
}

/// Test that an unsupported check/filetype pair fails before any work
#[test]
fn test_fromConfig_withTraceOnMarkdownHtml_shouldFail() {
    let fetcher = Arc::new(MockFetcher::new());
    let err = Pipeline::from_config_with_fetcher(&docs_config(vec![CheckKind::Markdown]), fetcher.clone())
        .unwrap_err();

    assert!(matches!(err, ConfigError::UnsupportedCheck { .. }));
    assert_eq!(fetcher.total_calls(), 0);
}

/// Test that xml without a query is rejected
#[test]
fn test_fromConfig_withXmlAndNoQuery_shouldFail() {
    let config = Config {
        filetype: FileType::Xml,
        ..docs_config(vec![CheckKind::Urls])
    };
    let err = Pipeline::from_config_with_fetcher(&config, Arc::new(MockFetcher::new())).unwrap_err();
    assert_eq!(err, ConfigError::MissingQuery);
}
