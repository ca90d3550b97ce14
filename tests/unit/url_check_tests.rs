/*!
 * Tests for URL extraction, deduplication and status resolution
 */

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use locheck::app_config::UrlCheckConfig;
use locheck::checks::urls::{HtmlUrlExtractor, TextUrlExtractor, UrlExtractor};
use locheck::checks::{Check, Diagnostic, UrlCheck, UrlStatusChecker};
use locheck::files::FileSet;
use locheck::parsers::{FileType, ParserChain};
use crate::common;
use crate::common::mock_fetcher::MockFetcher;

fn text_check(fetcher: Arc<MockFetcher>) -> UrlCheck {
    UrlCheck::new(
        UrlExtractor::Text(TextUrlExtractor::new()),
        UrlStatusChecker::new(fetcher, 3, 4),
    )
}

fn txt_chain() -> ParserChain {
    ParserChain::for_filetype(FileType::Txt, None, false).unwrap()
}

/// Two files referencing the same URL cost one request
#[tokio::test]
async fn test_check_withSharedUrl_shouldRequestOnceAndListBothFiles() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let a = common::create_test_file(temp_dir.path(), "a.txt", "see http://dead.example.com now")?;
    let b = common::create_test_file(temp_dir.path(), "b.txt", "also http://dead.example.com")?;

    let fetcher = Arc::new(MockFetcher::new().script("http://dead.example.com", &[404]));
    let check = text_check(fetcher.clone());
    let diagnostics = check
        .check(&[FileSet::new(&a), FileSet::new(&b)], &txt_chain())
        .await;

    assert_eq!(fetcher.calls_for("http://dead.example.com"), 1);
    assert_eq!(
        diagnostics,
        vec![Diagnostic::UrlInvalid {
            url: "http://dead.example.com".to_string(),
            status: 404,
            files: vec![a, b],
            has_disallowed_chars: false,
        }]
    );
    Ok(())
}

/// 500, 500, 200 recovers on the third and last attempt
#[tokio::test]
async fn test_check_withTransientFailure_shouldRetryAndPass() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let a = common::create_test_file(temp_dir.path(), "a.txt", "http://flaky.example.com")?;

    let fetcher = Arc::new(MockFetcher::new().script("http://flaky.example.com", &[500, 500, 200]));
    let diagnostics = text_check(fetcher.clone())
        .check(&[FileSet::new(&a)], &txt_chain())
        .await;

    assert!(diagnostics.is_empty());
    assert_eq!(fetcher.calls_for("http://flaky.example.com"), 3);
    Ok(())
}

/// A URL answering 500 three times is reported with status 500
#[tokio::test]
async fn test_check_withPersistentFailure_shouldReport500() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let a = common::create_test_file(temp_dir.path(), "a.txt", "http://down.example.com")?;

    let fetcher = Arc::new(MockFetcher::with_default(500));
    let diagnostics = text_check(fetcher.clone())
        .check(&[FileSet::new(&a)], &txt_chain())
        .await;

    assert_eq!(fetcher.total_calls(), 3);
    assert!(matches!(
        diagnostics.as_slice(),
        [Diagnostic::UrlInvalid { status: 500, .. }]
    ));
    Ok(())
}

/// Placeholders never reach the network
#[tokio::test]
async fn test_check_withPlaceholderUrl_shouldNotRequest() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let a = common::create_test_file(
        temp_dir.path(),
        "a.txt",
        "open http://{{host}}/login or http://example.com/{{ticket.id}}",
    )?;

    let fetcher = Arc::new(MockFetcher::new());
    let diagnostics = text_check(fetcher.clone())
        .check(&[FileSet::new(&a)], &txt_chain())
        .await;

    assert!(diagnostics.is_empty());
    assert_eq!(fetcher.total_calls(), 0);
    Ok(())
}

/// A left-to-right mark makes a 200 URL invalid
#[tokio::test]
async fn test_check_withLeftToRightMark_shouldReportDespite200() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let a = common::create_test_file(
        temp_dir.path(),
        "a.html",
        "<p><a>http://example.com/\u{200e}page</a></p>",
    )?;

    let fetcher = Arc::new(MockFetcher::new());
    let check = UrlCheck::new(
        UrlExtractor::Html(HtmlUrlExtractor::default()),
        UrlStatusChecker::new(fetcher.clone(), 3, 4),
    );
    let chain = ParserChain::for_filetype(FileType::Html, None, false)?;
    let diagnostics = check.check(&[FileSet::new(&a)], &chain).await;

    assert_eq!(fetcher.total_calls(), 1);
    assert!(matches!(
        diagnostics.as_slice(),
        [Diagnostic::UrlInvalid { status: 200, has_disallowed_chars: true, .. }]
    ));
    Ok(())
}

/// Missing files are reported and do not stop the batch
#[tokio::test]
async fn test_check_withMissingFile_shouldReportAndContinue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let a = common::create_test_file(temp_dir.path(), "a.txt", "http://gone.example.com")?;
    let missing = temp_dir.path().join("missing.txt");

    let fetcher = Arc::new(MockFetcher::with_default(404));
    let diagnostics = text_check(fetcher)
        .check(&[FileSet::new(&missing), FileSet::new(&a)], &txt_chain())
        .await;

    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0], Diagnostic::MissingFile { path: missing });
    assert!(matches!(&diagnostics[1], Diagnostic::UrlInvalid { files, .. } if files == &vec![a.clone()]));
    Ok(())
}

/// Markdown chains get the HTML extractor, with relative links resolved
#[tokio::test]
async fn test_forChain_withMarkdownAndRootUrl_shouldResolveRelativeLinks() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let a = common::create_test_file(
        temp_dir.path(),
        "a.md",
        "Read the [faq](/faq) and ![logo](http://cdn.example.com/logo.png).",
    )?;

    let config = UrlCheckConfig {
        root_url: Some("https://example.com".to_string()),
        skip_images: true,
        ..UrlCheckConfig::default()
    };
    let fetcher = Arc::new(MockFetcher::new());
    let chain = ParserChain::for_filetype(FileType::Md, None, false)?;
    let check = UrlCheck::for_chain(&chain, &config, UrlStatusChecker::new(fetcher.clone(), 3, 4))?;
    check.check(&[FileSet::new(&a)], &chain).await;

    assert_eq!(fetcher.requested(), vec!["https://example.com/faq".to_string()]);
    Ok(())
}

/// The HTML extractor reads hrefs, anchor text and images
#[test]
fn test_htmlExtractor_withMixedCandidates_shouldFixThem() {
    let extractor = HtmlUrlExtractor::default();
    let html = r#"
        <a href="http://one.example.com">one</a>
        <a>two.example.com</a>
        <a href="someone@example.com">mail</a>
        <a href="ftp://files.example.com">ftp</a>
        <img src="https://img.example.com/a.png">
    "#;
    assert_eq!(
        extractor.extract_urls(html),
        vec![
            "http://one.example.com",
            "http://two.example.com",
            "https://img.example.com/a.png"
        ]
    );
}

/// Trailing punctuation and non-ASCII residue are stripped from text URLs
#[test]
fn test_textExtractor_withPunctuation_shouldCleanUrls() {
    let urls = TextUrlExtractor::new()
        .extract_urls("Go to http://example.com/a. Or (http://example.com/b) or http://exämple.com");
    assert_eq!(
        urls,
        vec!["http://example.com/a", "http://example.com/b", "http://exmple.com"]
    );
}

/// Duplicate paths across file sets are read once
#[test]
fn test_collectUrls_withRepeatedPath_shouldNotDuplicateFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let a = common::create_test_file(temp_dir.path(), "a.txt", "http://example.com")?;

    let check = text_check(Arc::new(MockFetcher::new()));
    let (records, failures) = check.collect_urls(&[FileSet::new(&a), FileSet::new(&a)], &txt_chain());

    assert!(failures.is_empty());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].files, vec![PathBuf::from(&a)]);
    Ok(())
}
