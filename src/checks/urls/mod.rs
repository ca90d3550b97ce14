/*!
 * Link validation.
 *
 * `UrlCheck` extracts URLs from every file of a batch, merges repeated URLs
 * into one `UrlRecord`, resolves each record's status concurrently and
 * reports the records that are not valid.
 */

pub mod extract;
pub mod status;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;

use crate::app_config::UrlCheckConfig;
use crate::errors::ConfigError;
use crate::file_utils::FileManager;
use crate::files::FileSet;
use crate::parsers::{ContentKind, ParserChain};

use super::{Check, Diagnostic};

pub use extract::{HtmlUrlExtractor, TextUrlExtractor, UrlExtractor};
pub use status::{HttpStatusFetcher, StatusFetcher, UrlStatusChecker, DEFAULT_USER_AGENT};

/// Invisible left-to-right mark that sneaks into copied links
pub const DISALLOWED_CHAR: char = '\u{200E}';

/// Validation state of one distinct URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub url: String,
    /// Files referencing the URL, in discovery order
    pub files: Vec<PathBuf>,
    /// Last status seen; 200 until checked
    pub status_code: u16,
    pub has_disallowed_chars: bool,
}

impl UrlRecord {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            files: Vec::new(),
            status_code: 200,
            has_disallowed_chars: url.contains(DISALLOWED_CHAR),
        }
    }

    /// Record another referencing file; repeated files are ignored
    pub fn add_file(&mut self, path: &Path) {
        if !self.files.iter().any(|f| f == path) {
            self.files.push(path.to_path_buf());
        }
    }

    pub fn is_valid(&self) -> bool {
        (200..300).contains(&self.status_code) && !self.has_disallowed_chars
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::UrlInvalid {
            url: self.url,
            status: self.status_code,
            files: self.files,
            has_disallowed_chars: self.has_disallowed_chars,
        }
    }
}

/// Extract, deduplicate and validate links
#[derive(Debug, Clone)]
pub struct UrlCheck {
    extractor: UrlExtractor,
    checker: UrlStatusChecker,
}

impl UrlCheck {
    pub fn new(extractor: UrlExtractor, checker: UrlStatusChecker) -> Self {
        Self { extractor, checker }
    }

    /// Pick the extractor matching what `chain` produces
    pub fn for_chain(
        chain: &ParserChain,
        config: &UrlCheckConfig,
        checker: UrlStatusChecker,
    ) -> Result<Self, ConfigError> {
        let extractor = match chain.output_kind() {
            ContentKind::Text => UrlExtractor::Text(TextUrlExtractor::new()),
            ContentKind::Html => UrlExtractor::Html(HtmlUrlExtractor::new(
                config.root_url.as_deref(),
                config.skip_images,
            )?),
        };
        Ok(Self::new(extractor, checker))
    }

    /// One record per distinct URL across every file of `file_sets`.
    ///
    /// Files that cannot be loaded are returned as diagnostics and skipped.
    pub fn collect_urls(
        &self,
        file_sets: &[FileSet],
        parser: &ParserChain,
    ) -> (Vec<UrlRecord>, Vec<Diagnostic>) {
        let mut records: Vec<UrlRecord> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut failures = Vec::new();
        let mut seen_paths: Vec<&PathBuf> = Vec::new();

        for path in file_sets.iter().flat_map(FileSet::paths) {
            if seen_paths.contains(&path) {
                continue;
            }
            seen_paths.push(path);

            let content = match FileManager::load_content(path, parser) {
                Ok(content) => content,
                Err(diagnostic) => {
                    failures.push(diagnostic);
                    continue;
                }
            };

            for url in self.extractor.extract_urls(&content) {
                let slot = *index.entry(url.clone()).or_insert_with(|| {
                    records.push(UrlRecord::new(&url));
                    records.len() - 1
                });
                records[slot].add_file(path);
            }
        }

        debug!("Collected {} distinct URLs", records.len());
        (records, failures)
    }
}

#[async_trait]
impl Check for UrlCheck {
    fn name(&self) -> &'static str {
        "urls"
    }

    fn supports(&self, chain: &ParserChain) -> Result<(), ConfigError> {
        match (self.extractor.content_kind(), chain.output_kind()) {
            (ContentKind::Html, ContentKind::Text) => Err(ConfigError::UnsupportedCheck {
                check: self.name().to_string(),
                filetype: chain.label(),
            }),
            _ => Ok(()),
        }
    }

    async fn check(&self, file_sets: &[FileSet], parser: &ParserChain) -> Vec<Diagnostic> {
        let (records, mut diagnostics) = self.collect_urls(file_sets, parser);
        let checked = self.checker.check(records).await;
        diagnostics.extend(
            checked
                .into_iter()
                .filter(|record| !record.is_valid())
                .map(UrlRecord::into_diagnostic),
        );
        diagnostics
    }
}
