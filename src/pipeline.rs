/*!
 * Validation pipeline.
 *
 * Resolves the configured pattern into file sets, then runs the registered
 * checks over them with one parser chain. File sets are processed in
 * resolver order and checks in registration order; the only concurrency is
 * inside the URL check.
 */

use std::sync::Arc;

use log::{debug, info};

use crate::app_config::Config;
use crate::checks::urls::HttpStatusFetcher;
use crate::checks::{self, ChainCheck, Check, Diagnostic, StatusFetcher};
use crate::errors::{AppError, ConfigError};
use crate::files::{FileSet, PatternResolver};
use crate::parsers::ParserChain;
use crate::report::Reporter;

#[derive(Debug)]
pub struct Pipeline {
    file_sets: Vec<FileSet>,
    parser: ParserChain,
    checks: ChainCheck,
    batch: bool,
}

impl Pipeline {
    /// Fails if any check cannot work on what `parser` produces
    pub fn new(
        file_sets: Vec<FileSet>,
        parser: ParserChain,
        checks: ChainCheck,
        batch: bool,
    ) -> Result<Self, ConfigError> {
        checks.supports(&parser)?;
        Ok(Self {
            file_sets,
            parser,
            checks,
            batch,
        })
    }

    /// Build everything from a configuration, checking URLs over HTTP
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let fetcher = HttpStatusFetcher::new(&config.urls)?;
        Self::from_config_with_fetcher(config, Arc::new(fetcher))
    }

    /// Build everything from a configuration with a custom status fetcher.
    ///
    /// Every configuration error surfaces here, before any file is read.
    pub fn from_config_with_fetcher(
        config: &Config,
        fetcher: Arc<dyn StatusFetcher>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let parser = ParserChain::for_filetype(
            config.filetype,
            config.query.as_deref(),
            config.render_markdown,
        )?;
        let checks = checks::build_checks(config, &parser, fetcher)?;
        let resolver = PatternResolver::new(&config.source, &config.parameters)?;
        let file_sets = resolver.resolve()?;
        Self::new(file_sets, parser, checks, config.batch)
    }

    pub fn file_sets(&self) -> &[FileSet] {
        &self.file_sets
    }

    pub fn parser(&self) -> &ParserChain {
        &self.parser
    }

    pub async fn run(&self) -> Vec<Diagnostic> {
        self.run_with_progress(|_, _| {}).await
    }

    /// Run every check; `progress` receives `(completed, total)` file sets
    pub async fn run_with_progress<F>(&self, progress: F) -> Vec<Diagnostic>
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        let total = self.file_sets.len();
        info!(
            "Checking {} file set(s) with {} check(s)",
            total,
            self.checks.checks().len()
        );

        let mut diagnostics = Vec::new();
        if self.batch {
            let found = self.checks.check(&self.file_sets, &self.parser).await;
            merge(&mut diagnostics, found);
            progress(total, total);
        } else {
            for (index, file_set) in self.file_sets.iter().enumerate() {
                debug!("Checking {}", file_set.base().display());
                let found = self
                    .checks
                    .check(std::slice::from_ref(file_set), &self.parser)
                    .await;
                merge(&mut diagnostics, found);
                progress(index + 1, total);
            }
        }

        info!("Validation finished with {} diagnostic(s)", diagnostics.len());
        diagnostics
    }

    /// Run and hand the diagnostics to `reporter`
    pub async fn run_and_report(
        &self,
        reporter: &mut dyn Reporter,
    ) -> Result<Vec<Diagnostic>, AppError> {
        let diagnostics = self.run().await;
        reporter.report(&diagnostics)?;
        Ok(diagnostics)
    }
}

/// Append `found`, dropping file problems already reported by another check
fn merge(diagnostics: &mut Vec<Diagnostic>, found: Vec<Diagnostic>) {
    for diagnostic in found {
        let file_problem = matches!(
            diagnostic,
            Diagnostic::MissingFile { .. } | Diagnostic::ParseFailure { .. }
        );
        if file_problem && diagnostics.contains(&diagnostic) {
            continue;
        }
        diagnostics.push(diagnostic);
    }
}
