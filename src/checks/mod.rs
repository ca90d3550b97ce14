/*!
 * Checks over file sets.
 *
 * Every check shares one contract: take file sets and the parser chain that
 * normalizes their content, return diagnostics. Checks never fail; problems
 * with individual files come back as `MissingFile`/`ParseFailure`
 * diagnostics.
 */

pub mod diagnostic;
pub mod structure;
pub mod urls;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::app_config::{CheckKind, Config, StructureConfig, UrlCheckConfig};
use crate::errors::ConfigError;
use crate::files::FileSet;
use crate::parsers::ParserChain;

pub use diagnostic::{Diagnostic, StructureError};
pub use structure::{StructureCheck, StructureMode};
pub use urls::{StatusFetcher, UrlCheck, UrlRecord, UrlStatusChecker};

/// A validation over file sets
#[async_trait]
pub trait Check: Send + Sync + Debug {
    /// Name used in logs and configuration errors
    fn name(&self) -> &'static str;

    /// Whether the check can work on what `chain` produces
    fn supports(&self, _chain: &ParserChain) -> Result<(), ConfigError> {
        Ok(())
    }

    async fn check(&self, file_sets: &[FileSet], parser: &ParserChain) -> Vec<Diagnostic>;
}

/// Several checks over the same input, diagnostics in registration order
#[derive(Debug, Default)]
pub struct ChainCheck {
    checks: Vec<Box<dyn Check>>,
}

impl ChainCheck {
    pub fn new(checks: Vec<Box<dyn Check>>) -> Self {
        Self { checks }
    }

    pub fn push(&mut self, check: Box<dyn Check>) {
        self.checks.push(check);
    }

    pub fn checks(&self) -> &[Box<dyn Check>] {
        &self.checks
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

#[async_trait]
impl Check for ChainCheck {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn supports(&self, chain: &ParserChain) -> Result<(), ConfigError> {
        self.checks.iter().try_for_each(|check| check.supports(chain))
    }

    async fn check(&self, file_sets: &[FileSet], parser: &ParserChain) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for check in &self.checks {
            diagnostics.extend(check.check(file_sets, parser).await);
        }
        diagnostics
    }
}

/// URL check for `chain`, resolving statuses through `fetcher`
pub fn urls(
    chain: &ParserChain,
    config: &UrlCheckConfig,
    fetcher: Arc<dyn StatusFetcher>,
) -> Result<Box<dyn Check>, ConfigError> {
    let checker = UrlStatusChecker::new(fetcher, config.retry_max_count, config.max_concurrent_requests);
    let check = UrlCheck::for_chain(chain, config, checker)?;
    check.supports(chain)?;
    Ok(Box::new(check))
}

/// Tree comparison; `chain` must produce HTML
pub fn structure(chain: &ParserChain, config: &StructureConfig) -> Result<Box<dyn Check>, ConfigError> {
    let check = StructureCheck::tree(config.ignore_emphasis);
    check.supports(chain)?;
    Ok(Box::new(check))
}

/// Event-trace comparison; `chain` must produce Markdown source
pub fn markdown(chain: &ParserChain) -> Result<Box<dyn Check>, ConfigError> {
    let check = StructureCheck::trace();
    check.supports(chain)?;
    Ok(Box::new(check))
}

/// Format-argument and reference comparison; works on any chain output
pub fn format(chain: &ParserChain) -> Result<Box<dyn Check>, ConfigError> {
    let check = StructureCheck::format();
    check.supports(chain)?;
    Ok(Box::new(check))
}

/// Build the configured checks, in configuration order
pub fn build_checks(
    config: &Config,
    chain: &ParserChain,
    fetcher: Arc<dyn StatusFetcher>,
) -> Result<ChainCheck, ConfigError> {
    let mut checks = ChainCheck::default();
    for kind in &config.checks {
        let check = match kind {
            CheckKind::Urls => urls(chain, &config.urls, fetcher.clone())?,
            CheckKind::Structure => structure(chain, &config.structure)?,
            CheckKind::Markdown => markdown(chain)?,
            CheckKind::Format => format(chain)?,
        };
        checks.push(check);
    }
    Ok(checks)
}
