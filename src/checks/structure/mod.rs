/*!
 * Structural comparison between a base document and its translations.
 *
 * Three comparison forms are available:
 *
 * - `Tree`: element names of rendered HTML, compared position by position
 * - `Trace`: Markdown rule firings, compared event by event
 * - `Format`: printf-style arguments and `@string/` references
 *
 * Tree and trace are position indexed. Blocks that were legitimately
 * reordered in a translation are reported like any other difference.
 */

pub mod format;
pub mod trace;
pub mod tree;

use async_trait::async_trait;
use log::debug;

use crate::errors::ConfigError;
use crate::file_utils::FileManager;
use crate::files::FileSet;
use crate::parsers::{ContentKind, ParserChain};

use super::{Check, Diagnostic, StructureError};

pub use format::FormatComparator;
pub use trace::TraceComparator;
pub use tree::TreeComparator;

/// Comparison form
#[derive(Debug, Clone, Copy)]
pub enum StructureMode {
    Tree(TreeComparator),
    Trace(TraceComparator),
    Format(FormatComparator),
}

impl StructureMode {
    /// Content the form needs from the parser chain; `None` accepts any
    pub fn required_kind(&self) -> Option<ContentKind> {
        match self {
            Self::Tree(_) => Some(ContentKind::Html),
            Self::Trace(_) => Some(ContentKind::Text),
            Self::Format(_) => None,
        }
    }

    pub fn compare(&self, base: &str, other: &str) -> Vec<StructureError> {
        match self {
            Self::Tree(comparator) => comparator.compare(base, other),
            Self::Trace(comparator) => comparator.compare(base, other),
            Self::Format(comparator) => comparator.compare(base, other),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StructureCheck {
    mode: StructureMode,
}

impl StructureCheck {
    pub fn new(mode: StructureMode) -> Self {
        Self { mode }
    }

    pub fn tree(ignore_emphasis: bool) -> Self {
        Self::new(StructureMode::Tree(TreeComparator::new(ignore_emphasis)))
    }

    pub fn trace() -> Self {
        Self::new(StructureMode::Trace(TraceComparator::new()))
    }

    pub fn format() -> Self {
        Self::new(StructureMode::Format(FormatComparator::new()))
    }

    /// Compare every translation of one file set with its base
    pub fn check_file_set(&self, file_set: &FileSet, parser: &ParserChain) -> Vec<Diagnostic> {
        if file_set.others().is_empty() {
            return Vec::new();
        }

        let base = match FileManager::load_content(file_set.base(), parser) {
            Ok(content) => content,
            Err(diagnostic) => return vec![diagnostic],
        };

        let mut diagnostics = Vec::new();
        for other_path in file_set.others() {
            let other = match FileManager::load_content(other_path, parser) {
                Ok(content) => content,
                Err(diagnostic) => {
                    diagnostics.push(diagnostic);
                    continue;
                }
            };

            let errors = self.mode.compare(&base, &other);
            if errors.is_empty() {
                debug!("{} matches {}", other_path.display(), file_set.base().display());
                continue;
            }
            diagnostics.push(Diagnostic::StructureMismatch {
                base_path: file_set.base().to_path_buf(),
                other_path: other_path.clone(),
                errors,
            });
        }
        diagnostics
    }
}

#[async_trait]
impl Check for StructureCheck {
    fn name(&self) -> &'static str {
        match self.mode {
            StructureMode::Tree(_) => "structure",
            StructureMode::Trace(_) => "markdown",
            StructureMode::Format(_) => "format",
        }
    }

    fn supports(&self, chain: &ParserChain) -> Result<(), ConfigError> {
        let required = self.mode.required_kind();
        if required.is_none_or(|kind| kind == chain.output_kind()) {
            Ok(())
        } else {
            Err(ConfigError::UnsupportedCheck {
                check: self.name().to_string(),
                filetype: chain.label(),
            })
        }
    }

    async fn check(&self, file_sets: &[FileSet], parser: &ParserChain) -> Vec<Diagnostic> {
        file_sets
            .iter()
            .flat_map(|file_set| self.check_file_set(file_set, parser))
            .collect()
    }
}
