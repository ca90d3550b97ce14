/*!
 * Pattern resolution into comparable file sets.
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;
use walkdir::WalkDir;

use crate::errors::ConfigError;

use super::pattern::{Parameters, Template};

/// Base-first group of same-content, different-locale files.
///
/// Element 0 is always the reference file; the set is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSet {
    paths: Vec<PathBuf>,
}

impl FileSet {
    /// Create a set holding only its base file
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            paths: vec![base.into()],
        }
    }

    /// Append a translation, ignoring exact duplicates and the base itself
    pub fn push(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.paths.contains(&path) {
            return false;
        }
        self.paths.push(path);
        true
    }

    /// Reference-locale file
    pub fn base(&self) -> &Path {
        &self.paths[0]
    }

    /// Translation candidates
    pub fn others(&self) -> &[PathBuf] {
        &self.paths[1..]
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// A file set always holds its base
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Resolves a path pattern with named parameters into file sets
#[derive(Debug, Clone)]
pub struct PatternResolver {
    template: Template,
    defaults: Parameters,
}

impl PatternResolver {
    /// Prepare a resolver; fails if a placeholder has no default
    pub fn new(pattern: &str, defaults: &Parameters) -> Result<Self, ConfigError> {
        let template = Template::parse(pattern)?;
        let missing = template.missing_params(defaults);
        if !missing.is_empty() {
            return Err(ConfigError::MissingParameters {
                pattern: pattern.to_string(),
                names: missing,
            });
        }
        Ok(Self {
            template,
            defaults: defaults.clone(),
        })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Find all files matching the pattern and group them
    pub fn resolve(&self) -> Result<Vec<FileSet>, ConfigError> {
        let matches = self.discover()?;

        if self.template.params().is_empty() {
            return Ok(matches.into_iter().map(FileSet::new).collect());
        }

        self.group(matches)
    }

    /// Concrete files matching the discovery glob, in walk order
    fn discover(&self) -> Result<Vec<String>, ConfigError> {
        let matcher = self.template.glob_matcher()?;
        let root = self.template.walk_root();
        let strip_dot = root == Path::new(".");

        let mut matches = Vec::new();
        for entry in WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path().to_string_lossy().to_string();
            let path = if strip_dot {
                path.strip_prefix("./").map(str::to_string).unwrap_or(path)
            } else {
                path
            };
            if matcher.is_match(&path) {
                matches.push(path);
            }
        }

        debug!(
            "pattern {} -> glob {} matched {} file(s)",
            self.template.as_str(),
            self.template.discovery_glob(),
            matches.len()
        );
        Ok(matches)
    }

    fn group(&self, matches: Vec<String>) -> Result<Vec<FileSet>, ConfigError> {
        let matcher = self.template.path_matcher()?;

        let mut fixed_parts: Vec<Vec<String>> = Vec::new();
        let mut seen_fixed: HashMap<Vec<String>, usize> = HashMap::new();
        let mut values: Vec<Parameters> = Vec::new();

        for path in &matches {
            let Some(captured) = self.template.capture(&matcher, path) else {
                debug!("{} does not fit {}", path, self.template.as_str());
                continue;
            };
            if !seen_fixed.contains_key(&captured.fixed) {
                seen_fixed.insert(captured.fixed.clone(), fixed_parts.len());
                fixed_parts.push(captured.fixed);
            }
            if !values.contains(&captured.named) {
                values.push(captured.named);
            }
        }

        let mut sets = Vec::with_capacity(fixed_parts.len());
        for fixed in &fixed_parts {
            let Some(base) = self.template.render(fixed, &self.defaults) else {
                continue;
            };
            let mut set = FileSet::new(base);
            for named in &values {
                if let Some(other) = self.template.render(fixed, named) {
                    set.push(other);
                }
            }
            sets.push(set);
        }
        Ok(sets)
    }
}

/// Resolve `pattern` into base-first file sets using `defaults` for the base locale
pub fn files(pattern: &str, defaults: &Parameters) -> Result<Vec<FileSet>, ConfigError> {
    PatternResolver::new(pattern, defaults)?.resolve()
}
