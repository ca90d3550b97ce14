/*!
 * Typed findings produced by checks.
 *
 * Diagnostics are plain data: they are handed to a reporter and never carry
 * open files, clients or other live resources.
 */

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::parsers::Rule;

/// A position-indexed disagreement between a base document and a translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructureError {
    /// Elements at the same position have different names
    TagName { base: String, other: String },
    /// The two trees hold a different number of elements
    TagCount { base: usize, other: usize },
    /// The translation is empty while the base is not
    MissingFile,
    /// The translation fires a rule the base never recorded
    ExtraElement { rule: Rule, text: String },
    /// The translation fires a different rule than the base at this position
    CompareElement {
        expected_rule: Rule,
        expected_text: String,
        actual_rule: Rule,
        actual_text: String,
    },
    /// A rule recorded for the base never fired in the translation
    MissingElement { rule: Rule, text: String },
    /// The two files hold a different number of format arguments
    ArgumentCount { base: usize, other: usize },
    /// The `@string/` references differ
    ReferenceMismatch { base: Vec<String>, other: Vec<String> },
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TagName { base, other } => write!(
                f,
                "Tag {} in base file corresponds to {} in the other file",
                base, other
            ),
            Self::TagCount { base, other } => write!(
                f,
                "Base file has {} tags, the other file has {}",
                base, other
            ),
            Self::MissingFile => write!(f, "The other file is missing or empty"),
            Self::ExtraElement { rule, text } => {
                write!(f, "Unexpected {} {}", rule, quoted(text))
            }
            Self::CompareElement {
                expected_rule,
                expected_text,
                actual_rule,
                actual_text,
            } => write!(
                f,
                "Expected {} {} but found {} {}",
                expected_rule,
                quoted(expected_text),
                actual_rule,
                quoted(actual_text)
            ),
            Self::MissingElement { rule, text } => {
                write!(f, "Missing {} {}", rule, quoted(text))
            }
            Self::ArgumentCount { base, other } => write!(
                f,
                "Base file has {} format arguments, the other file has {}",
                base, other
            ),
            Self::ReferenceMismatch { base, other } => write!(
                f,
                "Base file references [{}], the other file references [{}]",
                base.join(", "),
                other.join(", ")
            ),
        }
    }
}

fn quoted(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("'{}'", text)
    }
}

/// One finding of a validation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A link that did not resolve, or that carries an invisible artifact
    UrlInvalid {
        url: String,
        status: u16,
        files: Vec<PathBuf>,
        has_disallowed_chars: bool,
    },
    /// A translation whose structure differs from its base
    StructureMismatch {
        base_path: PathBuf,
        other_path: PathBuf,
        errors: Vec<StructureError>,
    },
    /// A file named by a file set does not exist
    MissingFile { path: PathBuf },
    /// A file could not be read or parsed
    ParseFailure { path: PathBuf, cause: String },
}

impl Diagnostic {
    /// Short tag used by reporters
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UrlInvalid { .. } => "url_invalid",
            Self::StructureMismatch { .. } => "structure_mismatch",
            Self::MissingFile { .. } => "missing_file",
            Self::ParseFailure { .. } => "parse_failure",
        }
    }

    /// Files the finding is about
    pub fn paths(&self) -> Vec<&PathBuf> {
        match self {
            Self::UrlInvalid { files, .. } => files.iter().collect(),
            Self::StructureMismatch { other_path, .. } => vec![other_path],
            Self::MissingFile { path } | Self::ParseFailure { path, .. } => vec![path],
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UrlInvalid {
                url,
                status,
                files,
                has_disallowed_chars,
            } => {
                write!(f, "{} returned status code {}", url, status)?;
                if *has_disallowed_chars {
                    write!(f, " (contains disallowed characters)")?;
                }
                for file in files {
                    write!(f, "\n\treferenced in {}", file.display())?;
                }
                Ok(())
            }
            Self::StructureMismatch {
                base_path,
                other_path,
                errors,
            } => {
                write!(
                    f,
                    "the content of {} is not the same as {}:",
                    other_path.display(),
                    base_path.display()
                )?;
                for error in errors {
                    write!(f, "\n\t{}", error)?;
                }
                Ok(())
            }
            Self::MissingFile { path } => write!(f, "{} does not exist", path.display()),
            Self::ParseFailure { path, cause } => {
                write!(f, "failed to parse {}: {}", path.display(), cause)
            }
        }
    }
}
