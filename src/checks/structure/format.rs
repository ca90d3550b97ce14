/*!
 * Format-string comparison for string resources.
 *
 * Printf-style arguments (`%s`, `%1$d`, `%.2f`) and `@string/` references
 * must survive translation. The comparison counts arguments and lists
 * references; wording around them is free to change.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::checks::StructureError;

static ARGUMENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%(?:\d+\$)?(?:[a-zA-Z]+)?(?:\d+)?(?:\.\d+)?[a-zA-Z]+")
        .expect("Invalid argument regex")
});

static REFERENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@string/\w+").expect("Invalid reference regex"));

#[derive(Debug, Clone, Copy, Default)]
pub struct FormatComparator;

impl FormatComparator {
    pub fn new() -> Self {
        Self
    }

    /// Format arguments in order of appearance
    pub fn arguments<'a>(&self, content: &'a str) -> Vec<&'a str> {
        ARGUMENT_PATTERN.find_iter(content).map(|m| m.as_str()).collect()
    }

    /// `@string/` references in order of appearance
    pub fn references<'a>(&self, content: &'a str) -> Vec<&'a str> {
        REFERENCE_PATTERN.find_iter(content).map(|m| m.as_str()).collect()
    }

    pub fn compare(&self, base: &str, other: &str) -> Vec<StructureError> {
        if other.trim().is_empty() && !base.trim().is_empty() {
            return vec![StructureError::MissingFile];
        }

        let mut errors = Vec::new();

        let base_arguments = self.arguments(base).len();
        let other_arguments = self.arguments(other).len();
        if base_arguments != other_arguments {
            errors.push(StructureError::ArgumentCount {
                base: base_arguments,
                other: other_arguments,
            });
        }

        let base_references = self.references(base);
        let other_references = self.references(other);
        if base_references != other_references {
            errors.push(StructureError::ReferenceMismatch {
                base: base_references.into_iter().map(str::to_string).collect(),
                other: other_references.into_iter().map(str::to_string).collect(),
            });
        }

        errors
    }
}
