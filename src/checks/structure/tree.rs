/*!
 * Element-tree comparison of rendered HTML.
 *
 * Both documents are flattened to their element names in depth-first
 * pre-order and compared position by position.
 */

use scraper::Html;

use crate::checks::StructureError;

/// Wrappers that only change how words look
const EMPHASIS_TAGS: &[&str] = &["b", "strong", "i", "em"];

#[derive(Debug, Clone, Copy)]
pub struct TreeComparator {
    ignore_emphasis: bool,
}

impl Default for TreeComparator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TreeComparator {
    pub fn new(ignore_emphasis: bool) -> Self {
        Self { ignore_emphasis }
    }

    /// Element names in document order.
    ///
    /// Skipping an emphasis element keeps its children in place, which is the
    /// same as splicing them into the parent.
    pub fn element_names(&self, content: &str) -> Vec<String> {
        let fragment = Html::parse_fragment(content);
        fragment
            .root_element()
            .descendants()
            .skip(1)
            .filter_map(|node| node.value().as_element().map(|e| e.name().to_string()))
            .filter(|name| !(self.ignore_emphasis && EMPHASIS_TAGS.contains(&name.as_str())))
            .collect()
    }

    pub fn compare(&self, base: &str, other: &str) -> Vec<StructureError> {
        if other.trim().is_empty() && !base.trim().is_empty() {
            return vec![StructureError::MissingFile];
        }

        let base_names = self.element_names(base);
        let other_names = self.element_names(other);

        let mut errors: Vec<StructureError> = base_names
            .iter()
            .zip(other_names.iter())
            .filter(|(b, o)| b != o)
            .map(|(b, o)| StructureError::TagName {
                base: b.clone(),
                other: o.clone(),
            })
            .collect();

        if base_names.len() != other_names.len() {
            errors.push(StructureError::TagCount {
                base: base_names.len(),
                other: other_names.len(),
            });
        }

        errors
    }
}
