/*!
 * XML string extraction.
 *
 * Supports the ElementPath subset used for resource files:
 * `string`, `./string`, `.//string`, `resources/string`, `*`,
 * and attribute predicates `[@name]` / `[@name='value']`.
 */

use roxmltree::{Document, Node};

use crate::errors::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    /// `None` matches any element
    name: Option<String>,
    /// Attribute name and optional expected value
    predicate: Option<(String, Option<String>)>,
}

impl Step {
    fn matches(&self, node: &Node) -> bool {
        if !node.is_element() {
            return false;
        }
        if let Some(name) = &self.name {
            if node.tag_name().name() != name {
                return false;
            }
        }
        match &self.predicate {
            None => true,
            Some((attr, None)) => node.has_attribute(attr.as_str()),
            Some((attr, Some(value))) => node.attribute(attr.as_str()) == Some(value.as_str()),
        }
    }
}

/// Compiled element query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlQuery {
    source: String,
    steps: Vec<Step>,
}

impl XmlQuery {
    /// Compile a query expression
    pub fn parse(query: &str) -> Result<Self, ParseError> {
        let error = |reason: &str| ParseError::XmlQuery {
            query: query.to_string(),
            reason: reason.to_string(),
        };

        let mut rest = query.trim();
        if rest.is_empty() {
            return Err(error("empty query"));
        }
        if let Some(stripped) = rest.strip_prefix('.') {
            rest = stripped;
        }

        let mut steps = Vec::new();
        let mut first = true;
        while !rest.is_empty() {
            let axis = if let Some(r) = rest.strip_prefix("//") {
                rest = r;
                Axis::Descendant
            } else if let Some(r) = rest.strip_prefix('/') {
                rest = r;
                Axis::Child
            } else if first {
                Axis::Child
            } else {
                return Err(error("expected '/'"));
            };
            first = false;

            let end = step_end(rest);
            let step = &rest[..end];
            rest = &rest[end..];
            steps.push(parse_step(step, axis).ok_or_else(|| error(&format!("bad step '{}'", step)))?);
        }

        Ok(Self {
            source: query.to_string(),
            steps,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Evaluate the query against the document root element
    pub fn select<'a, 'input>(&self, doc: &'a Document<'input>) -> Vec<Node<'a, 'input>> {
        let mut context = vec![doc.root_element()];
        for step in &self.steps {
            let mut next: Vec<Node<'a, 'input>> = Vec::new();
            for node in &context {
                let candidates: Vec<Node<'a, 'input>> = match step.axis {
                    Axis::Child => node.children().collect(),
                    Axis::Descendant => node.descendants().skip(1).collect(),
                };
                for candidate in candidates {
                    if step.matches(&candidate) && !next.contains(&candidate) {
                        next.push(candidate);
                    }
                }
            }
            context = next;
        }
        context
    }

    /// Parse `content` and join the text of every selected element with blank lines
    pub fn extract(&self, content: &str) -> Result<String, ParseError> {
        if content.trim().is_empty() {
            return Ok(String::new());
        }
        let doc = Document::parse(content).map_err(|e| ParseError::Xml(e.to_string()))?;
        let texts: Vec<String> = self
            .select(&doc)
            .into_iter()
            .map(|node| {
                node.descendants()
                    .filter(|n| n.is_text())
                    .filter_map(|n| n.text())
                    .collect::<String>()
            })
            .collect();
        Ok(texts.join("\n\n"))
    }
}

fn step_end(rest: &str) -> usize {
    let mut depth = 0usize;
    for (idx, c) in rest.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => return idx,
            _ => {}
        }
    }
    rest.len()
}

fn parse_step(step: &str, axis: Axis) -> Option<Step> {
    let (name_part, predicate) = match step.find('[') {
        Some(open) => {
            let inner = step[open..].strip_prefix('[')?.strip_suffix(']')?;
            (&step[..open], Some(parse_predicate(inner)?))
        }
        None => (step, None),
    };

    let name = match name_part {
        "" => return None,
        "*" => None,
        other if other.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')) => {
            Some(other.to_string())
        }
        _ => return None,
    };

    Some(Step { axis, name, predicate })
}

fn parse_predicate(inner: &str) -> Option<(String, Option<String>)> {
    let inner = inner.trim().strip_prefix('@')?;
    match inner.split_once('=') {
        None => Some((inner.trim().to_string(), None)),
        Some((attr, value)) => {
            let value = value.trim();
            let unquoted = value
                .strip_prefix('\'')
                .and_then(|v| v.strip_suffix('\''))
                .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))?;
            Some((attr.trim().to_string(), Some(unquoted.to_string())))
        }
    }
}
