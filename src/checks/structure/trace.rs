/*!
 * Event-trace comparison of Markdown sources.
 *
 * The base is rendered once with a `Recorder` that keeps every rule firing.
 * The other document is then rendered with a `Comparer` that walks the
 * recording in step with its own firings. Both observers are created per
 * comparison; nothing is shared between calls.
 */

use crate::checks::StructureError;
use crate::parsers::{MarkdownRenderer, Rule, RuleObserver};

/// One rule firing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub rule: Rule,
    pub text: String,
}

/// Ordered rule firings of one rendering pass
pub type Recording = Vec<TraceEvent>;

#[derive(Debug, Default)]
pub struct Recorder {
    events: Recording,
}

impl Recorder {
    pub fn into_recording(self) -> Recording {
        self.events
    }
}

impl RuleObserver for Recorder {
    fn on_rule(&mut self, rule: Rule, text: &str) {
        self.events.push(TraceEvent {
            rule,
            text: text.to_string(),
        });
    }
}

/// Checks each firing against the next unconsumed recorded event
#[derive(Debug)]
pub struct Comparer<'a> {
    expected: &'a [TraceEvent],
    cursor: usize,
    errors: Vec<StructureError>,
}

impl<'a> Comparer<'a> {
    pub fn new(expected: &'a [TraceEvent]) -> Self {
        Self {
            expected,
            cursor: 0,
            errors: Vec::new(),
        }
    }

    /// Errors seen so far plus one `MissingElement` per unconsumed event
    pub fn finish(mut self) -> Vec<StructureError> {
        let leftover = self.expected.get(self.cursor..).unwrap_or_default();
        self.errors
            .extend(leftover.iter().map(|event| StructureError::MissingElement {
                rule: event.rule.clone(),
                text: event.text.clone(),
            }));
        self.errors
    }
}

impl RuleObserver for Comparer<'_> {
    fn on_rule(&mut self, rule: Rule, text: &str) {
        match self.expected.get(self.cursor) {
            None => self.errors.push(StructureError::ExtraElement {
                rule,
                text: text.to_string(),
            }),
            Some(expected) if expected.rule != rule || expected.text != text => {
                self.errors.push(StructureError::CompareElement {
                    expected_rule: expected.rule.clone(),
                    expected_text: expected.text.clone(),
                    actual_rule: rule,
                    actual_text: text.to_string(),
                })
            }
            Some(_) => {}
        }
        self.cursor += 1;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TraceComparator {
    renderer: MarkdownRenderer,
}

impl TraceComparator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, source: &str) -> Recording {
        let mut recorder = Recorder::default();
        self.renderer.render_observed(source, &mut recorder);
        recorder.into_recording()
    }

    pub fn compare(&self, base: &str, other: &str) -> Vec<StructureError> {
        if other.trim().is_empty() && !base.trim().is_empty() {
            return vec![StructureError::MissingFile];
        }

        let recording = self.record(base);
        let mut comparer = Comparer::new(&recording);
        self.renderer.render_observed(other, &mut comparer);
        comparer.finish()
    }
}
