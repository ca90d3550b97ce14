/*!
 * Markdown rendering with structural hooks.
 *
 * The renderer reports every block and inline rule it applies to a
 * `RuleObserver` before turning the event into HTML. The text attached to a
 * rule is the part that should not change between locales (heading level,
 * code, inline HTML); translated wording is never part of it. Headings and
 * inline markers also report where they close, so nesting is part of the
 * trace.
 */

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use serde::Serialize;

/// Identity of a structural rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Heading,
    Paragraph,
    BlockQuote,
    CodeBlock,
    HtmlBlock,
    List,
    Item,
    Table,
    Emphasis,
    Strong,
    Strikethrough,
    Link,
    Image,
    Code,
    InlineHtml,
    HardBreak,
    HorizontalRule,
    FootnoteReference,
    TaskListMarker,
    /// Closing of a heading or inline marker
    End(Box<Rule>),
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Rule::End(opened) => return write!(f, "/{}", opened),
            Rule::Heading => "heading",
            Rule::Paragraph => "paragraph",
            Rule::BlockQuote => "blockquote",
            Rule::CodeBlock => "code_block",
            Rule::HtmlBlock => "html_block",
            Rule::List => "list",
            Rule::Item => "item",
            Rule::Table => "table",
            Rule::Emphasis => "emphasis",
            Rule::Strong => "strong",
            Rule::Strikethrough => "strikethrough",
            Rule::Link => "link",
            Rule::Image => "image",
            Rule::Code => "code",
            Rule::InlineHtml => "inline_html",
            Rule::HardBreak => "hard_break",
            Rule::HorizontalRule => "horizontal_rule",
            Rule::FootnoteReference => "footnote_reference",
            Rule::TaskListMarker => "task_list_marker",
        };
        write!(f, "{}", name)
    }
}

/// Receives one callback per structural rule firing, in document order
pub trait RuleObserver {
    fn on_rule(&mut self, rule: Rule, text: &str);
}

/// Markdown to HTML renderer
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }

    /// Render Markdown source to HTML
    pub fn render(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, Parser::new_ext(source, self.options));
        out
    }

    /// Render while reporting every rule firing to `observer`
    pub fn render_observed(&self, source: &str, observer: &mut dyn RuleObserver) -> String {
        let events = Parser::new_ext(source, self.options).inspect(|event| {
            if let Some((rule, text)) = rule_of(event) {
                observer.on_rule(rule, &text);
            }
        });
        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, events);
        out
    }
}

fn rule_of(event: &Event) -> Option<(Rule, String)> {
    let fired = match event {
        Event::Start(tag) => match tag {
            Tag::Paragraph => (Rule::Paragraph, String::new()),
            Tag::Heading { level, .. } => (Rule::Heading, "#".repeat(*level as usize)),
            Tag::BlockQuote => (Rule::BlockQuote, String::new()),
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => (Rule::CodeBlock, info.to_string()),
            Tag::CodeBlock(CodeBlockKind::Indented) => (Rule::CodeBlock, String::new()),
            Tag::HtmlBlock => (Rule::HtmlBlock, String::new()),
            Tag::List(start) => (Rule::List, start.map(|n| n.to_string()).unwrap_or_default()),
            Tag::Item => (Rule::Item, String::new()),
            Tag::Table(_) => (Rule::Table, String::new()),
            Tag::Emphasis => (Rule::Emphasis, String::new()),
            Tag::Strong => (Rule::Strong, String::new()),
            Tag::Strikethrough => (Rule::Strikethrough, String::new()),
            Tag::Link { .. } => (Rule::Link, String::new()),
            Tag::Image { .. } => (Rule::Image, String::new()),
            _ => return None,
        },
        Event::End(tag) => {
            let opened = match tag {
                TagEnd::Heading(_) => Rule::Heading,
                TagEnd::Emphasis => Rule::Emphasis,
                TagEnd::Strong => Rule::Strong,
                TagEnd::Strikethrough => Rule::Strikethrough,
                TagEnd::Link => Rule::Link,
                _ => return None,
            };
            (Rule::End(Box::new(opened)), String::new())
        }
        Event::Code(code) => (Rule::Code, code.to_string()),
        Event::InlineHtml(raw) => (Rule::InlineHtml, raw.trim().to_string()),
        Event::HardBreak => (Rule::HardBreak, String::new()),
        Event::Rule => (Rule::HorizontalRule, String::new()),
        Event::FootnoteReference(label) => (Rule::FootnoteReference, label.to_string()),
        Event::TaskListMarker(checked) => (Rule::TaskListMarker, checked.to_string()),
        _ => return None,
    };
    Some(fired)
}
