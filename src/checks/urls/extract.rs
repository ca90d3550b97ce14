/*!
 * URL extraction from normalized content.
 *
 * - `TextUrlExtractor` scans plain text for `http(s)://` tokens
 * - `HtmlUrlExtractor` reads anchors and images from an HTML document
 *
 * Both drop URLs that still contain an untranslated `{{placeholder}}`.
 */

use log::error;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::errors::ConfigError;
use crate::parsers::ContentKind;

/// URL token grammar; balances parentheses and refuses trailing punctuation
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(?:https?://)(?:[^\s()\[\]<>]+|\((?:[^\s()<>]+|\([^\s()<>]+\))*\))+(?:\((?:[^\s()<>]+|\([^\s()<>]+\))*\)|[^\s`!()\[\];:'".,<>?«»“”‘’])"#,
    )
    .expect("Invalid url regex")
});

/// Untranslated template variable, whole or cut off at the end of a token
static PLACEHOLDER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{[^{}]*(?:\}\}|$)").expect("Invalid placeholder regex")
});

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.+@(\[?)[a-zA-Z0-9\-.]+\.([a-zA-Z]{2,3}|[0-9]{1,3})(\]?)$")
        .expect("Invalid email regex")
});

static SCHEME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.\-]*):").expect("Invalid scheme regex")
});

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("Invalid anchor selector"));

static IMAGE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("Invalid image selector"));

/// True if the URL still contains a `{{...}}` token, or the start of one
pub fn has_placeholder(url: &str) -> bool {
    PLACEHOLDER_PATTERN.is_match(url)
}

/// True if the whole string is a URL token, or starts with one
pub fn matches_url_grammar(candidate: &str) -> bool {
    URL_PATTERN
        .find(candidate)
        .is_some_and(|m| m.start() == 0)
}

fn looks_like_email(candidate: &str) -> bool {
    candidate.len() > 7 && EMAIL_PATTERN.is_match(candidate)
}

fn push_unique(urls: &mut Vec<String>, url: String) {
    if !urls.contains(&url) {
        urls.push(url);
    }
}

/// Extracts `http(s)://` tokens from free text
#[derive(Debug, Clone, Copy, Default)]
pub struct TextUrlExtractor;

impl TextUrlExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Distinct URLs in order of first appearance
    pub fn extract_urls(&self, content: &str) -> Vec<String> {
        let mut urls = Vec::new();
        for found in URL_PATTERN.find_iter(content) {
            let token = found.as_str();
            let token = token
                .strip_suffix(')')
                .or_else(|| token.strip_suffix('.'))
                .unwrap_or(token);
            // copy-paste artifacts: keep printable ASCII only
            let cleaned: String = token.chars().filter(|c| c.is_ascii_graphic()).collect();
            if cleaned.is_empty() || has_placeholder(&cleaned) {
                continue;
            }
            push_unique(&mut urls, cleaned);
        }
        urls
    }
}

/// Extracts link and image targets from HTML
#[derive(Debug, Clone, Default)]
pub struct HtmlUrlExtractor {
    root_url: Option<Url>,
    skip_images: bool,
}

impl HtmlUrlExtractor {
    pub fn new(root_url: Option<&str>, skip_images: bool) -> Result<Self, ConfigError> {
        let root_url = root_url
            .map(|root| {
                Url::parse(root).map_err(|e| ConfigError::InvalidRootUrl {
                    url: root.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;
        Ok(Self {
            root_url,
            skip_images,
        })
    }

    fn candidates(&self, content: &str) -> Vec<String> {
        let document = Html::parse_document(content);
        let mut candidates = Vec::new();

        for anchor in document.select(&ANCHOR_SELECTOR) {
            let candidate = match anchor.value().attr("href") {
                Some(href) if !href.is_empty() => href.to_string(),
                _ => anchor.text().collect::<String>(),
            };
            push_unique(&mut candidates, candidate);
        }

        if !self.skip_images {
            for image in document.select(&IMAGE_SELECTOR) {
                if let Some(src) = image.value().attr("src") {
                    push_unique(&mut candidates, src.to_string());
                }
            }
        }

        candidates
    }

    /// Turn an href/src/text candidate into a checkable URL
    fn fix_url(&self, candidate: &str) -> Option<String> {
        let candidate = candidate.trim();

        if candidate.starts_with('/') {
            let root = self.root_url.as_ref()?;
            return root.join(candidate).ok().map(String::from);
        }

        match SCHEME_PATTERN.captures(candidate).and_then(|c| c.get(1)) {
            Some(scheme) => {
                let scheme = scheme.as_str().to_lowercase();
                if scheme == "http" || scheme == "https" {
                    matches_url_grammar(candidate).then(|| candidate.to_string())
                } else {
                    error!("{} not tested", candidate);
                    None
                }
            }
            None => {
                if looks_like_email(candidate) {
                    return None;
                }
                let full = format!("http://{}", candidate);
                matches_url_grammar(&full).then_some(full)
            }
        }
    }

    /// Distinct URLs in document order, anchors before images
    pub fn extract_urls(&self, content: &str) -> Vec<String> {
        let mut urls = Vec::new();
        for candidate in self.candidates(content) {
            if let Some(url) = self.fix_url(&candidate) {
                if !has_placeholder(&url) {
                    push_unique(&mut urls, url);
                }
            }
        }
        urls
    }
}

/// Extractor picked for the content a parser chain produces
#[derive(Debug, Clone)]
pub enum UrlExtractor {
    Text(TextUrlExtractor),
    Html(HtmlUrlExtractor),
}

impl UrlExtractor {
    pub fn extract_urls(&self, content: &str) -> Vec<String> {
        match self {
            Self::Text(extractor) => extractor.extract_urls(content),
            Self::Html(extractor) => extractor.extract_urls(content),
        }
    }

    /// Kind of content this extractor expects
    pub fn content_kind(&self) -> ContentKind {
        match self {
            Self::Text(_) => ContentKind::Text,
            Self::Html(_) => ContentKind::Html,
        }
    }
}
