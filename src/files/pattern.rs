/*!
 * Path templates.
 *
 * A template mixes literal text, shell wildcards (`*`, `**`) and named
 * placeholders (`{lang}`). The same template is used three ways: as a glob to
 * discover files, as a matcher to pull wildcard and placeholder values back
 * out of a concrete path, and as a format string to render a path from those
 * values.
 */

use std::collections::BTreeMap;
use std::path::PathBuf;

use globset::GlobBuilder;
use regex::Regex;

use crate::errors::ConfigError;

/// Values bound to named placeholders
pub type Parameters = BTreeMap<String, String>;

/// One piece of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal path text
    Literal(String),
    /// `*`, `**/` (any number of directories) or a trailing `**`
    Wildcard(String),
    /// `{name}`
    Param(String),
}

/// Values recovered from a concrete path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    /// Wildcard values in template order; this is the part shared by all locales
    pub fixed: Vec<String>,
    /// Placeholder values
    pub named: Parameters,
}

/// A parsed path template
#[derive(Debug, Clone)]
pub struct Template {
    raw: String,
    tokens: Vec<Token>,
}

impl Template {
    /// Tokenize a pattern
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();
        let mut prev: Option<char> = None;

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(n) => name.push(n),
                            None => return Err(invalid("unterminated placeholder")),
                        }
                    }
                    if !is_identifier(&name) {
                        return Err(invalid(&format!("bad placeholder name '{}'", name)));
                    }
                    flush_literal(&mut literal, &mut tokens);
                    tokens.push(Token::Param(name));
                }
                '}' => return Err(invalid("unmatched '}'")),
                '*' => {
                    flush_literal(&mut literal, &mut tokens);
                    if chars.peek() != Some(&'*') {
                        tokens.push(Token::Wildcard("*".to_string()));
                    } else {
                        chars.next();
                        // `**` only recurses as a whole path segment
                        let starts_segment = prev.is_none() || prev == Some('/');
                        match chars.peek() {
                            Some('/') if starts_segment => {
                                chars.next();
                                tokens.push(Token::Wildcard("**/".to_string()));
                                prev = Some('/');
                                continue;
                            }
                            None if starts_segment => tokens.push(Token::Wildcard("**".to_string())),
                            _ => tokens.push(Token::Wildcard("*".to_string())),
                        }
                    }
                }
                other => literal.push(other),
            }
            prev = Some(c);
        }
        flush_literal(&mut literal, &mut tokens);

        if tokens.is_empty() {
            return Err(invalid("empty pattern"));
        }

        Ok(Self {
            raw: pattern.to_string(),
            tokens,
        })
    }

    /// The pattern as given
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Placeholder names in order of first appearance
    pub fn params(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for token in &self.tokens {
            if let Token::Param(name) = token {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Placeholders without a value in `defaults`
    pub fn missing_params(&self, defaults: &Parameters) -> Vec<String> {
        self.params()
            .into_iter()
            .filter(|name| !defaults.contains_key(*name))
            .map(str::to_string)
            .collect()
    }

    /// Glob used to find candidate files; every placeholder becomes a
    /// non-empty segment wildcard (`?*`)
    pub fn discovery_glob(&self) -> String {
        self.tokens
            .iter()
            .map(|token| match token {
                Token::Literal(text) => globset::escape(text),
                Token::Wildcard(w) => w.clone(),
                Token::Param(_) => "?*".to_string(),
            })
            .collect()
    }

    /// Compiled discovery glob
    pub fn glob_matcher(&self) -> Result<globset::GlobMatcher, ConfigError> {
        let glob = self.discovery_glob();
        GlobBuilder::new(&glob)
            .literal_separator(true)
            .build()
            .map(|g| g.compile_matcher())
            .map_err(|e| ConfigError::InvalidPattern {
                pattern: self.raw.clone(),
                reason: e.to_string(),
            })
    }

    /// Anchored regex with one group per wildcard or placeholder.
    ///
    /// Groups follow the discovery glob with `literal_separator` set: `*`
    /// and placeholders stay inside one segment, `**/` spans whole
    /// directories (none included) and a trailing `**` takes the rest.
    pub fn path_matcher(&self) -> Result<Regex, ConfigError> {
        let mut source = String::from("^");
        for token in &self.tokens {
            match token {
                Token::Literal(text) => source.push_str(&regex::escape(text)),
                Token::Wildcard(w) => source.push_str(match w.as_str() {
                    "**/" => "((?:[^/]+/)*)",
                    "**" => "(.*)",
                    _ => "([^/]*)",
                }),
                Token::Param(_) => source.push_str("([^/]+)"),
            }
        }
        source.push('$');
        Regex::new(&source).map_err(|e| ConfigError::InvalidPattern {
            pattern: self.raw.clone(),
            reason: e.to_string(),
        })
    }

    /// Split a concrete path into its fixed part and placeholder values.
    ///
    /// Returns `None` when the path does not fit the template, or when a
    /// placeholder used twice binds two different values.
    pub fn capture(&self, matcher: &Regex, path: &str) -> Option<Captured> {
        let caps = matcher.captures(path)?;
        let mut fixed = Vec::new();
        let mut named = Parameters::new();
        let mut group = 1;

        for token in &self.tokens {
            match token {
                Token::Literal(_) => continue,
                Token::Wildcard(_) => fixed.push(caps.get(group)?.as_str().to_string()),
                Token::Param(name) => {
                    let value = caps.get(group)?.as_str();
                    match named.get(name) {
                        Some(existing) if existing != value => return None,
                        Some(_) => {}
                        None => {
                            named.insert(name.clone(), value.to_string());
                        }
                    }
                }
            }
            group += 1;
        }

        Some(Captured { fixed, named })
    }

    /// Render a path from wildcard values and placeholder values.
    ///
    /// Returns `None` if a value is missing.
    pub fn render(&self, fixed: &[String], named: &Parameters) -> Option<String> {
        let mut out = String::new();
        let mut wildcards = fixed.iter();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Wildcard(_) => out.push_str(wildcards.next()?),
                Token::Param(name) => out.push_str(named.get(name)?),
            }
        }
        Some(out)
    }

    /// Deepest directory that contains every possible match
    pub fn walk_root(&self) -> PathBuf {
        let prefix = match self.tokens.first() {
            Some(Token::Literal(text)) => text.as_str(),
            _ => "",
        };
        match prefix.rfind('/') {
            Some(0) => PathBuf::from("/"),
            Some(idx) => PathBuf::from(&prefix[..idx]),
            None => PathBuf::from("."),
        }
    }
}

fn flush_literal(literal: &mut String, tokens: &mut Vec<Token>) {
    if !literal.is_empty() {
        tokens.push(Token::Literal(std::mem::take(literal)));
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
