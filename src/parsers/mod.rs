/*!
 * Content parsing.
 *
 * A `ParserChain` turns the raw bytes of a file into normalized content by
 * running an ordered list of `Stage`s. Each supported file type maps to a
 * default chain:
 *
 * - `txt`  -> `Identity`
 * - `md`   -> `MarkdownRender`
 * - `xml`  -> `XmlExtract(query)`
 * - `csv`  -> `CsvToLines`
 * - `html` -> `Identity` (content already is HTML)
 */

pub mod markdown;
pub mod xml;

use serde::{Deserialize, Serialize};

use crate::errors::{ChainError, ConfigError, ParseError};

pub use markdown::{MarkdownRenderer, Rule, RuleObserver};
pub use xml::XmlQuery;

/// Recognized content formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Txt,
    #[default]
    Md,
    Xml,
    Csv,
    Html,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Md => "md",
            Self::Xml => "xml",
            Self::Csv => "csv",
            Self::Html => "html",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FileType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" => Ok(Self::Txt),
            "md" | "markdown" => Ok(Self::Md),
            "xml" => Ok(Self::Xml),
            "csv" => Ok(Self::Csv),
            "html" => Ok(Self::Html),
            _ => Err(ConfigError::UnknownFileType(s.to_string())),
        }
    }
}

/// What a chain hands to the checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Plain text or Markdown source
    Text,
    /// Rendered HTML
    Html,
}

/// One transform in a parser chain
#[derive(Debug, Clone)]
pub enum Stage {
    /// Trimmed passthrough
    Identity,
    /// Markdown source to HTML
    MarkdownRender(MarkdownRenderer),
    /// Text of the elements selected by a query, separated by blank lines
    XmlExtract(XmlQuery),
    /// Comma separated fields to one field per line
    CsvToLines,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::MarkdownRender(_) => "markdown",
            Self::XmlExtract(_) => "xml",
            Self::CsvToLines => "csv",
        }
    }

    pub fn markdown() -> Self {
        Self::MarkdownRender(MarkdownRenderer::new())
    }

    /// Build an XML stage; the query is compiled up front
    pub fn xml(query: &str) -> Result<Self, ConfigError> {
        XmlQuery::parse(query)
            .map(Self::XmlExtract)
            .map_err(|e| ConfigError::InvalidSetting {
                name: "query".to_string(),
                reason: e.to_string(),
            })
    }

    pub fn apply(&self, content: &str) -> Result<String, ParseError> {
        match self {
            Self::Identity => Ok(content.trim().to_string()),
            Self::MarkdownRender(renderer) => Ok(renderer.render(content)),
            Self::XmlExtract(query) => query.extract(content),
            Self::CsvToLines => Ok(content.split(',').collect::<Vec<_>>().join("\n")),
        }
    }

    fn output_kind(&self, input: ContentKind) -> ContentKind {
        match self {
            Self::Identity => input,
            Self::MarkdownRender(_) => ContentKind::Html,
            Self::XmlExtract(_) | Self::CsvToLines => ContentKind::Text,
        }
    }
}

/// Ordered composition of stages
#[derive(Debug, Clone)]
pub struct ParserChain {
    stages: Vec<Stage>,
    input: ContentKind,
    filetype: Option<FileType>,
}

impl Default for ParserChain {
    fn default() -> Self {
        Self::new(vec![Stage::Identity])
    }
}

impl ParserChain {
    /// Chain over text input
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            stages,
            input: ContentKind::Text,
            filetype: None,
        }
    }

    /// Default chain for a file type.
    ///
    /// With `render_markdown`, text-producing chains (`txt`, `xml`, `csv`)
    /// additionally render their output as Markdown.
    pub fn for_filetype(
        filetype: FileType,
        query: Option<&str>,
        render_markdown: bool,
    ) -> Result<Self, ConfigError> {
        let mut stages = match filetype {
            FileType::Txt | FileType::Html => vec![Stage::Identity],
            FileType::Md => vec![Stage::markdown()],
            FileType::Xml => {
                let query = query.ok_or(ConfigError::MissingQuery)?;
                vec![Stage::xml(query)?]
            }
            FileType::Csv => vec![Stage::CsvToLines],
        };
        if render_markdown && matches!(filetype, FileType::Txt | FileType::Xml | FileType::Csv) {
            stages.push(Stage::markdown());
        }

        let input = if filetype == FileType::Html {
            ContentKind::Html
        } else {
            ContentKind::Text
        };

        Ok(Self {
            stages,
            input,
            filetype: Some(filetype),
        })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn filetype(&self) -> Option<FileType> {
        self.filetype
    }

    /// Human readable label used in configuration errors
    pub fn label(&self) -> String {
        match self.filetype {
            Some(filetype) => filetype.to_string(),
            None => self
                .stages
                .iter()
                .map(Stage::name)
                .collect::<Vec<_>>()
                .join("+"),
        }
    }

    /// Kind of content the chain produces
    pub fn output_kind(&self) -> ContentKind {
        self.stages
            .iter()
            .fold(self.input, |kind, stage| stage.output_kind(kind))
    }

    /// Decode raw bytes and run them through every stage
    pub fn parse(&self, raw: &[u8]) -> Result<String, ChainError> {
        let content = std::str::from_utf8(raw).map_err(|e| ChainError {
            stage: "decode".to_string(),
            original: String::from_utf8_lossy(raw).to_string(),
            source: ParseError::Encoding(e.to_string()),
        })?;
        self.parse_str(content)
    }

    /// Run already decoded content through every stage.
    ///
    /// The first failing stage aborts the chain; its error carries the
    /// original content.
    pub fn parse_str(&self, content: &str) -> Result<String, ChainError> {
        let mut current = content.to_string();
        for stage in &self.stages {
            current = stage.apply(&current).map_err(|source| ChainError {
                stage: stage.name().to_string(),
                original: content.to_string(),
                source,
            })?;
        }
        Ok(current)
    }
}
