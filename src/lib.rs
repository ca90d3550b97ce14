/*!
 * # locheck - localized document validator
 *
 * A Rust library that checks translated documents against their reference
 * locale before they ship.
 *
 * ## Features
 *
 * - Group per-locale files into base-first file sets from a path pattern
 *   such as `docs/{lang}/guide.md`
 * - Normalize txt, Markdown, XML string resources, CSV and HTML content
 * - Validate every link concurrently, once per distinct URL, with retries
 * - Detect structural drift between a translation and its base, either on
 *   the rendered element tree or on the Markdown rule trace
 * - Keep format arguments and `@string/` references intact in string resources
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `files`: Pattern parsing and resolution into `FileSet`s
 * - `parsers`: Parser chains that normalize raw file content
 * - `checks`: The `Check` contract and its implementations:
 *   - `checks::urls`: Link extraction and status resolution
 *   - `checks::structure`: Tree, event-trace and format comparison
 * - `pipeline`: Runs checks over file sets and collects diagnostics
 * - `report`: Diagnostic sinks (console, JSON, memory)
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod checks;
pub mod errors;
pub mod file_utils;
pub mod files;
pub mod parsers;
pub mod pipeline;
pub mod report;

// Re-export main types for easier usage
pub use app_config::Config;
pub use checks::{Check, Diagnostic, StructureError};
pub use errors::{AppError, ChainError, ConfigError, ParseError};
pub use files::{FileSet, PatternResolver, files};
pub use parsers::{FileType, ParserChain, Stage};
pub use pipeline::Pipeline;
