/*!
 * File discovery for localized content.
 *
 * - `pattern`: path template tokenizer, matcher and renderer
 * - `resolver`: groups discovered files into base-first `FileSet`s
 */

pub mod pattern;
pub mod resolver;

pub use pattern::{Parameters, Template};
pub use resolver::{FileSet, PatternResolver, files};
