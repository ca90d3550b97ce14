/*!
 * Tests for pattern parsing and file set resolution
 */

use anyhow::Result;
use std::path::PathBuf;

use locheck::errors::ConfigError;
use locheck::files::{self, Parameters, PatternResolver, Template};
use crate::common;

/// Every set starts with the template rendered with the defaults
#[test]
fn test_files_withLocaleTree_shouldPutBaseFirstInEverySet() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    for path in ["de/a.md", "en/a.md", "fr/a.md", "de/b.md", "en/b.md"] {
        common::create_test_file(root, path, "# x")?;
    }

    let sets = files::files(&common::pattern_in(root, "{lang}/*.md"), &common::lang("en"))?;

    assert_eq!(sets.len(), 2);
    for set in &sets {
        let name = set.base().file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(set.base(), root.join("en").join(&name));
    }
    Ok(())
}

/// Translations are grouped by the part of the path no parameter covers
#[test]
fn test_files_withLocaleTree_shouldGroupByFixedPart() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    for path in ["de/a.md", "en/a.md", "en/b.md"] {
        common::create_test_file(root, path, "# x")?;
    }

    let sets = files::files(&common::pattern_in(root, "{lang}/*.md"), &common::lang("en"))?;

    let a = sets
        .iter()
        .find(|s| s.base().ends_with("en/a.md"))
        .expect("set for a.md");
    assert_eq!(a.others(), &[root.join("de/a.md")]);

    // b.md has no German version; the expected path is still listed
    let b = sets
        .iter()
        .find(|s| s.base().ends_with("en/b.md"))
        .expect("set for b.md");
    assert_eq!(b.others(), &[root.join("de/b.md")]);
    Ok(())
}

/// Patterns without parameters give one set per file
#[test]
fn test_files_withoutParameters_shouldReturnSingletons() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    for path in ["notes/a.txt", "notes/deep/b.txt", "notes/c.md"] {
        common::create_test_file(root, path, "text")?;
    }

    let sets = files::files(&common::pattern_in(root, "notes/**/*.txt"), &Parameters::new())?;

    let paths: Vec<PathBuf> = sets.iter().map(|s| s.base().to_path_buf()).collect();
    assert!(sets.iter().all(|s| s.len() == 1));
    assert!(paths.contains(&root.join("notes/deep/b.txt")));
    assert!(!paths.contains(&root.join("notes/c.md")));
    Ok(())
}

/// A recursive wildcard ahead of the locale keeps every directory level in the fixed part
#[test]
fn test_files_withNestedTreeUnderDoubleStar_shouldGroupPerDocument() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    for path in [
        "guide/setup/linux/en/install.md",
        "guide/setup/linux/de/install.md",
        "guide/setup/linux/fr/install.md",
        "guide/setup/en/index.md",
        "guide/setup/de/index.md",
        "guide/en/intro.md",
    ] {
        common::create_test_file(root, path, "# x")?;
    }

    let sets = files::files(&common::pattern_in(root, "guide/**/{lang}/*.md"), &common::lang("en"))?;

    let bases: Vec<PathBuf> = sets.iter().map(|s| s.base().to_path_buf()).collect();
    assert_eq!(bases.len(), 3);
    assert!(bases.contains(&root.join("guide/setup/linux/en/install.md")));
    assert!(bases.contains(&root.join("guide/setup/en/index.md")));
    assert!(bases.contains(&root.join("guide/en/intro.md")));

    let install = sets
        .iter()
        .find(|s| s.base().ends_with("linux/en/install.md"))
        .expect("set for install.md");
    assert!(install.others().contains(&root.join("guide/setup/linux/de/install.md")));
    assert!(install.others().contains(&root.join("guide/setup/linux/fr/install.md")));
    assert!(install.others().iter().all(|p| p.starts_with(root.join("guide/setup/linux"))));
    Ok(())
}

/// A wildcard may match nothing, as it does in the discovery glob
#[test]
fn test_files_withEmptyWildcardMatch_shouldKeepFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    for path in ["src/en/test.md", "src/de/test.md", "src/en/unit-test.md"] {
        common::create_test_file(root, path, "# x")?;
    }

    let sets = files::files(&common::pattern_in(root, "src/{lang}/*test.md"), &common::lang("en"))?;

    let bases: Vec<PathBuf> = sets.iter().map(|s| s.base().to_path_buf()).collect();
    assert_eq!(bases.len(), 2);
    assert!(bases.contains(&root.join("src/en/test.md")));
    assert!(bases.contains(&root.join("src/en/unit-test.md")));
    Ok(())
}

/// A placeholder without a default is a configuration error
#[test]
fn test_resolverNew_withMissingDefault_shouldNameParameter() {
    let err = PatternResolver::new("docs/{lang}/{section}.md", &common::lang("en")).unwrap_err();
    match err {
        ConfigError::MissingParameters { names, .. } => assert_eq!(names, vec!["section"]),
        other => panic!("unexpected error {other:?}"),
    }
}

/// Two parameters vary independently
#[test]
fn test_files_withTwoParameters_shouldCoverEveryCombination() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    for path in ["en/us/a.md", "en/gb/a.md", "de/de/a.md"] {
        common::create_test_file(root, path, "# x")?;
    }
    let mut defaults = common::lang("en");
    defaults.insert("region".to_string(), "us".to_string());

    let sets = files::files(&common::pattern_in(root, "{lang}/{region}/a.md"), &defaults)?;

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].base(), root.join("en/us/a.md"));
    assert!(sets[0].others().contains(&root.join("en/gb/a.md")));
    assert!(sets[0].others().contains(&root.join("de/de/a.md")));
    Ok(())
}

/// Malformed placeholders are rejected up front
#[test]
fn test_templateParse_withUnterminatedPlaceholder_shouldFail() {
    assert!(matches!(
        Template::parse("docs/{lang/a.md"),
        Err(ConfigError::InvalidPattern { .. })
    ));
}
