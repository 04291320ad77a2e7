//! Factory utilities and metadata for source parsers.

use std::path::Path;
use std::sync::Arc;

use tree_sitter::Language;

use crate::core::config::ExtractionConfig;
use crate::core::errors::{Result, TestforgeError};
use crate::lang::common::SourceParser;
use crate::lang::csharp::CSharpParser;

/// Metadata describing one of the built-in parsers.
#[derive(Debug, Clone, Copy)]
pub struct LanguageInfo {
    /// Canonical short key
    pub key: &'static str,
    /// Human-friendly display name
    pub name: &'static str,
    /// Supported file extensions (without leading dots)
    pub extensions: &'static [&'static str],
}

const REGISTERED_LANGUAGES: &[LanguageInfo] = &[LanguageInfo {
    key: "cs",
    name: "C#",
    extensions: &["cs"],
}];

/// Return the languages that are compiled into this build.
pub fn registered_languages() -> &'static [LanguageInfo] {
    REGISTERED_LANGUAGES
}

/// Identify the canonical language key for a file path.
pub fn language_key_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    find_language_by_extension(ext).map(|info| info.key)
}

/// Create a shareable parser for a language key.
pub fn parser_for_language(
    language: &str,
    config: &ExtractionConfig,
) -> Result<Arc<dyn SourceParser>> {
    match normalize_language_key(language) {
        Some("cs") => Ok(Arc::new(CSharpParser::new(config.reject_syntax_errors)?)),
        _ => Err(TestforgeError::unsupported(format!(
            "No parser available for '{}'",
            language
        ))),
    }
}

/// Get tree-sitter language for a given language key
pub fn get_tree_sitter_language(language_key: &str) -> Result<Language> {
    match normalize_language_key(language_key) {
        Some("cs") => Ok(tree_sitter_c_sharp::LANGUAGE.into()),
        _ => Err(TestforgeError::unsupported(format!(
            "No tree-sitter grammar for: {}",
            language_key
        ))),
    }
}

/// Create a new tree-sitter parser for the given language
pub fn create_parser_for_language(language_key: &str) -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    let tree_sitter_language = get_tree_sitter_language(language_key)?;
    parser.set_language(&tree_sitter_language).map_err(|e| {
        TestforgeError::parse(
            language_key,
            format!("Failed to set parser language: {}", e),
        )
    })?;
    Ok(parser)
}

fn find_language_by_extension(ext: &str) -> Option<&'static LanguageInfo> {
    let target = ext.trim_start_matches('.');
    registered_languages().iter().find(|info| {
        info.extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(target))
    })
}

fn normalize_language_key(language: &str) -> Option<&'static str> {
    match language.to_ascii_lowercase().as_str() {
        "cs" | "c#" | "csharp" | "c_sharp" => Some("cs"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_key_detection() {
        assert_eq!(language_key_for_path(Path::new("src/MyClass.cs")), Some("cs"));
        assert_eq!(language_key_for_path(Path::new("src/MyClass.CS")), Some("cs"));
        assert_eq!(language_key_for_path(Path::new("README")), None);
        assert_eq!(language_key_for_path(Path::new("main.rs")), None);
    }

    #[test]
    fn test_parser_aliases() {
        let config = ExtractionConfig::default();
        for alias in ["cs", "csharp", "C#", "c_sharp"] {
            assert!(
                parser_for_language(alias, &config).is_ok(),
                "parser for alias {} should be available",
                alias
            );
        }
        assert!(parser_for_language("cobol", &config).is_err());
    }

    #[test]
    fn test_create_tree_sitter_parser() {
        assert!(create_parser_for_language("cs").is_ok());
        assert!(create_parser_for_language("py").is_err());
    }
}
