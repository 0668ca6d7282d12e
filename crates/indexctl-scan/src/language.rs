//! Grammar selection for the source languages the dashboards use.

use std::path::Path;
use tree_sitter::{Parser, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLang {
    JavaScript,
    TypeScript,
    /// TSX grammar; also covers plain JSX files.
    Tsx,
}

impl SourceLang {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
        match ext.as_str() {
            "js" | "cjs" | "mjs" => Some(Self::JavaScript),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "jsx" | "tsx" => Some(Self::Tsx),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
        }
    }

    fn grammar(self) -> tree_sitter::Language {
        match self {
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Parse `source` with the grammar for `lang`. Grammar-level syntax
/// errors are reported as a failure rather than silently yielding a
/// partial tree.
pub fn parse_source(lang: SourceLang, source: &str) -> Result<Tree, String> {
    let mut parser = Parser::new();
    parser
        .set_language(&lang.grammar())
        .map_err(|err| format!("failed to load {} grammar: {err}", lang.name()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| format!("{} parser returned no tree", lang.name()))?;
    if tree.root_node().has_error() {
        return Err(format!("{} source contains syntax errors", lang.name()));
    }
    Ok(tree)
}
