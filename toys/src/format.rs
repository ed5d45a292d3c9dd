use std::collections::HashMap;
use std::path::Path;

use crate::error::ToyError;
use crate::parser::Parser;

/// Builds a parser for one document format.
pub type ParserFactory = fn() -> Parser;

/// Document formats by file extension (lower-case, without the dot).
///
/// Built once by the caller and passed where documents are loaded.
#[derive(Debug, Clone)]
pub struct Formats {
    parsers: HashMap<String, ParserFactory>,
}

impl Default for Formats {
    /// Markdown only.
    fn default() -> Self {
        Formats::empty().with("md", Parser::default)
    }
}

impl Formats {
    pub fn empty() -> Self {
        Formats {
            parsers: HashMap::new(),
        }
    }

    pub fn with(mut self, extension: &str, factory: ParserFactory) -> Self {
        self.parsers.insert(extension.to_lowercase(), factory);
        self
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.parsers.keys().map(|s| s.as_str())
    }

    /// The parser for a file, chosen by its extension.
    pub fn parser_for(&self, path: &Path) -> Result<Parser, ToyError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        self.parsers
            .get(&extension)
            .map(|factory| factory())
            .ok_or(ToyError::UnsupportedFormat { extension })
    }
}
