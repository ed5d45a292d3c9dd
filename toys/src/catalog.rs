use indexmap::IndexMap;

use crate::document::Document;
use crate::error::ToyError;
use crate::extract;
use crate::parser::{ParseError, Parser};
use crate::toy::Toy;

/// All requests of one document, indexed by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub document: Document,
    toys: IndexMap<String, Toy>,
    /// Parse and extraction problems, in that order.
    pub diagnostics: Vec<ParseError>,
}

impl Catalog {
    /// Parse `text` with the default markdown processors and extract its requests.
    pub fn compile(text: &str) -> Self {
        Self::from_document(Parser::default().parse_text(text))
    }

    pub fn from_document(mut document: Document) -> Self {
        let extraction = extract::extract(&document.nodes);
        let mut diagnostics = std::mem::take(&mut document.diagnostics);
        diagnostics.extend(extraction.diagnostics);
        Catalog {
            document,
            toys: extraction.toys,
            diagnostics,
        }
    }

    /// Look up a request. Tries an exact match first, then case-insensitive.
    pub fn get(&self, name: &str) -> Result<&Toy, ToyError> {
        self.toys
            .get(name)
            .or_else(|| {
                let lower = name.to_lowercase();
                self.toys
                    .iter()
                    .find(|(k, _)| k.to_lowercase() == lower)
                    .map(|(_, v)| v)
            })
            .ok_or_else(|| ToyError::RequestNotFound {
                name: name.to_string(),
            })
    }

    /// Request names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.toys.keys().map(|s| s.as_str())
    }

    pub fn toys(&self) -> impl Iterator<Item = &Toy> {
        self.toys.values()
    }

    pub fn len(&self) -> usize {
        self.toys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toys.is_empty()
    }
}
