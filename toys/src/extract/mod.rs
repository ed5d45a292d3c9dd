pub mod request_line;

pub use request_line::RequestLine;

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;
use tracing::{debug, warn};

use crate::node::{Node, NodeId, NodeKind};
use crate::parser::error::ParseError;
use crate::toy::Toy;

/// Heading level of a request group.
pub const REQUEST_LEVEL: usize = 2;
/// Heading level of a field group inside a request group.
pub const FIELD_LEVEL: usize = 3;

/// Separator between the parent heading and the request heading in a name.
pub const NAME_SEPARATOR: &str = "@";

/// Requests compiled from one document, in document order.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub toys: IndexMap<String, Toy>,
    pub diagnostics: Vec<ParseError>,
}

/// Walk a parsed node list and build one [`Toy`] per request group.
///
/// Every node is consumed by at most one field group. Problems inside a group
/// leave the affected field at its default and are reported as warnings.
pub fn extract(nodes: &[Node]) -> Extraction {
    let index: HashMap<NodeId, &Node> = nodes.iter().map(|n| (n.id, n)).collect();
    let mut extractor = Extractor {
        lookup: index.clone(),
        index,
        diagnostics: Vec::new(),
    };

    let mut toys = IndexMap::new();
    for group in nodes
        .iter()
        .filter(|n| n.is_heading_at(REQUEST_LEVEL) && n.has_children())
    {
        let toy = extractor.request(group);
        debug!(name = %toy.name, method = %toy.method, url = %toy.url, "extracted request");
        if toys.contains_key(&toy.name) {
            extractor.warn(
                ParseError::warning(format!("duplicate request name '{}'", toy.name), group.first_line())
                    .with_note("the later definition replaces the earlier one"),
            );
        }
        toys.insert(toy.name.clone(), toy);
    }

    Extraction {
        toys,
        diagnostics: extractor.diagnostics,
    }
}

struct Extractor<'a> {
    /// Every node of the document, for name lookups.
    index: HashMap<NodeId, &'a Node>,
    /// Nodes not yet consumed by a request or field group.
    lookup: HashMap<NodeId, &'a Node>,
    diagnostics: Vec<ParseError>,
}

impl<'a> Extractor<'a> {
    fn warn(&mut self, error: ParseError) {
        warn!(line = error.line, "{}", error.message);
        self.diagnostics.push(error);
    }

    fn request(&mut self, group: &'a Node) -> Toy {
        self.lookup.remove(&group.id);
        let mut toy = Toy::named(self.request_name(group));

        for child_id in &group.children_ids {
            let Some(item) = self.lookup.get(child_id).copied() else {
                continue;
            };
            if !(item.is_heading_at(FIELD_LEVEL) && item.has_children()) {
                continue;
            }
            self.lookup.remove(&item.id);

            let value_id = item.children_ids[0];
            match self.lookup.remove(&value_id) {
                Some(value) => self.field(&mut toy, item, value),
                None => self.warn(ParseError::warning(
                    format!("field '{}' has no value", item.content.trim()),
                    item.first_line(),
                )),
            }
        }

        toy
    }

    fn request_name(&self, group: &Node) -> String {
        let own = group.content.trim();
        match group.parent_id.and_then(|id| self.index.get(&id)) {
            Some(parent) => format!("{}{}{}", parent.content.trim(), NAME_SEPARATOR, own),
            None => own.to_string(),
        }
    }

    /// Dispatch one field group on its heading text and the kind of its value.
    fn field(&mut self, toy: &mut Toy, item: &Node, value: &Node) {
        let heading = item.content.as_str();
        match &value.kind {
            NodeKind::Blockquote if heading.contains("url") => {
                match RequestLine::parse(&value.content) {
                    Some(line) => {
                        toy.method = line.method;
                        toy.url = line.url;
                        toy.http_version = line.version;
                    }
                    None => self.warn(
                        ParseError::warning("cannot parse request line", value.first_line())
                            .with_note("expected `METHOD http://host/path [HTTP/version]`"),
                    ),
                }
            }
            NodeKind::CodeFence { lang } if heading.contains("body") => {
                toy.body = if is_json(lang) { value.content.clone() } else { String::new() };
            }
            NodeKind::CodeFence { lang } if heading.contains("param") => {
                toy.param = self
                    .decode::<IndexMap<String, Json>>(lang, value)
                    .into_iter()
                    .map(|(k, v)| (k, stringify(v)))
                    .collect();
            }
            NodeKind::CodeFence { lang } if heading.contains("pathVar") => {
                toy.path_segments = self
                    .decode::<Vec<Json>>(lang, value)
                    .into_iter()
                    .map(stringify)
                    .collect();
            }
            NodeKind::CodeFence { lang } if heading.contains("header") => {
                toy.header = self.decode::<IndexMap<String, String>>(lang, value);
            }
            kind => debug!(field = heading, %kind, "ignored field group"),
        }
    }

    /// Decode a json block; anything else (or an empty block) yields the default.
    fn decode<T: DeserializeOwned + Default>(&mut self, lang: &str, value: &Node) -> T {
        if !is_json(lang) || value.content.trim().is_empty() {
            return T::default();
        }
        match serde_json::from_str(&value.content) {
            Ok(decoded) => decoded,
            Err(e) => {
                self.warn(ParseError::warning(
                    format!("cannot decode json block: {}", e),
                    value.first_line(),
                ));
                T::default()
            }
        }
    }
}

fn is_json(lang: &str) -> bool {
    lang == "json"
}

/// JSON strings keep their text; other values use their JSON rendering.
fn stringify(value: Json) -> String {
    match value {
        Json::String(s) => s,
        other => other.to_string(),
    }
}
