use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ToyError;

/// HTTP version used when a request line does not name one.
pub const DEFAULT_HTTP_VERSION: &str = "HTTP/1.1";

/// A named request compiled from one level-2 heading of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toy {
    /// `Parent@Heading`, or just the heading text for a request without a parent.
    pub name: String,
    pub url: String,
    pub method: String,
    pub http_version: String,
    #[serde(default)]
    pub header: IndexMap<String, String>,
    #[serde(default)]
    pub param: IndexMap<String, String>,
    #[serde(default)]
    pub path_segments: Vec<String>,
    #[serde(default)]
    pub body: String,
}

/// Which kind of backend executes a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToyKind {
    Http,
    Database,
}

impl ToyKind {
    /// Classify by method: HTTP verbs and SQL statement families.
    pub fn from_method(method: &str) -> Option<ToyKind> {
        match method {
            "GET" | "POST" | "PUT" | "DELETE" | "HEAD" | "OPTIONS" | "PATCH" | "CONNECT"
            | "TRACE" => Some(ToyKind::Http),
            "DDL" | "DML" | "DCL" | "DQL" => Some(ToyKind::Database),
            _ => None,
        }
    }
}

impl fmt::Display for ToyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToyKind::Http => write!(f, "HTTP"),
            ToyKind::Database => write!(f, "DATABASE"),
        }
    }
}

impl Toy {
    pub fn named(name: impl Into<String>) -> Self {
        Toy {
            name: name.into(),
            ..Toy::default()
        }
    }

    /// The backend kind, from the method first and the URL scheme second.
    pub fn kind(&self) -> Result<ToyKind, ToyError> {
        ToyKind::from_method(&self.method)
            .or_else(|| self.url.starts_with("http").then_some(ToyKind::Http))
            .ok_or_else(|| ToyError::UnknownKind {
                method: self.method.clone(),
                url: self.url.clone(),
            })
    }

    /// The full request target: url, then path segments, then the query built
    /// from `param`.
    pub fn target(&self) -> String {
        let (path, query) = match self.url.split_once('?') {
            Some((path, query)) => (path.to_string(), query.to_string()),
            None => (self.url.clone(), String::new()),
        };

        let mut target = path;
        if !self.path_segments.is_empty() {
            if !target.ends_with('/') {
                target.push('/');
            }
            target.push_str(&self.path_segments.join("/"));
        }

        let params = self
            .param
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let query = match (query.is_empty(), params.is_empty()) {
            (true, _) => params,
            (false, true) => query,
            (false, false) if query.ends_with('&') => query + &params,
            (false, false) => format!("{}&{}", query, params),
        };
        if !query.is_empty() {
            target.push('?');
            target.push_str(&query);
        }
        target
    }
}
