use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use tracing::debug;

use expression::Variables;

/// Environment file looked up next to the document when `--env-file` is not given.
pub const DEFAULT_ENV_FILE: &str = "toys.env.toml";
/// Table merged under every environment.
pub const SHARED: &str = "shared";

/// A scalar in an environment file, rendered as text for substitution.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Integer(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Boolean(b) => b.to_string(),
        }
    }
}

/// Named variable sets, one top-level table per environment.
///
/// ```toml
/// [shared]
/// host = "localhost:8080"
///
/// [dev]
/// token = "dev-token"
/// ```
#[derive(Debug, Clone, Default)]
pub struct Environments {
    tables: BTreeMap<String, Variables>,
}

impl Environments {
    /// Load a `.toml` or `.json` environment file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read environment file '{}'", path.display()))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        let raw: BTreeMap<String, BTreeMap<String, Scalar>> = match extension.as_str() {
            "json" => serde_json::from_str(&text)
                .with_context(|| format!("invalid JSON in '{}'", path.display()))?,
            "toml" => toml::from_str(&text)
                .with_context(|| format!("invalid TOML in '{}'", path.display()))?,
            other => bail!("unsupported environment file type '{}'", other),
        };

        let tables = raw
            .into_iter()
            .map(|(name, values)| {
                let values = values.into_iter().map(|(k, v)| (k, v.into_text())).collect();
                (name, values)
            })
            .collect();
        debug!(path = %path.display(), "loaded environment file");
        Ok(Environments { tables })
    }

    /// Environment names, `shared` excluded.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|s| s.as_str()).filter(|n| *n != SHARED)
    }

    /// `shared` overlaid with the named environment.
    pub fn variables(&self, name: &str) -> Result<Variables> {
        let selected = self.tables.get(name).ok_or_else(|| {
            anyhow!(
                "environment '{}' not found (available: {})",
                name,
                self.names().collect::<Vec<_>>().join(", ")
            )
        })?;

        let mut variables = self.tables.get(SHARED).cloned().unwrap_or_default();
        variables.extend(selected.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(variables)
    }
}

/// The environment file to use: the explicit one, else `toys.env.toml` next to
/// the document if it exists.
pub fn env_file_for(document: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let candidate = document.parent().unwrap_or(Path::new(".")).join(DEFAULT_ENV_FILE);
    candidate.is_file().then_some(candidate)
}

/// Parse a `key=value` command line variable.
pub fn parse_var(arg: &str) -> std::result::Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", arg)),
    }
}
