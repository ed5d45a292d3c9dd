use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Deserialize;

use expression::{Engine, FixedClock, Variables, resolve_toy};
use toys::{Catalog, ParseError, Toy};

#[derive(Debug, Deserialize)]
pub struct ExpectedWarning {
    /// Substring that must appear in the warning message.
    pub contains: String,

    /// If set, the warning must point at this 1-based line of the document.
    #[serde(default)]
    pub line: Option<usize>,
}

/// Front matter of a `.test.md` file. Every `expect_*` key is optional; only
/// the ones present are checked.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Human-readable test description.
    pub description: Option<String>,

    /// Request to check (case-insensitive). Defaults to the first one in the document.
    pub request: Option<String>,

    /// Fixed "now" for date expressions, `YYYY-MM-DDTHH:MM:SS`.
    pub now: Option<String>,

    /// Variables available to placeholders.
    pub variables: Variables,

    /// Names of all requests in document order.
    pub expect_requests: Option<Vec<String>>,

    /// The request must not exist.
    pub expect_missing: bool,

    pub expect_method: Option<String>,
    pub expect_url: Option<String>,
    pub expect_version: Option<String>,
    pub expect_header: Option<BTreeMap<String, String>>,
    pub expect_param: Option<BTreeMap<String, String>>,
    pub expect_path: Option<Vec<String>>,

    /// Expected body (trimmed comparison).
    pub expect_body: Option<String>,

    /// Expected url with path segments and query appended.
    pub expect_target: Option<String>,

    /// Expected warnings. If present (even empty), warning count and content are checked.
    pub expect_warnings: Option<Vec<ExpectedWarning>>,
}

/// Split a `.test.md` file into its TOML front matter and the document.
fn split_front_matter(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');
    let rest = content
        .strip_prefix("---")
        .ok_or("missing opening --- front matter delimiter")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let close = rest
        .find("\n---")
        .ok_or("missing closing --- front matter delimiter")?;
    let front = rest[..close].trim_end_matches('\r');
    let after = &rest[close + "\n---".len()..];
    let document = after
        .strip_prefix("\r\n")
        .or_else(|| after.strip_prefix('\n'))
        .unwrap_or(after);

    let config = toml::from_str(front).map_err(|e| format!("TOML parse error: {}", e))?;
    Ok((config, document))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description
            .as_deref()
            .or_else(|| self.path.file_stem().and_then(|s| s.to_str()))
            .unwrap_or("?")
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let (description, outcome) = match std::fs::read_to_string(path) {
        Err(e) => (None, Err(format!("cannot read file: {}", e))),
        Ok(content) => match split_front_matter(&content) {
            Err(e) => (None, Err(format!("front matter error: {}", e))),
            Ok((config, document)) => (config.description.clone(), check(&config, document)),
        },
    };

    TestResult {
        path: path.to_path_buf(),
        description,
        outcome: match outcome {
            Ok(()) => TestOutcome::Pass,
            Err(reason) => TestOutcome::Fail(reason),
        },
    }
}

fn expect_eq<T: PartialEq + std::fmt::Debug>(what: &str, expected: &Option<T>, actual: &T) -> Result<(), String> {
    match expected {
        Some(expected) if expected != actual => Err(format!(
            "{} mismatch\n  expected: {:?}\n  actual:   {:?}",
            what, expected, actual
        )),
        _ => Ok(()),
    }
}

/// Compile `document` and compare against the expectations in `config`.
fn check(config: &TestConfig, document: &str) -> Result<(), String> {
    let catalog = Catalog::compile(document);

    if let Some(expected) = &config.expect_warnings {
        check_warnings(&catalog.diagnostics, expected)?;
    }

    let names: Vec<String> = catalog.names().map(str::to_string).collect();
    expect_eq("request names", &config.expect_requests, &names)?;

    let found = match &config.request {
        Some(name) => catalog.get(name).ok(),
        None => catalog.toys().next(),
    };
    let toy = match (found, config.expect_missing) {
        (None, true) => return Ok(()),
        (Some(toy), true) => return Err(format!("expected no request, found '{}'", toy.name)),
        (None, false) => {
            return Err(format!(
                "request {} not found (available: {})",
                config.request.as_deref().unwrap_or("(first)"),
                names.join(", ")
            ));
        }
        (Some(toy), false) => toy,
    };

    let mut engine = Engine::new();
    if let Some(now) = &config.now {
        let now = NaiveDateTime::parse_from_str(now, "%Y-%m-%dT%H:%M:%S")
            .map_err(|e| format!("invalid `now` '{}': {}", now, e))?;
        engine = engine.with_clock(FixedClock(now));
    }
    let toy: Toy = resolve_toy(&engine, toy, &config.variables);

    expect_eq("method", &config.expect_method, &toy.method)?;
    expect_eq("url", &config.expect_url, &toy.url)?;
    expect_eq("version", &config.expect_version, &toy.http_version)?;
    let header: BTreeMap<String, String> = toy.header.clone().into_iter().collect();
    expect_eq("header", &config.expect_header, &header)?;
    let param: BTreeMap<String, String> = toy.param.clone().into_iter().collect();
    expect_eq("param", &config.expect_param, &param)?;
    expect_eq("path segments", &config.expect_path, &toy.path_segments)?;
    let body = config.expect_body.as_ref().map(|b| b.trim().to_string());
    expect_eq("body", &body, &toy.body.trim().to_string())?;
    expect_eq("target", &config.expect_target, &toy.target())?;

    Ok(())
}

/// Check that actual warnings match expectations.
fn check_warnings(diagnostics: &[ParseError], expected: &[ExpectedWarning]) -> Result<(), String> {
    let warnings: Vec<&ParseError> = diagnostics.iter().filter(|d| d.is_warning()).collect();

    if warnings.len() != expected.len() {
        let actual = if warnings.is_empty() {
            "    (none)".to_string()
        } else {
            warnings
                .iter()
                .map(|w| format!("  - {}", w))
                .collect::<Vec<_>>()
                .join("\n")
        };
        return Err(format!(
            "expected {} warning(s), got {}\n  actual warnings:\n{}",
            expected.len(),
            warnings.len(),
            actual
        ));
    }

    for (i, (actual, expected)) in warnings.iter().zip(expected).enumerate() {
        if !actual.message.contains(&expected.contains) {
            return Err(format!(
                "warning[{}]: expected message containing \"{}\", got: {}",
                i, expected.contains, actual
            ));
        }
        if let Some(line) = expected.line {
            if actual.line != line {
                return Err(format!(
                    "warning[{}]: expected on line {}, but it is on line {}",
                    i, line, actual.line
                ));
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// `.test.md` files grouped by subfolder relative to `root`, sorted. Files
/// directly in `root` get the category "".
fn discover(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            collect(&path, root, out);
            continue;
        }
        let is_test = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".test.md"));
        if is_test {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover(path);
    if categories.is_empty() {
        eprintln!("no .test.md files found in {}", path.display());
        return;
    }

    eprintln!("available categories:");
    for (category, files) in &categories {
        eprintln!("  {} ({} tests)", category_label(category), files.len());
    }
}

/// Restrict `all` to the requested categories (and their subcategories).
fn select<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a [PathBuf]> {
    let mut selected = BTreeMap::new();
    for category in requested {
        let category = category.trim_matches('/');
        let prefix = format!("{}/", category);
        let before = selected.len();
        for (name, files) in all {
            if name == category || name.starts_with(&prefix) {
                selected.insert(name.as_str(), files.as_slice());
            }
        }
        if selected.len() == before {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                category,
                all.keys().map(|k| category_label(k)).collect::<Vec<_>>().join(", ")
            );
        }
    }
    selected
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

struct Style {
    no_color: bool,
}

impl Style {
    fn paint(&self, text: &str, code: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        }
    }

    fn line(&self, result: &TestResult) {
        let label = match result.outcome {
            TestOutcome::Pass => self.paint("PASS", "32"),
            TestOutcome::Fail(_) => self.paint("FAIL", "31"),
        };
        eprintln!("  {}  {}", label, result.label());
    }

    fn failures(&self, failures: &[TestResult]) {
        if failures.is_empty() {
            return;
        }
        eprintln!();
        eprintln!("failures:");
        for failure in failures {
            eprintln!();
            eprintln!("  --- {} ---", failure.path.display());
            if let TestOutcome::Fail(reason) = &failure.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    /// Print the summary line and return the exit code.
    fn summary(&self, passed: usize, failed: usize) -> i32 {
        eprintln!();
        if failed == 0 {
            eprintln!("test result: {}. {} passed, 0 failed", self.paint("ok", "32"), passed);
            0
        } else {
            eprintln!(
                "test result: {}. {} passed, {} failed (of {})",
                self.paint("FAILED", "31"),
                passed,
                failed,
                passed + failed
            );
            1
        }
    }
}

/// Run all `.test.md` files under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let style = Style { no_color };

    let all = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        discover(path)
    };
    if all.is_empty() {
        eprintln!("no .test.md files found in {}", path.display());
        return 1;
    }

    let selected: BTreeMap<&str, &[PathBuf]> = if categories.is_empty() || path.is_file() {
        all.iter().map(|(k, v)| (k.as_str(), v.as_slice())).collect()
    } else {
        select(&all, categories)
    };
    if selected.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0;
    let mut failures = Vec::new();
    for (category, files) in &selected {
        if !path.is_file() {
            eprintln!();
            eprintln!("{}", style.paint(category_label(category), "1"));
        }
        for file in *files {
            let result = run_single_test(file);
            style.line(&result);
            if matches!(result.outcome, TestOutcome::Pass) {
                passed += 1;
            } else {
                failures.push(result);
            }
        }
    }

    style.failures(&failures);
    style.summary(passed, failures.len())
}
