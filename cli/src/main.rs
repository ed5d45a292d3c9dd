mod config;
mod dry_run;
mod test_runner;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expression::{Engine, Variables, resolve_toy};
use toys::{Catalog, Document, Formats, Node, ParseError, Toy};

use config::Environments;

const SUBCOMMANDS: &[&str] = &["run", "test", "help"];

#[derive(Parser)]
#[command(name = "toys", version, about = "Run requests written as markdown")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve and execute requests from a markdown document
    Run(RunArgs),

    /// Run .test.md test files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Markdown document with request definitions
    file: PathBuf,

    /// Requests to run (`Parent@Heading`, case-insensitive). All when omitted.
    names: Vec<String>,

    /// Environment to take variables from
    #[arg(short, long, default_value = "dev")]
    env: String,

    /// Environment file (.toml or .json). Defaults to toys.env.toml next to the document.
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Extra variable, overrides the environment. Repeatable.
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = config::parse_var)]
    vars: Vec<(String, String)>,

    /// Parse only, report diagnostics and exit
    #[arg(long)]
    check: bool,

    /// Dump the parsed node tree
    #[arg(long)]
    nodes: bool,

    /// List request names with their kind, method and url
    #[arg(long)]
    list: bool,

    /// Print the resolved requests as JSON instead of executing them
    #[arg(long)]
    json: bool,

    /// Suppress transport output (just check for errors)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.md file or directory containing them
    path: PathBuf,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // `toys file.md` works like `toys run file.md`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args.iter().skip(1).position(|a| !a.starts_with('-')) {
        let pos = pos + 1;
        if !SUBCOMMANDS.contains(&args[pos].as_str()) {
            args.insert(pos, "run".to_string());
        }
    }

    let cli = Cli::parse_from(&args);
    init_logging(cli.verbose);

    match cli.command {
        Command::Run(run_args) => match do_run(run_args, cli.no_color) {
            Ok(true) => {}
            Ok(false) => process::exit(1),
            Err(error) => {
                eprintln!("error: {:#}", error);
                process::exit(1);
            }
        },
        Command::Test(test_args) => {
            if test_args.list_categories {
                test_runner::list_categories(&test_args.path);
                return;
            }
            let exit_code = test_runner::run_tests(&test_args.path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("toys={level},expression={level},toys_cli={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Returns `Ok(false)` when a requested name was missing or a transport failed.
fn do_run(args: RunArgs, no_color: bool) -> Result<bool> {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("cannot read '{}'", args.file.display()))?;
    let parser = Formats::default().parser_for(&args.file)?;

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.display().to_string(), source.clone());

    let catalog = Catalog::from_document(parser.parse_text(&source));
    emit_diagnostics(color_choice, &files, file_id, &catalog.diagnostics);

    if args.check {
        eprintln!(
            "ok: {} parsed, {} request(s), {} warning(s)",
            args.file.display(),
            catalog.len(),
            catalog.diagnostics.len()
        );
        return Ok(true);
    }

    if args.nodes {
        print_nodes(&catalog.document);
        return Ok(true);
    }

    if args.list {
        for toy in catalog.toys() {
            let kind = toy.kind().map(|k| k.to_string()).unwrap_or_else(|_| "?".into());
            println!("{}\t{}\t{}\t{}", toy.name, kind, toy.method, toy.url);
        }
        return Ok(true);
    }

    let variables = load_variables(&args)?;
    let engine = Engine::new();

    let names: Vec<String> = if args.names.is_empty() {
        catalog.names().map(str::to_string).collect()
    } else {
        args.names.clone()
    };

    let mut ok = true;
    let mut resolved: Vec<Toy> = Vec::new();
    for name in &names {
        match catalog.get(name) {
            Ok(toy) => resolved.push(resolve_toy(&engine, toy, &variables)),
            Err(error) => {
                eprintln!("error: {}", error);
                ok = false;
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(ok);
    }

    let transports = dry_run::transports();
    for toy in &resolved {
        match transports.dispatch(toy) {
            Ok(outcome) => {
                info!(name = %toy.name, status = %outcome.status, elapsed = ?outcome.elapsed, "executed request");
                if !args.quiet {
                    println!("### {} ({})", toy.name, outcome.status);
                    println!("{}", outcome.body);
                }
                ok &= outcome.success;
            }
            Err(error) => {
                eprintln!("error: {}: {}", toy.name, error);
                ok = false;
            }
        }
    }

    Ok(ok)
}

/// Environment file variables overlaid with `--var` arguments.
fn load_variables(args: &RunArgs) -> Result<Variables> {
    let mut variables = match config::env_file_for(&args.file, args.env_file.as_deref()) {
        Some(path) => Environments::load(&path)?.variables(&args.env)?,
        None => Variables::new(),
    };
    variables.extend(args.vars.iter().cloned());
    Ok(variables)
}

fn emit_diagnostics(
    color_choice: ColorChoice,
    files: &SimpleFiles<String, String>,
    file_id: usize,
    diagnostics: &[ParseError],
) {
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    for error in diagnostics {
        let diagnostic = error.to_diagnostic(files, file_id);
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, &diagnostic);
    }
}

fn print_nodes(document: &Document) {
    fn print_node(document: &Document, node: &Node, indent: usize) {
        let pad = "  ".repeat(indent);
        let content: String = node.content.lines().next().unwrap_or_default().chars().take(60).collect();
        println!("{}[{}] {} {:?} {}", pad, node.id, node.kind, node.line_span, content);
        for child in document.children(node) {
            print_node(document, child, indent + 1);
        }
    }
    for root in document.roots() {
        print_node(document, root, 0);
    }
}

