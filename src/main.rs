//! Unigraph CLI - build a program graph from unit documents and resolve it

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use unigraph::config::{self, UnigraphConfig};
use unigraph::edge::Link;
use unigraph::frontend::{self, FrontendRegistry};
use unigraph::graph::GraphStats;
use unigraph::passes::{PassReport, Pipeline};
use unigraph::ui::{self, Icons, TypeRow};
use unigraph::{Graph, TypeDescriptor};

#[derive(Parser)]
#[command(name = "unigraph")]
#[command(version)]
#[command(about = "Language-agnostic program graph - link usages to declarations")]
#[command(long_about = r#"
Unigraph reads translation units emitted by language frontends, merges them
into one graph and runs enhancement passes over it:
  • Link references to the declarations they use
  • Resolve member accesses across class inheritance
  • Synthesize placeholder declarations for anything undefined

Example usage:
  unigraph init
  unigraph resolve --input ./units --format json
  unigraph types --raw "const char *" --raw "struct node[ 8 ]"
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a graph from unit documents and run the pass pipeline
    Resolve {
        /// Document file or directory (defaults to `input` from the config)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show how raw type strings are normalized
    Types {
        /// Raw type text, as a frontend would emit it
        #[arg(short, long = "raw", required = true)]
        raw: Vec<String>,
    },

    /// Write a starter unigraph.toml
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,

        /// Where to write the config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => anyhow::bail!("unknown output format '{}' (expected text or json)", other),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Resolve { input, format, config } => resolve(input, format, config),
        Commands::Types { raw } => {
            let rows: Vec<TypeRow> = raw
                .iter()
                .map(|r| TypeRow::new(r, &TypeDescriptor::parse(r)))
                .collect();
            println!("{}", ui::types_table(&rows));
            Ok(())
        }
        Commands::Init { force, config } => {
            let path = config.unwrap_or_else(config::default_config_path);
            config::write_config(&path, &UnigraphConfig::starter(), force)?;
            ui::success(&format!("Wrote {}", path.display()));
            Ok(())
        }
    }
}

fn resolve(input: Option<PathBuf>, format: Option<String>, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = config::load_config(config_path.as_deref())?.unwrap_or_default();

    let input = input
        .or_else(|| config.input.as_ref().map(PathBuf::from))
        .ok_or_else(|| anyhow::anyhow!("no input given (use --input or set `input` in the config)"))?;
    let format: OutputFormat = format
        .as_deref()
        .or(config.format.as_deref())
        .unwrap_or("text")
        .parse()?;

    let registry = frontend::default_registry();
    let files = collect_files(&input, &registry);
    if files.is_empty() {
        anyhow::bail!("no documents found under {}", input.display());
    }

    if format == OutputFormat::Text {
        ui::header(&format!("Resolving {} document(s)", files.len()));
    }

    let mut graph = Graph::new();
    for path in &files {
        tracing::debug!("Parsing {}", path.display());
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                ui::warn(&format!("Skipping {}: {}", path.display(), e));
                continue;
            }
        };
        match registry.parse_file(path, &content, &mut graph) {
            Ok(Some(_)) if format == OutputFormat::Text => ui::file(&path.display().to_string()),
            Ok(_) => {}
            Err(e) => ui::warn(&format!("Skipping {}: {}", path.display(), e)),
        }
    }

    let pipeline = Pipeline::from_names(&config.pass_names())?;
    let reports = pipeline.run(&mut graph)?;
    let stats = graph.stats();
    let links = Link::collect(&graph);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "stats": stats,
                "reports": reports,
                "links": links,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => print_text(&reports, &stats, &links),
    }

    Ok(())
}

/// Every document a registered frontend can handle, sorted by path
fn collect_files(input: &Path, registry: &FrontendRegistry) -> Vec<PathBuf> {
    if input.is_file() {
        return vec![input.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = ignore::WalkBuilder::new(input)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| registry.find_frontend(path).is_some())
        .collect();
    files.sort();
    files
}

fn print_text(reports: &[PassReport], stats: &GraphStats, links: &[Link]) {
    for report in reports {
        ui::section(Icons::GEAR, &report.pass);
        let rows: Vec<(&str, usize)> = report
            .metrics
            .iter()
            .map(|m| (m.name.as_str(), m.value))
            .collect();
        println!("{}", ui::stats_table(&rows));
    }

    ui::section(Icons::STATS, "Graph");
    println!(
        "{}",
        ui::stats_table(&[
            ("units", stats.units),
            ("nodes", stats.nodes),
            ("typed nodes", stats.typed),
            ("references", stats.references),
            ("resolved references", stats.resolved_references),
            ("member accesses", stats.member_accesses),
            ("resolved members", stats.resolved_members),
            ("dummy declarations", stats.dummies),
        ])
    );

    ui::section(Icons::LINK, &format!("Links ({})", links.len()));
    for link in links {
        let usage = match link.line {
            Some(line) => format!("{} {}:{}", link.kind, link.name, line),
            None => format!("{} {}", link.kind, link.name),
        };
        let target = ui::declaration(&format!("{} {}", link.target, link.to), link.dummy);
        ui::summary_row(&usage, &format!("{} {}", ui::dim("→"), target));
    }

    let dummies = links.iter().filter(|l| l.dummy).count();
    if dummies > 0 {
        ui::info("linked to synthesized declarations", &dummies.to_string());
    } else {
        ui::success("All links point at real declarations");
    }
}
