//! `mro` command-line interface
//!
//! Prints method resolution orders and declared parents for a class graph
//! stored as `YAML`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use mro_core::config::MroConfig;
use mro_core::types::ClassId;
use mro_service::{HierarchyGraph, Linearizer};
use std::path::{Path, PathBuf};
use tracing::info;

/// Inspect C3 method resolution orders
#[derive(Parser, Debug)]
#[command(name = "mro", version, about = "C3 method resolution order tools")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Session configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the method resolution order of a class
    Linearize {
        /// Class graph file
        graph: PathBuf,
        /// Class to linearize
        class: String,
    },
    /// Print the declared direct parents of a class
    Parents {
        /// Class graph file
        graph: PathBuf,
        /// Class to inspect
        class: String,
    },
    /// List classes that do not derive from the given root
    Unrooted {
        /// Class graph file
        graph: PathBuf,
        /// Resolution root of the contract family
        root: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => MroConfig::from_yaml_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => MroConfig::default(),
    };

    match cli.command {
        Command::Linearize { graph, class } => {
            let linearizer = Linearizer::with_config(load_graph(&graph)?, config);
            let order = linearizer.linearize(&ClassId::from(class))?;
            println!("{order}");
        }
        Command::Parents { graph, class } => {
            let graph = load_graph(&graph)?;
            let parents = graph.declared_parents(&ClassId::from(class));
            let names: Vec<&str> = parents.iter().map(ClassId::as_str).collect();
            println!("[{}]", names.join(", "));
        }
        Command::Unrooted { graph, root } => {
            let graph = load_graph(&graph)?;
            for class in graph.unrooted_classes(&ClassId::from(root)) {
                println!("{class}");
            }
        }
    }
    Ok(())
}

fn load_graph(path: &Path) -> anyhow::Result<HierarchyGraph> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading class graph {}", path.display()))?;
    let graph = HierarchyGraph::from_yaml_str(&text)
        .with_context(|| format!("parsing class graph {}", path.display()))?;
    info!(classes = graph.len(), path = %path.display(), "loaded class graph");
    Ok(graph)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
