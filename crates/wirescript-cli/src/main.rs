//! wirescript compiler CLI.
//!
//! Provides the `wirescript` binary with subcommands for working with
//! graph snapshots saved by the editor. `compile` turns a graph JSON
//! file into runnable JavaScript; `check` validates a graph's structure
//! and every function's source without emitting.
//!
//! Both subcommands use the same `wirescript_codegen` pipeline as any
//! embedding editor would, ensuring identical behavior from both entry
//! points.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use wirescript_codegen::{check, compile, CompileOptions};
use wirescript_core::graph::Graph;

/// wirescript compiler and tools.
#[derive(Parser)]
#[command(name = "wirescript", about = "wirescript compiler and tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Compile a graph snapshot to JavaScript.
    Compile {
        /// Path to the graph JSON file.
        #[arg(short, long)]
        graph: PathBuf,

        /// Output file (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Additional reserved identifiers the emitted code must not
        /// shadow. Repeatable.
        #[arg(long = "reserved")]
        reserved: Vec<String>,
    },

    /// Validate a graph snapshot without emitting code.
    Check {
        /// Path to the graph JSON file.
        #[arg(short, long)]
        graph: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Commands::Compile {
            graph,
            output,
            reserved,
        } => run_compile(&graph, output.as_deref(), reserved),
        Commands::Check { graph } => run_check(&graph),
    };
    process::exit(exit_code);
}

fn load_graph(path: &Path) -> Result<Graph, String> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
    serde_json::from_str(&text).map_err(|err| format!("cannot parse {}: {err}", path.display()))
}

fn run_compile(graph_path: &Path, output: Option<&Path>, reserved: Vec<String>) -> i32 {
    let graph = match load_graph(graph_path) {
        Ok(graph) => graph,
        Err(message) => {
            eprintln!("error: {message}");
            return 1;
        }
    };
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "compiling {}",
        graph_path.display()
    );

    let options = CompileOptions::default().reserve(reserved);
    let text = match compile(&graph, &options) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("error: {err}");
            return 1;
        }
    };

    match output {
        Some(path) => {
            if let Err(err) = fs::write(path, &text) {
                eprintln!("error: cannot write {}: {err}", path.display());
                return 1;
            }
            tracing::info!("wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    0
}

fn run_check(graph_path: &Path) -> i32 {
    let graph = match load_graph(graph_path) {
        Ok(graph) => graph,
        Err(message) => {
            eprintln!("error: {message}");
            return 1;
        }
    };

    match check(&graph) {
        Ok(()) => {
            println!(
                "ok: {} nodes, {} edges",
                graph.node_count(),
                graph.edge_count()
            );
            0
        }
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}
