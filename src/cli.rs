use clap::{Parser, Subcommand};
use nu_plugin_tabclusters::algo::weighting::DEFAULT_TOP_TERMS;
use nu_plugin_tabclusters::{ops, ClusterConfig};
use serde_json::Value;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "tabclusters",
    version,
    about = "Group browser tabs into topical clusters by title similarity"
)]
struct Cli {
    /// Log progress to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster tabs read as a JSON array on stdin
    Cluster {
        /// Minimum similarity that links two tabs, in (0, 1]
        #[arg(short, long)]
        threshold: Option<f64>,
        /// Smaller clusters are folded into "Other"
        #[arg(short, long)]
        min_size: Option<usize>,
        /// Extra words to ignore (repeatable)
        #[arg(short, long = "stop-word")]
        stop_words: Vec<String>,
        /// JSON file with `similarityThreshold`, `minClusterSize`, `extraStopWords`.
        /// Flags override the file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Append the highest-weighted title terms of each tab as `_terms`
    Terms {
        /// Number of terms per tab
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_TERMS)]
        count: usize,
        /// Extra words to ignore (repeatable)
        #[arg(short, long = "stop-word")]
        stop_words: Vec<String>,
    },
    /// Rank tabs against a free-text query
    Search {
        /// Words to look for
        query: String,
        /// Maximum number of hits
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
        /// Extra words to ignore (repeatable)
        #[arg(short, long = "stop-word")]
        stop_words: Vec<String>,
    },
    /// Print the pairwise title similarity matrix
    Similarity {
        /// Extra words to ignore (repeatable)
        #[arg(short, long = "stop-word")]
        stop_words: Vec<String>,
    },
    /// Append the cleaned clustering text of each tab as `_document`
    Clean,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let command = cli.command.unwrap_or_else(|| {
        eprintln!("No subcommand provided. Run `tabclusters --help` for usage.");
        std::process::exit(1);
    });

    let result = match command {
        Commands::Cluster {
            threshold,
            min_size,
            stop_words,
            config,
        } => load_config(config.as_deref()).and_then(|base| {
            let mut config = base.with_stop_words(stop_words);
            if let Some(t) = threshold {
                config = config.with_threshold(t);
            }
            if let Some(m) = min_size {
                config = config.with_min_cluster_size(m);
            }
            ops::op_cluster(&read_stdin_json(), &config)
        }),
        Commands::Terms { count, stop_words } => {
            ops::op_terms(&read_stdin_json(), count, &stop_words)
        }
        Commands::Search {
            query,
            count,
            stop_words,
        } => ops::op_search(&read_stdin_json(), &query, count, &stop_words),
        Commands::Similarity { stop_words } => {
            ops::op_similarity(&read_stdin_json(), &stop_words)
        }
        Commands::Clean => Ok(ops::op_clean(&read_stdin_json())),
    };

    match result.and_then(|v| serde_json::to_string_pretty(&v).map_err(|e| e.to_string())) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        1 => tracing_subscriber::EnvFilter::new("nu_plugin_tabclusters=debug"),
        _ => tracing_subscriber::EnvFilter::new("nu_plugin_tabclusters=trace"),
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ClusterConfig, String> {
    let Some(path) = path else {
        return Ok(ClusterConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid config {}: {e}", path.display()))
}

fn read_stdin_json() -> Vec<Value> {
    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("failed to read stdin: {e}");
        std::process::exit(1);
    }
    if buf.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str(&buf) {
        Ok(Value::Array(arr)) => arr,
        Ok(single) => vec![single],
        Err(e) => {
            eprintln!("invalid JSON on stdin: {e}");
            std::process::exit(1);
        }
    }
}
