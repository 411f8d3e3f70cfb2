use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use taskgraph::logger::{self, LogLevel};
use taskgraph::{GeneratorConfig, OpKind, SerializedGraph, TaskGenerator};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "taskgraph")]
#[command(about = "Random operator-graph generator for cognitive task datasets", long_about = None)]
struct Cli {
    /// More log output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a single subtask graph.
    Subtask {
        /// Root operator label, e.g. `IsSame`. Random when omitted.
        #[arg(long)]
        root: Option<String>,

        /// Pick a random boolean root instead.
        #[arg(long, conflicts_with = "root")]
        boolean: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Generate one episode of chained switch compositions.
    Episode {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Generate a batch of independent episodes in parallel.
    Batch {
        #[arg(long)]
        n_tasks: Option<usize>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// JSON generator config; flags below override it.
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    max_ops: Option<usize>,

    #[arg(long)]
    max_depth: Option<usize>,

    #[arg(long)]
    select_limit: bool,

    /// Include NotSame, Or and Xor.
    #[arg(long)]
    extended: bool,

    #[arg(long)]
    max_switch: Option<usize>,

    #[arg(long)]
    switch_threshold: Option<f64>,

    /// Write JSON here instead of stdout.
    #[arg(short = 'o', long)]
    out: Option<String>,
}

impl CommonArgs {
    fn load_config(&self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_json_file(path)?,
            None => GeneratorConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(max_ops) = self.max_ops {
            config.max_ops = max_ops;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(max_switch) = self.max_switch {
            config.max_switch = max_switch;
        }
        if let Some(threshold) = self.switch_threshold {
            config.switch_threshold = threshold;
        }
        config.select_limit |= self.select_limit;
        config.extended_ops |= self.extended;
        config.validate()?;
        Ok(config)
    }
}

/// One exported episode as printed by `episode` and `batch`.
#[derive(Serialize)]
struct EpisodeOutput {
    switches: usize,
    #[serde(flatten)]
    graph: SerializedGraph,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_with_level(LogLevel::from_verbosity(cli.verbose, cli.quiet));

    match cli.cmd {
        Commands::Subtask {
            root,
            boolean,
            common,
        } => {
            let config = common.load_config()?;
            let mut generator = TaskGenerator::from_config(config)?;
            let task = match root {
                Some(label) => {
                    let kind: OpKind = label.parse()?;
                    generator.subtask(kind)?
                }
                None if boolean => generator.boolean_subtask()?,
                None => generator.random_subtask()?,
            };
            emit(&taskgraph::serialize(&task), common.out.as_deref())?;
        }
        Commands::Episode { common } => {
            let config = common.load_config()?;
            let mut generator = TaskGenerator::from_config(config)?;
            let episode = generator.episode()?;
            let output = EpisodeOutput {
                switches: episode.switches,
                graph: taskgraph::serialize(&episode.task),
            };
            emit(&output, common.out.as_deref())?;
        }
        Commands::Batch { n_tasks, common } => {
            let mut config = common.load_config()?;
            if let Some(n) = n_tasks {
                config.n_tasks = n;
            }
            let seed = config.seed.unwrap_or_else(rand::random);
            let catalog = Arc::new(config.catalog()?);
            let episodes = taskgraph::generate_batch(catalog, &config, seed, config.n_tasks)?;
            let outputs: Vec<EpisodeOutput> = episodes
                .iter()
                .map(|episode| EpisodeOutput {
                    switches: episode.switches,
                    graph: taskgraph::serialize(&episode.task),
                })
                .collect();
            emit(&outputs, common.out.as_deref())?;
            tracing::info!(n = outputs.len(), seed, "batch written");
        }
    }

    Ok(())
}

fn emit<T: Serialize>(value: &T, out: Option<&str>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            std::fs::write(path, json + "\n").with_context(|| format!("write {}", path))?;
            eprintln!("Wrote {}", path);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}
