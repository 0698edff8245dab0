// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

mod dimacs;
mod maxclique;
mod semigroups;

use arbor_core::error::SearchError;
use arbor_core::params::{SearchParams, SearchParamsBuilder};
use arbor_runtime::cluster::ClusterSpec;
use arbor_search::{NoOpMonitor, PoolKind, SearchMonitor, SkeletonKind, TracingMonitor, TreeSearch};
use clap::{Args, Parser, Subcommand, ValueEnum};
use maxclique::{CliqueNode, CliqueSpace};
use semigroups::{GenusCounts, Semigroup, SemigroupSpace};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Largest genus the 64-bit semigroup representation supports comfortably.
const MAX_GENUS: usize = 25;

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Parallel tree search: branch-and-bound, enumeration and decision skeletons")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Maximum clique on a DIMACS clique-format graph.
    Maxclique {
        /// Input graph file.
        #[arg(short, long)]
        input: PathBuf,

        /// Stop at the first clique of this size instead of proving the
        /// optimum.
        #[arg(long)]
        decision_size: Option<i64>,

        #[command(flatten)]
        options: SearchOptions,
    },

    /// Count numerical semigroups by genus.
    Semigroups {
        /// Enumerate up to this genus.
        #[arg(long, default_value_t = 10)]
        genus: usize,

        #[command(flatten)]
        options: SearchOptions,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SkeletonArg {
    Depthbounded,
    /// Depth-bounded spawning over a plain deque pool.
    Deque,
    Stacksteal,
    Budget,
    Ordered,
    Basicrandom,
    Indexed,
}

#[derive(Args, Clone)]
struct SearchOptions {
    /// Search strategy.
    #[arg(long, value_enum, default_value = "depthbounded")]
    skeleton: SkeletonArg,

    /// Simulated localities.
    #[arg(long, default_value_t = 1)]
    localities: usize,

    /// Worker threads per locality; defaults to hardware threads minus one.
    #[arg(long)]
    workers: Option<usize>,

    /// Depth-bounded and ordered skeletons: spawn everything above this
    /// depth.
    #[arg(long, default_value_t = 2)]
    spawn_depth: usize,

    /// Budget skeleton: backtracks before offloading.
    #[arg(long, default_value_t = 100)]
    backtrack_budget: u64,

    /// Random skeleton: spawn with probability 1/N per step.
    #[arg(long, value_name = "N", default_value_t = 8)]
    spawn_probability: u64,

    /// Stack stealing: take whole frames instead of single siblings.
    #[arg(long)]
    steal_all: bool,

    /// Ordered skeleton: prioritize by accumulated discrepancies.
    #[arg(long)]
    discrepancy: bool,

    /// Hard limit on the per-task expansion depth.
    #[arg(long)]
    max_stack_depth: Option<usize>,

    /// Log search progress.
    #[arg(short, long)]
    verbose: bool,
}

impl SearchOptions {
    fn skeleton_kind(&self) -> SkeletonKind {
        match self.skeleton {
            SkeletonArg::Depthbounded => SkeletonKind::DepthBounded {
                pool: PoolKind::Depth,
            },
            SkeletonArg::Deque => SkeletonKind::DepthBounded {
                pool: PoolKind::Deque,
            },
            SkeletonArg::Stacksteal => SkeletonKind::StackStealing,
            SkeletonArg::Budget => SkeletonKind::Budget,
            SkeletonArg::Ordered => SkeletonKind::Ordered,
            SkeletonArg::Basicrandom => SkeletonKind::Random,
            SkeletonArg::Indexed => SkeletonKind::Indexed,
        }
    }

    fn cluster(&self) -> ClusterSpec {
        let mut spec = ClusterSpec::new(self.localities);
        if let Some(workers) = self.workers {
            spec = spec.with_workers(workers);
        }
        spec
    }

    fn params_builder(&self) -> SearchParamsBuilder<i64> {
        let mut builder = SearchParams::builder()
            .spawn_depth(self.spawn_depth)
            .backtrack_budget(self.backtrack_budget)
            .spawn_probability(self.spawn_probability)
            .steal_all(self.steal_all)
            .discrepancy_order(self.discrepancy);
        if let Some(limit) = self.max_stack_depth {
            builder = builder.max_stack_depth(limit);
        }
        builder
    }

    fn monitor<N>(&self) -> Arc<dyn SearchMonitor<N>>
    where
        N: Send + Sync + 'static,
    {
        if self.verbose {
            Arc::new(TracingMonitor)
        } else {
            Arc::new(NoOpMonitor)
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid input: {0}")]
    Dimacs(#[from] dimacs::DimacsError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Misconfiguration exits with 2, runtime failures with 1.
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Search(SearchError::Config(_)) | CliError::Usage(_) => ExitCode::from(2),
            _ => ExitCode::FAILURE,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = match &cli.command {
        Command::Maxclique { options, .. } | Command::Semigroups { options, .. } => {
            if options.verbose {
                "arbor_runtime=debug,arbor_search=debug"
            } else {
                "warn"
            }
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            error.exit_code()
        }
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Maxclique {
            input,
            decision_size,
            options,
        } => run_maxclique(&input, decision_size, &options),
        Command::Semigroups { genus, options } => run_semigroups(genus, &options),
    }
}

fn run_maxclique(
    input: &PathBuf,
    decision_size: Option<i64>,
    options: &SearchOptions,
) -> Result<(), CliError> {
    let text = std::fs::read_to_string(input).map_err(|source| CliError::Io {
        path: input.clone(),
        source,
    })?;
    let graph = dimacs::parse(&text)?;
    let space = Arc::new(CliqueSpace::new(&graph));
    let root = space.root();

    // The colour-class order emits children with a monotone bound, so
    // prune-level is always sound here.
    let params = options.params_builder().prune_level(true).build();
    let search = TreeSearch::<_, arbor_core::Maximising>::new(Arc::clone(&space))
        .skeleton(options.skeleton_kind())
        .params(params)
        .cluster(options.cluster())
        .monitor(options.monitor::<CliqueNode>());

    match decision_size {
        Some(size) => {
            let outcome = search.decide(root, size)?;
            print_clique(&space, outcome.best(), outcome.objective());
            println!(
                "target {}: {}",
                size,
                if outcome.satisfied() { "met" } else { "not met" }
            );
            println!("{}", outcome.statistics());
        }
        None => {
            let outcome = search.optimise(root)?;
            print_clique(&space, outcome.best(), outcome.objective());
            println!("{}", outcome.statistics());
        }
    }
    Ok(())
}

fn print_clique(space: &CliqueSpace, best: &CliqueNode, size: i64) {
    let mut members: Vec<usize> = space
        .input_labels(best)
        .into_iter()
        .map(|vertex| vertex + 1)
        .collect();
    members.sort_unstable();
    println!("clique size: {size}");
    println!(
        "members: {}",
        members
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    );
}

fn run_semigroups(genus: usize, options: &SearchOptions) -> Result<(), CliError> {
    if genus > MAX_GENUS {
        return Err(CliError::Usage(format!(
            "genus {genus} exceeds the supported maximum of {MAX_GENUS}"
        )));
    }

    let params = options.params_builder().max_depth(genus).build();
    let outcome = TreeSearch::<_, arbor_core::Maximising>::new(Arc::new(SemigroupSpace))
        .skeleton(options.skeleton_kind())
        .params(params)
        .cluster(options.cluster())
        .monitor(options.monitor::<Semigroup>())
        .enumerate::<GenusCounts>(Semigroup::naturals())?;

    println!("genus  count");
    for (genus, count) in outcome.value().iter().enumerate() {
        println!("{genus:>5}  {count}");
    }
    println!("{}", outcome.statistics());
    Ok(())
}
