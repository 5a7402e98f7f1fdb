//! livefx - live effect CLI
//!
//! Lists the registered effects, shows their parameters and UI, and applies
//! them to PNG images.

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use livefx_compute::{Backend, PowerPreference};
use std::path::PathBuf;

mod commands;
mod io;
mod logging;

#[derive(Parser)]
#[command(name = "livefx")]
#[command(author, version, about = "Apply GPU live effects to images")]
#[command(long_about = "
Runs the livefx effects (Gaussian blur, directional blur, chromatic
aberration, random noise) on the GPU through wgpu, or on the CPU when no
adapter is available.

Examples:
  livefx list
  livefx describe directional-blur-v1
  livefx apply directional-blur-v1 in.png -o out.png -p '{\"strength\": 20, \"angle\": 45}'
  livefx apply blur-v1 in.png -o out.png -p '{\"radius\": 4}' --backend cpu
  livefx interpolate directional-blur-v1 --from '{\"strength\": 0}' --to '{\"strength\": 10}' -t 0.5
  livefx scale chromatic-aberration-v1 -p '{\"strength\": 3}' --factor 2

Environment:
  LIVEFX_LOG / RUST_LOG     log filter (e.g. debug, livefx_compute=trace)
  LIVEFX_BACKEND            auto | cpu | wgpu
  LIVEFX_DEBUG              1 to log per-dispatch timings
  LIVEFX_MAX_TEXTURE_DIM    cap on the canvas dimension
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered effects
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show an effect's parameters and UI tree
    Describe(DescribeArgs),

    /// Apply an effect to a PNG image
    Apply(ApplyArgs),

    /// Normalize a parameter state through the effect's edit callback
    Edit(EditArgs),

    /// Interpolate between two parameter states
    Interpolate(InterpolateArgs),

    /// Scale an effect's spatial parameters
    Scale(ScaleArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct DescribeArgs {
    /// Effect id
    effect: String,

    /// Parameter state (JSON, or @file)
    #[arg(short, long)]
    params: Option<String>,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Effect id
    effect: String,

    /// Input PNG
    input: PathBuf,

    /// Output PNG
    #[arg(short, long)]
    output: PathBuf,

    /// Parameter state (JSON, or @file)
    #[arg(short, long)]
    params: Option<String>,

    /// Compute backend: auto, cpu or wgpu (overrides LIVEFX_BACKEND)
    #[arg(short, long, value_parser = parse_backend)]
    backend: Option<Backend>,

    /// Prefer a low-power GPU adapter
    #[arg(long)]
    low_power: bool,
}

#[derive(Args)]
pub struct EditArgs {
    /// Effect id
    effect: String,

    /// Parameter state (JSON, or @file)
    #[arg(short, long)]
    params: Option<String>,
}

#[derive(Args)]
pub struct InterpolateArgs {
    /// Effect id
    effect: String,

    /// Start state (JSON, or @file)
    #[arg(long)]
    from: String,

    /// End state (JSON, or @file)
    #[arg(long)]
    to: String,

    /// Progress, 0 at `from` and 1 at `to`
    #[arg(short)]
    t: f64,
}

#[derive(Args)]
pub struct ScaleArgs {
    /// Effect id
    effect: String,

    /// Parameter state (JSON, or @file)
    #[arg(short, long)]
    params: Option<String>,

    /// Scale factor
    #[arg(short, long)]
    factor: f64,
}

fn parse_backend(s: &str) -> Result<Backend> {
    Backend::parse(s).ok_or_else(|| anyhow!("unknown backend '{s}' (expected auto, cpu or wgpu)"))
}

impl ApplyArgs {
    fn power(&self) -> PowerPreference {
        if self.low_power {
            PowerPreference::LowPower
        } else {
            PowerPreference::HighPerformance
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&logging::LogConfig::for_verbosity(cli.verbose))?;

    match cli.command {
        Commands::List(args) => commands::list::run(args, cli.verbose),
        Commands::Describe(args) => commands::describe::run(args, cli.verbose),
        Commands::Apply(args) => commands::apply::run(args, cli.verbose),
        Commands::Edit(args) => commands::params::run_edit(args),
        Commands::Interpolate(args) => commands::params::run_interpolate(args),
        Commands::Scale(args) => commands::params::run_scale(args),
    }
}
