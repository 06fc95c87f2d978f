mod run_estimate;
mod run_power;
mod run_simulate;

use crate::run_estimate::*;
use crate::run_power::*;
use crate::run_simulate::*;

use clap::{Parser, Subcommand};

/// Reliability and power analysis for social networks built from
/// sparse interaction counts
#[derive(Parser, Debug)]
#[command(version, about, long_about, term_width = 80)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate interaction counts, sampling efforts and true rates
    /// from the Gamma-Poisson model
    #[command(alias = "sim")]
    Simulate(SimulateArgs),

    /// Estimate social differentiation, interaction rate and network
    /// correlation from counts and sampling efforts
    #[command(alias = "est")]
    Estimate(EstimateArgs),

    /// Monte Carlo power of a node-level regression under sampling
    /// noise
    Power(PowerCmdArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.commands {
        Commands::Simulate(args) => {
            run_simulate(args)?;
        }
        Commands::Estimate(args) => {
            run_estimate(args)?;
        }
        Commands::Power(args) => {
            run_power(args)?;
        }
    }

    Ok(())
}
