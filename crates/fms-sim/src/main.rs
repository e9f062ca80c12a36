use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use fms_core::LogSink;
use fms_sim::{run, write_run_directory, SimConfig};

#[derive(Parser, Debug)]
#[command(name = "fms-sim", about = "Full multiple spawning trajectory-basis driver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a simulation from a YAML configuration.
    Run(RunArgs),
    /// Print the driver version.
    Version,
}

#[derive(ClapArgs, Debug)]
struct RunArgs {
    /// YAML configuration describing the run.
    #[arg(long)]
    config: PathBuf,
    /// Output directory for run artefacts.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run_simulation(args),
        Command::Version => {
            println!("fms-sim {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_simulation(args: RunArgs) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.out)?;
    let config = SimConfig::load(&args.config)?;
    let (summary, basis) = run(&config, &LogSink)?;
    let manifest = write_run_directory(&args.out, &config, &summary, &basis)?;

    if let Err(err) = fs::copy(&args.config, args.out.join("config.yaml")) {
        log::warn!("could not copy configuration into run directory: {err}");
    }

    println!(
        "{} steps, {} trajectories, {} spawns, basis {}",
        summary.steps,
        summary.final_nalive,
        summary.spawns.len(),
        &manifest.basis_hash[..12]
    );
    Ok(())
}
