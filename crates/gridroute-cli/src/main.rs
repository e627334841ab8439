use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gridroute",
    about = "gridroute — accelerator request routing",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive synthetic load through a router and report placement quality.
    ///
    /// Settings come from the config file when given; flags override it.
    /// Without a config, a pool of 8 × 100 capacity is used.
    Simulate {
        /// Path to gridroute.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Strategy: round_robin or p2c
        #[arg(short, long)]
        strategy: Option<String>,
        /// Replace the pool with N generated accelerators
        #[arg(long)]
        accelerators: Option<u32>,
        /// Capacity of each generated accelerator
        #[arg(long, default_value = "100")]
        capacity: u32,
        /// Total requests across all workers
        #[arg(short, long)]
        requests: Option<u64>,
        /// Routing threads sharing the router
        #[arg(short, long)]
        workers: Option<u32>,
        /// Seed for request generation
        #[arg(long)]
        seed: Option<u64>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Load and validate a config file
    Check {
        #[arg(short, long, default_value = "gridroute.toml")]
        config: PathBuf,
    },
    /// Write a scaffold gridroute.toml
    Init {
        #[arg(short, long, default_value = "gridroute.toml")]
        path: PathBuf,
        #[arg(short, long, default_value = "p2c")]
        strategy: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gridroute=info".parse()?)
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            strategy,
            accelerators,
            capacity,
            requests,
            workers,
            seed,
            format,
        } => {
            let overrides = commands::simulate::Overrides {
                strategy,
                accelerators,
                capacity,
                requests,
                workers,
                seed,
            };
            commands::simulate::simulate(config.as_deref(), overrides, &format)
        }
        Commands::Check { config } => commands::check::check(&config),
        Commands::Init { path, strategy, force } => commands::init::init(&path, &strategy, force),
    }
}
