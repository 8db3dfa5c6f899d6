//! geotutor CLI — the terminal front end of the tutor.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "geotutor", version, about = "Adaptive geometry-area tutor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Practice area problems interactively
    Practice {
        /// Student ID (e.g. 202300123)
        #[arg(long)]
        student: String,

        /// Starting shape: triangle, square, rectangle
        #[arg(long, default_value = "triangle")]
        shape: String,

        /// Student record file
        #[arg(long, default_value = "students_data.json")]
        store: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seed for reproducible problems
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print generated problems
    Generate {
        /// Shape: triangle, square, rectangle
        #[arg(long)]
        shape: String,

        /// Difficulty: easy, medium, hard
        #[arg(long, default_value = "easy")]
        difficulty: String,

        /// Number of problems
        #[arg(long, default_value = "1")]
        count: usize,

        /// Include the expected area
        #[arg(long)]
        show_answer: bool,

        /// Seed for reproducible problems
        #[arg(long)]
        seed: Option<u64>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show a worked example for a shape
    Example {
        /// Shape: triangle, square, rectangle
        #[arg(long, default_value = "triangle")]
        shape: String,

        /// Seed for reproducible problems
        #[arg(long)]
        seed: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show student progress
    Stats {
        /// Only this student
        #[arg(long)]
        student: Option<String>,

        /// Student record file
        #[arg(long, default_value = "students_data.json")]
        store: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate a config file
    Validate {
        /// Path to config file
        #[arg(long)]
        config: PathBuf,
    },

    /// Create a starter config
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("geotutor=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Practice {
            student,
            shape,
            store,
            config,
            seed,
        } => commands::practice::execute(student, shape, store, config, seed),
        Commands::Generate {
            shape,
            difficulty,
            count,
            show_answer,
            seed,
            format,
            config,
        } => commands::generate::execute(
            shape,
            difficulty,
            count,
            show_answer,
            seed,
            format,
            config,
        ),
        Commands::Example {
            shape,
            seed,
            config,
        } => commands::example::execute(shape, seed, config),
        Commands::Stats {
            student,
            store,
            format,
        } => commands::stats::execute(student, store, format),
        Commands::Validate { config } => commands::validate::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
