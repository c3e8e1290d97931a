pub mod commands;
pub mod logging;

use clap::{Parser, Subcommand};
use replique_core::config::{AppConfig, LoadOptions};
use std::process::ExitCode;

use crate::commands::{cart::CartCommand, price::ConfigureArgs};

#[derive(Debug, Parser)]
#[command(
    name = "replique",
    about = "Replique Crafts storefront CLI",
    long_about = "Configure and price furniture templates, manage the persisted cart, ask the \
recommender, and operate the catalog database.",
    after_help = "Examples:\n  replique seed\n  replique price --product p1 --material plywood \
--width 180 --assembly\n  replique cart add --product p2 --color black --quantity 2\n  \
replique recommend \"a black bookshelf for a small flat\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the default storefront catalog (idempotent)")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, database connectivity, catalog and recommender readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Configure a product and print its live quote")]
    Price(ConfigureArgs),
    #[command(about = "Inspect or change the persisted cart")]
    Cart {
        #[command(subcommand)]
        command: CartCommand,
    },
    #[command(about = "Ask the recommender for matching templates")]
    Recommend {
        #[arg(required = true, num_args = 1.., help = "What the shopper is looking for")]
        text: Vec<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let logging = AppConfig::load(LoadOptions::default())
        .map(|config| config.logging)
        .unwrap_or_else(|_| logging::fallback());
    if let Err(error) = logging::init(&logging) {
        eprintln!("{error}");
    }

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Price(args) => commands::price::run(args),
        Command::Cart { command } => commands::cart::run(command),
        Command::Recommend { text } => commands::recommend::run(text),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
