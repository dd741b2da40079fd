mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    address, init, outline, resolve, AddressArgs, InitArgs, OutlineArgs, ResolveArgs,
};
use tracing_subscriber::EnvFilter;

/// Pagetree CLI - inspect stored pages and the sections they include
#[derive(Parser, Debug)]
#[command(name = "pagetree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log every addressing and inclusion step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new pagetree project
    Init(InitArgs),

    /// Print the normalized outline of a page
    Outline(OutlineArgs),

    /// Print the position ids and registries of a page
    Address(AddressArgs),

    /// Include sections into a page and print the result
    Resolve(ResolveArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Outline(args) => outline(args, &cwd),
        Command::Address(args) => address(args, &cwd),
        Command::Resolve(args) => resolve(args, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
