use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "overscroll-cli", version, about = "Overscroll CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded touch trace through the recognizer
    Replay(commands::replay::ReplayArgs),
    /// Synthesize a linear drag and print the resulting state
    Simulate(commands::simulate::SimulateArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Replay(args) => commands::replay::run(args),
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
