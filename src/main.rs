//! rtstep CLI entry point.

use clap::Parser;

use rtstep::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, cli.json).await,
        Commands::Schedule(args) => commands::schedule::execute(args, config_path, cli.json).await,
        Commands::Optimize(args) => commands::optimize::execute(args, config_path, cli.json).await,
    };

    if let Err(err) = result {
        rtstep::cli::handle_error(err, cli.json);
    }
}
