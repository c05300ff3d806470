// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Threadkeeper - archives completed Discord threads and lets them be
//! reopened.
//!
//! This is the binary entry point.

mod serve;
mod shutdown;

use clap::{Parser, Subcommand};
use threadkeeper_config::ThreadkeeperConfig;

/// Threadkeeper - archives completed Discord threads.
#[derive(Parser, Debug)]
#[command(name = "threadkeeper", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to Discord and start watching for checkmarks.
    Serve,
    /// Print the effective configuration with secrets redacted.
    Config,
}

const REDACTED: &str = "<redacted>";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Legacy deployments keep DISCORD_TOKEN and friends in a .env file.
    dotenvy::dotenv().ok();

    let config = match threadkeeper_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            threadkeeper_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(errors) = threadkeeper_config::validate_for_serve(&config) {
                threadkeeper_config::render_errors(&errors);
                std::process::exit(1);
            }
            if let Err(err) = serve::run_serve(config).await {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match effective_config(&config) {
            Ok(rendered) => print!("{rendered}"),
            Err(err) => {
                eprintln!("error: failed to render configuration: {err}");
                std::process::exit(1);
            }
        },
        None => {
            println!("threadkeeper: use --help for available commands");
        }
    }
}

/// Renders `config` as TOML with the bot token replaced.
fn effective_config(config: &ThreadkeeperConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.discord.bot_token.is_some() {
        shown.discord.bot_token = Some(REDACTED.to_string());
    }
    toml::to_string_pretty(&shown)
}
