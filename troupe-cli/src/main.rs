use clap::{Parser, Subcommand};

mod teams;

use teams::{run_stateful_weather_team, run_weather_team};

#[derive(Parser, Debug)]
#[command(name = "troupe", version = "0.1.0")]
#[command(about = "Troupe CLI - Hierarchical agent team demos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run team demos
    Team {
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize JSON logging once.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let env_filter = match "info".parse() {
        Ok(directive) => env_filter.add_directive(directive),
        Err(_) => env_filter, // fallback to default if parsing fails
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Team { name } => match name.as_str() {
            "weather" => {
                println!("Running weather team...");
                if let Err(e) = run_weather_team().await {
                    tracing::error!(error = %e, "Weather team demo failed");
                    std::process::exit(1);
                }
            }
            "stateful" => {
                println!("Running stateful weather team...");
                if let Err(e) = run_stateful_weather_team().await {
                    tracing::error!(error = %e, "Stateful weather team demo failed");
                    std::process::exit(1);
                }
            }
            _ => {
                tracing::error!(team_name = %name, "Unknown team requested");
                std::process::exit(1);
            }
        },
    }
}
