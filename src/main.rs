use clap::Parser;
use kimp_monitor::cli::{describe_config, Cli, Commands};
use kimp_monitor::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            Config::bundled()?
        }
    };

    // Initialize telemetry
    let _telemetry = kimp_monitor::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Monitor(args) => {
            tracing::info!("Starting spread monitor");
            args.execute(&config).await?;
        }
        Commands::Funding(args) => {
            tracing::info!(coin = %args.coin, "Fetching funding history");
            args.execute(&config.funding).await?;
        }
        Commands::Config => {
            println!("{}", describe_config(&config));
        }
    }

    Ok(())
}
