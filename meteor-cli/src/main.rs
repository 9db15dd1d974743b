use clap::Parser;
use meteor_cli::Cli;
use std::process;

#[tokio::main]
async fn main() {
    // stdout carries the report; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = meteor_cli::execute(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
