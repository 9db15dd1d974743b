use clap::Parser;
use meteor_responder::config::{DEFAULT_DELAY, DEFAULT_PORT};
use meteor_responder::{Server, ServerConfig};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "meteor-responder", about = "Configurable HTTP responder for exercising meteor-shower")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Response delay in milliseconds
    #[arg(long, default_value_t = DEFAULT_DELAY.as_millis() as u64)]
    delay: u64,

    /// Fraction of `GET /` requests answered with 500 (0.0 to 1.0)
    #[arg(long, default_value_t = 0.0)]
    error_rate: f64,

    /// Vary the delay by up to +-50%
    #[arg(long)]
    random_delay: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if !(0.0..=1.0).contains(&args.error_rate) {
        return Err(format!("--error-rate must be between 0.0 and 1.0, got {}", args.error_rate).into());
    }

    let config = ServerConfig {
        address: SocketAddr::from(([0, 0, 0, 0], args.port)),
        delay: Duration::from_millis(args.delay),
        error_rate: args.error_rate,
        random_delay: args.random_delay,
    };

    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        if let Ok(addr) = ready_rx.await {
            println!("Listening on {}", addr);
            println!("  GET /         - configured delay and error rate");
            println!("  GET /health   - health check (no delay)");
            println!("  GET /stats    - request counter and uptime");
            println!("  GET /slow     - fixed 500ms delay");
            println!("  GET /error    - always 500");
        }
    });

    Server::new(config).run(ready_tx).await?;
    Ok(())
}
