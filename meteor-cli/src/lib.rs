use clap::{Args, Parser, Subcommand};
use meteor_common::config::{write_default_config, FileConfig, Overrides};
use meteor_common::{LoadTestConfig, MeteorError, OutputFormat, Result};
use meteor_engine::{EngineOptions, LoadTest, StopReason};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "meteor-shower", about = "HTTP load generator with weighted endpoints")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a load test against the configured endpoints
    Run(RunArgs),
    /// Manage configuration files
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Print version information
    Version,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Config file (default: ./config.yaml, then ~/.meteor-shower/config.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Requests per second (overrides config)
    #[arg(long)]
    pub rps: Option<u32>,

    /// Number of concurrent clients (overrides config)
    #[arg(long)]
    pub concurrency: Option<u32>,

    /// Test duration in seconds (overrides config)
    #[arg(long)]
    pub duration: Option<u32>,

    /// Output format: html, json (overrides config)
    #[arg(short, long, value_parser = parse_output)]
    pub output: Option<OutputFormat>,

    /// Seed for endpoint selection, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Generate a default configuration file
    Init {
        /// Output file path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn parse_output(name: &str) -> std::result::Result<OutputFormat, String> {
    OutputFormat::from_name(name).ok_or_else(|| MeteorError::UnsupportedOutput(name.to_string()).to_string())
}

/// Load the config file, apply command-line overrides and validate.
pub fn prepare_run(args: &RunArgs) -> Result<(LoadTestConfig, OutputFormat)> {
    let mut file = FileConfig::load(args.config.as_deref())?;
    file.loadtest.apply_overrides(&Overrides {
        rps: args.rps,
        concurrency: args.concurrency,
        duration: args.duration,
        output: args.output,
    });

    let config = file.loadtest.to_load_test_config();
    config.validate()?;
    Ok((config, file.loadtest.output))
}

pub fn print_banner(config: &LoadTestConfig, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Starting load test...")?;
    writeln!(out, "Endpoints: {}", config.targets.len())?;
    for (i, target) in config.targets.iter().enumerate() {
        writeln!(out, "  [{}] {} (weight: {:.2})", i + 1, target.url, target.weight)?;
    }
    writeln!(out, "RPS: {}", config.requests_per_second)?;
    writeln!(out, "Concurrency: {}", config.concurrency)?;
    writeln!(out, "Duration: {}s", config.duration_seconds)?;
    writeln!(out)
}

/// `meteor-shower run`: the report goes to `stdout`, progress to `stderr`.
pub async fn run_command(args: &RunArgs, stdout: &mut impl Write, stderr: &mut impl Write) -> Result<()> {
    let (config, format) = prepare_run(args)?;
    print_banner(&config, stderr).map_err(|e| MeteorError::Report(e.to_string()))?;

    let options = EngineOptions { seed: args.seed, ..EngineOptions::default() };
    let test = LoadTest::with_options(config, options)?;

    let stop = test.stop_signal();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() && stop.stop(StopReason::Cancelled) {
            tracing::warn!("interrupted, draining queued requests");
        }
    });
    let results = test.run().await;
    interrupt.abort();

    let stats = meteor_engine::compute(&results);
    meteor_report::render(format, &results, &stats, stdout)
}

/// `meteor-shower config init`
pub fn config_init(path: &Path, force: bool, out: &mut impl Write) -> Result<()> {
    write_default_config(path, force)?;
    writeln!(out, "Configuration file created: {}", path.display())
        .map_err(|e| MeteorError::ConfigWrite(e.to_string()))
}

pub fn version_text() -> String {
    format!("meteor-shower version {}", env!("CARGO_PKG_VERSION"))
}

pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run(args) => run_command(&args, &mut std::io::stdout(), &mut std::io::stderr()).await,
        Command::Config { command: ConfigCommand::Init { output, force } } => {
            config_init(&output, force, &mut std::io::stdout())
        }
        Command::Version => {
            println!("{}", version_text());
            Ok(())
        }
    }
}
