//! CoinMarketCap data CLI - main entry point
//!
//! Subcommands:
//! - map: list known coins
//! - info: coin metadata
//! - quotes: 6h historical quotes as CSV
//! - ohlcv: daily OHLCV candles as CSV

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "coinmarket-data")]
#[command(about = "Fetch CoinMarketCap listings, metadata, quotes and OHLCV", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    client: ClientArgs,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Connection options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API key (overrides config file and CMC_PRO_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Use the production host instead of the sandbox
    #[arg(long, global = true)]
    pub production: bool,

    /// Account tier: "standard" or "professional"
    #[arg(long, global = true)]
    pub tier: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List coins known to CoinMarketCap
    Map {
        /// Skip inactive coins
        #[arg(long)]
        active_only: bool,

        /// Print at most this many coins
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Fetch coin metadata
    Info {
        /// Coin ids (comma-separated). E.g., "1,1027"
        #[arg(short, long)]
        ids: String,

        /// Ids per request
        #[arg(long, default_value = "100")]
        chunk_size: usize,
    },

    /// Fetch 6h historical quotes
    Quotes {
        /// Coin id (1 = Bitcoin)
        #[arg(short, long)]
        id: u64,

        /// Start (unix seconds or YYYY-MM-DD). Defaults to the tier's lookback.
        #[arg(long)]
        start: Option<String>,

        /// End (unix seconds or YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Quote currency
        #[arg(long, default_value = "USD")]
        convert: String,

        /// Write CSV here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch daily OHLCV over the tier's lookback window
    Ohlcv {
        /// Coin id (1 = Bitcoin)
        #[arg(short, long)]
        id: u64,

        /// Quote currency
        #[arg(long, default_value = "USD")]
        convert: String,

        /// Write CSV here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    // Filter out noisy HTTP crates
    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    // Console goes to stderr so CSV on stdout stays clean
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Log file: {}", log_path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Map { .. } => "map",
        Commands::Info { .. } => "info",
        Commands::Quotes { .. } => "quotes",
        Commands::Ohlcv { .. } => "ohlcv",
    };

    setup_logging(cli.verbose, command_name)?;

    match cli.command {
        Commands::Map { active_only, limit } => {
            commands::listing::run(&cli.client, active_only, limit)
        }

        Commands::Info { ids, chunk_size } => {
            commands::metadata::run(&cli.client, ids, chunk_size)
        }

        Commands::Quotes {
            id,
            start,
            end,
            convert,
            output,
        } => commands::history::run_quotes(&cli.client, id, start, end, convert, output),

        Commands::Ohlcv { id, convert, output } => {
            commands::history::run_ohlcv(&cli.client, id, convert, output)
        }
    }
}
