pub mod history;
pub mod listing;
pub mod metadata;

use anyhow::{Context, Result};
use std::time::Duration;

use coinmarket_data::config::{Environment, FileConfig};
use coinmarket_data::CoinMarketCapClient;

use crate::ClientArgs;

/// Build a client from the config file, env and command-line overrides
pub fn build_client(args: &ClientArgs) -> Result<CoinMarketCapClient> {
    dotenv::dotenv().ok();

    let mut file = match &args.config {
        Some(path) => FileConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => FileConfig::default(),
    };

    if let Some(key) = &args.api_key {
        file.api_key = Some(key.clone());
    }
    if args.production {
        file.environment = Environment::Production;
    }
    if let Some(tier) = &args.tier {
        file.tier = Some(tier.clone());
    }

    let mut config = file.with_env_api_key().into_client_config()?;
    if let Some(secs) = args.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    CoinMarketCapClient::new(config).context("Failed to create CoinMarketCap client")
}
