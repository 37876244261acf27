//! Map command - list coins known to CoinMarketCap

use anyhow::Result;
use tracing::info;

use crate::ClientArgs;

pub fn run(args: &ClientArgs, active_only: bool, limit: Option<usize>) -> Result<()> {
    let client = super::build_client(args)?;
    let rt = tokio::runtime::Runtime::new()?;

    let entries = rt.block_on(client.get_coin_map())?;
    let total = entries.len();

    let shown: Vec<_> = entries
        .into_iter()
        .filter(|e| !active_only || e.is_active())
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    info!("Fetched {} coins, showing {}", total, shown.len());

    println!("{:>8}  {:<10}  {}", "ID", "SYMBOL", "NAME");
    for entry in &shown {
        let marker = if entry.is_active() { "" } else { " (inactive)" };
        println!(
            "{:>8}  {:<10}  {}{}",
            entry.id, entry.symbol, entry.name, marker
        );
    }

    Ok(())
}
