//! Info command - coin metadata as pretty JSON

use anyhow::{Context, Result};
use serde_json::Value;

use crate::ClientArgs;

pub fn run(args: &ClientArgs, ids: String, chunk_size: usize) -> Result<()> {
    let ids: Vec<u64> = ids
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().with_context(|| format!("Invalid coin id: {}", s)))
        .collect::<Result<_>>()?;

    if ids.is_empty() {
        anyhow::bail!("No coin ids given");
    }

    let client = super::build_client(args)?;
    let rt = tokio::runtime::Runtime::new()?;

    let data = if ids.len() == 1 {
        rt.block_on(client.get_meta_data_from_id(ids[0]))?
    } else {
        Value::Object(rt.block_on(client.get_meta_data_from_ids(&ids, chunk_size))?)
    };

    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}
