//! Batch helpers for id lists

use itertools::Itertools;
use std::fmt::Display;

use crate::error::{ClientError, ClientResult};

/// Join ids into the comma-separated form the API expects (`1,1027,825`)
pub fn parse_list_to_string<T: Display>(items: &[T]) -> String {
    items.iter().join(",")
}

/// Split `items` into consecutive chunks of at most `length`
pub fn split_list<T: Clone>(items: &[T], length: usize) -> ClientResult<Vec<Vec<T>>> {
    if length == 0 {
        return Err(ClientError::InvalidChunkSize);
    }
    Ok(items.chunks(length).map(|c| c.to_vec()).collect())
}
