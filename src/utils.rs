use anyhow::{anyhow, Result};
use std::path::Path;
use std::str::FromStr;

pub fn parse_number<T: FromStr>(value: &str, name: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| anyhow!("Invalid {} value: {}", name, value))
}

/// Lower case extension of `path`, empty if there is none.
pub fn extension(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default()
}
