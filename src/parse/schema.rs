use anyhow::{Context, Result};
use regex::Regex;

/// Table names from level-2 headings of the form ``## `table_name` ``.
pub fn schema_tables(text: &str) -> Result<Vec<String>> {
    let pattern = Regex::new(r"(?m)^## `(\w+)`").context("failed to compile schema heading regex")?;

    Ok(pattern
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .collect())
}
