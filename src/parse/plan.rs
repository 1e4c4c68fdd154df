use anyhow::{Context, Result};
use regex::Regex;

const ANALYSES_HEADING: &str = "## Analyses";

/// Counts lines that are still an italic prompt such as `_What is the goal?_`.
pub fn count_placeholders(text: &str) -> Result<usize> {
    let pattern =
        Regex::new(r"(?m)^_[^_\n]+\?_[ \t\r]*$").context("failed to compile placeholder regex")?;
    Ok(pattern.find_iter(text).count())
}

pub fn planned_questions(text: &str) -> Result<Vec<String>> {
    let item = Regex::new(r"^\d+\.\s+(.+)$").context("failed to compile plan item regex")?;

    let mut lines = text.lines();
    if !lines
        .by_ref()
        .any(|line| line.trim_end() == ANALYSES_HEADING)
    {
        return Ok(Vec::new());
    }

    let questions = lines
        .take_while(|line| !line.starts_with("## "))
        .filter_map(|line| item.captures(line.trim_end()))
        .filter_map(|captures| captures.get(1))
        .map(|question| question.as_str().trim().to_string())
        .filter(|question| !question.is_empty())
        .collect();

    Ok(questions)
}

pub fn count_decisions(text: &str) -> Result<usize> {
    let pattern =
        Regex::new(r"(?m)^### \d{4}-\d{2}-\d{2}").context("failed to compile decision regex")?;
    Ok(pattern.find_iter(text).count())
}
