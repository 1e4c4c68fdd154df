use regex::Regex;

// `Failed` leaves the declared set unknown; `Empty` declares nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestParse {
    Declared(Vec<String>),
    Empty,
    Failed(String),
}

impl ManifestParse {
    pub fn declared(&self) -> &[String] {
        match self {
            Self::Declared(files) => files,
            Self::Empty | Self::Failed(_) => &[],
        }
    }

    fn from_files(files: Vec<String>) -> Self {
        if files.is_empty() {
            Self::Empty
        } else {
            Self::Declared(files)
        }
    }
}

pub fn parse_sources_manifest(text: &str) -> ManifestParse {
    if is_blank_document(text) {
        return ManifestParse::Empty;
    }

    parse_entries(text)
}

#[cfg(feature = "yaml")]
fn parse_entries(text: &str) -> ManifestParse {
    parse_structured(text)
}

#[cfg(not(feature = "yaml"))]
fn parse_entries(text: &str) -> ManifestParse {
    parse_line_pattern(text)
}

fn is_blank_document(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---")
}

#[cfg(feature = "yaml")]
fn parse_structured(text: &str) -> ManifestParse {
    use serde_yaml::Value;

    let value: Value = match serde_yaml::from_str(text) {
        Ok(value) => value,
        Err(err) => return ManifestParse::Failed(err.to_string()),
    };

    let Value::Sequence(entries) = value else {
        return ManifestParse::Empty;
    };

    let files = entries
        .iter()
        .filter_map(|entry| entry.get("file"))
        .filter_map(|file| match file {
            Value::String(name) => Some(name.trim().to_string()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        })
        .filter(|name| !name.is_empty())
        .collect::<Vec<String>>();

    ManifestParse::from_files(files)
}

#[cfg_attr(feature = "yaml", allow(dead_code))]
pub(super) fn parse_line_pattern(text: &str) -> ManifestParse {
    let pattern = match Regex::new(r#"(?m)^-\s+file:\s*["']?([^"'\n]+)"#) {
        Ok(pattern) => pattern,
        Err(err) => return ManifestParse::Failed(err.to_string()),
    };

    let files = pattern
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect::<Vec<String>>();

    ManifestParse::from_files(files)
}
