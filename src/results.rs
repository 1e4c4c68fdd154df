use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::layout::{FIGURES_DIR, PipelineLayout, RESULTS_FILE};
use crate::model::ResultDocument;

pub const REQUIRED_KEYS: [&str; 6] = [
    "query",
    "n_results",
    "results",
    "description",
    "interpretation",
    "figures",
];

const TEXT_KEYS: [&str; 3] = ["query", "description", "interpretation"];

pub fn validate_results_file(path: &Path) -> Vec<String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => return vec![format!("Unreadable {}: {err}", path.display())],
    };
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    validate_results_text(&raw, base_dir)
}

pub fn validate_results_text(raw: &str, base_dir: &Path) -> Vec<String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => validate_results_value(&value, base_dir),
        Err(err) => vec![format!("Invalid JSON: {err}")],
    }
}

// Figure paths resolve against `base_dir`, the folder holding the document.
pub fn validate_results_value(value: &Value, base_dir: &Path) -> Vec<String> {
    let Some(object) = value.as_object() else {
        return vec!["Top-level value is not an object".to_string()];
    };

    let missing = REQUIRED_KEYS
        .iter()
        .filter(|key| !object.contains_key(**key))
        .copied()
        .collect::<Vec<&str>>();
    if !missing.is_empty() {
        return vec![format!("Missing keys: {}", missing.join(", "))];
    }

    let mut issues = TEXT_KEYS
        .iter()
        .filter(|key| !object[**key].is_string())
        .map(|key| format!("'{key}' is not a string"))
        .collect::<Vec<String>>();

    match object["results"].as_array() {
        None => issues.push("'results' is not a list".to_string()),
        Some(results) => {
            for (index, row) in results.iter().enumerate() {
                if !row.is_object() {
                    issues.push(format!("results[{index}] is not an object"));
                }
            }
            let declared = &object["n_results"];
            if declared.as_u64() != Some(results.len() as u64) {
                issues.push(format!(
                    "n_results={declared} but results has {} items",
                    results.len()
                ));
            }
        }
    }

    match object["figures"].as_array() {
        None => issues.push("'figures' is not a list".to_string()),
        Some(figures) => {
            for (index, figure) in figures.iter().enumerate() {
                issues.extend(figure_issues(index, figure, base_dir));
            }
        }
    }

    issues
}

fn figure_issues(index: usize, figure: &Value, base_dir: &Path) -> Vec<String> {
    let Some(figure) = figure.as_object() else {
        return vec![format!("figures[{index}] is not an object")];
    };

    let mut issues = Vec::new();
    match figure.get("file") {
        None => issues.push(format!("figures[{index}] missing 'file'")),
        Some(Value::String(file)) => {
            if !base_dir.join(file).exists() {
                issues.push(format!("figures[{index}] file not found: {file}"));
            }
        }
        Some(_) => issues.push(format!("figures[{index}] 'file' is not a string")),
    }
    match figure.get("caption") {
        None => issues.push(format!("figures[{index}] missing 'caption'")),
        Some(Value::String(_)) => {}
        Some(_) => issues.push(format!("figures[{index}] 'caption' is not a string")),
    }

    issues
}

pub fn load_analysis(layout: &PipelineLayout, name: &str) -> Result<ResultDocument> {
    let analysis_dir = analysis_dir_checked(layout, name)?;
    let path = analysis_dir.join(RESULTS_FILE);
    if !path.is_file() {
        bail!(
            "analysis '{name}' has no {RESULTS_FILE} at {}; run the analysis first",
            path.display()
        );
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let issues = validate_results_text(&raw, &analysis_dir);
    if !issues.is_empty() {
        bail!(
            "analysis '{name}/{RESULTS_FILE}' is invalid: {}",
            issues.join("; ")
        );
    }

    serde_json::from_str(&raw).with_context(|| format!("failed to decode {}", path.display()))
}

pub fn figure_path(layout: &PipelineLayout, name: &str, figure: &str) -> Result<PathBuf> {
    let analysis_dir = analysis_dir_checked(layout, name)?;
    let path = analysis_dir.join(FIGURES_DIR).join(figure);
    if !path.is_file() {
        bail!(
            "figure '{figure}' not found in analysis '{name}' at {}; run the analysis first",
            path.display()
        );
    }
    Ok(path)
}

fn analysis_dir_checked(layout: &PipelineLayout, name: &str) -> Result<PathBuf> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '\\']) || trimmed == ".." {
        bail!("invalid analysis name: {name:?}");
    }

    let dir = layout.analysis_dir(trimmed);
    if !dir.is_dir() {
        bail!("analysis '{trimmed}' not found at {}", dir.display());
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn valid_document() -> Value {
        json!({
            "query": "SELECT month, SUM(total) FROM sales GROUP BY month",
            "n_results": 2,
            "results": [{"month": 1, "total": 10.5}, {"month": 2, "total": 7.0}],
            "description": "Monthly revenue",
            "interpretation": "January leads",
            "figures": []
        })
    }

    #[test]
    fn valid_document_has_no_issues() {
        let dir = TempDir::new().expect("tempdir");
        assert!(validate_results_value(&valid_document(), dir.path()).is_empty());
    }

    #[test]
    fn invalid_json_is_a_single_issue() {
        let dir = TempDir::new().expect("tempdir");
        let issues = validate_results_text("{\"query\": ", dir.path());
        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("Invalid JSON"), "unexpected: {issues:?}");
    }

    #[test]
    fn missing_keys_stop_validation() {
        let dir = TempDir::new().expect("tempdir");
        let doc = json!({
            "query": "SELECT 1",
            "n_results": 5,
            "results": "not a list",
        });

        let issues = validate_results_value(&doc, dir.path());
        assert_eq!(
            issues,
            vec!["Missing keys: description, interpretation, figures".to_string()]
        );
    }

    #[test]
    fn count_mismatch_is_exactly_one_issue() {
        let dir = TempDir::new().expect("tempdir");
        let mut doc = valid_document();
        doc["n_results"] = json!(3);

        let issues = validate_results_value(&doc, dir.path());
        assert_eq!(issues, vec!["n_results=3 but results has 2 items".to_string()]);
    }

    #[test]
    fn non_integer_count_is_a_mismatch() {
        let dir = TempDir::new().expect("tempdir");
        let mut doc = valid_document();
        doc["n_results"] = json!("2");

        let issues = validate_results_value(&doc, dir.path());
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("results has 2 items"));
    }

    #[test]
    fn one_issue_per_missing_figure() {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir(dir.path().join("figures")).expect("mkdir");
        fs::write(dir.path().join("figures/present.pdf"), b"%PDF").expect("write");

        let mut doc = valid_document();
        doc["figures"] = json!([
            {"file": "figures/present.pdf", "caption": "ok"},
            {"file": "figures/a.pdf", "caption": "missing a"},
            {"file": "figures/b.pdf", "caption": "missing b"}
        ]);

        let issues = validate_results_value(&doc, dir.path());
        assert_eq!(
            issues,
            vec![
                "figures[1] file not found: figures/a.pdf".to_string(),
                "figures[2] file not found: figures/b.pdf".to_string(),
            ]
        );
    }

    #[test]
    fn count_mismatch_does_not_stop_figure_checks() {
        let dir = TempDir::new().expect("tempdir");
        let mut doc = valid_document();
        doc["n_results"] = json!(0);
        doc["figures"] = json!([{"caption": "no file"}, {"file": "x.png"}, 7]);

        let issues = validate_results_value(&doc, dir.path());
        assert_eq!(
            issues,
            vec![
                "n_results=0 but results has 2 items".to_string(),
                "figures[0] missing 'file'".to_string(),
                "figures[1] file not found: x.png".to_string(),
                "figures[1] missing 'caption'".to_string(),
                "figures[2] is not an object".to_string(),
            ]
        );
    }

    #[test]
    fn non_list_fields_are_reported() {
        let dir = TempDir::new().expect("tempdir");
        let mut doc = valid_document();
        doc["results"] = json!({"a": 1});
        doc["figures"] = json!(null);

        let issues = validate_results_value(&doc, dir.path());
        assert_eq!(
            issues,
            vec![
                "'results' is not a list".to_string(),
                "'figures' is not a list".to_string(),
            ]
        );
    }

    #[test]
    fn wrongly_typed_fields_are_reported_per_field() {
        let dir = TempDir::new().expect("tempdir");
        let doc = json!({
            "query": 5,
            "n_results": 2,
            "results": [1, {"ok": true}],
            "description": null,
            "interpretation": ["x"],
            "figures": [{"file": "plot.png", "caption": 3}]
        });
        fs::write(dir.path().join("plot.png"), b"png").expect("write");

        let issues = validate_results_value(&doc, dir.path());
        assert_eq!(
            issues,
            vec![
                "'query' is not a string".to_string(),
                "'description' is not a string".to_string(),
                "'interpretation' is not a string".to_string(),
                "results[0] is not an object".to_string(),
                "figures[0] 'caption' is not a string".to_string(),
            ]
        );
    }

    #[test]
    fn load_analysis_and_validator_agree_on_shape() {
        let root = TempDir::new().expect("tempdir");
        let layout = PipelineLayout::new(root.path());
        let analysis = layout.analysis_dir("mistyped");
        fs::create_dir_all(&analysis).expect("mkdir");

        let mut doc = valid_document();
        doc["description"] = json!(null);
        doc["results"] = json!([1, 2]);
        let path = analysis.join(RESULTS_FILE);
        fs::write(&path, doc.to_string()).expect("write");

        let issues = validate_results_file(&path);
        assert_eq!(
            issues,
            vec![
                "'description' is not a string".to_string(),
                "results[0] is not an object".to_string(),
                "results[1] is not an object".to_string(),
            ]
        );

        let error = load_analysis(&layout, "mistyped").expect_err("invalid analysis");
        assert!(
            error.to_string().contains("'description' is not a string"),
            "unexpected error: {error}"
        );
    }

    #[test]
    fn top_level_array_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let issues = validate_results_value(&json!([1, 2]), dir.path());
        assert_eq!(issues, vec!["Top-level value is not an object".to_string()]);
    }

    #[test]
    fn load_analysis_decodes_valid_document() {
        let root = TempDir::new().expect("tempdir");
        let layout = PipelineLayout::new(root.path());
        let analysis = layout.analysis_dir("monthly");
        fs::create_dir_all(analysis.join("figures")).expect("mkdir");
        fs::write(analysis.join("figures/bars.pdf"), b"%PDF").expect("write");

        let mut doc = valid_document();
        doc["figures"] = json!([{"file": "figures/bars.pdf", "caption": "Revenue"}]);
        fs::write(analysis.join(RESULTS_FILE), doc.to_string()).expect("write");

        let loaded = load_analysis(&layout, "monthly").expect("valid analysis");
        assert_eq!(loaded.n_results, 2);
        assert_eq!(loaded.results.len(), 2);
        assert_eq!(loaded.figures[0].caption, "Revenue");

        let figure = figure_path(&layout, "monthly", "bars.pdf").expect("figure");
        assert!(figure.ends_with("figures/bars.pdf"));
        assert!(figure_path(&layout, "monthly", "missing.pdf").is_err());
    }

    #[test]
    fn load_analysis_rejects_invalid_document() {
        let root = TempDir::new().expect("tempdir");
        let layout = PipelineLayout::new(root.path());
        let analysis = layout.analysis_dir("broken");
        fs::create_dir_all(&analysis).expect("mkdir");

        let mut doc = valid_document();
        doc["n_results"] = json!(3);
        fs::write(analysis.join(RESULTS_FILE), doc.to_string()).expect("write");

        let error = load_analysis(&layout, "broken").expect_err("invalid analysis");
        assert!(
            error.to_string().contains("n_results=3"),
            "unexpected error: {error}"
        );
    }

    #[test]
    fn load_analysis_requires_existing_results() {
        let root = TempDir::new().expect("tempdir");
        let layout = PipelineLayout::new(root.path());
        fs::create_dir_all(layout.analysis_dir("pending")).expect("mkdir");

        let error = load_analysis(&layout, "pending").expect_err("no results yet");
        assert!(error.to_string().contains("run the analysis first"));
        assert!(load_analysis(&layout, "../escape").is_err());
        assert!(load_analysis(&layout, "absent").is_err());
    }
}
