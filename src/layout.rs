use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

pub const ROOT_ENV: &str = "PIPELINE_ROOT";

pub const PLAN_DIR: &str = "0_plan";
pub const DATA_DIR: &str = "1_data";
pub const DB_DIR: &str = "2_db";
pub const ANALYSES_DIR: &str = "3_analyses";
pub const OUTPUT_DIR: &str = "4_output";

pub const PLAN_FILE: &str = "plan.md";
pub const DECISIONS_FILE: &str = "decisions.md";
pub const SOURCES_FILE: &str = "sources.yaml";
pub const DATABASE_FILE: &str = "project.duckdb";
pub const SCHEMA_FILE: &str = "schema.md";
pub const RESULTS_FILE: &str = "results.json";
pub const FIGURES_DIR: &str = "figures";

pub const DATA_META_FILES: &[&str] = &["README.md", SOURCES_FILE];

pub const EXAMPLE_ANALYSIS: &str = "example_analysis";
pub const DEPRECATED_PREFIX: &str = "_deprecated_";

pub const OUTPUT_SKIP_DIRS: &[&str] = &["templates", "__pycache__"];
pub const RENDERED_EXTENSIONS: &[&str] = &["pdf", "html"];

#[derive(Debug, Clone)]
pub struct PipelineLayout {
    pub root: PathBuf,
}

impl PipelineLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            bail!("pipeline root is not a directory: {}", root.display());
        }
        fs::read_dir(root)
            .with_context(|| format!("failed to read pipeline root {}", root.display()))?;

        Ok(Self::new(root))
    }

    pub fn plan_path(&self) -> PathBuf {
        self.root.join(PLAN_DIR).join(PLAN_FILE)
    }

    pub fn decisions_path(&self) -> PathBuf {
        self.root.join(PLAN_DIR).join(DECISIONS_FILE)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn sources_path(&self) -> PathBuf {
        self.data_dir().join(SOURCES_FILE)
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(DB_DIR).join(DATABASE_FILE)
    }

    pub fn schema_path(&self) -> PathBuf {
        self.root.join(DB_DIR).join(SCHEMA_FILE)
    }

    pub fn analyses_dir(&self) -> PathBuf {
        self.root.join(ANALYSES_DIR)
    }

    pub fn analysis_dir(&self, name: &str) -> PathBuf {
        self.analyses_dir().join(name)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR)
    }
}

pub fn resolve_root(arg: Option<&Path>) -> PathBuf {
    if let Some(path) = arg {
        return path.to_path_buf();
    }

    std::env::var(ROOT_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn is_data_file_name(name: &str) -> bool {
    !name.starts_with('.') && !DATA_META_FILES.contains(&name)
}

pub fn is_analysis_dir_name(name: &str) -> bool {
    name != EXAMPLE_ANALYSIS && !name.starts_with('.') && !name.starts_with(DEPRECATED_PREFIX)
}

pub fn is_deliverable_dir_name(name: &str) -> bool {
    !name.starts_with('.') && !OUTPUT_SKIP_DIRS.contains(&name)
}

pub fn rendered_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension().and_then(|ext| ext.to_str())?;
    RENDERED_EXTENSIONS
        .iter()
        .copied()
        .find(|candidate| *candidate == ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_rejects_missing_root() {
        let dir = TempDir::new().expect("tempdir");
        let missing = dir.path().join("nowhere");
        let err = PipelineLayout::open(&missing).expect_err("missing root must fail");
        assert!(err.to_string().contains("not a directory"), "{err:#}");
    }

    #[test]
    fn open_rejects_file_root() {
        let dir = TempDir::new().expect("tempdir");
        let file = dir.path().join("plan.md");
        fs::write(&file, "# Plan\n").expect("write file");
        assert!(PipelineLayout::open(&file).is_err());
    }

    #[test]
    fn open_accepts_directory_root() {
        let dir = TempDir::new().expect("tempdir");
        let layout = PipelineLayout::open(dir.path()).expect("open root");
        assert_eq!(layout.root, dir.path());
        assert_eq!(
            layout.sources_path(),
            dir.path().join(DATA_DIR).join(SOURCES_FILE)
        );
    }

    #[test]
    fn explicit_root_is_used_as_given() {
        let root = Path::new("/srv/pipelines/sales");
        assert_eq!(resolve_root(Some(root)), PathBuf::from("/srv/pipelines/sales"));
    }

    #[test]
    fn name_filters_skip_hidden_and_reserved_entries() {
        assert!(is_data_file_name("sales.csv"));
        assert!(!is_data_file_name(".DS_Store"));
        assert!(!is_data_file_name(SOURCES_FILE));
        assert!(!is_analysis_dir_name(EXAMPLE_ANALYSIS));
        assert!(!is_analysis_dir_name("_deprecated_q1"));
        assert!(!is_deliverable_dir_name("templates"));
        assert_eq!(rendered_extension(Path::new("report.pdf")), Some("pdf"));
        assert_eq!(rendered_extension(Path::new("report.qmd")), None);
    }
}
