use std::collections::{BTreeSet, HashSet};
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::layout::{
    PLAN_FILE, PipelineLayout, RESULTS_FILE, SCHEMA_FILE, SOURCES_FILE, is_analysis_dir_name,
    is_data_file_name, is_deliverable_dir_name, rendered_extension,
};
use crate::model::{
    AnalysesStatus, DataStatus, DatabaseStatus, OutputStatus, PlanStatus, Stage, StageOutcome,
    StageResult,
};
use crate::parse::{
    ManifestParse, count_decisions, count_placeholders, parse_sources_manifest, planned_questions,
    schema_tables,
};
use crate::results::validate_results_file;
use crate::util::{DirItem, list_dir, modified_time, read_optional_text, system_time_string};

pub fn check_all(layout: &PipelineLayout) -> Vec<StageResult> {
    Stage::ALL
        .iter()
        .map(|stage| match stage {
            Stage::Plan => check_plan(layout),
            Stage::Data => check_data(layout),
            Stage::Database => check_database(layout),
            Stage::Analyses => check_analyses(layout),
            Stage::Output => check_output(layout),
        })
        .collect()
}

fn finish(outcome: StageOutcome, issues: Vec<String>, details: Vec<String>) -> StageResult {
    debug!(
        stage = outcome.stage().name(),
        status = %outcome.kind(),
        issues = issues.len(),
        details = details.len(),
        "stage checked"
    );
    StageResult::new(outcome, issues, details)
}

fn issue_from(err: anyhow::Error) -> String {
    warn!(error = %format!("{err:#}"), "stage input unreadable");
    format!("{err:#}")
}

pub fn check_plan(layout: &PipelineLayout) -> StageResult {
    let mut issues = Vec::new();
    let mut details = Vec::new();

    let text = match read_optional_text(&layout.plan_path()) {
        Ok(Some(text)) => text,
        Ok(None) => {
            issues.push(format!("{PLAN_FILE} not found"));
            return finish(StageOutcome::Plan(PlanStatus::Missing), issues, details);
        }
        Err(err) => {
            issues.push(issue_from(err));
            return finish(StageOutcome::Plan(PlanStatus::Incomplete), issues, details);
        }
    };

    match count_placeholders(&text) {
        Ok(0) => {}
        Ok(count) => {
            issues.push(format!("{count} section(s) still have placeholder text"));
            return finish(StageOutcome::Plan(PlanStatus::Incomplete), issues, details);
        }
        Err(err) => {
            issues.push(issue_from(err));
            return finish(StageOutcome::Plan(PlanStatus::Incomplete), issues, details);
        }
    }

    // The decisions log is optional and only ever informational.
    match read_optional_text(&layout.decisions_path()) {
        Ok(Some(log)) => match count_decisions(&log) {
            Ok(0) => {}
            Ok(count) => details.push(format!("{count} decision(s) logged")),
            Err(err) => warn!(error = %format!("{err:#}"), "decisions log not counted"),
        },
        Ok(None) => {}
        Err(err) => warn!(error = %format!("{err:#}"), "decisions log not counted"),
    }

    finish(StageOutcome::Plan(PlanStatus::Complete), issues, details)
}

fn data_files(items: &[DirItem]) -> impl Iterator<Item = &DirItem> {
    items
        .iter()
        .filter(|item| item.is_file && is_data_file_name(&item.name))
}

pub fn check_data(layout: &PipelineLayout) -> StageResult {
    let mut issues = Vec::new();
    let mut details = Vec::new();

    let data_dir = layout.data_dir();
    let actual = match list_dir(&data_dir) {
        Ok(items) => data_files(&items)
            .map(|item| item.name.clone())
            .collect::<Vec<String>>(),
        Err(err) => {
            issues.push(issue_from(err));
            Vec::new()
        }
    };

    // `None` means the declared set could not be determined.
    let declared = match read_optional_text(&layout.sources_path()) {
        Ok(Some(text)) => match parse_sources_manifest(&text) {
            ManifestParse::Failed(reason) => {
                issues.push(format!("{SOURCES_FILE} could not be parsed: {reason}"));
                None
            }
            parsed => Some(parsed.declared().to_vec()),
        },
        Ok(None) => {
            if data_dir.is_dir() {
                issues.push(format!("{SOURCES_FILE} not found"));
            }
            Some(Vec::new())
        }
        Err(err) => {
            issues.push(issue_from(err));
            None
        }
    };

    let Some(declared) = declared else {
        if !actual.is_empty() {
            details.push(format!(
                "{} data file(s): {}",
                actual.len(),
                actual.join(", ")
            ));
        }
        return finish(StageOutcome::Data(DataStatus::Partial), issues, details);
    };

    if actual.is_empty() && declared.is_empty() {
        return finish(StageOutcome::Data(DataStatus::Empty), issues, details);
    }

    if !actual.is_empty() {
        details.push(format!(
            "{} data file(s): {}",
            actual.len(),
            actual.join(", ")
        ));
    }

    let declared_set = declared.iter().cloned().collect::<BTreeSet<String>>();
    let actual_set = actual.iter().cloned().collect::<HashSet<String>>();

    let undocumented = actual
        .iter()
        .filter(|name| !declared_set.contains(*name))
        .cloned()
        .collect::<Vec<String>>();
    let missing_on_disk = declared_set
        .iter()
        .filter(|name| !actual_set.contains(*name))
        .cloned()
        .collect::<Vec<String>>();

    if !undocumented.is_empty() {
        issues.push(format!("Undocumented: {}", undocumented.join(", ")));
    }
    if !missing_on_disk.is_empty() {
        issues.push(format!(
            "In {SOURCES_FILE} but missing on disk: {}",
            missing_on_disk.join(", ")
        ));
    }

    if !declared_set.is_empty() {
        details.push(format!(
            "{} documented in {SOURCES_FILE}",
            declared_set.len()
        ));
    }

    let status = if issues.is_empty() && !declared_set.is_empty() && !actual.is_empty() {
        DataStatus::Complete
    } else {
        DataStatus::Partial
    };
    finish(StageOutcome::Data(status), issues, details)
}

pub fn check_database(layout: &PipelineLayout) -> StageResult {
    let mut issues = Vec::new();
    let mut details = Vec::new();

    let db_path = layout.database_path();
    if !db_path.exists() {
        return finish(StageOutcome::Database(DatabaseStatus::NotBuilt), issues, details);
    }

    let tables = match read_optional_text(&layout.schema_path()) {
        Ok(Some(text)) => schema_tables(&text).unwrap_or_else(|err| {
            issues.push(issue_from(err));
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(err) => {
            issues.push(issue_from(err));
            Vec::new()
        }
    };

    let has_tables = !tables.is_empty();
    if has_tables {
        details.push(format!("{} table(s): {}", tables.len(), tables.join(", ")));
    } else {
        issues.push(format!("{SCHEMA_FILE} has no tables (DB may be empty)"));
    }

    let built_at = match modified_time(&db_path) {
        Ok(ts) => {
            details.push(format!("database built {}", system_time_string(ts)));
            Some(ts)
        }
        Err(err) => {
            issues.push(issue_from(err));
            None
        }
    };

    if let Some(built_at) = built_at {
        let stale = stale_data_files(layout, built_at, &mut issues);
        if !stale.is_empty() {
            issues.push(format!("DB older than: {}", stale.join(", ")));
            if has_tables {
                return finish(StageOutcome::Database(DatabaseStatus::Stale), issues, details);
            }
        }
    }

    let status = if issues.is_empty() {
        DatabaseStatus::Complete
    } else {
        DatabaseStatus::Partial
    };
    finish(StageOutcome::Database(status), issues, details)
}

fn stale_data_files(
    layout: &PipelineLayout,
    built_at: SystemTime,
    issues: &mut Vec<String>,
) -> Vec<String> {
    let items = match list_dir(&layout.data_dir()) {
        Ok(items) => items,
        Err(err) => {
            issues.push(issue_from(err));
            return Vec::new();
        }
    };

    let mut stale = Vec::new();
    for item in data_files(&items) {
        match modified_time(&item.path) {
            Ok(ts) if ts > built_at => stale.push(item.name.clone()),
            Ok(_) => {}
            Err(err) => issues.push(issue_from(err)),
        }
    }
    stale
}

pub fn check_analyses(layout: &PipelineLayout) -> StageResult {
    let mut issues = Vec::new();
    let mut details = Vec::new();

    let folders = match list_dir(&layout.analyses_dir()) {
        Ok(items) => items
            .into_iter()
            .filter(|item| item.is_dir && is_analysis_dir_name(&item.name))
            .collect::<Vec<DirItem>>(),
        Err(err) => {
            issues.push(issue_from(err));
            Vec::new()
        }
    };

    if folders.is_empty() {
        return finish(StageOutcome::Analyses(AnalysesStatus::Empty), issues, details);
    }

    let mut valid = Vec::new();
    let mut without_results = Vec::new();
    let mut invalid = Vec::new();

    for folder in &folders {
        let results_path = folder.path.join(RESULTS_FILE);
        if !results_path.is_file() {
            without_results.push(folder.name.clone());
            continue;
        }

        let errors = validate_results_file(&results_path);
        if errors.is_empty() {
            valid.push(folder.name.clone());
        } else {
            invalid.push((folder.name.clone(), errors));
        }
    }

    details.push(format!("{} analysis folder(s)", folders.len()));
    if !valid.is_empty() {
        details.push(format!("{} with valid {RESULTS_FILE}", valid.len()));
    }

    if !without_results.is_empty() {
        issues.push(format!(
            "Missing {RESULTS_FILE}: {}",
            without_results.join(", ")
        ));
    }
    for (name, errors) in &invalid {
        issues.push(format!(
            "Invalid {name}/{RESULTS_FILE}: {}",
            errors.join("; ")
        ));
    }

    // Planned questions are counted, never matched against folder names.
    match read_optional_text(&layout.plan_path()) {
        Ok(Some(plan)) => match planned_questions(&plan) {
            Ok(questions) if !questions.is_empty() => {
                details.push(format!("{} question(s) listed in plan", questions.len()));
            }
            Ok(_) => {}
            Err(err) => warn!(error = %format!("{err:#}"), "plan questions not counted"),
        },
        Ok(None) => {}
        Err(err) => warn!(error = %format!("{err:#}"), "plan questions not counted"),
    }

    let failing = without_results.len() + invalid.len();
    let status = match (valid.is_empty(), failing) {
        (false, 0) => AnalysesStatus::Complete,
        (false, _) => AnalysesStatus::Partial,
        (true, _) => AnalysesStatus::Incomplete,
    };
    finish(StageOutcome::Analyses(status), issues, details)
}

pub fn check_output(layout: &PipelineLayout) -> StageResult {
    let mut issues = Vec::new();
    let mut details = Vec::new();

    let deliverables = match list_dir(&layout.output_dir()) {
        Ok(items) => items
            .into_iter()
            .filter(|item| item.is_dir && is_deliverable_dir_name(&item.name))
            .collect::<Vec<DirItem>>(),
        Err(err) => {
            issues.push(issue_from(err));
            Vec::new()
        }
    };

    if deliverables.is_empty() {
        return finish(StageOutcome::Output(OutputStatus::Empty), issues, details);
    }

    let mut rendered = Vec::new();
    let mut unrendered = Vec::new();

    for deliverable in &deliverables {
        let formats = match list_dir(&deliverable.path) {
            Ok(items) => items
                .iter()
                .filter(|item| item.is_file && !item.name.starts_with('.'))
                .filter_map(|item| rendered_extension(&item.path))
                .map(|ext| format!(".{ext}"))
                .collect::<BTreeSet<String>>(),
            Err(err) => {
                issues.push(issue_from(err));
                BTreeSet::new()
            }
        };

        if formats.is_empty() {
            unrendered.push(deliverable.name.clone());
        } else {
            let formats = formats.into_iter().collect::<Vec<String>>();
            rendered.push(format!("{} ({})", deliverable.name, formats.join(", ")));
        }
    }

    details.push(format!("{} deliverable(s)", deliverables.len()));
    if !rendered.is_empty() {
        details.push(format!("Rendered: {}", rendered.join(", ")));
    }
    if !unrendered.is_empty() {
        issues.push(format!("Not yet rendered: {}", unrendered.join(", ")));
    }

    let status = if unrendered.is_empty() {
        OutputStatus::Complete
    } else {
        OutputStatus::Partial
    };
    finish(StageOutcome::Output(status), issues, details)
}
