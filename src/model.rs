use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Plan,
    Data,
    Database,
    Analyses,
    Output,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Plan,
        Stage::Data,
        Stage::Database,
        Stage::Analyses,
        Stage::Output,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Plan => 0,
            Self::Data => 1,
            Self::Database => 2,
            Self::Analyses => 3,
            Self::Output => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Plan => "Plan",
            Self::Data => "Data",
            Self::Database => "Database",
            Self::Analyses => "Analyses",
            Self::Output => "Output",
        }
    }

    pub fn label(self) -> String {
        format!("Stage {} - {}", self.index(), self.name())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Missing,
    Empty,
    NotBuilt,
    Incomplete,
    Partial,
    Complete,
    Stale,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Empty => "empty",
            Self::NotBuilt => "not_built",
            Self::Incomplete => "incomplete",
            Self::Partial => "partial",
            Self::Complete => "complete",
            Self::Stale => "stale",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Missing => "Missing",
            Self::Empty => "Empty",
            Self::NotBuilt => "Not built",
            Self::Incomplete => "Incomplete",
            Self::Partial => "Partial",
            Self::Complete => "Complete",
            Self::Stale => "Stale",
        }
    }

    /// Nothing attempted yet; not a defect.
    pub fn is_neutral(self) -> bool {
        matches!(self, Self::Empty | Self::NotBuilt)
    }

    pub fn is_blocking(self) -> bool {
        !self.is_neutral() && self != Self::Complete
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PlanStatus {
    Missing,
    Incomplete,
    Complete,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DataStatus {
    Empty,
    Partial,
    Complete,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DatabaseStatus {
    NotBuilt,
    Partial,
    Stale,
    Complete,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AnalysesStatus {
    Empty,
    Incomplete,
    Partial,
    Complete,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputStatus {
    Empty,
    Partial,
    Complete,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StageOutcome {
    Plan(PlanStatus),
    Data(DataStatus),
    Database(DatabaseStatus),
    Analyses(AnalysesStatus),
    Output(OutputStatus),
}

impl StageOutcome {
    pub fn stage(self) -> Stage {
        match self {
            Self::Plan(_) => Stage::Plan,
            Self::Data(_) => Stage::Data,
            Self::Database(_) => Stage::Database,
            Self::Analyses(_) => Stage::Analyses,
            Self::Output(_) => Stage::Output,
        }
    }

    pub fn kind(self) -> StatusKind {
        match self {
            Self::Plan(PlanStatus::Missing) => StatusKind::Missing,
            Self::Plan(PlanStatus::Incomplete) => StatusKind::Incomplete,
            Self::Plan(PlanStatus::Complete) => StatusKind::Complete,
            Self::Data(DataStatus::Empty) => StatusKind::Empty,
            Self::Data(DataStatus::Partial) => StatusKind::Partial,
            Self::Data(DataStatus::Complete) => StatusKind::Complete,
            Self::Database(DatabaseStatus::NotBuilt) => StatusKind::NotBuilt,
            Self::Database(DatabaseStatus::Partial) => StatusKind::Partial,
            Self::Database(DatabaseStatus::Stale) => StatusKind::Stale,
            Self::Database(DatabaseStatus::Complete) => StatusKind::Complete,
            Self::Analyses(AnalysesStatus::Empty) => StatusKind::Empty,
            Self::Analyses(AnalysesStatus::Incomplete) => StatusKind::Incomplete,
            Self::Analyses(AnalysesStatus::Partial) => StatusKind::Partial,
            Self::Analyses(AnalysesStatus::Complete) => StatusKind::Complete,
            Self::Output(OutputStatus::Empty) => StatusKind::Empty,
            Self::Output(OutputStatus::Partial) => StatusKind::Partial,
            Self::Output(OutputStatus::Complete) => StatusKind::Complete,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageResult {
    pub outcome: StageOutcome,
    pub issues: Vec<String>,
    pub details: Vec<String>,
}

impl StageResult {
    pub fn new(outcome: StageOutcome, issues: Vec<String>, details: Vec<String>) -> Self {
        Self {
            outcome,
            issues,
            details,
        }
    }

    pub fn stage(&self) -> Stage {
        self.outcome.stage()
    }

    pub fn status(&self) -> StatusKind {
        self.outcome.kind()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigureRef {
    pub file: String,
    pub caption: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultDocument {
    pub query: String,
    pub n_results: u64,
    pub results: Vec<Map<String, Value>>,
    pub description: String,
    pub interpretation: String,
    pub figures: Vec<FigureRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub stage_index: usize,
    pub stage_name: String,
    pub action: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Blocked,
    NextStep,
    AllComplete,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub index: usize,
    pub name: String,
    pub status: StatusKind,
    pub issues: Vec<String>,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub generated_at: String,
    pub root: String,
    pub stages: Vec<StageReport>,
    pub verdict: Verdict,
    pub current_stage: Option<usize>,
    pub recommendation: Option<Recommendation>,
    pub fingerprint: String,
}
