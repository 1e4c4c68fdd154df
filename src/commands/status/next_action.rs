use crate::model::{
    AnalysesStatus, DataStatus, DatabaseStatus, OutputStatus, PlanStatus, StageOutcome,
};

pub fn next_action(outcome: StageOutcome) -> Option<&'static str> {
    match outcome {
        StageOutcome::Plan(PlanStatus::Missing) => {
            Some("Create 0_plan/plan.md or restore it from the template.")
        }
        StageOutcome::Plan(PlanStatus::Incomplete) => {
            Some("Fill in the remaining sections of 0_plan/plan.md.")
        }
        StageOutcome::Plan(PlanStatus::Complete) => None,

        StageOutcome::Data(DataStatus::Empty) => {
            Some("Collect raw data into 1_data/ and document it in sources.yaml.")
        }
        StageOutcome::Data(DataStatus::Partial) => {
            Some("Document all data files in 1_data/sources.yaml.")
        }
        StageOutcome::Data(DataStatus::Complete) => None,

        StageOutcome::Database(DatabaseStatus::NotBuilt) => {
            Some("Edit 2_db/build_db.py, then run: make db")
        }
        StageOutcome::Database(DatabaseStatus::Partial) => {
            Some("Fix build_db.py and rebuild with: make db")
        }
        StageOutcome::Database(DatabaseStatus::Stale) => {
            Some("Data has changed. Rebuild with: make db")
        }
        StageOutcome::Database(DatabaseStatus::Complete) => None,

        StageOutcome::Analyses(AnalysesStatus::Empty) => Some(
            "Create analysis subfolders in 3_analyses/. See example_analysis/ for the template.",
        ),
        StageOutcome::Analyses(AnalysesStatus::Incomplete) => {
            Some("Run analyses to generate results.json: make analyses")
        }
        StageOutcome::Analyses(AnalysesStatus::Partial) => {
            Some("Fix or complete remaining analyses, then: make analyses")
        }
        StageOutcome::Analyses(AnalysesStatus::Complete) => None,

        StageOutcome::Output(OutputStatus::Empty) => {
            Some("Create a deliverable subfolder in 4_output/ from a template.")
        }
        StageOutcome::Output(OutputStatus::Partial) => {
            Some("Render deliverables with: make outputs")
        }
        StageOutcome::Output(OutputStatus::Complete) => None,
    }
}
