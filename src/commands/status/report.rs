use colored::Colorize;

use super::next_action::next_action;
use crate::layout::PipelineLayout;
use crate::model::{
    PipelineReport, Recommendation, StageReport, StageResult, StatusKind, Verdict,
};
use crate::util::sha256_hex;

const RULE_WIDTH: usize = 50;

// First blocking stage wins; otherwise the first stage not yet started.
pub fn current_stage(results: &[StageResult]) -> (Verdict, Option<&StageResult>) {
    if let Some(blocked) = results.iter().find(|result| result.status().is_blocking()) {
        return (Verdict::Blocked, Some(blocked));
    }
    if let Some(pending) = results.iter().find(|result| result.status().is_neutral()) {
        return (Verdict::NextStep, Some(pending));
    }
    (Verdict::AllComplete, None)
}

pub fn recommend(result: &StageResult) -> Option<Recommendation> {
    let stage = result.stage();
    next_action(result.outcome).map(|action| Recommendation {
        stage_index: stage.index(),
        stage_name: stage.label(),
        action: action.to_string(),
    })
}

pub fn build_report(
    layout: &PipelineLayout,
    results: &[StageResult],
    generated_at: String,
) -> PipelineReport {
    let stages = results
        .iter()
        .map(|result| StageReport {
            index: result.stage().index(),
            name: result.stage().label(),
            status: result.status(),
            issues: result.issues.clone(),
            details: result.details.clone(),
        })
        .collect::<Vec<StageReport>>();

    let (verdict, current) = current_stage(results);
    let fingerprint = fingerprint(&stages);

    PipelineReport {
        generated_at,
        root: layout.root.display().to_string(),
        stages,
        verdict,
        current_stage: current.map(|result| result.stage().index()),
        recommendation: current.and_then(recommend),
        fingerprint,
    }
}

pub fn fingerprint(stages: &[StageReport]) -> String {
    let mut parts = Vec::new();
    for stage in stages {
        parts.push(format!("stage:{}:{}", stage.index, stage.status.as_str()));
        parts.extend(stage.issues.iter().map(|issue| format!("issue:{issue}")));
        parts.extend(stage.details.iter().map(|detail| format!("detail:{detail}")));
    }
    let parts = parts.iter().map(String::as_str).collect::<Vec<&str>>();
    sha256_hex(&parts)
}

#[derive(Copy, Clone, Debug)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self::new(false)
    }

    fn ok(self, msg: &str) -> String {
        if self.color {
            format!("{} {msg}", "✓".green())
        } else {
            format!("✓ {msg}")
        }
    }

    fn warn(self, msg: &str) -> String {
        if self.color {
            format!("{} {msg}", "⚠".yellow())
        } else {
            format!("⚠ {msg}")
        }
    }

    fn fail(self, msg: &str) -> String {
        if self.color {
            format!("{} {msg}", "✗".red())
        } else {
            format!("✗ {msg}")
        }
    }

    fn dim(self, msg: &str) -> String {
        if self.color {
            msg.dimmed().to_string()
        } else {
            msg.to_string()
        }
    }

    fn bold(self, msg: &str) -> String {
        if self.color {
            msg.bold().to_string()
        } else {
            msg.to_string()
        }
    }

    fn status(self, status: StatusKind) -> String {
        let label = status.display_name();
        match status {
            StatusKind::Complete => self.ok(label),
            StatusKind::Incomplete | StatusKind::Missing => self.fail(label),
            StatusKind::Partial | StatusKind::Stale => self.warn(label),
            StatusKind::Empty | StatusKind::NotBuilt => self.dim(label),
        }
    }
}

pub fn render_text(report: &PipelineReport, palette: Palette) -> String {
    let mut lines = vec![
        String::new(),
        palette.bold("Pipeline Status"),
        "═".repeat(RULE_WIDTH),
    ];

    for stage in &report.stages {
        lines.push(String::new());
        lines.push(format!(
            "{}  {}",
            palette.bold(&format!("{}:", stage.name)),
            palette.status(stage.status)
        ));
        lines.extend(
            stage
                .details
                .iter()
                .map(|detail| format!("  {}", palette.dim(detail))),
        );
        lines.extend(
            stage
                .issues
                .iter()
                .map(|issue| format!("  {}", palette.fail(issue))),
        );
    }

    lines.push(String::new());
    lines.push("─".repeat(RULE_WIDTH));

    let current = report
        .current_stage
        .and_then(|index| report.stages.iter().find(|stage| stage.index == index));

    match (report.verdict, current) {
        (Verdict::AllComplete, _) | (_, None) => lines.push(palette.ok("All stages complete!")),
        (Verdict::Blocked, Some(stage)) => {
            lines.push(format!("→ Current stage: {}", palette.bold(&stage.name)));
        }
        (Verdict::NextStep, Some(stage)) => {
            lines.push(palette.ok("No blocking issues"));
            lines.push(format!("→ Next stage: {}", palette.bold(&stage.name)));
        }
    }
    if let Some(recommendation) = &report.recommendation {
        lines.push(format!("  {}", recommendation.action));
    }

    lines.push(String::new());
    lines.join("\n") + "\n"
}
