use std::io::IsTerminal;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{ColorChoice, StatusArgs};
use crate::layout::{PipelineLayout, resolve_root};
use crate::util::now_utc_string;

mod next_action;
mod report;
mod stages;

use report::{Palette, build_report, render_text};
use stages::check_all;

pub fn run(args: StatusArgs) -> Result<()> {
    let root = resolve_root(args.root.as_deref());
    let layout = PipelineLayout::open(&root)?;

    info!(
        root = %layout.root.display(),
        json = args.json,
        color = args.color.as_str(),
        "status requested"
    );

    let results = check_all(&layout);
    let report = build_report(&layout, &results, now_utc_string());

    info!(
        verdict = ?report.verdict,
        current_stage = ?report.current_stage,
        issues = report.stages.iter().map(|stage| stage.issues.len()).sum::<usize>(),
        fingerprint = %report.fingerprint,
        "status computed"
    );

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&report).context("failed to serialize status report")?;
        println!("{rendered}");
    } else {
        print!("{}", render_text(&report, resolve_palette(args.color)));
    }

    Ok(())
}

fn resolve_palette(choice: ColorChoice) -> Palette {
    let enabled = match choice {
        ColorChoice::Auto => std::io::stdout().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };
    colored::control::set_override(enabled);
    Palette::new(enabled)
}
