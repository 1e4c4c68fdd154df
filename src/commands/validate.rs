use anyhow::Result;
use tracing::{info, warn};

use crate::cli::ValidateArgs;
use crate::layout::{PipelineLayout, resolve_root};
use crate::results::{figure_path, load_analysis};

pub fn run(args: ValidateArgs) -> Result<()> {
    let root = resolve_root(args.root.as_deref());
    let layout = PipelineLayout::open(&root)?;

    let document = load_analysis(&layout, &args.analysis)?;

    info!(
        analysis = %args.analysis,
        n_results = document.n_results,
        figures = document.figures.len(),
        query_chars = document.query.len(),
        description = %document.description,
        "results document valid"
    );
    if document.interpretation.trim().is_empty() {
        warn!(analysis = %args.analysis, "interpretation is empty");
    }

    if let Some(figure) = args.figure.as_deref() {
        let path = figure_path(&layout, &args.analysis, figure)?;
        println!("{}", path.display());
    }

    Ok(())
}
