use dayplan_core::{has_overlap, suggest_next_slot};
use std::path::Path;

use super::{load_plan, span_label};

pub fn run(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let plan = load_plan(path)?;
    let suggestion = suggest_next_slot(&plan.blocks);

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestion)?);
        return Ok(());
    }

    let span = suggestion.interval();
    println!("{} (day {})", span_label(span.start, span.end), suggestion.day_offset);

    // the end-of-day cap can land the suggestion on an existing block
    let check = has_overlap(&span, &plan.blocks, None);
    if let Some(with) = check.with {
        eprintln!("warning: suggested slot overlaps '{with}'");
    }
    Ok(())
}
