use dayplan_core::time::parse_absolute_minutes;
use dayplan_core::validate_candidate;
use std::path::Path;

use super::{load_plan, span_label};

/// Exits non-zero (through the returned error) on a conflict or a bad range.
pub fn run(
    path: &Path,
    start: &str,
    end: &str,
    day: u32,
    exclude: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let plan = load_plan(path)?;
    let start = parse_absolute_minutes(start, day)?;
    let end = parse_absolute_minutes(end, day)?;

    let span = validate_candidate(start, end, &plan.blocks, exclude)?;
    println!("ok: {} is free", span_label(span.start, span.end));
    Ok(())
}
