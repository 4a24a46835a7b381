pub mod check;
pub mod config;
pub mod gaps;
pub mod plan;
pub mod sub;
pub mod suggest;

use dayplan_core::time::format_with_day_marker;
use dayplan_core::DayPlan;
use std::path::Path;

/// Load a plan file and reject malformed records up front.
pub fn load_plan(path: &Path) -> Result<DayPlan, Box<dyn std::error::Error>> {
    let plan = DayPlan::load(path)?;
    plan.validate()?;
    tracing::debug!(
        path = %path.display(),
        blocks = plan.blocks.len(),
        sub_blocks = plan.sub_blocks.len(),
        "loaded plan"
    );
    Ok(plan)
}

/// `09:00-10:30`, with `(+1)` on next-day times.
pub fn span_label(start: i64, end: i64) -> String {
    format!(
        "{}-{}",
        format_with_day_marker(start),
        format_with_day_marker(end)
    )
}
