use dayplan_core::EngineConfig;
use std::path::Path;

use super::{load_plan, span_label};

pub fn run(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let plan = load_plan(path)?;
    let config = EngineConfig::load_or_default();
    let gaps = config.gap_finder().find_gaps(&plan.blocks)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&gaps)?);
        return Ok(());
    }

    if gaps.is_empty() {
        println!("No gaps.");
        return Ok(());
    }
    for gap in &gaps {
        println!(
            "{}  {:<10} {:<6}  after {} before {}",
            span_label(gap.start, gap.end),
            gap.duration_label(),
            gap.size.as_str(),
            gap.previous_id,
            gap.next_id,
        );
    }
    Ok(())
}
