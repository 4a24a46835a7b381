use dayplan_core::{format_duration, EngineConfig};
use std::path::Path;

use super::{load_plan, span_label};

pub fn run(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let plan = load_plan(path)?;
    let config = EngineConfig::load_or_default();
    let layout = config.layout_engine().layout(&plan.blocks)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
        return Ok(());
    }

    if layout.entries.is_empty() {
        println!("No blocks.");
        return Ok(());
    }

    let mut gaps = layout.gaps.iter().peekable();
    for entry in &layout.entries {
        let title = plan
            .block(&entry.block_id)
            .map_or(entry.block_id.as_str(), |b| b.title.as_str());
        let mut flags = String::new();
        if entry.is_buffer {
            flags.push_str(" [buffer]");
        }
        if entry.height.is_auto() {
            flags.push_str(" [expanded]");
        }
        println!(
            "{:>8.1}px  {}  {}{}  ({}, {:.1}px)",
            entry.top,
            span_label(entry.start, entry.end),
            title,
            flags,
            format_duration(entry.end - entry.start),
            entry.height.min_px(),
        );

        while let Some(affordance) = gaps.next_if(|a| a.gap.previous_id == entry.block_id) {
            println!(
                "{:>8.1}px    gap {}  ({}, {})",
                affordance.top,
                span_label(affordance.gap.start, affordance.gap.end),
                affordance.gap.duration_label(),
                affordance.gap.size.as_str(),
            );
        }
    }

    let markers: Vec<&str> = layout.markers.iter().map(|m| m.label.as_str()).collect();
    println!("markers: {}", markers.join(", "));
    println!("canvas height: {:.1}px", layout.canvas_height);
    Ok(())
}
