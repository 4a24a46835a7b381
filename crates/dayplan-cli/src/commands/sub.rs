use dayplan_core::{format_duration, EngineConfig, SubTimeline};
use std::path::Path;

use super::load_plan;

pub fn run(path: &Path, block_id: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let plan = load_plan(path)?;
    let parent = plan.require_block(block_id)?;
    let config = EngineConfig::load_or_default();

    let timeline = SubTimeline::new(parent, &plan.sub_blocks)?;
    let finder = config.gap_finder();
    let layout = timeline.layout(&config.sub_layout, &finder)?;
    let gaps = timeline.find_gaps(&finder)?;
    let overflows = timeline.overflows();

    if json {
        let out = serde_json::json!({
            "parent_id": parent.id,
            "parent_duration": timeline.parent_duration(),
            "next_offset": timeline.next_offset(),
            "layout": layout,
            "gaps": gaps,
            "overflows": overflows,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{} ({}, {})",
        parent.title,
        timeline.label_of(0),
        format_duration(timeline.parent_duration())
    );
    let mut subs = timeline.sub_blocks().to_vec();
    subs.sort_by_key(|s| s.offset_minutes);
    for sub in subs {
        println!(
            "  +{:<4} {}  {}  ({})",
            sub.offset_minutes,
            timeline.label_of(sub.offset_minutes),
            sub.title,
            format_duration(sub.duration_minutes),
        );
    }
    for gap in &gaps {
        println!(
            "  gap +{}..+{}  ({})",
            gap.start,
            gap.end,
            gap.duration_label()
        );
    }
    println!("next offset: +{}", timeline.next_offset());

    for overflow in &overflows {
        eprintln!(
            "warning: '{}' runs {} past the end of '{}'",
            overflow.sub_block_id,
            format_duration(overflow.overflow_minutes()),
            parent.title
        );
    }
    Ok(())
}
