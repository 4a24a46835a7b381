//! Plan documents: the blocks and sub-blocks of one planning unit.
//!
//! A plan is read from TOML or JSON:
//!
//! ```toml
//! [[blocks]]
//! id = "ceremony"
//! title = "Ceremony"
//! start_time = "11:00"
//! end_time = "12:00"
//!
//! [[sub_blocks]]
//! id = "vows"
//! parent_id = "ceremony"
//! title = "Vows"
//! offset_minutes = 20
//! duration_minutes = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::block::{Block, SubBlock};
use crate::error::{CoreError, Result, ScheduleError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub sub_blocks: Vec<SubBlock>,
}

impl DayPlan {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| CoreError::PlanParse(e.to_string()))
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| CoreError::PlanParse(e.to_string()))
    }

    /// Read a plan file; `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };
        parsed.map_err(|e| match e {
            CoreError::PlanParse(msg) => CoreError::PlanParse(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Like [`block`](Self::block) but an unknown id is an error.
    pub fn require_block(&self, id: &str) -> Result<&Block, ScheduleError> {
        self.block(id)
            .ok_or_else(|| ScheduleError::UnknownBlock(id.to_string()))
    }

    pub fn sub_blocks_of<'a>(&'a self, parent_id: &'a str) -> impl Iterator<Item = &'a SubBlock> {
        self.sub_blocks.iter().filter(move |s| s.parent_id == parent_id)
    }

    /// Check every record on its own: valid intervals, and every sub-block
    /// pointing at an existing block. Overlaps are not checked here.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        for block in &self.blocks {
            block.validate()?;
        }
        for sub in &self.sub_blocks {
            sub.validate()?;
            self.require_block(&sub.parent_id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"
[[blocks]]
id = "ceremony"
title = "Ceremony"
start_time = "11:00"
end_time = "12:00"

[[blocks]]
id = "party"
title = "After party"
start_time = "00:30"
end_time = "02:00"
day_offset = 1
is_buffer = false

[[sub_blocks]]
id = "vows"
parent_id = "ceremony"
title = "Vows"
offset_minutes = 20
duration_minutes = 10
"#;

    #[test]
    fn parses_toml_with_defaults() {
        let plan = DayPlan::from_toml_str(PLAN).unwrap();
        assert_eq!(plan.blocks.len(), 2);
        let ceremony = plan.block("ceremony").unwrap();
        assert_eq!(ceremony.day_offset, 0);
        assert!(!ceremony.is_expanded);
        assert_eq!(plan.block("party").unwrap().absolute_start(), 1470);
        assert_eq!(plan.sub_blocks_of("ceremony").count(), 1);
        plan.validate().unwrap();
    }

    #[test]
    fn parses_json() {
        let json = r#"{"blocks": [{"id": "a", "title": "A", "start_time": "09:00", "end_time": "10:00"}]}"#;
        let plan = DayPlan::from_json_str(json).unwrap();
        assert_eq!(plan.blocks[0].duration_minutes(), 60);
        assert!(plan.sub_blocks.is_empty());
    }

    #[test]
    fn bad_time_is_a_parse_error() {
        let err = DayPlan::from_toml_str(
            "[[blocks]]\nid = \"a\"\ntitle = \"A\"\nstart_time = \"25:00\"\nend_time = \"26:00\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::PlanParse(_)));
    }

    #[test]
    fn orphan_sub_block_fails_validation() {
        let mut plan = DayPlan::from_toml_str(PLAN).unwrap();
        plan.sub_blocks[0].parent_id = "gone".into();
        assert_eq!(plan.validate(), Err(ScheduleError::UnknownBlock("gone".into())));
    }

    #[test]
    fn load_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("plan.toml");
        std::fs::write(&toml_path, PLAN).unwrap();
        assert_eq!(DayPlan::load(&toml_path).unwrap().blocks.len(), 2);

        let json_path = dir.path().join("plan.json");
        let plan = DayPlan::from_toml_str(PLAN).unwrap();
        std::fs::write(&json_path, serde_json::to_string(&plan).unwrap()).unwrap();
        assert_eq!(DayPlan::load(&json_path).unwrap(), plan);

        let missing = DayPlan::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, CoreError::Io(_)));
    }
}
