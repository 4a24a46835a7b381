//! Single owner of the "at most one block expanded" rule.
//!
//! Every transition rewrites all flags in one pass and reports only the
//! blocks whose flag actually changed, so persistence writes deltas instead
//! of touching every record.

use serde::{Deserialize, Serialize};

use super::entry::sort_chronologically;
use crate::batch::PendingOperation;
use crate::block::Block;
use crate::error::ScheduleError;

/// One block whose `is_expanded` flag changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagChange {
    pub block_id: String,
    pub is_expanded: bool,
}

impl FlagChange {
    /// Update operation persisting this change.
    pub fn to_operation(&self, collection: &str) -> PendingOperation {
        PendingOperation::update(
            collection,
            self.block_id.clone(),
            serde_json::json!({ "is_expanded": self.is_expanded }),
        )
    }
}

/// Which block, if any, is currently expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionState {
    expanded: Option<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recover the state from loaded records.
    ///
    /// Records written by older clients may carry several expanded flags; the
    /// earliest expanded block wins and the next `apply` clears the rest.
    pub fn from_blocks(blocks: &[Block]) -> Self {
        Self {
            expanded: sort_chronologically(blocks)
                .into_iter()
                .find(|b| b.is_expanded)
                .map(|b| b.id.clone()),
        }
    }

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    pub fn is_expanded(&self, block_id: &str) -> bool {
        self.expanded.as_deref() == Some(block_id)
    }

    /// Expand `block_id` and collapse everything else.
    ///
    /// # Errors
    ///
    /// `UnknownBlock` if no block has that id; the state is left untouched.
    pub fn set_expanded(
        &mut self,
        blocks: &mut [Block],
        block_id: &str,
    ) -> Result<Vec<FlagChange>, ScheduleError> {
        if !blocks.iter().any(|b| b.id == block_id) {
            return Err(ScheduleError::UnknownBlock(block_id.to_string()));
        }
        self.expanded = Some(block_id.to_string());
        Ok(self.apply(blocks))
    }

    /// Collapse whatever is expanded.
    pub fn collapse(&mut self, blocks: &mut [Block]) -> Vec<FlagChange> {
        self.expanded = None;
        self.apply(blocks)
    }

    /// Expand `block_id`, or collapse it if it already is.
    pub fn toggle(
        &mut self,
        blocks: &mut [Block],
        block_id: &str,
    ) -> Result<Vec<FlagChange>, ScheduleError> {
        if self.is_expanded(block_id) {
            Ok(self.collapse(blocks))
        } else {
            self.set_expanded(blocks, block_id)
        }
    }

    /// Write the state into `blocks` in one pass.
    pub fn apply(&self, blocks: &mut [Block]) -> Vec<FlagChange> {
        blocks
            .iter_mut()
            .filter_map(|block| {
                let want = self.is_expanded(&block.id);
                if block.is_expanded == want {
                    return None;
                }
                block.is_expanded = want;
                Some(FlagChange {
                    block_id: block.id.clone(),
                    is_expanded: want,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::OperationKind;

    fn blocks() -> Vec<Block> {
        ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let start = crate::time::ClockTime::new(9 + i as u32, 0).unwrap();
                let end = crate::time::ClockTime::new(9 + i as u32, 45).unwrap();
                Block::new(*id, *id, start, end, 0)
            })
            .collect()
    }

    fn expanded_ids(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().filter(|b| b.is_expanded).map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn expanding_one_collapses_the_other() {
        let mut blocks = blocks();
        let mut state = ExpansionState::new();

        let changes = state.set_expanded(&mut blocks, "a").unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(expanded_ids(&blocks), vec!["a"]);

        let changes = state.set_expanded(&mut blocks, "c").unwrap();
        assert_eq!(
            changes,
            vec![
                FlagChange { block_id: "a".into(), is_expanded: false },
                FlagChange { block_id: "c".into(), is_expanded: true },
            ]
        );
        assert_eq!(expanded_ids(&blocks), vec!["c"]);
    }

    #[test]
    fn toggle_collapses_the_expanded_block() {
        let mut blocks = blocks();
        let mut state = ExpansionState::new();
        state.toggle(&mut blocks, "b").unwrap();
        assert!(state.is_expanded("b"));
        let changes = state.toggle(&mut blocks, "b").unwrap();
        assert_eq!(changes.len(), 1);
        assert!(state.expanded().is_none());
        assert!(expanded_ids(&blocks).is_empty());
    }

    #[test]
    fn unknown_block_leaves_state_alone() {
        let mut blocks = blocks();
        let mut state = ExpansionState::new();
        state.set_expanded(&mut blocks, "a").unwrap();
        assert_eq!(
            state.set_expanded(&mut blocks, "zzz").unwrap_err(),
            ScheduleError::UnknownBlock("zzz".into())
        );
        assert_eq!(state.expanded(), Some("a"));
    }

    #[test]
    fn recovering_from_records_with_several_flags() {
        let mut blocks = blocks();
        blocks[1].is_expanded = true;
        blocks[2].is_expanded = true;
        let state = ExpansionState::from_blocks(&blocks);
        assert_eq!(state.expanded(), Some("b"));
        let changes = state.apply(&mut blocks);
        assert_eq!(changes, vec![FlagChange { block_id: "c".into(), is_expanded: false }]);
    }

    #[test]
    fn flag_change_becomes_an_update() {
        let op = FlagChange { block_id: "a".into(), is_expanded: true }.to_operation("blocks");
        assert_eq!(op.kind(), OperationKind::Update);
        assert_eq!(op.collection(), "blocks");
        assert_eq!(op.id(), Some("a"));
        assert_eq!(op.payload(), Some(&serde_json::json!({ "is_expanded": true })));
    }
}
