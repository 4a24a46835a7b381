//! Queued write operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a queued operation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Insert,
    Update,
    Delete,
}

/// A write waiting to be flushed to the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PendingOperation {
    Insert {
        collection: String,
        payload: Value,
    },
    Update {
        collection: String,
        id: String,
        payload: Value,
    },
    Delete {
        collection: String,
        id: String,
    },
}

impl PendingOperation {
    pub fn insert(collection: impl Into<String>, payload: Value) -> Self {
        Self::Insert {
            collection: collection.into(),
            payload,
        }
    }

    pub fn update(collection: impl Into<String>, id: impl Into<String>, payload: Value) -> Self {
        Self::Update {
            collection: collection.into(),
            id: id.into(),
            payload,
        }
    }

    pub fn delete(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Delete {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Insert { .. } => OperationKind::Insert,
            Self::Update { .. } => OperationKind::Update,
            Self::Delete { .. } => OperationKind::Delete,
        }
    }

    pub fn collection(&self) -> &str {
        match self {
            Self::Insert { collection, .. }
            | Self::Update { collection, .. }
            | Self::Delete { collection, .. } => collection,
        }
    }

    /// Target record id; inserts carry theirs inside the payload, if at all.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Insert { .. } => None,
            Self::Update { id, .. } | Self::Delete { id, .. } => Some(id),
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Insert { payload, .. } | Self::Update { payload, .. } => Some(payload),
            Self::Delete { .. } => None,
        }
    }
}
