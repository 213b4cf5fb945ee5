//! Authenticated principal as seen by the collaboration layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A verified user: stable id plus the name shown to other members
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    pub display_name: String,
}

impl Identity {
    pub fn new(id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}
