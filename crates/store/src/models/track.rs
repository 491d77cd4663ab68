//! Track model: one uploaded audio file, embedded in its performance.

use perfman_core::types::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: EntityId,
    /// Stored file name inside the performance directory (after collision
    /// suffixing, so it may differ from the uploaded name).
    pub filename: String,
    #[serde(default)]
    pub performer: String,
    pub url: String,
    #[serde(default)]
    pub is_completed: bool,
}

/// DTO for attaching an already-written file to a performance.
#[derive(Debug, Clone)]
pub struct CreateTrack {
    pub filename: String,
    pub performer: String,
}
