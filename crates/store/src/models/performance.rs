//! Performance entity model and DTOs.
//!
//! Performances live in `<event_id>/performances.json`, one array per event.

use perfman_core::error::CoreError;
use perfman_core::reorder::Ordered;
use perfman_core::schedule::{
    validate_expected_duration, validate_name, DEFAULT_PERFORMANCE_MODE, DEFAULT_PERFORMANCE_TYPE,
};
use perfman_core::serde_ext::{lenient_timestamp, present};
use perfman_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::models::track::Track;

fn default_type() -> String {
    DEFAULT_PERFORMANCE_TYPE.to_string()
}

fn default_mode() -> String {
    DEFAULT_PERFORMANCE_MODE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub performer: String,
    #[serde(rename = "type", default = "default_type")]
    pub performance_type: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub is_done: bool,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: Timestamp,
    #[serde(default)]
    pub order: i64,
    /// Planned length in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_duration: Option<u32>,
}

impl Ordered for Performance {
    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }
}

/// DTO for creating a new performance.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePerformance {
    pub name: String,
    pub performer: Option<String>,
    #[serde(rename = "type")]
    pub performance_type: Option<String>,
    pub mode: Option<String>,
    pub expected_duration: Option<u32>,
}

impl CreatePerformance {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name("name", &self.name)?;
        if let Some(secs) = self.expected_duration {
            validate_expected_duration(secs)?;
        }
        Ok(())
    }
}

/// DTO for updating a performance.
///
/// Only these fields can change; other keys in the request body (`id`,
/// `tracks`, `createdAt`, ...) are ignored. `expectedDuration: null`
/// clears the duration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePerformance {
    pub name: Option<String>,
    pub performer: Option<String>,
    #[serde(rename = "type")]
    pub performance_type: Option<String>,
    pub mode: Option<String>,
    pub is_done: Option<bool>,
    pub order: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub expected_duration: Option<Option<u32>>,
}

impl UpdatePerformance {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(Some(secs)) = self.expected_duration {
            validate_expected_duration(secs)?;
        }
        Ok(())
    }

    /// Shallow-merge the supplied fields into `performance`.
    pub fn apply_to(&self, performance: &mut Performance) {
        if let Some(name) = &self.name {
            performance.name = name.clone();
        }
        if let Some(performer) = &self.performer {
            performance.performer = performer.clone();
        }
        if let Some(performance_type) = &self.performance_type {
            performance.performance_type = performance_type.clone();
        }
        if let Some(mode) = &self.mode {
            performance.mode = mode.clone();
        }
        if let Some(is_done) = self.is_done {
            performance.is_done = is_done;
        }
        if let Some(order) = self.order {
            performance.order = order;
        }
        if let Some(expected_duration) = self.expected_duration {
            performance.expected_duration = expected_duration;
        }
    }
}
