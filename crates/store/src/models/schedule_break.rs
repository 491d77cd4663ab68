//! Break entity model and DTOs.
//!
//! Breaks are schedule gaps (meals, announcements, ...) stored in
//! `<event_id>/breaks.json`, separate from performances but reordered the
//! same way.

use perfman_core::error::CoreError;
use perfman_core::reorder::Ordered;
use perfman_core::schedule::{validate_expected_duration, validate_name, BreakType};
use perfman_core::serde_ext::{lenient_timestamp, present};
use perfman_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Break {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type")]
    pub break_type: BreakType,
    #[serde(default)]
    pub is_done: bool,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: Timestamp,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_duration: Option<u32>,
}

impl Ordered for Break {
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

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBreak {
    pub name: String,
    #[serde(rename = "type")]
    pub break_type: BreakType,
    pub expected_duration: Option<u32>,
}

impl CreateBreak {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name("name", &self.name)?;
        if let Some(secs) = self.expected_duration {
            validate_expected_duration(secs)?;
        }
        Ok(())
    }
}

/// DTO for updating a break. Unrecognized keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBreak {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub break_type: Option<BreakType>,
    pub is_done: Option<bool>,
    pub order: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub expected_duration: Option<Option<u32>>,
}

impl UpdateBreak {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(Some(secs)) = self.expected_duration {
            validate_expected_duration(secs)?;
        }
        Ok(())
    }

    pub fn apply_to(&self, item: &mut Break) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(break_type) = self.break_type {
            item.break_type = break_type;
        }
        if let Some(is_done) = self.is_done {
            item.is_done = is_done;
        }
        if let Some(order) = self.order {
            item.order = order;
        }
        if let Some(expected_duration) = self.expected_duration {
            item.expected_duration = expected_duration;
        }
    }
}
