//! Event entity model and DTOs.
//!
//! Events form the resident index (`events.json`). Each event owns a
//! directory holding its performances, breaks, and cover image.

use perfman_core::error::CoreError;
use perfman_core::schedule::{validate_name, ImagePosition};
use perfman_core::serde_ext::lenient_timestamp;
use perfman_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

/// An entry in `events.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: Timestamp,
    /// File name of the cover image inside the event directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub image_position: ImagePosition,
}

/// DTO for creating a new event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvent {
    pub name: String,
    pub description: Option<String>,
    pub image_position: Option<ImagePosition>,
}

impl CreateEvent {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name("name", &self.name)?;
        if let Some(position) = &self.image_position {
            position.validate()?;
        }
        Ok(())
    }
}

/// DTO for updating an event. All fields optional; absent fields are kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvent {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_position: Option<ImagePosition>,
}

impl UpdateEvent {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(position) = &self.image_position {
            position.validate()?;
        }
        Ok(())
    }

    /// Shallow-merge the supplied fields into `event`.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(name) = &self.name {
            event.name = name.clone();
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(position) = self.image_position {
            event.image_position = position;
        }
    }
}
