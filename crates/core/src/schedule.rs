//! Run-sheet vocabulary: performance defaults, break kinds, and field
//! validation shared by the store and the API layer.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Performance `type` applied when the client omits one.
pub const DEFAULT_PERFORMANCE_TYPE: &str = "Song";

/// Performance `mode` applied when the client omits one.
pub const DEFAULT_PERFORMANCE_MODE: &str = "Solo";

/// Performer recorded on a track uploaded without one.
pub const DEFAULT_TRACK_PERFORMER: &str = "Unknown";

/// Upper bound for names (events, performances, breaks).
pub const MAX_NAME_LEN: usize = 200;

/// Upper bound for an expected duration: 24 hours.
pub const MAX_EXPECTED_DURATION_SECS: u32 = 24 * 60 * 60;

// ---------------------------------------------------------------------------
// Break type
// ---------------------------------------------------------------------------

/// Kind of non-performance slot in a run-sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakType {
    Lunch,
    Dinner,
    Broadcast,
    Announcement,
    /// Older documents and clients spell this "Appearence".
    #[serde(alias = "Appearence")]
    Appearance,
    #[serde(rename = "Special Show")]
    SpecialShow,
}

impl BreakType {
    pub const ALL: [BreakType; 6] = [
        Self::Lunch,
        Self::Dinner,
        Self::Broadcast,
        Self::Announcement,
        Self::Appearance,
        Self::SpecialShow,
    ];

    /// Wire label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::Broadcast => "Broadcast",
            Self::Announcement => "Announcement",
            Self::Appearance => "Appearance",
            Self::SpecialShow => "Special Show",
        }
    }

    /// Parse a wire label, accepting the legacy "Appearence" spelling.
    pub fn parse(label: &str) -> Result<Self, CoreError> {
        if label == "Appearence" {
            return Ok(Self::Appearance);
        }
        Self::ALL
            .into_iter()
            .find(|t| t.label() == label)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|t| t.label()).collect();
                CoreError::Validation(format!(
                    "Invalid break type '{label}'. Must be one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Cover image position
// ---------------------------------------------------------------------------

/// Focal point of an event's cover image, in percent of width/height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagePosition {
    pub x: f64,
    pub y: f64,
}

impl Default for ImagePosition {
    fn default() -> Self {
        Self { x: 50.0, y: 50.0 }
    }
}

impl ImagePosition {
    /// Both coordinates must lie within `0..=100`.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (axis, value) in [("x", self.x), ("y", self.y)] {
            if !(0.0..=100.0).contains(&value) {
                return Err(CoreError::Validation(format!(
                    "imagePosition.{axis} must be between 0 and 100, got {value}"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Validate a required display name: non-blank and at most [`MAX_NAME_LEN`].
pub fn validate_name(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_expected_duration(secs: u32) -> Result<(), CoreError> {
    if secs > MAX_EXPECTED_DURATION_SECS {
        return Err(CoreError::Validation(format!(
            "expectedDuration must be at most {MAX_EXPECTED_DURATION_SECS} seconds"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
