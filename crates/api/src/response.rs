//! Shared response types for API handlers.
//!
//! Entities are returned as bare JSON (the browser client consumes them
//! directly); only acknowledgements without a payload use a wrapper.

use serde::Serialize;

/// `{ "success": true }` acknowledgement for reorder requests.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
