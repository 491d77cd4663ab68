/// Entity identifiers are opaque strings. New entities receive a random
/// UUID v4; documents written elsewhere may carry any unique string.
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh random identifier for a new entity.
pub fn new_entity_id() -> EntityId {
    uuid::Uuid::new_v4().to_string()
}
