//! On-disk layout of the data directory.
//!
//! ```text
//! <root>/events.json
//! <root>/<event_id>/performances.json
//! <root>/<event_id>/breaks.json
//! <root>/<event_id>/cover.<ext>
//! <root>/<event_id>/<performance_id>/<track files>
//! ```

use std::path::{Path, PathBuf};

pub const EVENTS_FILE: &str = "events.json";
pub const PERFORMANCES_FILE: &str = "performances.json";
pub const BREAKS_FILE: &str = "breaks.json";

/// Which per-event collection a document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Performances,
    Breaks,
}

impl CollectionKind {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Performances => PERFORMANCES_FILE,
            Self::Breaks => BREAKS_FILE,
        }
    }

    /// Singular entity name used in errors and logs.
    pub fn entity(self) -> &'static str {
        match self {
            Self::Performances => "Performance",
            Self::Breaks => "Break",
        }
    }
}

/// Path builder rooted at the data directory.
///
/// IDs passed here must already be known to the store (looked up in a
/// document or freshly generated); the layout does not sanitize them.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn events_file(&self) -> PathBuf {
        self.root.join(EVENTS_FILE)
    }

    pub fn event_dir(&self, event_id: &str) -> PathBuf {
        self.root.join(event_id)
    }

    pub fn collection_file(&self, event_id: &str, kind: CollectionKind) -> PathBuf {
        self.event_dir(event_id).join(kind.file_name())
    }

    pub fn performance_dir(&self, event_id: &str, performance_id: &str) -> PathBuf {
        self.event_dir(event_id).join(performance_id)
    }

    pub fn event_file(&self, event_id: &str, filename: &str) -> PathBuf {
        self.event_dir(event_id).join(filename)
    }

    pub fn track_file(&self, event_id: &str, performance_id: &str, filename: &str) -> PathBuf {
        self.performance_dir(event_id, performance_id).join(filename)
    }
}

/// Public URL under which a track file is streamed.
pub fn track_url(event_id: &str, performance_id: &str, filename: &str) -> String {
    format!("/api/events/{event_id}/performances/{performance_id}/files/{filename}")
}
