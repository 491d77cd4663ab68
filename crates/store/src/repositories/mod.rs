//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async operations that
//! accept `&Store` as the first argument.

mod collection;

pub mod break_repo;
pub mod event_repo;
pub mod performance_repo;
pub mod track_repo;

pub use break_repo::BreakRepo;
pub use event_repo::EventRepo;
pub use performance_repo::PerformanceRepo;
pub use track_repo::TrackRepo;
