pub mod event;
pub mod media;
pub mod performance;
pub mod schedule_break;
pub mod track;
pub mod upload;
