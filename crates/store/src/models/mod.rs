pub mod event;
pub mod performance;
pub mod schedule_break;
pub mod track;
