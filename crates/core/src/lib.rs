//! Domain logic for the performance manager: run-sheet vocabulary, partial
//! reordering, upload naming, and media helpers. Nothing in this crate
//! touches the filesystem or the network.

pub mod error;
pub mod media;
pub mod naming;
pub mod range;
pub mod reorder;
pub mod schedule;
pub mod serde_ext;
pub mod types;
