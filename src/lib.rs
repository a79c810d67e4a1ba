//! Cell tower survey pipeline.
//!
//! Batches of raw cell identities arrive from an [`source::UpdateSource`],
//! are normalized, stripped of records carrying "unknown" sentinels,
//! deduplicated in first-seen order and finally exported as numbered text
//! lines.

pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod input;
pub mod model;
pub mod normalize;
pub mod permission;
pub mod projector;
pub mod session;
pub mod source;
pub mod status;
pub mod store;

pub use model::{CellTower, RawCellRecord};
pub use session::{Session, SessionObserver, SessionState};
pub use status::Status;
