pub mod service;
pub mod types;

pub use service::{advance, assign_slot};
pub use types::{AdvanceOutcome, PotentialChanges, ProgressionError, SlotAssignment};
