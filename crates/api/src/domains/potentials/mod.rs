pub mod service;

pub use service::{invalidate, propagate};
