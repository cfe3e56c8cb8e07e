//! State module for tracking session progress
//!
//! - `SessionState`: where a scrape session is in its open/collect/commit lifecycle

mod session_state;

pub use session_state::SessionState;
