//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `TaskState`: lifecycle of a single page task (pending, fetching, tokenising, done)
//! - `Outstanding`: counter of issued-but-unfinished page tasks, used to detect termination

mod outstanding;
mod task_state;

// Re-export main types
pub use outstanding::{Outstanding, TaskGuard};
pub use task_state::TaskState;
