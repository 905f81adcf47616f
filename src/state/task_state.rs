/// Task state definitions for tracking page task progress
///
/// This module defines the lifecycle a single page task moves through while
/// the crawl is running.
use crate::SitemapError;
use std::fmt;

/// Represents the current state of a page task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task has been issued but has not started its fetch
    Pending,

    /// HTTP request is in flight
    Fetching,

    /// Page body is being walked for links
    Tokenising,

    // ===== Terminal States =====
    /// Page was fetched and all of its links were processed
    Done,

    /// Fetch failed; no links were extracted
    Failed,
}

impl TaskState {
    /// Returns true if this is a terminal state
    ///
    /// Both `Done` and `Failed` count as completed work for termination
    /// tracking.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// ```text
    /// Pending -> Fetching -> Tokenising -> Done
    /// Pending | Fetching -> Failed
    /// ```
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Fetching)
                | (Self::Fetching, Self::Tokenising)
                | (Self::Tokenising, Self::Done)
                | (Self::Pending, Self::Failed)
                | (Self::Fetching, Self::Failed)
        )
    }

    /// Performs a checked transition
    ///
    /// # Returns
    ///
    /// * `Ok(TaskState)` - The new state
    /// * `Err(SitemapError::InvalidTransition)` - The transition is not allowed
    pub fn transition(self, next: TaskState) -> Result<TaskState, SitemapError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(SitemapError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Short lowercase label used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Tokenising => "tokenising",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
