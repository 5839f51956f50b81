//! Error types for the `Result`-returning ring operations.
//!
//! The core API reports "no space" and "no data" as `false` or a short count.
//! [`Producer::try_insert`](crate::Producer::try_insert) and
//! [`Consumer::try_pop`](crate::Consumer::try_pop) report the same conditions
//! as errors for callers that want to use `?`.

use thiserror::Error;

/// The ring had no free slot. Carries the value that was not inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("ring buffer is full")]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Returns the rejected value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// The ring held no element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Error)]
#[error("ring buffer is empty")]
pub struct Empty;
