//! How a job reacts when one query key fails, and what it keeps of the failure.
//!
//! Both jobs run the same loop shape: fetch one key, flatten the response,
//! append the rows. The policy decides whether a per-key error aborts the run
//! or is recorded and skipped.

use std::fmt;

/// Per-key failure handling for an ETL run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The first per-key error aborts the run and is returned to the caller.
    /// Rows already written for earlier keys stay on disk.
    FailFast,
    /// A per-key error is logged, recorded on the run report, and the loop
    /// continues with the next key. The output silently excludes the failed
    /// key's rows.
    SkipAndRecord,
}

/// One skipped key together with the error that sank it.
///
/// The full error value is kept, not just the key, so failures remain
/// distinguishable after the run.
#[derive(Debug)]
pub struct ErrorRecord<K, E> {
    pub key: K,
    pub error: E,
}

impl<K: fmt::Display, E: fmt::Display> fmt::Display for ErrorRecord<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.error)
    }
}
