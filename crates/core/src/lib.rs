//! Domain types and pure helpers for tracking asynchronous backend jobs.
//!
//! Nothing in this crate performs I/O. The HTTP client and the polling
//! engine live in `jobtrack-client`.

pub mod artifact;
pub mod error;
pub mod job_status;
pub mod progress;
pub mod submission;
pub mod types;
