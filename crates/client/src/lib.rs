//! HTTP client and polling engine for backend jobs.
//!
//! [`api::JobApi`] wraps the backend REST endpoints (submission, status,
//! listing, deletion). [`tracker::JobTracker`] follows one job to a
//! terminal state on a fixed cadence and reports every snapshot to a
//! [`observer::JobObserver`]. [`view::JobView`] folds those callbacks into
//! the state a presentation layer draws.

pub mod api;
pub mod config;
pub mod observer;
pub mod resolver;
pub mod tracker;
pub mod view;
