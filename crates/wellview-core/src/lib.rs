//! WellView Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout WellView:
//! - Insight data model (stats, mood, improvement, weekly reports)
//! - Identity, date and time-range value types
//! - Backend and token-source trait abstractions
//! - Core error types

pub mod backend;
pub mod date;
pub mod error;
pub mod identity;
pub mod model;
pub mod range;

pub use backend::{InsightsBackend, StaticTokenSource, TokenSource};
pub use date::IsoDate;
pub use error::{Error, Result, Slice};
pub use identity::{Identity, ReportId, UserId};
pub use range::TimeRange;

/// Hard upper bound on the number of weekly reports requested in one list call.
pub const MAX_REPORT_LIMIT: usize = 10;
