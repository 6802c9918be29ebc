//! # prwatch-core: shared model for daily PR/GHI analysis
//!
//! Holds the types every stage agrees on:
//!
//! - [`DateRecord`]: one calendar day with an optional performance ratio and
//!   an optional irradiation value. A missing side stays `None`; it is never
//!   coerced to zero.
//! - [`MergedTable`]: records in strictly ascending date order with no
//!   duplicate dates, plus [`Coverage`] counts over it.
//! - [`PrError`] / [`PrResult`]: the error type shared across crates.
//! - [`Diagnostics`]: non-fatal issues collected while reading source files.

pub mod diagnostics;
pub mod error;
pub mod record;

pub use diagnostics::{DiagnosticIssue, Diagnostics, IssueKind, Severity};
pub use error::{PrError, PrResult};
pub use record::{parse_date, Coverage, DateRecord, Measure, MergedTable, DATE_FORMAT};
