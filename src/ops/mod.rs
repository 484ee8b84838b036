//! Top-level operations: merge, ratio split, parts split.
//!
//! All three follow the same shape: validate parameters, validate sources,
//! create output directories, collect, place, report. Validation is eager, so
//! a bad parameter or missing source aborts before anything is created.

mod merge;
mod parts;
mod ratio;

pub use merge::{MergeOptions, merge};
pub use parts::{PartsOptions, split_parts};
pub use ratio::{RatioOptions, split_ratio};
