//! Numeric passes that turn one station's hourly series into degree-hour bins.
//!
//! Each pass is a pure function over slices: degree hours, block means, the
//! conditional gate, season tagging, temperature binning, and the per
//! (hour, bin) aggregation. [`crate::pipeline`] composes them in order.

pub mod aggregate;
pub mod bins;
pub mod block_mean;
pub mod degree_hour;
pub mod gate;
pub mod season;
pub mod types;
pub mod utility;
