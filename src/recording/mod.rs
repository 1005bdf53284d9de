//! Search timing recording.
//!
//! Each finished decision episode can be appended to a CSV file, one row per
//! search stage, for offline profiling of the engine.
//!
//! # Components
//!
//! - `csv_writer`: CSV output with daily file rotation and a reader for it

pub mod csv_writer;

pub use csv_writer::{load_timings_from_csv, LoadedTimingRow, TimingCsvWriter};
