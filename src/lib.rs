// src/lib.rs
//! GPS Merge Library
//!
//! Reads raw GPS receiver logs (GPGGA/GPRMC sentence streams), keeps the data
//! lines and writes them, optionally augmented with the latest decoded date,
//! time and position, into one merged file per acquisition batch.

pub mod config;
pub mod display;
pub mod error;
pub mod filter;
pub mod gps;
pub mod merger;
pub mod processor;
pub mod source;

// Re-export main types for convenience
pub use config::MergeConfig;
pub use error::{MergeError, Result};
pub use merger::{merge_batch, run_batch, BatchSummary};
pub use processor::{process_stream, MergeMode};
