// src/display/mod.rs
//! Progress reporting for batch merges

pub mod terminal;

use crate::{error::Result, merger::BatchSummary};

/// Receives progress notifications from the batch merger.
///
/// Implementations never influence the merged output.
pub trait ProgressSink {
    /// A batch with `total` files to merge is starting
    fn batch_started(&mut self, label: &str, total: usize) -> Result<()>;

    /// File `index` (1-based) of `total` is about to be processed
    fn file_started(&mut self, index: usize, total: usize, name: &str) -> Result<()>;

    fn batch_finished(&mut self, summary: &BatchSummary) -> Result<()>;
}

/// Discards all progress notifications
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn batch_started(&mut self, _label: &str, _total: usize) -> Result<()> {
        Ok(())
    }

    fn file_started(&mut self, _index: usize, _total: usize, _name: &str) -> Result<()> {
        Ok(())
    }

    fn batch_finished(&mut self, _summary: &BatchSummary) -> Result<()> {
        Ok(())
    }
}
