// src/merger.rs
//! Batch merging: every log of an acquisition into one output file

use crate::{
    display::ProgressSink,
    error::{MergeError, Result},
    processor::{process_stream, MergeMode},
    source::{self, entry_file_name, LogSource},
};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Counts accumulated over all files of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeTotals {
    pub files: usize,
    pub lines_read: u64,
    pub lines_written: u64,
}

/// Outcome of one batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub files: usize,
    pub lines_read: u64,
    pub lines_written: u64,
    /// Metadata file copied next to the merged output (plain mode)
    pub info_copied: Option<PathBuf>,
}

/// Merge all entries of `source` into `output`, in natural order.
///
/// Entries whose file name is listed in `exclude_names` are skipped. The
/// first failure aborts the merge.
pub fn merge_batch<S, W, P>(
    source: &mut S,
    output: &mut W,
    mode: MergeMode,
    exclude_names: &[&str],
    progress: &mut P,
) -> Result<MergeTotals>
where
    S: LogSource + ?Sized,
    W: Write + ?Sized,
    P: ProgressSink + ?Sized,
{
    let names: Vec<String> = source
        .entry_names()?
        .into_iter()
        .filter(|name| !exclude_names.contains(&entry_file_name(name)))
        .collect();

    let total = names.len();
    progress.batch_started(&source.label(), total)?;

    let mut totals = MergeTotals::default();
    for (index, name) in names.iter().enumerate() {
        progress.file_started(index + 1, total, name)?;

        let reader = source.open(name).map_err(|e| e.in_file(name))?;
        let stats = process_stream(BufReader::new(reader), output, mode).map_err(|e| e.in_file(name))?;
        debug!(
            file = %name,
            lines_read = stats.lines_read,
            lines_written = stats.lines_written,
            "merged file"
        );

        totals.files += 1;
        totals.lines_read += stats.lines_read;
        totals.lines_written += stats.lines_written;
    }

    Ok(totals)
}

/// Path of the merged file for a batch input
pub fn output_path(input: &Path, output_dir: &Path, mode: MergeMode) -> PathBuf {
    output_dir.join(format!("{}{}", source::batch_base_name(input), mode.output_suffix()))
}

/// Merge one batch (zip archive or folder) into `output_dir`.
///
/// In plain mode the metadata file is copied into `output_dir` before the
/// merge starts. A partially written output file is removed on failure.
pub fn run_batch<P>(
    input: &Path,
    output_dir: &Path,
    mode: MergeMode,
    exclude_name: &str,
    progress: &mut P,
) -> Result<BatchSummary>
where
    P: ProgressSink + ?Sized,
{
    let mut source = source::open_batch(input)?;

    let info_copied = match mode {
        MergeMode::Plain => copy_info_file(source.as_mut(), output_dir, exclude_name)?,
        MergeMode::Augment => None,
    };

    let output = output_path(input, output_dir, mode);
    let result = write_merged(source.as_mut(), &output, mode, exclude_name, progress);

    let totals = match result {
        Ok(totals) => totals,
        Err(e) => {
            if let Err(remove_err) = fs::remove_file(&output) {
                warn!(path = %output.display(), error = %remove_err, "could not remove partial output");
            }
            return Err(e);
        }
    };

    let summary = BatchSummary {
        input: input.to_path_buf(),
        output,
        files: totals.files,
        lines_read: totals.lines_read,
        lines_written: totals.lines_written,
        info_copied,
    };
    info!(
        input = %summary.input.display(),
        output = %summary.output.display(),
        files = summary.files,
        lines_written = summary.lines_written,
        "batch merged"
    );
    progress.batch_finished(&summary)?;

    Ok(summary)
}

fn write_merged<P>(
    source: &mut dyn LogSource,
    output: &Path,
    mode: MergeMode,
    exclude_name: &str,
    progress: &mut P,
) -> Result<MergeTotals>
where
    P: ProgressSink + ?Sized,
{
    let mut writer = BufWriter::new(File::create(output)?);
    let totals = merge_batch(source, &mut writer, mode, &[exclude_name], progress)?;
    writer.flush()?;
    Ok(totals)
}

/// Copy the batch's metadata file, if it has one, byte-for-byte into `output_dir`
fn copy_info_file(
    source: &mut dyn LogSource,
    output_dir: &Path,
    exclude_name: &str,
) -> Result<Option<PathBuf>> {
    let entry = source
        .entry_names()?
        .into_iter()
        .find(|name| entry_file_name(name) == exclude_name);

    let Some(entry) = entry else {
        return Ok(None);
    };

    let target = output_dir.join(exclude_name);
    let mut reader = source.open(&entry)?;
    let mut file = File::create(&target)?;
    io::copy(&mut reader, &mut file)?;
    debug!(from = %entry, to = %target.display(), "copied metadata file");

    Ok(Some(target))
}

/// Find batch inputs named `<prefix>*` directly inside `input_dir`, in natural order
pub fn discover_batches(input_dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/{}*",
        glob::Pattern::escape(&input_dir.to_string_lossy()),
        glob::Pattern::escape(prefix)
    );

    let mut batches = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry.map_err(|e| MergeError::Io(e.into()))?;
        batches.push(path);
    }

    batches.sort_by(|a, b| source::natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
    Ok(batches)
}
