// src/processor.rs
//! Line-by-line processing of one input log

use crate::{
    error::{MergeError, Result},
    filter::is_admissible,
    gps::{
        data::{PositionFix, ProcessorState, TimeDate},
        nmea::{self, FieldList},
    },
};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use tracing::trace;

/// Number of header lines at the top of every device log
pub const HEADER_LINES: usize = 2;

/// Field whose trimmed content replaces the last field of an augmented line
const TERMINAL_FIELD: usize = 11;

const LINE_END: &[u8] = b"\r\n";

/// How data lines are written to the merged output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Append date, time, latitude, longitude and altitude to each data line
    #[default]
    Augment,
    /// Copy data lines through with their line ending normalised to CRLF
    Plain,
}

impl MergeMode {
    /// Suffix of the merged file name for this mode
    pub fn output_suffix(&self) -> &'static str {
        match self {
            MergeMode::Augment => "_merged_data.txt",
            MergeMode::Plain => "_data.txt",
        }
    }

    /// Metadata file that is left out of the merge
    pub fn default_exclude_name(&self) -> &'static str {
        match self {
            MergeMode::Augment => "acquinfo.txt",
            MergeMode::Plain => "aquinfo.txt",
        }
    }
}

impl std::fmt::Display for MergeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeMode::Augment => write!(f, "augment"),
            MergeMode::Plain => write!(f, "plain"),
        }
    }
}

/// Line counts for one processed stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    /// Lines read after the header
    pub lines_read: u64,
    pub lines_written: u64,
}

/// Process one device log, writing every admissible line to `output`.
///
/// The first [`HEADER_LINES`] lines are skipped unconditionally. In augment
/// mode, data lines seen before both a GPRMC and a valid GPGGA sentence are
/// dropped.
pub fn process_stream<R, W>(mut reader: R, output: &mut W, mode: MergeMode) -> Result<StreamStats>
where
    R: BufRead,
    W: Write + ?Sized,
{
    let mut line = Vec::new();
    for _ in 0..HEADER_LINES {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(StreamStats::default());
        }
    }

    let mut stats = StreamStats::default();
    let mut state = ProcessorState::new();
    let mut line_number = HEADER_LINES;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        line_number += 1;
        stats.lines_read += 1;

        let written = match mode {
            MergeMode::Plain => write_plain(&line, output)?,
            MergeMode::Augment => write_augmented(&line, &mut state, output)
                .map_err(|e| match e {
                    MergeError::Parse(msg) => MergeError::Parse(format!("line {}: {}", line_number, msg)),
                    other => other,
                })?,
        };

        if written {
            stats.lines_written += 1;
        } else {
            trace!(line_number, "dropped line");
        }
    }

    Ok(stats)
}

fn write_plain<W: Write + ?Sized>(line: &[u8], output: &mut W) -> Result<bool> {
    if !is_admissible(line) {
        return Ok(false);
    }
    output.write_all(strip_line_end(line))?;
    output.write_all(LINE_END)?;
    Ok(true)
}

/// Line content without its trailing `\r`/`\n` bytes
fn strip_line_end(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|b| *b != b'\r' && *b != b'\n')
        .map_or(0, |i| i + 1);
    &line[..end]
}

fn write_augmented<W: Write + ?Sized>(
    line: &[u8],
    state: &mut ProcessorState,
    output: &mut W,
) -> Result<bool> {
    if nmea::is_gprmc(line) {
        state.record_time_date(nmea::parse_gprmc(line)?);
    }

    if nmea::is_gpgga(line) {
        if let Some(fix) = nmea::parse_gpgga(line)? {
            state.record_position(fix);
        }
    }

    if !is_admissible(line) {
        return Ok(false);
    }

    match state.augmentation() {
        Some((time_date, fix)) => {
            output.write_all(&augment_line(line, time_date, fix)?)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Rebuild a data line with the decoded values appended as extra fields.
///
/// The line's last field (which carries the terminator) is replaced by the
/// trimmed content of field 11, then date, time, latitude, longitude and
/// altitude follow, ending in CRLF.
pub fn augment_line(line: &[u8], time_date: &TimeDate, fix: &PositionFix) -> Result<Vec<u8>> {
    let fields = FieldList::split(line);
    let terminal = fields.get(TERMINAL_FIELD, "data line terminal field")?.trim_ascii();

    let (_, leading) = fields
        .as_slice()
        .split_last()
        .ok_or_else(|| MergeError::Parse("empty data line".to_string()))?;

    let mut out: Vec<&[u8]> = Vec::with_capacity(leading.len() + 6);
    out.extend_from_slice(leading);
    out.push(terminal);
    out.push(&time_date.date);
    out.push(&time_date.time);
    out.push(&fix.latitude);
    out.push(&fix.longitude);
    out.push(&fix.altitude);

    let mut rewritten = out.join(&b","[..]);
    rewritten.extend_from_slice(LINE_END);
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Device log v1\r\nchannels: 12\r\n";
    const GPRMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n";
    const GPGGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";
    const GPGGA_NO_FIX: &str = "$GPGGA,123520,4830.000,N,01130.000,E,0,00,0.0,0.0,M,0.0,M,,*47\r\n";
    const DATA: &str = "1,2,3,4,5,6,7,8,9,10,11,12\r\n";

    fn run(input: &str, mode: MergeMode) -> (String, StreamStats) {
        let mut out = Vec::new();
        let stats = process_stream(input.as_bytes(), &mut out, mode).unwrap();
        (String::from_utf8(out).unwrap(), stats)
    }

    #[test]
    fn test_augments_after_both_sentences() {
        let input = format!("{HEADER}{DATA}{GPRMC}{DATA}{GPGGA}{DATA}");
        let (out, stats) = run(&input, MergeMode::Augment);

        assert_eq!(
            out,
            "1,2,3,4,5,6,7,8,9,10,11,12,230394,123519,48.12722222,11.51666667,545.4\r\n"
        );
        assert_eq!(stats, StreamStats { lines_read: 5, lines_written: 1 });
    }

    #[test]
    fn test_header_is_skipped() {
        // A data-looking header line must not reach the output
        let input = "1,2\r\n3,4\r\n5,6\r\n";
        let (out, stats) = run(input, MergeMode::Plain);
        assert_eq!(out, "5,6\r\n");
        assert_eq!(stats.lines_read, 1);
    }

    #[test]
    fn test_short_input() {
        let (out, stats) = run("only one line", MergeMode::Augment);
        assert!(out.is_empty());
        assert_eq!(stats, StreamStats::default());
    }

    #[test]
    fn test_no_fix_keeps_previous_position() {
        let input = format!("{HEADER}{GPRMC}{GPGGA}{GPGGA_NO_FIX}{DATA}");
        let (out, _) = run(&input, MergeMode::Augment);
        assert!(out.ends_with(",48.12722222,11.51666667,545.4\r\n"));
    }

    #[test]
    fn test_no_fix_alone_does_not_enable_output() {
        let input = format!("{HEADER}{GPRMC}{GPGGA_NO_FIX}{DATA}");
        let (out, stats) = run(&input, MergeMode::Augment);
        assert!(out.is_empty());
        assert_eq!(stats.lines_written, 0);
    }

    #[test]
    fn test_latest_time_date_is_used() {
        let later = "$GPRMC,130000,A,4807.038,N,01131.000,E,022.4,084.4,240394,003.1,W*6A\r\n";
        let input = format!("{HEADER}{GPRMC}{GPGGA}{DATA}{later}{DATA}");
        let (out, _) = run(&input, MergeMode::Augment);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(",230394,123519,"));
        assert!(lines[1].contains(",240394,130000,"));
    }

    #[test]
    fn test_terminal_field_replaces_last_field() {
        let line = "1,2,3,4,5,6,7,8,9,10,11, 12 ,extra\n";
        let input = format!("{HEADER}{GPRMC}{GPGGA}{line}");
        let (out, _) = run(&input, MergeMode::Augment);
        assert_eq!(
            out,
            "1,2,3,4,5,6,7,8,9,10,11, 12 ,12,230394,123519,48.12722222,11.51666667,545.4\r\n"
        );
    }

    #[test]
    fn test_short_data_line_is_fatal() {
        let input = format!("{HEADER}{GPRMC}{GPGGA}1,2,3\r\n");
        let err = process_stream(input.as_bytes(), &mut Vec::new(), MergeMode::Augment).unwrap_err();
        assert!(err.to_string().contains("line 5"));
    }

    #[test]
    fn test_malformed_gprmc_is_fatal() {
        let input = format!("{HEADER}$GPRMC,123519,A\r\n");
        let err = process_stream(input.as_bytes(), &mut Vec::new(), MergeMode::Augment).unwrap_err();
        assert!(matches!(err, MergeError::Parse(_)));
    }

    #[test]
    fn test_sentences_never_emitted() {
        let input = format!("{HEADER}{GPRMC}{GPGGA}PPS 1\r\nStatus OK\r\n\r\n");
        let (out, _) = run(&input, MergeMode::Augment);
        assert!(out.is_empty());
        let (out, _) = run(&input, MergeMode::Plain);
        assert!(out.is_empty());
    }

    #[test]
    fn test_plain_mode_normalises_line_endings() {
        let input = format!("{HEADER}{GPRMC}1,2\n{GPGGA}3,4\r\n#comment\r\n");
        let (out, stats) = run(&input, MergeMode::Plain);
        assert_eq!(out, "1,2\r\n3,4\r\n");
        assert_eq!(stats, StreamStats { lines_read: 5, lines_written: 2 });
    }

    #[test]
    fn test_plain_mode_terminates_last_line() {
        let input = format!("{HEADER}1, 2 \r\n3,4");
        let (out, stats) = run(&input, MergeMode::Plain);
        assert_eq!(out, "1, 2 \r\n3,4\r\n");
        assert_eq!(stats.lines_written, 2);
    }

    #[test]
    fn test_strip_line_end() {
        assert_eq!(strip_line_end(b"1,2\r\n"), b"1,2");
        assert_eq!(strip_line_end(b"1,2"), b"1,2");
        assert_eq!(strip_line_end(b"\r\n"), b"");
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(MergeMode::Augment.output_suffix(), "_merged_data.txt");
        assert_eq!(MergeMode::Plain.default_exclude_name(), "aquinfo.txt");
        assert_eq!(MergeMode::Plain.to_string(), "plain");
    }
}
