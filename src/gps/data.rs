// src/gps/data.rs
//! Decoded sentence values and per-file processing state

/// Position decoded from a GPGGA sentence with a valid fix
#[derive(Debug, Clone, PartialEq)]
pub struct PositionFix {
    /// Signed decimal degrees, already rendered as text
    pub latitude: Vec<u8>,
    /// Signed decimal degrees, already rendered as text
    pub longitude: Vec<u8>,
    /// Altitude field copied verbatim from the sentence
    pub altitude: Vec<u8>,
}

/// Date and time fields copied verbatim from a GPRMC sentence
#[derive(Debug, Clone, PartialEq)]
pub struct TimeDate {
    pub date: Vec<u8>,
    pub time: Vec<u8>,
}

/// State carried across the lines of a single input file.
///
/// Created fresh for every file. The `*_seen` flags only ever go from `false`
/// to `true`; the last values stay in effect until a newer valid sentence
/// replaces them.
#[derive(Debug, Clone, Default)]
pub struct ProcessorState {
    pub last_position_fix: Option<PositionFix>,
    pub last_time_date: Option<TimeDate>,
    pub time_date_seen: bool,
    pub position_seen: bool,
}

impl ProcessorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_time_date(&mut self, time_date: TimeDate) {
        self.last_time_date = Some(time_date);
        self.time_date_seen = true;
    }

    pub fn record_position(&mut self, fix: PositionFix) {
        self.last_position_fix = Some(fix);
        self.position_seen = true;
    }

    /// Both a time/date and a position have been observed in this file
    pub fn can_augment(&self) -> bool {
        self.time_date_seen && self.position_seen
    }

    /// The values to append to a data line, once augmentation is allowed
    pub fn augmentation(&self) -> Option<(&TimeDate, &PositionFix)> {
        if !self.can_augment() {
            return None;
        }
        match (&self.last_time_date, &self.last_position_fix) {
            (Some(time_date), Some(fix)) => Some((time_date, fix)),
            _ => None,
        }
    }
}
