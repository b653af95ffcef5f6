// src/gps/nmea.rs
//! NMEA sentence parsing for GPGGA and GPRMC lines

use super::coord;
use super::data::{PositionFix, TimeDate};
use crate::error::{MergeError, Result};

pub const GPGGA_TAG: &[u8] = b"$GPGGA";
pub const GPRMC_TAG: &[u8] = b"$GPRMC";

/// Fix quality value meaning "no position solution"
const NO_FIX: &[u8] = b"0";

/// GPGGA field positions
mod gga {
    pub const LATITUDE: usize = 2;
    pub const LATITUDE_HEMISPHERE: usize = 3;
    pub const LONGITUDE: usize = 4;
    pub const LONGITUDE_HEMISPHERE: usize = 5;
    pub const FIX_QUALITY: usize = 6;
    pub const ALTITUDE: usize = 9;
}

/// GPRMC field positions
mod rmc {
    pub const TIME: usize = 1;
    pub const DATE: usize = 9;
}

/// A raw line split on commas, with positional access that fails loudly
#[derive(Debug, Clone)]
pub struct FieldList<'a> {
    fields: Vec<&'a [u8]>,
}

impl<'a> FieldList<'a> {
    pub fn split(line: &'a [u8]) -> Self {
        Self {
            fields: line.split(|b| *b == b',').collect(),
        }
    }

    pub fn as_slice(&self) -> &[&'a [u8]] {
        &self.fields
    }

    /// Field at `index`, or a parse error naming the missing field
    pub fn get(&self, index: usize, name: &str) -> Result<&'a [u8]> {
        self.fields.get(index).copied().ok_or_else(|| {
            MergeError::Parse(format!(
                "missing {} (field {}), line has only {} fields",
                name,
                index,
                self.fields.len()
            ))
        })
    }
}

pub fn is_gpgga(line: &[u8]) -> bool {
    contains(line, GPGGA_TAG)
}

pub fn is_gprmc(line: &[u8]) -> bool {
    contains(line, GPRMC_TAG)
}

/// Parse a GPGGA sentence into a position fix.
///
/// Returns `Ok(None)` when the receiver reports no fix. A line that is too
/// short, or whose coordinate digits are not numeric, is an error.
pub fn parse_gpgga(line: &[u8]) -> Result<Option<PositionFix>> {
    let fields = FieldList::split(line);

    if fields.get(gga::FIX_QUALITY, "fix quality")? == NO_FIX {
        return Ok(None);
    }

    // ddmm.sss / dddmm.sss; the digits after the decimal point are read as seconds
    let lat = fields.get(gga::LATITUDE, "latitude")?;
    let lat_dir = fields.get(gga::LATITUDE_HEMISPHERE, "latitude hemisphere")?;
    let lon = fields.get(gga::LONGITUDE, "longitude")?;
    let lon_dir = fields.get(gga::LONGITUDE_HEMISPHERE, "longitude hemisphere")?;
    let altitude = fields.get(gga::ALTITUDE, "altitude")?;

    let latitude = coord::decode(slice(lat, 0, 2), slice(lat, 2, 4), slice(lat, 5, lat.len()), lat_dir)?;
    let longitude = coord::decode(slice(lon, 0, 3), slice(lon, 3, 5), slice(lon, 6, lon.len()), lon_dir)?;

    Ok(Some(PositionFix {
        latitude: coord::format_decimal(latitude).into_bytes(),
        longitude: coord::format_decimal(longitude).into_bytes(),
        altitude: altitude.to_vec(),
    }))
}

/// Extract the date and time fields of a GPRMC sentence, unvalidated
pub fn parse_gprmc(line: &[u8]) -> Result<TimeDate> {
    let fields = FieldList::split(line);
    Ok(TimeDate {
        date: fields.get(rmc::DATE, "date")?.to_vec(),
        time: fields.get(rmc::TIME, "time")?.to_vec(),
    })
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Byte range clamped to the field length
fn slice(field: &[u8], start: usize, end: usize) -> &[u8] {
    let end = end.min(field.len());
    let start = start.min(end);
    &field[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const GPGGA: &[u8] = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";
    const GPRMC: &[u8] = b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n";

    #[test]
    fn test_gpgga_parsing() {
        let fix = parse_gpgga(GPGGA).unwrap().unwrap();
        assert_eq!(fix.latitude, b"48.12722222");
        assert_eq!(fix.longitude, b"11.51666667");
        assert_eq!(fix.altitude, b"545.4");
    }

    #[test]
    fn test_gpgga_southern_western() {
        let line = b"$GPGGA,123519,4830.000,S,01130.000,W,1,08,0.9,12.0,M,46.9,M,,*47";
        let fix = parse_gpgga(line).unwrap().unwrap();
        assert_eq!(fix.latitude, b"-48.5");
        assert_eq!(fix.longitude, b"-11.5");
    }

    #[test]
    fn test_gpgga_no_fix() {
        let line = b"$GPGGA,123519,4807.038,N,01131.000,E,0,08,0.9,545.4,M,46.9,M,,*47";
        assert_eq!(parse_gpgga(line).unwrap(), None);

        // No fix wins even when the coordinates are garbage
        let line = b"$GPGGA,,,,,,0,,,,";
        assert_eq!(parse_gpgga(line).unwrap(), None);
    }

    #[test]
    fn test_gpgga_too_short() {
        let err = parse_gpgga(b"$GPGGA,123519,4807.038,N").unwrap_err();
        assert!(err.to_string().contains("fix quality"));
    }

    #[test]
    fn test_gpgga_empty_coordinates_with_fix() {
        assert!(parse_gpgga(b"$GPGGA,123519,,,,,1,08,0.9,545.4,M").is_err());
    }

    #[test]
    fn test_gprmc_parsing() {
        let time_date = parse_gprmc(GPRMC).unwrap();
        assert_eq!(time_date.date, b"230394");
        assert_eq!(time_date.time, b"123519");
    }

    #[test]
    fn test_gprmc_too_short() {
        assert!(matches!(parse_gprmc(b"$GPRMC,123519,A"), Err(MergeError::Parse(_))));
    }

    #[test]
    fn test_sentence_detection_is_unanchored() {
        assert!(is_gpgga(b"PPS 17 $GPGGA,1,2"));
        assert!(is_gprmc(GPRMC));
        assert!(!is_gprmc(GPGGA));
        assert!(!is_gpgga(b"123,456"));
    }

    #[test]
    fn test_field_list() {
        let fields = FieldList::split(b"a,,c");
        assert_eq!(fields.as_slice().len(), 3);
        assert_eq!(fields.get(1, "middle").unwrap(), b"");
        assert!(fields.get(3, "fourth").is_err());
    }
}
