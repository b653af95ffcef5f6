// src/filter.rs
//! Classification of raw log lines into data and non-data

/// Prefix of pulse-per-second diagnostic lines
const PPS_MARKER: &[u8] = b"PPS";

/// Characters that never appear in a data line
const REJECTED_CHARS: &[u8] = b"$#@%^&*!";

/// Decide whether a raw line is data worth writing to the merged output.
///
/// Data lines are non-blank, do not start with `PPS` or a letter, and carry
/// none of the sentence/diagnostic marker characters. NMEA sentences always
/// fail this check because of their leading `$`.
pub fn is_admissible(line: &[u8]) -> bool {
    !line.trim_ascii().is_empty()
        && !line.starts_with(PPS_MARKER)
        && !line.iter().any(|b| REJECTED_CHARS.contains(b))
        && !line.first().is_some_and(u8::is_ascii_alphabetic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_data_line() {
        assert!(is_admissible(b"123,456,789\r\n"));
        assert!(is_admissible(b"-12,0.5,3\n"));
        assert!(is_admissible(b"1"));
    }

    #[test]
    fn test_rejects_blank_lines() {
        assert!(!is_admissible(b""));
        assert!(!is_admissible(b"\r\n"));
        assert!(!is_admissible(b"  \t \n"));
    }

    #[test]
    fn test_rejects_pps_and_letters() {
        assert!(!is_admissible(b"PPS 1234\r\n"));
        assert!(!is_admissible(b"Sample rate: 100Hz\r\n"));
        assert!(!is_admissible(b"x,1,2\n"));
    }

    #[test]
    fn test_rejects_marker_characters() {
        for marker in REJECTED_CHARS {
            let line = [b'1', b',', *marker, b'\n'];
            assert!(!is_admissible(&line), "accepted marker {:?}", *marker as char);
        }
        assert!(!is_admissible(b"$GPGGA,123519,4807.038,N\r\n"));
    }

    #[test]
    fn test_leading_whitespace_is_not_a_letter() {
        assert!(is_admissible(b" 12,34\n"));
    }
}
