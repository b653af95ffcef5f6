// src/gps/coord.rs
//! Degrees/minutes/seconds to decimal degree conversion

use crate::error::{MergeError, Result};

/// Number of decimal places kept in decoded coordinates
pub const COORDINATE_PRECISION: i32 = 8;

/// Convert DMS fragments plus a hemisphere letter into signed decimal degrees.
///
/// Each fragment is the raw numeric text cut out of a sentence field. Southern and
/// western hemispheres yield negative values. The result is rounded to
/// [`COORDINATE_PRECISION`] decimal places.
pub fn decode(degrees: &[u8], minutes: &[u8], seconds: &[u8], hemisphere: &[u8]) -> Result<f64> {
    let mut dd = parse_number(degrees, "degrees")?
        + parse_number(minutes, "minutes")? / 60.0
        + parse_number(seconds, "seconds")? / 3600.0;

    if matches!(hemisphere, b"S" | b"W") {
        dd = -dd;
    }

    Ok(round_to(dd, COORDINATE_PRECISION))
}

/// Render a decoded coordinate the way it is written into merged lines.
///
/// Uses the shortest representation that round-trips, always with a fractional
/// part (`48.0`, not `48`). Magnitudes below `1e-4` or from `1e16` up switch
/// to exponent form (`1.5e-05`, `2.5e+16`); NaN is written as `nan`.
pub fn format_decimal(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return value.to_string();
    }

    let magnitude = value.abs();
    if value != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return exponent_form(value);
    }

    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

/// `1.5e-05` style: signed exponent of at least two digits
fn exponent_form(value: f64) -> String {
    let sci = format!("{:e}", value);
    match sci.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => sci,
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

fn parse_number(fragment: &[u8], what: &str) -> Result<f64> {
    std::str::from_utf8(fragment)
        .ok()
        .map(str::trim)
        .and_then(|text| text.parse::<f64>().ok())
        .ok_or_else(|| {
            MergeError::Parse(format!(
                "invalid {} value {:?}",
                what,
                String::from_utf8_lossy(fragment)
            ))
        })
}
