//! Sexagesimal coordinate parsing and formatting
//!
//! Right ascension is accepted as `HHhMMmSS.Ss`, `HH:MM:SS.S` or `HH MM SS.S`;
//! declination as `±DD°MM'SS"`, `±DD:MM:SS` or `±DD MM SS`. Decimal results are
//! in degrees.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, SkyError};

static RA_RE: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
static DEC_RE: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();

fn ra_regex() -> Result<&'static Regex> {
    RA_RE
        .get_or_init(|| {
            Regex::new(r"^\s*(\d{1,2})\s*[h:\s]\s*(\d{1,2})\s*[m:\s]\s*(\d{1,2}(?:\.\d+)?)\s*s?\s*$")
        })
        .as_ref()
        .map_err(|e| SkyError::Other(format!("invalid right ascension pattern: {e}")))
}

fn dec_regex() -> Result<&'static Regex> {
    DEC_RE
        .get_or_init(|| {
            Regex::new(
                r#"^\s*([+\-−]?)\s*(\d{1,2})\s*[°d:\s]\s*(\d{1,2})\s*['′m:\s]\s*(\d{1,2}(?:\.\d+)?)\s*(?:"|″|''|s)?\s*$"#,
            )
        })
        .as_ref()
        .map_err(|e| SkyError::Other(format!("invalid declination pattern: {e}")))
}

fn component(caps: &regex::Captures<'_>, index: usize) -> f64 {
    caps.get(index)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Parse a sexagesimal right ascension into decimal degrees in [0, 360)
pub fn parse_ra(text: &str) -> Result<f64> {
    let caps = ra_regex()?
        .captures(text)
        .ok_or_else(|| SkyError::invalid_value("right ascension", text))?;

    let (hours, minutes, seconds) = (component(&caps, 1), component(&caps, 2), component(&caps, 3));
    if hours >= 24.0 || minutes >= 60.0 || seconds >= 60.0 {
        return Err(SkyError::invalid_value("right ascension", text));
    }

    Ok((hours + minutes / 60.0 + seconds / 3600.0) * 15.0)
}

/// Parse a sexagesimal declination into decimal degrees in [-90, 90]
pub fn parse_dec(text: &str) -> Result<f64> {
    let caps = dec_regex()?
        .captures(text)
        .ok_or_else(|| SkyError::invalid_value("declination", text))?;

    let negative = caps.get(1).is_some_and(|m| !m.as_str().is_empty() && m.as_str() != "+");
    let (degrees, minutes, seconds) = (component(&caps, 2), component(&caps, 3), component(&caps, 4));
    if minutes >= 60.0 || seconds >= 60.0 {
        return Err(SkyError::invalid_value("declination", text));
    }

    let magnitude = degrees + minutes / 60.0 + seconds / 3600.0;
    if magnitude > 90.0 {
        return Err(SkyError::invalid_value("declination", text));
    }

    Ok(if negative { -magnitude } else { magnitude })
}

/// Format decimal degrees as `HHhMMmSS.Ss`
pub fn format_ra(degrees: f64) -> String {
    let total_seconds = (degrees.rem_euclid(360.0) / 15.0 * 3600.0 * 10.0).round() / 10.0;
    let hours = (total_seconds / 3600.0).floor();
    let minutes = ((total_seconds - hours * 3600.0) / 60.0).floor();
    let seconds = total_seconds - hours * 3600.0 - minutes * 60.0;
    format!("{:02}h{:02}m{:04.1}s", hours as u32 % 24, minutes as u32, seconds)
}

/// Format decimal degrees as `±DD°MM'SS"`
pub fn format_dec(degrees: f64) -> String {
    let sign = if degrees < 0.0 { '-' } else { '+' };
    let total_seconds = (degrees.abs() * 3600.0).round();
    let whole = (total_seconds / 3600.0).floor();
    let minutes = ((total_seconds - whole * 3600.0) / 60.0).floor();
    let seconds = total_seconds - whole * 3600.0 - minutes * 60.0;
    format!(
        "{}{:02}°{:02}'{:02}\"",
        sign, whole as u32, minutes as u32, seconds as u32
    )
}

/// Great-circle separation between two positions, in degrees
pub fn angular_separation(ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
    let (ra1, dec1, ra2, dec2) = (
        ra1.to_radians(),
        dec1.to_radians(),
        ra2.to_radians(),
        dec2.to_radians(),
    );
    let hav = ((dec2 - dec1) / 2.0).sin().powi(2)
        + dec1.cos() * dec2.cos() * ((ra2 - ra1) / 2.0).sin().powi(2);
    (2.0 * hav.sqrt().min(1.0).asin()).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_parse_ra_forms() {
        // M31: 00h42m44.3s
        let expected = (0.0 + 42.0 / 60.0 + 44.3 / 3600.0) * 15.0;
        assert!(close(parse_ra("00h42m44.3s").unwrap(), expected));
        assert!(close(parse_ra("00:42:44.3").unwrap(), expected));
        assert!(close(parse_ra("00 42 44.3").unwrap(), expected));
    }

    #[test]
    fn test_parse_ra_rejects_out_of_range() {
        assert!(parse_ra("24h00m00s").is_err());
        assert!(parse_ra("12h61m00s").is_err());
        assert!(parse_ra("not a coordinate").is_err());
    }

    #[test]
    fn test_parse_dec_forms() {
        let expected = 41.0 + 16.0 / 60.0 + 9.0 / 3600.0;
        assert!(close(parse_dec("+41°16'09\"").unwrap(), expected));
        assert!(close(parse_dec("41:16:09").unwrap(), expected));
        assert!(close(parse_dec("-05 23 28").unwrap(), -(5.0 + 23.0 / 60.0 + 28.0 / 3600.0)));
    }

    #[test]
    fn test_parse_dec_rejects_beyond_pole() {
        assert!(parse_dec("+91:00:00").is_err());
        assert!(parse_dec("+45:60:00").is_err());
    }

    #[test]
    fn test_format_round_trip() {
        let ra = parse_ra("05h35m17.3s").unwrap();
        assert_eq!(format_ra(ra), "05h35m17.3s");
        let dec = parse_dec("-05°23'28\"").unwrap();
        assert_eq!(format_dec(dec), "-05°23'28\"");
    }

    #[test]
    fn test_angular_separation() {
        assert!(close(angular_separation(10.0, 20.0, 10.0, 20.0), 0.0));
        assert!(close(angular_separation(0.0, 0.0, 90.0, 0.0), 90.0));
        assert!(close(angular_separation(0.0, 89.0, 180.0, 89.0), 2.0));
    }
}
