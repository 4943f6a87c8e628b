//! Height formatting and parsing in feet and inches.

use crate::error::{SizeDiffError, SizeDiffResult};

/// Format inches as `F'I"`. Feet are floored and inches rounded, so 71.6 is `6'0"`.
pub fn inches_to_feet_inches(inches: f64) -> String {
    let mut feet = (inches / 12.0).floor() as i64;
    let mut rest = (inches % 12.0).round() as i64;
    if rest == 12 {
        feet += 1;
        rest = 0;
    }
    format!("{feet}'{rest}\"")
}

/// Parse a height in inches from `5'6"`, `5'`, `66"`, `66`, or `5ft 6in`.
pub fn parse_height(input: &str) -> SizeDiffResult<f64> {
    let invalid = || SizeDiffError::Query(format!("unrecognized height: {input:?}"));
    let normalized = input
        .trim()
        .to_ascii_lowercase()
        .replace("feet", "'")
        .replace("foot", "'")
        .replace("ft", "'")
        .replace("inches", "\"")
        .replace("inch", "\"")
        .replace("in", "\"");

    let number = |s: &str| -> SizeDiffResult<f64> {
        let value: f64 = s.trim().parse().map_err(|_| invalid())?;
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(invalid())
        }
    };

    let (feet, rest) = match normalized.split_once('\'') {
        Some((feet, rest)) => (number(feet)?, rest.trim()),
        None => (0.0, normalized.as_str()),
    };
    let rest = rest.trim_end_matches('"').trim();
    if rest.contains(['\'', '"']) {
        return Err(invalid());
    }
    let inches = if rest.is_empty() {
        if !normalized.contains('\'') {
            return Err(invalid());
        }
        0.0
    } else {
        number(rest)?
    };
    Ok(feet * 12.0 + inches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(36.0, "3'0\"")]
    #[case(66.0, "5'6\"")]
    #[case(71.6, "6'0\"")]
    #[case(70.4, "5'10\"")]
    #[case(5.0, "0'5\"")]
    #[case(102.0, "8'6\"")]
    fn test_inches_to_feet_inches(#[case] inches: f64, #[case] expected: &str) {
        assert_eq!(inches_to_feet_inches(inches), expected);
    }

    #[rstest]
    #[case("5'6\"", 66.0)]
    #[case("5'", 60.0)]
    #[case("66\"", 66.0)]
    #[case("66", 66.0)]
    #[case(" 5ft 6in ", 66.0)]
    #[case("6 ft", 72.0)]
    #[case("5' 6.5\"", 66.5)]
    fn test_parse_height(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(parse_height(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("tall")]
    #[case("5'6'")]
    #[case("-3")]
    fn test_parse_height_rejects(#[case] input: &str) {
        assert!(parse_height(input).is_err());
    }
}
