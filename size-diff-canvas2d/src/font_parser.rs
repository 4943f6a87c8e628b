//! CSS `font` shorthand parsing.
//!
//! Labels are set with strings such as `"20px Arial, sans-serif"`; this turns
//! them into the pieces cosmic-text needs.

use crate::error::{Canvas2dError, Canvas2dResult};
use cosmic_text::{Style, Weight};

/// Parsed CSS font shorthand.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFont {
    pub style: Style,
    pub weight: Weight,
    /// Font size in pixels.
    pub size_px: f32,
    /// Families in preference order.
    pub families: Vec<String>,
}

impl Default for ParsedFont {
    fn default() -> Self {
        Self {
            style: Style::Normal,
            weight: Weight::NORMAL,
            size_px: 10.0,
            families: vec!["sans-serif".to_string()],
        }
    }
}

/// Parse `[style] [variant] [weight] size[/line-height] family[, family]*`.
///
/// An empty string yields the canvas default of `10px sans-serif`.
pub fn parse_font(font_str: &str) -> Canvas2dResult<ParsedFont> {
    let font_str = font_str.trim();
    let mut result = ParsedFont::default();
    if font_str.is_empty() {
        return Ok(result);
    }

    let mut rest = font_str;
    loop {
        let (token, after) = split_token(rest);
        if token.is_empty() {
            return Err(Canvas2dError::FontParseError(format!(
                "missing font size in {font_str:?}"
            )));
        }
        match token {
            "normal" | "small-caps" => {}
            "italic" => result.style = Style::Italic,
            "oblique" => result.style = Style::Oblique,
            "bold" | "bolder" => result.weight = Weight::BOLD,
            "lighter" => result.weight = Weight::LIGHT,
            t if is_numeric_weight(t) => {
                result.weight = Weight(t.parse().unwrap_or(Weight::NORMAL.0));
            }
            t => {
                let size_part = t.split('/').next().unwrap_or(t);
                result.size_px = parse_size(size_part)?;
                rest = after;
                break;
            }
        }
        rest = after;
    }

    let families: Vec<String> = rest
        .split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|f| !f.is_empty())
        .collect();
    if !families.is_empty() {
        result.families = families;
    }
    Ok(result)
}

fn split_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], &s[i..]),
        None => (s, ""),
    }
}

fn is_numeric_weight(token: &str) -> bool {
    matches!(token.parse::<u16>(), Ok(w) if (100..=900).contains(&w) && w % 100 == 0)
}

fn parse_size(token: &str) -> Canvas2dResult<f32> {
    let num_end = token
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(token.len());
    let (number, unit) = token.split_at(num_end);
    let value: f32 = number
        .parse()
        .map_err(|_| Canvas2dError::FontParseError(format!("invalid font size: {token}")))?;

    let multiplier = match unit {
        "" | "px" => 1.0,
        "pt" => 4.0 / 3.0,
        "em" | "rem" => 16.0,
        "%" => 0.16,
        other => {
            return Err(Canvas2dError::FontParseError(format!(
                "unsupported font size unit: {other}"
            )))
        }
    };
    Ok(value * multiplier)
}
