//! Share-state query strings.
//!
//! Characters are encoded as `species,gender,height,name` and joined with `|`.
//! The older form separated characters with `+` or spaces. It is still read
//! when the value contains no `|`.

use crate::error::{SizeDiffError, SizeDiffResult};
use log::warn;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

const FIELD_DEFAULTS: [&str; 4] = ["unknown", "unknown", "60", "unknown"];

/// A character as requested, before species data is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterEntry {
    pub species: String,
    pub gender: String,
    /// Requested height in inches.
    pub height: f64,
    pub name: String,
}

impl CharacterEntry {
    fn parse(raw: &str) -> Self {
        let mut fields = raw.split(',');
        let mut next = |default: &str| {
            fields
                .next()
                .filter(|f| !f.is_empty())
                .unwrap_or(default)
                .to_string()
        };
        let species = next(FIELD_DEFAULTS[0]);
        let gender = next(FIELD_DEFAULTS[1]);
        let height_text = next(FIELD_DEFAULTS[2]);
        let name = next(FIELD_DEFAULTS[3]);

        let height = match height_text.parse::<f64>() {
            Ok(h) if h.is_finite() && h >= 0.0 => h,
            _ => {
                warn!("Invalid height {height_text:?} in character {raw:?}, using 0");
                0.0
            }
        };
        Self {
            species,
            gender,
            height,
            name,
        }
    }

    pub fn to_query(&self) -> String {
        format!("{},{},{},{}", self.species, self.gender, self.height, self.name)
    }
}

/// Parse the `characters` value. Empty entries are skipped.
pub fn parse_characters(value: &str) -> Vec<CharacterEntry> {
    let separators: &[char] = if value.contains('|') {
        &['|']
    } else {
        &['+', ' ']
    };
    value
        .split(separators)
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| CharacterEntry::parse(raw.trim()))
        .collect()
}

pub fn format_characters(entries: &[CharacterEntry]) -> String {
    entries
        .iter()
        .map(CharacterEntry::to_query)
        .collect::<Vec<_>>()
        .join("|")
}

/// Remove the entry at `index`. An out-of-range index leaves the list unchanged.
pub fn remove_character(entries: &mut Vec<CharacterEntry>, index: usize) -> Option<CharacterEntry> {
    (index < entries.len()).then(|| entries.remove(index))
}

/// Everything needed to reproduce a comparison from a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareState {
    pub characters: Vec<CharacterEntry>,
    pub measure_ears: bool,
    pub scale_height: bool,
    pub size: u32,
}

impl Default for ShareState {
    fn default() -> Self {
        Self {
            characters: Vec::new(),
            measure_ears: true,
            scale_height: false,
            size: 400,
        }
    }
}

impl ShareState {
    /// Parse a `key=value&...` query string, with or without a leading `?`.
    ///
    /// Unknown keys are ignored. `measure_ears` is on unless it is `false`,
    /// `scale_height` is on only when it is `true`, and a size that is not a
    /// positive integer falls back to 400.
    pub fn parse(query: &str) -> SizeDiffResult<Self> {
        let mut state = Self::default();
        for pair in query.trim_start_matches('?').split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode(value)?;
            match decode(key)?.as_ref() {
                "characters" => state.characters = parse_characters(&value),
                "measure_ears" => state.measure_ears = value != "false",
                "scale_height" => state.scale_height = value == "true",
                "size" => {
                    state.size = value.parse().ok().filter(|&s| s > 0).unwrap_or(400);
                }
                other => warn!("Ignoring unknown query parameter {other:?}"),
            }
        }
        Ok(state)
    }

    pub fn to_query(&self) -> String {
        format!(
            "characters={}&measure_ears={}&scale_height={}&size={}",
            urlencoding::encode(&format_characters(&self.characters)),
            self.measure_ears,
            self.scale_height,
            self.size
        )
    }
}

fn decode(raw: &str) -> SizeDiffResult<Cow<'_, str>> {
    urlencoding::decode(raw).map_err(|e| SizeDiffError::Query(format!("{raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(species: &str, gender: &str, height: f64, name: &str) -> CharacterEntry {
        CharacterEntry {
            species: species.to_string(),
            gender: gender.to_string(),
            height,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_parse_characters() {
        let parsed = parse_characters("wolf,male,72,Rex|red_fox,female,60.5,Vixi");
        assert_eq!(
            parsed,
            vec![
                entry("wolf", "male", 72.0, "Rex"),
                entry("red_fox", "female", 60.5, "Vixi"),
            ]
        );
    }

    #[test]
    fn test_legacy_separators_and_defaults() {
        let parsed = parse_characters("wolf,male+fox  cat,female,abc,Tom");
        assert_eq!(
            parsed,
            vec![
                entry("wolf", "male", 60.0, "unknown"),
                entry("fox", "unknown", 60.0, "unknown"),
                entry("cat", "female", 0.0, "Tom"),
            ]
        );
        assert!(parse_characters("").is_empty());
    }

    #[test]
    fn test_format_and_remove() {
        let mut entries = parse_characters("wolf,male,72,Rex|cat,female,40,Tom");
        assert_eq!(format_characters(&entries), "wolf,male,72,Rex|cat,female,40,Tom");

        assert!(remove_character(&mut entries, 5).is_none());
        assert_eq!(entries.len(), 2);
        let removed = remove_character(&mut entries, 0).unwrap();
        assert_eq!(removed.name, "Rex");
        assert_eq!(format_characters(&entries), "cat,female,40,Tom");
    }

    #[test]
    fn test_share_state_parse() {
        let state = ShareState::parse(
            "?characters=wolf%2Cmale%2C72%2CRex%7Ccat%2Cfemale%2C40%2CTom&measure_ears=no&scale_height=true&size=1024",
        )
        .unwrap();
        assert_eq!(state.characters.len(), 2);
        assert!(state.measure_ears);
        assert!(state.scale_height);
        assert_eq!(state.size, 1024);

        let defaults = ShareState::parse("measure_ears=false&size=big&extra=1").unwrap();
        assert!(!defaults.measure_ears);
        assert!(!defaults.scale_height);
        assert_eq!(defaults.size, 400);
        assert!(defaults.characters.is_empty());
    }

    #[test]
    fn test_share_state_query_reparses() {
        let state = ShareState {
            characters: vec![
                entry("snow_leopard", "female", 66.5, "Mira Jo"),
                entry("wolf", "male", 72.0, "Rex"),
            ],
            measure_ears: false,
            scale_height: true,
            size: 800,
        };
        let query = state.to_query();
        assert!(query.starts_with("characters=snow_leopard%2Cfemale%2C66.5%2CMira%20Jo%7Cwolf"));
        assert_eq!(ShareState::parse(&query).unwrap(), state);
    }

    #[test]
    fn test_bad_percent_encoding() {
        assert!(matches!(
            ShareState::parse("characters=%FF%FE"),
            Err(SizeDiffError::Query(_))
        ));
    }
}
