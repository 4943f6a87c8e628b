//! Species data files and height estimation.
//!
//! A species file `<species>.json` (or `<species>.yaml`) maps each gender to its
//! image, ears offset, optional tint, and `(anthro_size, height)` samples. Feral height is the
//! least-squares line through the samples evaluated at the requested height.

use crate::character::Character;
use crate::error::{SizeDiffError, SizeDiffResult};
use crate::query::CharacterEntry;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub anthro_size: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderProfile {
    pub image: String,
    #[serde(default)]
    pub ears_offset: f64,
    #[serde(default)]
    pub color: Option<String>,
    pub data: Vec<DataPoint>,
}

/// Profiles keyed by gender.
pub type SpeciesData = BTreeMap<String, GenderProfile>;

/// Profile used for species without a data file: placeholder image, identity heights.
pub fn ambiguous_profile() -> GenderProfile {
    GenderProfile {
        image: "missing.png".to_string(),
        ears_offset: 0.0,
        color: None,
        data: vec![
            DataPoint {
                anthro_size: 5.5,
                height: 5.5,
            },
            DataPoint {
                anthro_size: 6.0,
                height: 6.0,
            },
        ],
    }
}

/// Evaluate the degree-1 least-squares fit of `height` on `anthro_size`.
///
/// One sample scales proportionally through the origin. Samples that share a
/// single `anthro_size` give their mean height. Returns `None` without samples.
pub fn estimate_height(points: &[DataPoint], anthro_height: f64) -> Option<f64> {
    match points {
        [] => None,
        [only] => {
            if only.anthro_size == 0.0 {
                Some(only.height)
            } else {
                Some(only.height * anthro_height / only.anthro_size)
            }
        }
        _ => {
            let n = points.len() as f64;
            let mean_x = points.iter().map(|p| p.anthro_size).sum::<f64>() / n;
            let mean_y = points.iter().map(|p| p.height).sum::<f64>() / n;
            let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), p| {
                let dx = p.anthro_size - mean_x;
                (sxx + dx * dx, sxy + dx * (p.height - mean_y))
            });
            if sxx == 0.0 {
                return Some(mean_y);
            }
            let slope = sxy / sxx;
            Some(mean_y + slope * (anthro_height - mean_x))
        }
    }
}

/// Species file formats, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpeciesFormat {
    Json,
    Yaml,
}

impl SpeciesFormat {
    const LOOKUP_ORDER: [SpeciesFormat; 2] = [SpeciesFormat::Json, SpeciesFormat::Yaml];

    fn extension(self) -> &'static str {
        match self {
            SpeciesFormat::Json => "json",
            SpeciesFormat::Yaml => "yaml",
        }
    }

    fn parse(self, text: &str) -> Result<SpeciesData, String> {
        match self {
            SpeciesFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            SpeciesFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

/// Directory of species data files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesLibrary {
    root: PathBuf,
}

impl SpeciesLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load a species by name, or `None` when it has no data file.
    pub async fn load(&self, species: &str) -> SizeDiffResult<Option<SpeciesData>> {
        let name = species.to_lowercase();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(SizeDiffError::SpeciesData(format!(
                "invalid species name {species:?}"
            )));
        }

        for format in SpeciesFormat::LOOKUP_ORDER {
            let path = self.root.join(format!("{name}.{}", format.extension()));
            let text = match tokio::fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(SizeDiffError::SpeciesData(format!(
                        "failed to read {}: {e}",
                        path.display()
                    )))
                }
            };
            let data = format.parse(&text).map_err(|e| {
                SizeDiffError::SpeciesData(format!("failed to parse {}: {e}", path.display()))
            })?;
            debug!("loaded {} with genders {:?}", path.display(), data.keys());
            return Ok(Some(data));
        }
        info!("No species data for {name}, using the ambiguous profile");
        Ok(None)
    }

    /// Turn a query entry into a renderable character.
    pub async fn resolve(&self, entry: &CharacterEntry) -> SizeDiffResult<Character> {
        let profile = match self.load(&entry.species).await? {
            Some(mut data) => data.remove(&entry.gender).ok_or_else(|| {
                SizeDiffError::SpeciesData(format!(
                    "species {} has no data for gender {}",
                    entry.species, entry.gender
                ))
            })?,
            None => ambiguous_profile(),
        };

        let feral_height = estimate_height(&profile.data, entry.height).ok_or_else(|| {
            SizeDiffError::SpeciesData(format!(
                "species {} has no height samples for gender {}",
                entry.species, entry.gender
            ))
        })?;

        Ok(Character {
            species: entry.species.clone(),
            gender: entry.gender.clone(),
            name: entry.name.clone(),
            height: entry.height,
            feral_height,
            ears_offset: profile.ears_offset,
            color: profile.color,
            image: profile.image,
        })
    }

    pub async fn resolve_all(&self, entries: &[CharacterEntry]) -> SizeDiffResult<Vec<Character>> {
        let mut characters = Vec::with_capacity(entries.len());
        for entry in entries {
            characters.push(self.resolve(entry).await?);
        }
        Ok(characters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn points(pairs: &[(f64, f64)]) -> Vec<DataPoint> {
        pairs
            .iter()
            .map(|&(anthro_size, height)| DataPoint {
                anthro_size,
                height,
            })
            .collect()
    }

    fn entry(species: &str, gender: &str, height: f64) -> CharacterEntry {
        CharacterEntry {
            species: species.to_string(),
            gender: gender.to_string(),
            height,
            name: "Test".to_string(),
        }
    }

    #[rstest]
    #[case(&[(60.0, 30.0), (72.0, 36.0)], 66.0, 33.0)]
    #[case(&[(60.0, 30.0), (72.0, 36.0)], 84.0, 42.0)]
    #[case(&[(5.5, 5.5), (6.0, 6.0)], 70.0, 70.0)]
    #[case(&[(60.0, 20.0)], 90.0, 30.0)]
    #[case(&[(0.0, 12.0)], 90.0, 12.0)]
    #[case(&[(60.0, 20.0), (60.0, 30.0)], 90.0, 25.0)]
    fn test_estimate_height(#[case] samples: &[(f64, f64)], #[case] at: f64, #[case] expected: f64) {
        let estimate = estimate_height(&points(samples), at).unwrap();
        assert!((estimate - expected).abs() < 1e-9, "{estimate} != {expected}");
    }

    #[test]
    fn test_estimate_height_least_squares() {
        // y = 2x + 1 with symmetric noise
        let samples = points(&[(0.0, 1.5), (1.0, 2.5), (2.0, 5.5), (3.0, 6.5)]);
        let estimate = estimate_height(&samples, 4.0).unwrap();
        // slope 1.8, intercept 1.3
        assert!((estimate - 8.5).abs() < 1e-9);
        assert_eq!(estimate_height(&[], 4.0), None);
    }

    #[tokio::test]
    async fn test_resolve_from_species_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("wolf.json"),
            r#"{
                "male": {
                    "image": "wolf_male.png",
                    "ears_offset": 12.5,
                    "color": "aa7744",
                    "data": [{"anthro_size": 60, "height": 30}, {"anthro_size": 72, "height": 36}]
                }
            }"#,
        )
        .unwrap();
        let library = SpeciesLibrary::new(dir.path());

        let c = library.resolve(&entry("Wolf", "male", 66.0)).await.unwrap();
        assert_eq!(c.species, "Wolf");
        assert_eq!(c.height, 66.0);
        assert!((c.feral_height - 33.0).abs() < 1e-9);
        assert_eq!(c.ears_offset, 12.5);
        assert_eq!(c.color.as_deref(), Some("aa7744"));
        assert_eq!(c.image, "wolf_male.png");

        let err = library.resolve(&entry("wolf", "female", 66.0)).await.unwrap_err();
        assert!(matches!(err, SizeDiffError::SpeciesData(_)));
    }

    #[tokio::test]
    async fn test_yaml_species_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("red_fox.yaml"),
            "female:\n  image: red_fox_female.png\n  ears_offset: 10\n  data:\n    - anthro_size: 60\n      height: 20\n    - anthro_size: 72\n      height: 24\n",
        )
        .unwrap();
        let library = SpeciesLibrary::new(dir.path());

        let c = library.resolve(&entry("red_fox", "female", 66.0)).await.unwrap();
        assert!((c.feral_height - 22.0).abs() < 1e-9);
        assert_eq!(c.ears_offset, 10.0);
        assert_eq!(c.image, "red_fox_female.png");

        // JSON is preferred when both exist
        std::fs::write(
            dir.path().join("red_fox.json"),
            r#"{"female": {"image": "json.png", "data": [{"anthro_size": 60, "height": 60}]}}"#,
        )
        .unwrap();
        let c = library.resolve(&entry("red_fox", "female", 66.0)).await.unwrap();
        assert_eq!(c.image, "json.png");
    }

    #[tokio::test]
    async fn test_missing_species_uses_ambiguous_profile() {
        let dir = tempfile::tempdir().unwrap();
        let library = SpeciesLibrary::new(dir.path());
        let c = library.resolve(&entry("unknown", "unknown", 60.0)).await.unwrap();
        assert_eq!(c.image, "missing.png");
        assert!((c.feral_height - 60.0).abs() < 1e-9);
        assert_eq!(c.ears_offset, 0.0);
    }

    #[tokio::test]
    async fn test_bad_species_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let library = SpeciesLibrary::new(dir.path());

        assert!(matches!(
            library.load("broken").await,
            Err(SizeDiffError::SpeciesData(_))
        ));
        std::fs::write(dir.path().join("tangled.yaml"), "male: [unclosed").unwrap();
        assert!(matches!(
            library.load("tangled").await,
            Err(SizeDiffError::SpeciesData(_))
        ));
        assert!(library.load("../etc").await.is_err());
        assert!(library.load("").await.is_err());
    }
}
