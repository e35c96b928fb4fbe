use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {name} = {value}: must be {rule}")]
    Invalid {
        name: &'static str,
        value: f64,
        rule: &'static str,
    },
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Options of the detection preprocessing chain.
///
/// Construction always validates, including deserialization, so an instance
/// in hand is usable as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParamsFile")]
pub struct PreprocessParams {
    gamma: f64,
    bilateral_d: u32,
    bilateral_sigma_color: f64,
    bilateral_sigma_space: f64,
    contrast_clip: f64,
    alpha: f64,
    beta: f64,
}

impl PreprocessParams {
    pub fn new(
        gamma: f64,
        bilateral_d: u32,
        bilateral_sigma_color: f64,
        bilateral_sigma_space: f64,
        contrast_clip: f64,
        alpha: f64,
        beta: f64,
    ) -> Result<Self, ConfigError> {
        positive("gamma", gamma)?;
        if bilateral_d < 1 {
            return Err(ConfigError::Invalid {
                name: "bilateral_d",
                value: bilateral_d as f64,
                rule: "at least 1",
            });
        }
        positive("bilateral_sigma_color", bilateral_sigma_color)?;
        positive("bilateral_sigma_space", bilateral_sigma_space)?;
        positive("contrast_clip", contrast_clip)?;
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(ConfigError::Invalid {
                name: "alpha",
                value: alpha,
                rule: "finite and non-negative",
            });
        }
        if !beta.is_finite() {
            return Err(ConfigError::Invalid {
                name: "beta",
                value: beta,
                rule: "finite",
            });
        }
        Ok(Self {
            gamma,
            bilateral_d,
            bilateral_sigma_color,
            bilateral_sigma_space,
            contrast_clip,
            alpha,
            beta,
        })
    }

    /// Read a JSON object of options; absent keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn bilateral_d(&self) -> u32 {
        self.bilateral_d
    }

    pub fn bilateral_sigma_color(&self) -> f64 {
        self.bilateral_sigma_color
    }

    pub fn bilateral_sigma_space(&self) -> f64 {
        self.bilateral_sigma_space
    }

    pub fn contrast_clip(&self) -> f64 {
        self.contrast_clip
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }
}

impl Default for PreprocessParams {
    fn default() -> Self {
        let f = ParamsFile::default();
        Self {
            gamma: f.gamma,
            bilateral_d: f.bilateral_d,
            bilateral_sigma_color: f.bilateral_sigma_color,
            bilateral_sigma_space: f.bilateral_sigma_space,
            contrast_clip: f.contrast_clip,
            alpha: f.alpha,
            beta: f.beta,
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            name,
            value,
            rule: "finite and positive",
        })
    }
}

/// On-disk shape of the options, validated on conversion.
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ParamsFile {
    gamma: f64,
    bilateral_d: u32,
    bilateral_sigma_color: f64,
    bilateral_sigma_space: f64,
    contrast_clip: f64,
    alpha: f64,
    beta: f64,
}

impl Default for ParamsFile {
    fn default() -> Self {
        Self {
            gamma: 0.8,
            bilateral_d: 9,
            bilateral_sigma_color: 75.0,
            bilateral_sigma_space: 75.0,
            contrast_clip: 2.0,
            alpha: 1.2,
            beta: 10.0,
        }
    }
}

impl TryFrom<ParamsFile> for PreprocessParams {
    type Error = ConfigError;

    fn try_from(f: ParamsFile) -> Result<Self, Self::Error> {
        Self::new(
            f.gamma,
            f.bilateral_d,
            f.bilateral_sigma_color,
            f.bilateral_sigma_space,
            f.contrast_clip,
            f.alpha,
            f.beta,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let p = PreprocessParams::default();
        assert_relative_eq!(p.gamma(), 0.8);
        assert_eq!(p.bilateral_d(), 9);
        assert_relative_eq!(p.bilateral_sigma_color(), 75.0);
        assert_relative_eq!(p.bilateral_sigma_space(), 75.0);
        assert_relative_eq!(p.contrast_clip(), 2.0);
        assert_relative_eq!(p.alpha(), 1.2);
        assert_relative_eq!(p.beta(), 10.0);
    }

    #[test]
    fn test_defaults_pass_validation() {
        let d = PreprocessParams::default();
        let validated = PreprocessParams::new(
            d.gamma(),
            d.bilateral_d(),
            d.bilateral_sigma_color(),
            d.bilateral_sigma_space(),
            d.contrast_clip(),
            d.alpha(),
            d.beta(),
        )
        .unwrap();
        assert_eq!(validated, d);
    }

    #[rstest]
    #[case::zero_gamma(0.0, 9, 75.0, 2.0, 1.2, "gamma")]
    #[case::nan_gamma(f64::NAN, 9, 75.0, 2.0, 1.2, "gamma")]
    #[case::zero_diameter(0.8, 0, 75.0, 2.0, 1.2, "bilateral_d")]
    #[case::negative_sigma(0.8, 9, -1.0, 2.0, 1.2, "bilateral_sigma_color")]
    #[case::zero_clip(0.8, 9, 75.0, 0.0, 1.2, "contrast_clip")]
    #[case::negative_alpha(0.8, 9, 75.0, 2.0, -0.5, "alpha")]
    fn test_invalid_values_rejected(
        #[case] gamma: f64,
        #[case] d: u32,
        #[case] sigma: f64,
        #[case] clip: f64,
        #[case] alpha: f64,
        #[case] field: &str,
    ) {
        let err = PreprocessParams::new(gamma, d, sigma, 75.0, clip, alpha, 10.0).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name, .. } if name == field));
    }

    #[test]
    fn test_negative_beta_is_allowed() {
        assert!(PreprocessParams::new(0.8, 9, 75.0, 75.0, 2.0, 1.2, -20.0).is_ok());
    }

    #[test]
    fn test_json_partial_overrides_keep_defaults() {
        let p: PreprocessParams = serde_json::from_str(r#"{"gamma": 1.5, "bilateral_d": 5}"#).unwrap();
        assert_relative_eq!(p.gamma(), 1.5);
        assert_eq!(p.bilateral_d(), 5);
        assert_relative_eq!(p.alpha(), 1.2);
    }

    #[test]
    fn test_json_is_validated() {
        let result: Result<PreprocessParams, _> = serde_json::from_str(r#"{"gamma": -1.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_rejects_unknown_keys() {
        let result: Result<PreprocessParams, _> = serde_json::from_str(r#"{"gama": 1.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_json_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("params.json");
        fs::write(&path, r#"{"contrast_clip": 3.0}"#).unwrap();
        let p = PreprocessParams::from_json_file(&path).unwrap();
        assert_relative_eq!(p.contrast_clip(), 3.0);
    }

    #[test]
    fn test_from_json_file_errors() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("absent.json");
        assert!(matches!(
            PreprocessParams::from_json_file(&missing),
            Err(ConfigError::Read { .. })
        ));

        let bad = tmp.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(
            PreprocessParams::from_json_file(&bad),
            Err(ConfigError::Parse { .. })
        ));
    }
}
