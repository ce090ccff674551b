use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::ConfigError;

/// Charge-injection handling requested for a log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CiMode {
    /// No charge injection took place during the log.
    #[default]
    None,
    /// One injection run spanning the whole log.
    Single,
    /// Multiple injection runs delimited by begin/end marker lines.
    Multi,
}

/// How live time is reconstructed from event hit timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateStyle {
    /// Live time is not reconstructed.
    #[default]
    None,
    /// Consecutive deltas between all hits of an event.
    SinglePacket,
    /// One delta spanning the first to the last hit of an event.
    Packed,
}

/// Decoding controls for a single downlink log. Serializable to YAML using
/// serde and serde_yaml as part of [`Config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Input lines hold fixed hex frame slots instead of decimal tokens.
    pub hex_input: bool,
    pub ci_mode: CiMode,
    /// Parse I-V scan point lines alongside frames.
    pub iv_scan: bool,
    /// Inclusive 1-based selection of injection runs to keep.
    pub run_range: Option<(u32, u32)>,
    pub rate_style: RateStyle,
    /// Log was produced by the 6th-revision firmware.
    pub new_programme: bool,
    /// Drop samples with a timestamp at or below this many seconds; negative keeps all.
    pub time_cut: f64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            hex_input: false,
            ci_mode: CiMode::None,
            iv_scan: false,
            run_range: None,
            rate_style: RateStyle::None,
            new_programme: false,
            time_cut: -1.0,
        }
    }
}

impl DecodeOptions {
    /// Check the options for combinations that can never decode anything
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((first, last)) = self.run_range {
            if first < 1 || first > last {
                return Err(ConfigError::BadRunRange(first, last));
            }
        }
        Ok(())
    }

    /// Resolve option interactions. Hexprint captures carry frame slots only,
    /// so marker and scan line handling is switched off for them.
    pub fn normalized(&self) -> Self {
        let mut options = self.clone();
        if options.hex_input {
            options.ci_mode = CiMode::None;
            options.iv_scan = false;
        }
        options
    }
}

/// Structure representing the application configuration. Contains the log
/// files to decode and the options applied to each of them.
/// Configs are serializable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub log_files: Vec<PathBuf>,
    pub options: DecodeOptions,
}

impl Default for Config {
    /// Generate a new Config object. All fields will be empty/invalid
    fn default() -> Self {
        Self {
            log_files: Vec::new(),
            options: DecodeOptions::default(),
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }
}
