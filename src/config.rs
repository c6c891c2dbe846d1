use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::landmarks::{Block, PoseDimensions};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PoseCsvConfig {
    pub input: InputConfig,
    pub keypoints: KeypointConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InputConfig {
    /// Extension of keyframe files inside each video directory
    #[serde(default = "default_input_extension")]
    pub extension: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct KeypointConfig {
    /// Which estimator output to read, "2d" or "3d"
    #[serde(default)]
    pub dimensions: PoseDimensions,

    /// Override for the body block key (default pose_keypoints_{2d,3d})
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_key: Option<String>,

    /// Override for the left hand block key (default hand_left_keypoints_{2d,3d})
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_hand_key: Option<String>,

    /// Override for the right hand block key (default hand_right_keypoints_{2d,3d})
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_hand_key: Option<String>,

    /// Override for the face block key (default face_keypoints_{2d,3d})
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OutputConfig {
    /// Prepended to the video directory name when naming output files
    #[serde(default)]
    pub prefix: String,

    /// Output file extension
    #[serde(default = "default_output_extension")]
    pub extension: String,

    /// Single-character field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Fixed number of decimals; shortest round-trip form when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub float_precision: Option<usize>,

    /// Replace existing output files instead of failing
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
}

impl PoseCsvConfig {
    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("input.extension", default_input_extension())?
            .set_default("keypoints.dimensions", PoseDimensions::default().as_str())?
            .set_default("output.prefix", "")?
            .set_default("output.extension", default_output_extension())?
            .set_default("output.delimiter", default_delimiter())?
            .set_default("output.overwrite", default_overwrite())?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables with POSE_CSV_ prefix, e.g. POSE_CSV_OUTPUT__DELIMITER
            .add_source(
                Environment::with_prefix("POSE_CSV")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: PoseCsvConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::Message(
                "Input extension must not be empty".to_string(),
            ));
        }

        if self.output.extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::Message(
                "Output extension must not be empty".to_string(),
            ));
        }

        self.output.delimiter_byte()?;

        for block in Block::ALL {
            if let Some(key) = self.keypoints.override_for(block) {
                if key.trim().is_empty() {
                    return Err(ConfigError::Message(format!(
                        "Key override for {} must not be empty",
                        block.pose_set()
                    )));
                }
            }
        }

        Ok(())
    }
}

impl KeypointConfig {
    fn override_for(&self, block: Block) -> Option<&str> {
        match block {
            Block::Body => self.body_key.as_deref(),
            Block::LeftHand => self.left_hand_key.as_deref(),
            Block::RightHand => self.right_hand_key.as_deref(),
            Block::Face => self.face_key.as_deref(),
        }
    }

    /// JSON key holding `block` in each keyframe's first person entry
    pub fn key_for(&self, block: Block) -> String {
        match self.override_for(block) {
            Some(key) => key.to_string(),
            None => block.default_key(self.dimensions),
        }
    }
}

impl OutputConfig {
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        let bytes = self.delimiter.as_bytes();
        match bytes {
            [b] if b.is_ascii() && !matches!(b, b'"' | b'\n' | b'\r') => Ok(*b),
            _ => Err(ConfigError::Message(format!(
                "Delimiter must be a single ASCII character other than a quote or newline, got {:?}",
                self.delimiter
            ))),
        }
    }

    /// `{prefix}{video_name}.{extension}`
    pub fn file_name(&self, video_name: &str) -> String {
        format!(
            "{}{}.{}",
            self.prefix,
            video_name,
            self.extension.trim_start_matches('.')
        )
    }
}

impl Default for PoseCsvConfig {
    fn default() -> Self {
        Self {
            input: InputConfig {
                extension: default_input_extension(),
            },
            keypoints: KeypointConfig {
                dimensions: PoseDimensions::default(),
                body_key: None,
                left_hand_key: None,
                right_hand_key: None,
                face_key: None,
            },
            output: OutputConfig {
                prefix: String::new(),
                extension: default_output_extension(),
                delimiter: default_delimiter(),
                float_precision: None,
                overwrite: default_overwrite(),
            },
        }
    }
}

// Default value functions
fn default_input_extension() -> String {
    "json".to_string()
}

fn default_output_extension() -> String {
    "csv".to_string()
}
fn default_delimiter() -> String {
    ",".to_string()
}
fn default_overwrite() -> bool {
    true
}
