use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{PoseCsvError, Result};

/// One per-frame estimator output file
#[derive(Debug, Clone, Deserialize)]
pub struct Keyframe {
    #[serde(skip)]
    path: PathBuf,
    /// Detected people; only the first one is converted. `null` reads as empty.
    #[serde(deserialize_with = "null_as_empty")]
    pub people: Vec<Map<String, Value>>,
}

fn null_as_empty<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<Map<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

impl Keyframe {
    /// Read and parse a keyframe file. A missing `people` key is a parse error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading keyframe {}", path.display());

        let data = std::fs::read(path).map_err(|e| PoseCsvError::file_access(path, e))?;
        Self::from_slice(path, &data)
    }

    /// Parse keyframe JSON; `path` is only used for error reporting.
    pub fn from_slice<P: Into<PathBuf>>(path: P, data: &[u8]) -> Result<Self> {
        let path = path.into();
        let mut keyframe: Keyframe =
            serde_json::from_slice(data).map_err(|source| PoseCsvError::KeyframeParse {
                path: path.clone(),
                source,
            })?;
        keyframe.path = path;
        Ok(keyframe)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Values of the first person's `key` array.
    ///
    /// `None` means "no detection": no people, or the key is absent, null or
    /// an empty array. Anything other than an array of numbers is an error.
    pub fn block(&self, key: &str) -> Result<Option<Vec<f64>>> {
        let Some(person) = self.people.first() else {
            return Ok(None);
        };

        let values = match person.get(key) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Array(values)) if values.is_empty() => return Ok(None),
            Some(Value::Array(values)) => values,
            Some(other) => {
                return Err(PoseCsvError::invalid_block(
                    &self.path,
                    key,
                    format!("expected an array, found {}", json_kind(other)),
                ))
            }
        };

        values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                value.as_f64().ok_or_else(|| {
                    PoseCsvError::invalid_block(
                        &self.path,
                        key,
                        format!("value {} is {}, not a number", i, json_kind(value)),
                    )
                })
            })
            .collect::<Result<Vec<f64>>>()
            .map(Some)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
