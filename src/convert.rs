use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::PoseCsvConfig;
use crate::error::{PoseCsvError, Result};
use crate::keyframe::Keyframe;
use crate::landmarks::{Block, PoseDimensions};
use crate::natural_sort::natural_sort_by;
use crate::table::VideoTable;

/// Turns one directory of keyframe files into a `VideoTable`.
#[derive(Debug, Clone)]
pub struct KeyframeConverter {
    dims: PoseDimensions,
    extension: String,
    keys: [(Block, String); 4],
}

impl KeyframeConverter {
    pub fn new(config: &PoseCsvConfig) -> Self {
        let keys = Block::ALL.map(|block| (block, config.keypoints.key_for(block)));
        Self {
            dims: config.keypoints.dimensions,
            extension: config.input.extension.trim_start_matches('.').to_string(),
            keys,
        }
    }

    pub fn dims(&self) -> PoseDimensions {
        self.dims
    }

    /// Keyframe files in `dir`, naturally sorted by file name
    pub fn list_keyframes(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir).map_err(|e| PoseCsvError::file_access(dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| PoseCsvError::file_access(dir, e))?.path();
            if path.is_file() && self.has_keyframe_extension(&path) {
                files.push(path);
            }
        }

        natural_sort_by(&mut files, |path| file_name(path))?;
        Ok(files)
    }

    fn has_keyframe_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }

    /// Convert every keyframe in `dir` into one row of a table named `name`.
    pub fn convert_dir(&self, dir: &Path, name: &str) -> Result<VideoTable> {
        let files = self.list_keyframes(dir)?;
        info!("Converting {} keyframe(s) from {}", files.len(), dir.display());

        let mut table = VideoTable::zeros(name, self.dims, files);
        for row in 0..table.n_rows() {
            let Some(path) = table.source(row).map(Path::to_path_buf) else {
                continue;
            };
            let keyframe = Keyframe::load(&path)?;
            self.fill_row(&mut table, row, &keyframe)?;
        }

        Ok(table)
    }

    /// Copy each non-empty block of `keyframe` into `row`.
    pub fn fill_row(&self, table: &mut VideoTable, row: usize, keyframe: &Keyframe) -> Result<()> {
        if keyframe.people.is_empty() {
            debug!("No people in {}", keyframe.path().display());
            return Ok(());
        }

        for (block, key) in &self.keys {
            if let Some(values) = keyframe.block(key)? {
                table.fill_block(row, *block, key, &values)?;
            }
        }
        Ok(())
    }
}

/// Final path component; bytes that are not UTF-8 become U+FFFD.
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
