use std::path::{Path, PathBuf};

use crate::error::{PoseCsvError, Result};
use crate::landmarks::{Block, ColumnHeader, PoseDimensions};

/// Frame-by-landmark matrix for one video, with its four-level column label.
///
/// Rows are frames in natural filename order. Storage is row-major and
/// zero-initialized; blocks without a detection stay zero.
#[derive(Debug, Clone)]
pub struct VideoTable {
    name: String,
    dims: PoseDimensions,
    header: ColumnHeader,
    sources: Vec<PathBuf>,
    data: Vec<f64>,
}

impl VideoTable {
    /// Zeroed table with one row per source keyframe file
    pub fn zeros<S: Into<String>>(name: S, dims: PoseDimensions, sources: Vec<PathBuf>) -> Self {
        let data = vec![0.0; sources.len() * dims.columns()];
        Self {
            name: name.into(),
            dims,
            header: ColumnHeader::new(dims),
            sources,
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> PoseDimensions {
        self.dims
    }

    pub fn header(&self) -> &ColumnHeader {
        &self.header
    }

    pub fn n_rows(&self) -> usize {
        self.sources.len()
    }

    pub fn n_cols(&self) -> usize {
        self.dims.columns()
    }

    /// Keyframe file each row was read from
    pub fn source(&self, row: usize) -> Option<&Path> {
        self.sources.get(row).map(PathBuf::as_path)
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        let cols = self.n_cols();
        self.data.get(row * cols..(row + 1) * cols)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.n_cols())
    }

    /// Copy `values` into the columns reserved for `block` in `row`.
    /// The value count must match the block's range exactly.
    pub fn fill_block(&mut self, row: usize, block: Block, key: &str, values: &[f64]) -> Result<()> {
        let range = block.column_range(self.dims);
        let source = self
            .sources
            .get(row)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(&self.name));

        if values.len() != range.len() {
            return Err(PoseCsvError::BlockLength {
                path: source,
                key: key.to_string(),
                expected: range.len(),
                actual: values.len(),
            });
        }

        let offset = row * self.n_cols();
        match self
            .data
            .get_mut(offset + range.start..offset + range.end)
        {
            Some(slice) => {
                slice.copy_from_slice(values);
                Ok(())
            }
            None => Err(PoseCsvError::invalid_block(
                source,
                key,
                format!("row {} is outside a table of {} rows", row, self.n_rows()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("f{i}.json"))).collect()
    }

    #[test]
    fn test_zeros_shape() {
        let table = VideoTable::zeros("clip", PoseDimensions::ThreeD, sources(3));
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_cols(), 552);
        assert_eq!(table.rows().count(), 3);
        assert!(table.rows().all(|row| row.iter().all(|v| *v == 0.0)));
        assert_eq!(table.header().len(), table.n_cols());
        assert_eq!(table.source(2), Some(Path::new("f2.json")));
    }

    #[test]
    fn test_fill_block_writes_only_its_range() {
        let mut table = VideoTable::zeros("clip", PoseDimensions::ThreeD, sources(2));
        let values: Vec<f64> = (1..=84).map(f64::from).collect();
        table
            .fill_block(1, Block::LeftHand, "hand_left_keypoints_3d", &values)
            .unwrap();

        let row = table.row(1).unwrap();
        assert_eq!(&row[104..188], values.as_slice());
        assert!(row[..104].iter().all(|v| *v == 0.0));
        assert!(row[188..].iter().all(|v| *v == 0.0));
        assert!(table.row(0).unwrap().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_fill_block_rejects_wrong_length() {
        let mut table = VideoTable::zeros("clip", PoseDimensions::TwoD, sources(1));
        let err = table
            .fill_block(0, Block::Body, "pose_keypoints_2d", &[0.5; 100])
            .unwrap_err();

        match err {
            PoseCsvError::BlockLength {
                path,
                expected,
                actual,
                ..
            } => {
                assert_eq!(path, PathBuf::from("f0.json"));
                assert_eq!(expected, 75);
                assert_eq!(actual, 100);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fill_block_rejects_missing_row() {
        let mut table = VideoTable::zeros("clip", PoseDimensions::ThreeD, sources(1));
        assert!(table
            .fill_block(5, Block::Body, "pose_keypoints_3d", &[0.0; 100])
            .is_err());
    }

    #[test]
    fn test_empty_table() {
        let table = VideoTable::zeros("empty", PoseDimensions::ThreeD, Vec::new());
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.rows().count(), 0);
        assert!(table.row(0).is_none());
    }
}
