use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::PoseCsvConfig;
use crate::convert::{file_name, KeyframeConverter};
use crate::error::{PoseCsvError, Result};
use crate::natural_sort::natural_sort_by;
use crate::output::TableWriter;

/// Outcome for one video directory
#[derive(Debug, Clone, PartialEq)]
pub struct VideoReport {
    pub name: String,
    pub source_dir: PathBuf,
    pub frame_count: usize,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub videos: Vec<VideoReport>,
}

impl BatchSummary {
    pub fn total_frames(&self) -> usize {
        self.videos.iter().map(|v| v.frame_count).sum()
    }
}

/// Sequentially converts every video directory under a source root.
pub struct BatchConverter {
    converter: KeyframeConverter,
    writer: TableWriter,
}

impl BatchConverter {
    pub fn new(config: &PoseCsvConfig) -> Result<Self> {
        Ok(Self {
            converter: KeyframeConverter::new(config),
            writer: TableWriter::new(config.output.clone())?,
        })
    }

    /// Video directories directly under `source`, naturally sorted.
    /// Plain files in `source` are ignored.
    pub fn discover(&self, source: &Path) -> Result<Vec<PathBuf>> {
        if !source.is_dir() {
            return Err(PoseCsvError::NotADirectory {
                path: source.to_path_buf(),
            });
        }

        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(source).map_err(|e| PoseCsvError::file_access(source, e))? {
            let path = entry.map_err(|e| PoseCsvError::file_access(source, e))?.path();
            if path.is_dir() {
                dirs.push(path);
            } else {
                debug!("Skipping non-directory {}", path.display());
            }
        }

        natural_sort_by(&mut dirs, |path| file_name(path))?;
        info!("Found {} video directories in {}", dirs.len(), source.display());
        Ok(dirs)
    }

    /// Convert and write every video. The first failure aborts the run.
    pub fn run(&self, source: &Path, destination: &Path) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        let mut claimed = HashSet::new();

        for dir in self.discover(source)? {
            let name = file_name(&dir);
            self.claim_output(&mut claimed, destination, &name, &dir)?;
            info!("Processing video '{}'", name);

            let table = self.converter.convert_dir(&dir, &name)?;
            let output_path = self.writer.write(&table, destination)?;

            summary.videos.push(VideoReport {
                name,
                source_dir: dir,
                frame_count: table.n_rows(),
                output_path,
            });
        }

        info!(
            "Converted {} video(s), {} frame(s) total",
            summary.videos.len(),
            summary.total_frames()
        );
        Ok(summary)
    }

    /// What `run` would produce, without reading keyframes or writing files.
    pub fn plan(&self, source: &Path, destination: &Path) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        let mut claimed = HashSet::new();

        for dir in self.discover(source)? {
            let name = file_name(&dir);
            self.claim_output(&mut claimed, destination, &name, &dir)?;
            let frame_count = self.converter.list_keyframes(&dir)?.len();
            let output_path = self.writer.output_path(destination, &name);

            summary.videos.push(VideoReport {
                name,
                source_dir: dir,
                frame_count,
                output_path,
            });
        }

        Ok(summary)
    }

    // Directory names that differ only in non-UTF-8 bytes share an output path.
    fn claim_output(
        &self,
        claimed: &mut HashSet<PathBuf>,
        destination: &Path,
        name: &str,
        dir: &Path,
    ) -> Result<()> {
        let path = self.writer.output_path(destination, name);
        if claimed.insert(path.clone()) {
            Ok(())
        } else {
            Err(PoseCsvError::OutputCollision {
                path,
                source_dir: dir.to_path_buf(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_video(root: &Path, name: &str, frames: usize) -> PathBuf {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        for i in 0..frames {
            let body: Vec<f64> = vec![i as f64; 100];
            let keyframe = json!({ "people": [{ "pose_keypoints_3d": body }] });
            std::fs::write(
                dir.join(format!("{name}_{i}_keypoints.json")),
                serde_json::to_vec(&keyframe).unwrap(),
            )
            .unwrap();
        }
        dir
    }

    fn count_rows(path: &Path) -> usize {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap()
            .records()
            .count()
    }

    #[test]
    fn test_two_videos_produce_two_files() {
        let source = TempDir::new().unwrap();
        let destination = TempDir::new().unwrap();
        write_video(source.path(), "video_10", 2);
        write_video(source.path(), "video_2", 3);
        std::fs::write(source.path().join("readme.txt"), "not a video").unwrap();

        let batch = BatchConverter::new(&PoseCsvConfig::default()).unwrap();
        let summary = batch.run(source.path(), destination.path()).unwrap();

        let names: Vec<&str> = summary.videos.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["video_2", "video_10"]);
        assert_eq!(summary.total_frames(), 5);

        let first = destination.path().join("video_2.csv");
        let second = destination.path().join("video_10.csv");
        assert_eq!(summary.videos[0].output_path, first);
        assert_eq!(count_rows(&first), 4 + 3);
        assert_eq!(count_rows(&second), 4 + 2);
    }

    #[test]
    fn test_plan_writes_nothing() {
        let source = TempDir::new().unwrap();
        let destination = TempDir::new().unwrap();
        write_video(source.path(), "clip", 4);

        let batch = BatchConverter::new(&PoseCsvConfig::default()).unwrap();
        let summary = batch.plan(source.path(), destination.path()).unwrap();

        assert_eq!(summary.videos.len(), 1);
        assert_eq!(summary.videos[0].frame_count, 4);
        assert!(!summary.videos[0].output_path.exists());
        assert_eq!(std::fs::read_dir(destination.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failure_aborts_remaining_videos() {
        let source = TempDir::new().unwrap();
        let destination = TempDir::new().unwrap();
        let broken = write_video(source.path(), "a_1", 1);
        std::fs::write(broken.join("a_1_9_keypoints.json"), "[]").unwrap();
        write_video(source.path(), "a_2", 1);

        let batch = BatchConverter::new(&PoseCsvConfig::default()).unwrap();
        let err = batch.run(source.path(), destination.path()).unwrap_err();

        assert!(matches!(err, PoseCsvError::KeyframeParse { .. }));
        assert!(!destination.path().join("a_2.csv").exists());
    }

    #[cfg(unix)]
    fn create_raw_dir(root: &Path, name: &[u8]) -> PathBuf {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = root.join(OsStr::from_bytes(name));
        std::fs::create_dir(&dir).unwrap();
        let keyframe = json!({ "people": [] });
        std::fs::write(dir.join("0.json"), serde_json::to_vec(&keyframe).unwrap()).unwrap();
        dir
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_video_names_keep_separate_outputs() {
        let source = TempDir::new().unwrap();
        let destination = TempDir::new().unwrap();
        create_raw_dir(source.path(), b"vid\xff1");
        create_raw_dir(source.path(), b"vid\xfe2");

        let batch = BatchConverter::new(&PoseCsvConfig::default()).unwrap();
        let summary = batch.run(source.path(), destination.path()).unwrap();

        let names: Vec<&str> = summary.videos.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["vid\u{FFFD}1", "vid\u{FFFD}2"]);
        assert_eq!(std::fs::read_dir(destination.path()).unwrap().count(), 2);
        assert_ne!(summary.videos[0].output_path, summary.videos[1].output_path);
    }

    #[cfg(unix)]
    #[test]
    fn test_colliding_output_names_are_rejected() {
        let source = TempDir::new().unwrap();
        let destination = TempDir::new().unwrap();
        create_raw_dir(source.path(), b"vid\xff1");
        create_raw_dir(source.path(), b"vid\xfe1");

        let batch = BatchConverter::new(&PoseCsvConfig::default()).unwrap();
        assert!(matches!(
            batch.plan(source.path(), destination.path()),
            Err(PoseCsvError::OutputCollision { .. })
        ));
        assert!(matches!(
            batch.run(source.path(), destination.path()),
            Err(PoseCsvError::OutputCollision { .. })
        ));
        assert_eq!(std::fs::read_dir(destination.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_source_must_be_a_directory() {
        let source = TempDir::new().unwrap();
        let file = source.path().join("file.json");
        std::fs::write(&file, "{}").unwrap();

        let batch = BatchConverter::new(&PoseCsvConfig::default()).unwrap();
        assert!(matches!(
            batch.discover(&file),
            Err(PoseCsvError::NotADirectory { .. })
        ));
        assert!(matches!(
            batch.discover(&source.path().join("missing")),
            Err(PoseCsvError::NotADirectory { .. })
        ));
    }
}
