use csv::WriterBuilder;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::error::{PoseCsvError, Result};
use crate::table::VideoTable;

/// Writes `VideoTable`s as delimited text with a four-row column header.
///
/// Layout:
/// ```text
/// Pose Set,Body,Body,...
/// Body Part,Head,Head,...
/// Point,Nose,Nose,...
/// Coordinate,x,y,...
/// 0,0.0,1.5,...
/// ```
/// Each header row starts with its level name; each data row starts with the
/// zero-based frame index.
#[derive(Debug, Clone)]
pub struct TableWriter {
    config: OutputConfig,
    delimiter: u8,
}

impl TableWriter {
    pub fn new(config: OutputConfig) -> Result<Self> {
        let delimiter = config.delimiter_byte()?;
        Ok(Self { config, delimiter })
    }

    /// Where the table for `video_name` goes under `destination`
    pub fn output_path(&self, destination: &Path, video_name: &str) -> PathBuf {
        destination.join(self.config.file_name(video_name))
    }

    /// Write `table` into `destination`, creating the directory if needed.
    pub fn write(&self, table: &VideoTable, destination: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(destination)
            .map_err(|e| PoseCsvError::file_access(destination, e))?;

        let path = self.output_path(destination, table.name());
        if path.exists() && !self.config.overwrite {
            return Err(PoseCsvError::OutputExists { path });
        }

        let file =
            std::fs::File::create(&path).map_err(|e| PoseCsvError::file_access(&path, e))?;
        self.write_to(table, std::io::BufWriter::new(file))?;

        info!(
            "Wrote {} frame(s) x {} column(s) to {}",
            table.n_rows(),
            table.n_cols(),
            path.display()
        );
        Ok(path)
    }

    /// Write `table` to any sink.
    pub fn write_to<W: Write>(&self, table: &VideoTable, sink: W) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .flexible(false)
            .from_writer(sink);

        for (level, labels) in table.header().levels() {
            writer.write_record(std::iter::once(level).chain(labels.iter().copied()))?;
        }

        let mut record = Vec::with_capacity(table.n_cols() + 1);
        for (index, row) in table.rows().enumerate() {
            record.clear();
            record.push(index.to_string());
            record.extend(
                row.iter()
                    .map(|value| format_value(*value, self.config.float_precision)),
            );
            writer.write_record(&record)?;
        }

        writer.flush()?;
        debug!("Flushed table '{}'", table.name());
        Ok(())
    }
}

/// Shortest round-trip form (`0.0`, `1.25`, `1e-05`), or fixed decimals when
/// a precision is given.
pub fn format_value(value: f64, precision: Option<usize>) -> String {
    match precision {
        Some(digits) => format!("{:.*}", digits, value),
        None => pad_exponent(format!("{:?}", value)),
    }
}

// Exponents always carry a sign and at least two digits: 1e-05, 1e+16.
fn pad_exponent(text: String) -> String {
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}
