pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod keyframe;
pub mod landmarks;
pub mod natural_sort;
pub mod output;
pub mod table;

pub use batch::{BatchConverter, BatchSummary, VideoReport};
pub use config::PoseCsvConfig;
pub use convert::KeyframeConverter;
pub use error::{PoseCsvError, Result};
pub use keyframe::Keyframe;
pub use landmarks::{expand_names, Block, ColumnHeader, PoseDimensions, N_POINTS};
pub use natural_sort::{natural_sort, natural_sort_by, NaturalKey};
pub use output::TableWriter;
pub use table::VideoTable;
