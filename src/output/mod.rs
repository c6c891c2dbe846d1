mod writer;

pub use writer::{format_value, TableWriter};
