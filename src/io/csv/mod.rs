mod read;
mod write;

pub(crate) use read::read_table;
pub use write::{buildings_to_dataframe, write_buildings};
