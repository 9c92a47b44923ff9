//! CSV reading operations.

use std::{fs::File, path::Path, sync::Arc};

use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, DataType, Field, Schema}};

use crate::error::{Error, Result};

/// Reads a CSV file into a DataFrame, forcing `key_column` to be read as strings so geo ids
/// keep their leading zeros.
pub(crate) fn read_table(path: &Path, key_column: &str) -> Result<DataFrame> {
    let file = File::open(path)?;
    let schema = Arc::new(Schema::from_iter([Field::new(key_column.into(), DataType::String)]));

    CsvReadOptions::default()
        .with_has_header(true)
        .with_schema_overwrite(Some(schema))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| Error::external(path.display().to_string(), format!("[io::csv::read] {e}")))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn key_column_keeps_leading_zeros() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "GEOID,B01003_001E\n01001020100,1900\n01001020200,2100").unwrap();

        let df = read_table(file.path(), "GEOID").unwrap();
        assert_eq!(df.height(), 2);
        let ids: Vec<_> = df.column("GEOID").unwrap().str().unwrap().into_no_null_iter().collect();
        assert_eq!(ids, ["01001020100", "01001020200"]);
        assert_eq!(df.column("B01003_001E").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn missing_file_is_external() {
        let err = read_table(Path::new("/nonexistent/table.csv"), "GEOID").unwrap_err();
        assert!(err.is_external());
    }
}
