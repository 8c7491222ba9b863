use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tempfile::NamedTempFile;

use crate::error::{AlignError, Result};

/// A label file held as raw strings, so columns we don't touch are written back verbatim.
#[derive(Debug, Clone)]
pub struct LabelTable {
    path: PathBuf,
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl LabelTable {
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(File::open(path)?);

        let headers = reader.headers()?.clone();
        let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
        log::debug!(
            "Read {} rows x {} columns from {}",
            rows.len(),
            headers.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    pub fn column(&self, column: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(|row| row.get(idx).unwrap_or("")).collect())
    }

    fn column_index(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| AlignError::ColumnNotFound {
                column: column.to_owned(),
                path: self.path.clone(),
            })
    }

    /// Overwrites `column` row by row. The table is left as is unless
    /// `values` has exactly one entry per row.
    pub fn replace_column(&mut self, column: &str, values: &[f64]) -> Result<()> {
        let idx = self.column_index(column)?;
        if self.rows.len() != values.len() {
            return Err(AlignError::RowCountMismatch {
                rows: self.rows.len(),
                frames: values.len(),
            });
        }

        for (row, value) in self.rows.iter_mut().zip(values) {
            let formatted = format_timestamp(*value);
            *row = row
                .iter()
                .enumerate()
                .map(|(i, field)| if i == idx { formatted.as_str() } else { field })
                .collect();
        }
        Ok(())
    }

    /// Writes the table to `path` through a temp file in the same directory,
    /// so readers never observe a half-written table.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = WriterBuilder::new()
                .terminator(Terminator::Any(b'\n'))
                .from_writer(temp.as_file_mut());
            writer.write_record(&self.headers)?;
            for row in &self.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        temp.as_file_mut().flush()?;
        if let Ok(metadata) = fs::metadata(path) {
            fs::set_permissions(temp.path(), metadata.permissions())?;
        }
        temp.persist(path).map_err(|e| AlignError::Io(e.error))?;
        Ok(())
    }
}

/// Shortest round-trip form, always with a fractional part (`0.0`, `0.067`).
pub fn format_timestamp(value: f64) -> String {
    let mut s = value.to_string();
    if value.is_finite() && !s.contains(['.', 'e', 'E']) {
        s.push_str(".0");
    }
    s
}

/// Replaces `column` in the label file at `path` with `values`.
/// Returns the number of rows written; on any error the file is untouched.
pub fn update_column(path: impl AsRef<Path>, column: &str, values: &[f64]) -> Result<usize> {
    let path = path.as_ref();
    let mut table = LabelTable::read(path)?;
    table.replace_column(column, values)?;
    table.write(path)?;
    log::info!(
        "Updated column '{column}' in {} ({} rows)",
        path.display(),
        table.row_count()
    );
    Ok(table.row_count())
}
