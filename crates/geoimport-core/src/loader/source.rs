// crates/geoimport-core/src/loader/source.rs
//! Line Source: lazy iteration over tab-delimited GeoNames records.

use super::common_io;
use crate::error::Result;
use crate::model::Fields;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// A named data file that can be read from the start any number of times.
#[derive(Debug, Clone)]
pub struct LineSource {
    name: String,
    path: PathBuf,
}

impl LineSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Opens a fresh pass over the file.
    pub fn records(&self) -> Result<Records<Box<dyn BufRead>>> {
        Ok(Records::new(common_io::open_stream(&self.path)?))
    }
}

/// Iterator over the records of one pass.
///
/// Holds a single line buffer; blank lines and `#` comments are dropped.
/// Invalid UTF-8 is replaced rather than rejected.
pub struct Records<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl<R: BufRead> Records<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(512),
            line_no: 0,
        }
    }

    /// Physical line number of the last record returned.
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for Records<R> {
    type Item = Result<Fields>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line_no += 1;

            let line = String::from_utf8_lossy(&self.buf);
            // Only the line ending is cut before splitting: a leading tab
            // is an empty first column, not padding.
            let line = line.trim_end_matches(['\r', '\n']);
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Some(Ok(Fields::from_line(line)));
        }
    }
}
