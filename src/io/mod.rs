//! Streaming molecule records in and out of files.
//!
//! ```text
//!  .smi / .txt / .csv ──┐                     ┌── delimited text
//!                       ├─ MolReader ─ run ─ MolWriter ─┤
//!  .sdf ────────────────┘                     └── .sdf
//! ```
//!
//! Readers hand out one [ReadOutcome] at a time so a bad record can be
//! skipped without ending the stream. Writers are created only once the
//! calculated field names are known.

use std::{fs::File, io::BufReader, path::Path};

use crate::{error::Error, mol::Molecule, schema::Value, Result};

pub mod delimited;
pub mod sdf;

pub use delimited::{DelimitedReader, DelimitedWriter};
pub use sdf::{SdfReader, SdfWriter};

/// One molecule read from the input, with everything that is carried through
/// to the output
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub mol: Molecule,
    pub smiles: String,
    pub id: Option<String>,
    /// pass-through fields, in input order
    pub props: Vec<(String, String)>,
    /// the original connection table, for records read from SDF
    pub molblock: Option<String>,
}

impl Record {
    pub fn prop(&self, name: &str) -> Option<&str> {
        self.props
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ReadOutcome {
    Record(Record),
    /// a record that could not be used, and why
    Skip(String),
    End,
}

pub trait MolReader {
    /// the names of the pass-through fields this reader found
    fn extra_field_names(&self) -> &[String];

    /// read the next record. only I/O failures are errors; malformed
    /// records come back as [ReadOutcome::Skip]
    fn read(&mut self) -> Result<ReadOutcome>;
}

pub trait MolWriter {
    /// write one row: the record's identity and extra fields, then `values`
    fn write(&mut self, record: &Record, values: &[Value]) -> Result<()>;

    /// flush everything written so far to the underlying file
    fn finish(&mut self) -> Result<()>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReaderOptions {
    pub delimiter: u8,
    pub read_header: bool,
    /// zero-based column index or header name for delimited text, data item
    /// name for SDF
    pub id_column: Option<String>,
    /// the number of leading SDF records scanned for field names
    pub sdf_read_records: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            read_header: false,
            id_column: None,
            sdf_read_records: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WriterOptions {
    pub extra_field_names: Vec<String>,
    pub calc_prop_names: Vec<String>,
    pub delimiter: u8,
}

pub fn is_sdf(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("sdf"))
}

/// parse a delimiter argument. accepts the names tab, comma, space, and pipe
/// or any single byte, defaulting to tab
pub fn parse_delimiter(s: Option<&str>) -> Result<u8> {
    match s {
        None | Some("tab") | Some("\\t") => Ok(b'\t'),
        Some("comma") => Ok(b','),
        Some("space") => Ok(b' '),
        Some("pipe") => Ok(b'|'),
        Some(s) if s.len() == 1 => Ok(s.as_bytes()[0]),
        Some(s) => Err(Error::Delimiter(s.to_owned())),
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| Error::io(path, e))
}

/// open a reader for `path`, choosing the format from its extension
pub fn create_reader(
    path: impl AsRef<Path>,
    opts: &ReaderOptions,
) -> Result<Box<dyn MolReader>> {
    let path = path.as_ref();
    if is_sdf(path) {
        let names = sdf::scan_field_names(
            BufReader::new(open(path)?),
            opts.sdf_read_records,
            opts.id_column.as_deref(),
        )
        .map_err(|e| Error::io(path, e))?;
        Ok(Box::new(SdfReader::new(
            BufReader::new(open(path)?),
            names,
            opts.id_column.clone(),
        )))
    } else {
        Ok(Box::new(DelimitedReader::new(open(path)?, opts)?))
    }
}

/// create a writer for `path`, choosing the format from its extension
pub fn create_writer(
    path: impl AsRef<Path>,
    opts: WriterOptions,
) -> Result<Box<dyn MolWriter>> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    if is_sdf(path) {
        Ok(Box::new(SdfWriter::new(file, path, opts)))
    } else {
        Ok(Box::new(DelimitedWriter::new(file, opts)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiters() {
        assert_eq!(parse_delimiter(None).unwrap(), b'\t');
        assert_eq!(parse_delimiter(Some("comma")).unwrap(), b',');
        assert_eq!(parse_delimiter(Some(";")).unwrap(), b';');
        assert!(matches!(
            parse_delimiter(Some("::")),
            Err(Error::Delimiter(_))
        ));
    }

    #[test]
    fn formats() {
        assert!(is_sdf("a/b/mols.sdf"));
        assert!(is_sdf("MOLS.SDF"));
        assert!(!is_sdf("mols.smi"));
        assert!(!is_sdf("sdf"));
    }
}
