//! SMILES files and other delimited text, one molecule per line with the
//! SMILES in the first column.

use std::io::{Read, Write};

use log::trace;

use super::{MolReader, MolWriter, ReadOutcome, Record, ReaderOptions, WriterOptions};
use crate::{error::Error, mol::Molecule, schema::Value, Result};

pub struct DelimitedReader<R: Read> {
    inner: csv::Reader<R>,
    record: csv::StringRecord,
    id_column: Option<usize>,
    /// (column, name) for every pass-through column
    extras: Vec<(usize, String)>,
    names: Vec<String>,
}

impl<R: Read> DelimitedReader<R> {
    pub fn new(input: R, opts: &ReaderOptions) -> Result<Self> {
        let mut inner = csv::ReaderBuilder::new()
            .delimiter(opts.delimiter)
            .has_headers(opts.read_header)
            .flexible(true)
            .quoting(false)
            .from_reader(input);

        // without a header this is the first data row, which is not consumed.
        // a bad byte in it should not end the run before any record is read
        let first: Vec<String> = inner
            .byte_headers()?
            .iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect();
        let header = |i: usize| {
            if opts.read_header {
                first.get(i).cloned().unwrap_or_default()
            } else {
                format!("field{}", i + 1)
            }
        };

        let id_column = match opts.id_column.as_deref() {
            None => None,
            Some(s) => match s.parse::<usize>() {
                Ok(i) => Some(i),
                Err(_) if opts.read_header => Some(
                    first
                        .iter()
                        .position(|h| h == s)
                        .ok_or_else(|| Error::IdColumn(s.to_owned()))?,
                ),
                Err(_) => return Err(Error::IdColumn(s.to_owned())),
            },
        };

        let extras: Vec<_> = (1..first.len())
            .filter(|&i| Some(i) != id_column)
            .map(|i| (i, header(i)))
            .collect();
        let names = extras.iter().map(|(_, n)| n.clone()).collect();
        trace!("delimited input with extra fields {names:?}");

        Ok(Self {
            inner,
            record: csv::StringRecord::new(),
            id_column,
            extras,
            names,
        })
    }

    fn line(&self) -> u64 {
        self.record.position().map(|p| p.line()).unwrap_or(0)
    }
}

impl<R: Read> MolReader for DelimitedReader<R> {
    fn extra_field_names(&self) -> &[String] {
        &self.names
    }

    fn read(&mut self) -> Result<ReadOutcome> {
        match self.inner.read_record(&mut self.record) {
            Ok(true) => {}
            Ok(false) => return Ok(ReadOutcome::End),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Utf8 { .. }) => {
                return Ok(ReadOutcome::Skip(format!("{e}")));
            }
            Err(e) => return Err(e.into()),
        }

        let line = self.line();
        let smiles = self.record.get(0).unwrap_or_default().trim();
        if smiles.is_empty() {
            return Ok(ReadOutcome::Skip(format!("line {line}: no SMILES")));
        }
        let mol = match Molecule::from_smiles(smiles) {
            Ok(mol) => mol,
            Err(e) => {
                return Ok(ReadOutcome::Skip(format!(
                    "line {line}: failed to parse SMILES {smiles:?}: {e}"
                )))
            }
        };

        let id = match self.id_column {
            None => None,
            Some(c) => match self.record.get(c) {
                Some(id) => Some(id.trim().to_owned()),
                None => {
                    return Ok(ReadOutcome::Skip(format!(
                        "line {line}: no id in column {c}"
                    )))
                }
            },
        };

        let props = self
            .extras
            .iter()
            .map(|(i, name)| {
                let v = self.record.get(*i).unwrap_or_default();
                (name.clone(), v.to_owned())
            })
            .collect();

        Ok(ReadOutcome::Record(Record {
            mol,
            smiles: smiles.to_owned(),
            id,
            props,
            molblock: None,
        }))
    }
}

pub struct DelimitedWriter<W: Write> {
    inner: csv::Writer<W>,
    extra_field_names: Vec<String>,
    width: usize,
}

impl<W: Write> DelimitedWriter<W> {
    /// wrap `output` and write the header row
    pub fn new(output: W, opts: WriterOptions) -> Result<Self> {
        // fields are read without quoting, so they are written back verbatim
        let mut inner = csv::WriterBuilder::new()
            .delimiter(opts.delimiter)
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(output);
        let header: Vec<&str> = ["smiles", "id"]
            .into_iter()
            .chain(opts.extra_field_names.iter().map(String::as_str))
            .chain(opts.calc_prop_names.iter().map(String::as_str))
            .collect();
        inner.write_record(&header)?;
        Ok(Self {
            inner,
            width: header.len(),
            extra_field_names: opts.extra_field_names,
        })
    }
}

impl<W: Write> MolWriter for DelimitedWriter<W> {
    fn write(&mut self, record: &Record, values: &[Value]) -> Result<()> {
        let mut row = Vec::with_capacity(self.width);
        row.push(record.smiles.clone());
        row.push(record.id.clone().unwrap_or_default());
        for name in &self.extra_field_names {
            row.push(record.prop(name).unwrap_or_default().to_owned());
        }
        row.extend(values.iter().map(Value::to_string));
        self.inner.write_record(&row)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.inner
            .flush()
            .map_err(|e| Error::Csv(csv::Error::from(e)))
    }
}
