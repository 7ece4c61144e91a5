//! SD files: V2000 molblocks followed by `> <name>` data items, with each
//! record terminated by `$$$$`.

use std::{
    fs::File,
    io::{self, BufRead, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::trace;

use super::{MolReader, MolWriter, ReadOutcome, Record, WriterOptions};
use crate::{error::Error, mol::Molecule, schema::Value, Result};

const TERMINATOR: &str = "$$$$";

/// The pieces of one raw SDF record
#[derive(Debug, PartialEq)]
struct RawRecord {
    molblock: String,
    title: String,
    props: Vec<(String, String)>,
}

fn is_terminator(line: &[u8]) -> bool {
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    &line[..end] == TERMINATOR.as_bytes()
}

/// read the raw bytes of the next record from `input`, without its
/// terminator. records are split before any UTF-8 decoding, so a bad byte
/// spoils only its own record. returns None once only whitespace is left
fn next_record(input: &mut impl BufRead) -> io::Result<Option<Vec<u8>>> {
    let mut text = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if is_terminator(&line) {
            return Ok(Some(text));
        }
        text.extend_from_slice(&line);
    }
    if text.iter().all(u8::is_ascii_whitespace) {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

/// the name in a data header line like `>  <MW>  (1)`
fn data_name(line: &str) -> Option<&str> {
    let start = line.find('<')? + 1;
    let len = line[start..].find('>')?;
    Some(&line[start..start + len])
}

fn split_record(text: &str) -> RawRecord {
    let title = text.lines().next().unwrap_or_default().trim().to_owned();
    let (molblock, data) = match text.find("M  END") {
        Some(i) => {
            let end = text[i..].find('\n').map(|n| i + n + 1).unwrap_or(text.len());
            (&text[..end], &text[end..])
        }
        None => (text, ""),
    };

    let mut props = Vec::new();
    let mut lines = data.lines();
    while let Some(line) = lines.next() {
        let Some(name) = line.starts_with('>').then(|| data_name(line)).flatten()
        else {
            continue;
        };
        let value: Vec<&str> =
            lines.by_ref().take_while(|l| !l.trim().is_empty()).collect();
        props.push((name.to_owned(), value.join("\n")));
    }

    let mut molblock = molblock.to_owned();
    if !molblock.ends_with('\n') {
        molblock.push('\n');
    }
    RawRecord {
        molblock,
        title,
        props,
    }
}

/// the data item names found in the first `max_records` records of `input`,
/// in the order they were first seen, excluding `id_field`
pub fn scan_field_names(
    mut input: impl BufRead,
    max_records: usize,
    id_field: Option<&str>,
) -> io::Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for i in 0..max_records {
        let Some(bytes) = next_record(&mut input)? else {
            break;
        };
        let Ok(text) = String::from_utf8(bytes) else {
            trace!("record {} is not valid UTF-8, not scanning it", i + 1);
            continue;
        };
        for (name, _) in split_record(&text).props {
            if Some(name.as_str()) != id_field && !names.contains(&name) {
                names.push(name);
            }
        }
    }
    trace!("found SDF fields {names:?}");
    Ok(names)
}

pub struct SdfReader<R: BufRead> {
    input: R,
    names: Vec<String>,
    id_field: Option<String>,
    count: usize,
}

impl<R: BufRead> SdfReader<R> {
    /// wrap `input`, reporting `names` as the extra fields. the id is taken
    /// from the data item `id_field` if given, otherwise the title line
    pub fn new(input: R, names: Vec<String>, id_field: Option<String>) -> Self {
        Self {
            input,
            names,
            id_field,
            count: 0,
        }
    }
}

impl<R: BufRead> MolReader for SdfReader<R> {
    fn extra_field_names(&self) -> &[String] {
        &self.names
    }

    fn read(&mut self) -> Result<ReadOutcome> {
        let bytes = match next_record(&mut self.input) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(ReadOutcome::End),
            Err(e) => return Err(Error::io("SDF input", e)),
        };
        self.count += 1;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                return Ok(ReadOutcome::Skip(format!(
                    "record {}: {e}",
                    self.count
                )))
            }
        };

        let raw = split_record(&text);
        let mol = match Molecule::from_molblock(&raw.molblock) {
            Ok(mol) => mol,
            Err(e) => {
                return Ok(ReadOutcome::Skip(format!(
                    "record {}: failed to read molblock: {e}",
                    self.count
                )))
            }
        };

        let id = match &self.id_field {
            Some(field) => raw
                .props
                .iter()
                .find(|(k, _)| k == field)
                .map(|(_, v)| v.clone()),
            None => Some(raw.title).filter(|t| !t.is_empty()),
        };

        Ok(ReadOutcome::Record(Record {
            smiles: mol.to_smiles(),
            mol,
            id,
            props: raw.props,
            molblock: Some(raw.molblock),
        }))
    }
}

pub struct SdfWriter<W: Write> {
    output: BufWriter<W>,
    path: PathBuf,
    calc_prop_names: Vec<String>,
}

impl SdfWriter<File> {
    pub fn new(file: File, path: &Path, opts: WriterOptions) -> Self {
        Self::from_writer(file, path, opts)
    }
}

impl<W: Write> SdfWriter<W> {
    /// `path` is only used to label errors
    pub fn from_writer(output: W, path: &Path, opts: WriterOptions) -> Self {
        Self {
            output: BufWriter::new(output),
            path: path.to_owned(),
            calc_prop_names: opts.calc_prop_names,
        }
    }

    fn write_record(
        &mut self,
        molblock: &str,
        record: &Record,
        values: &[Value],
    ) -> io::Result<()> {
        self.output.write_all(molblock.as_bytes())?;
        for (name, value) in &record.props {
            writeln!(self.output, "> <{name}>\n{value}\n")?;
        }
        for (name, value) in self.calc_prop_names.iter().zip(values) {
            writeln!(self.output, "> <{name}>\n{value}\n")?;
        }
        writeln!(self.output, "{TERMINATOR}")
    }
}

impl<W: Write> MolWriter for SdfWriter<W> {
    /// records read from SMILES get a generated molblock. one that cannot
    /// be generated fails with [Error::Molfile] before anything is written
    fn write(&mut self, record: &Record, values: &[Value]) -> Result<()> {
        let generated;
        let molblock = match &record.molblock {
            Some(block) => block.as_str(),
            None => {
                let title = record.id.as_deref().unwrap_or_default();
                generated = record.mol.to_molblock(title)?;
                generated.as_str()
            }
        };
        self.write_record(molblock, record, values)
            .map_err(|e| Error::io(&self.path, e))
    }

    fn finish(&mut self) -> Result<()> {
        self.output.flush().map_err(|e| Error::io(&self.path, e))
    }
}
