//! The batch run: load a model, stream molecules through it, and write one
//! output row per molecule that could be read.

use std::path::{Path, PathBuf};

use log::{debug, trace, warn};

use crate::{
    error::Error,
    events::{emit_cost, emit_event},
    io::{
        create_reader, create_writer, MolWriter, ReadOutcome, ReaderOptions,
        Record, WriterOptions,
    },
    model::{
        meta::{display_name, load_title, meta_path},
        model_path, Model, Prediction,
    },
    schema::{ModelKind, Schema},
    Result,
};

/// permissions of the finished output file: rw-rw-r--
pub const OUTPUT_MODE: u32 = 0o664;

#[derive(Clone, Debug, PartialEq)]
pub struct RunOptions {
    pub model_id: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub model_dir: PathBuf,
    pub reader: ReaderOptions,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// no model file exists for the requested ID, so nothing was read or
    /// written
    ModelNotFound,
    Finished {
        /// rows written to the output
        written: usize,
        /// records read from the input, including skipped ones
        scanned: usize,
    },
}

/// An output writer together with the columns it was created for
struct OpenWriter {
    writer: Box<dyn MolWriter>,
    schema: Schema,
}

impl OpenWriter {
    fn write(&mut self, record: &Record, prediction: &Prediction) -> Result<()> {
        let values = self.schema.values(prediction)?;
        self.writer.write(record, &values)
    }
}

/// The output is created only once the first prediction is in hand, so its
/// header reflects the model that produced it. Until then only the pieces
/// needed to create it are held
enum WriterState {
    Pending { extra_field_names: Vec<String> },
    Open(OpenWriter),
}

pub fn run(opts: &RunOptions) -> Result<Outcome> {
    let model = match Model::load(model_path(&opts.model_dir, &opts.model_id))
    {
        Ok(model) => model,
        Err(e) if e.is_not_found() => {
            emit_event(format!("Model {} not found!", opts.model_id));
            return Ok(Outcome::ModelNotFound);
        }
        Err(e) => return Err(e),
    };

    let title = load_title(meta_path(&opts.model_dir, &opts.model_id));
    let name = display_name(&title);

    trace!("opening reader for {}", opts.input.display());
    let mut reader = create_reader(&opts.input, &opts.reader)?;
    let mut state = WriterState::Pending {
        extra_field_names: reader.extra_field_names().to_vec(),
    };

    let mut written = 0;
    let mut scanned = 0;
    loop {
        let record = match reader.read()? {
            ReadOutcome::End => break,
            ReadOutcome::Skip(reason) => {
                scanned += 1;
                emit_event(reason);
                continue;
            }
            ReadOutcome::Record(record) => {
                scanned += 1;
                record
            }
        };

        let prediction = model.predict(&record.mol);
        trace!("{}: {prediction:?}", record.smiles);

        if let WriterState::Pending { extra_field_names } = &mut state {
            let schema = Schema::new(model.kind(), &name);
            let writer = create_writer(
                &opts.output,
                WriterOptions {
                    extra_field_names: std::mem::take(extra_field_names),
                    calc_prop_names: schema.field_names().to_vec(),
                    delimiter: opts.reader.delimiter,
                },
            )?;
            emit_event(format!(
                "Model title: {title}, property name {name}, type: {}",
                ModelKind::of(&prediction).label()
            ));
            state = WriterState::Open(OpenWriter { writer, schema });
        }

        if let WriterState::Open(open) = &mut state {
            match open.write(&record, &prediction) {
                Ok(()) => written += 1,
                // nothing was written for it, so it is skipped like a bad
                // input record
                Err(Error::Molfile(e)) => {
                    emit_event(format!("record {scanned}: {e}"));
                }
                Err(e) => return Err(e),
            }
        }
    }

    match state {
        WriterState::Open(mut open) => {
            open.writer.finish()?;
            // close the file before touching its permissions
            drop(open);
            set_permissions(&opts.output)?;
        }
        WriterState::Pending { .. } => {
            warn!(
                "no molecules could be predicted, {} was not written",
                opts.output.display()
            );
        }
    }

    emit_event(format!("{written} outputs among {scanned} molecules"));
    emit_cost(scanned);
    debug!("finished model {}", opts.model_id);

    Ok(Outcome::Finished { written, scanned })
}

#[cfg(unix)]
fn set_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(OUTPUT_MODE);
    std::fs::set_permissions(path, perms).map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
