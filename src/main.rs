use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::debug;
use molpredict::{
    config::Config,
    io::{parse_delimiter, ReaderOptions},
    run, RunOptions,
};

#[derive(Parser)]
#[command(about = "Predict molecular properties with a pre-trained model")]
struct Cli {
    /// The ID of the model to run. `<model>.jmodel` and, optionally,
    /// `<model>_meta.json` are read from the model directory.
    #[arg(short, long)]
    model: String,

    /// The SMILES, delimited text, or SDF file of molecules to predict.
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the predictions. A `.sdf` extension writes SDF,
    /// anything else delimited text.
    #[arg(short, long)]
    output: PathBuf,

    /// The field delimiter for delimited input and output: a single
    /// character or one of tab, comma, space, pipe. Defaults to tab.
    #[arg(short, long)]
    delimiter: Option<String>,

    /// The column holding molecule identifiers: a zero-based index (or a
    /// header name with --read-header) for delimited text, a data item name
    /// for SDF.
    #[arg(long)]
    id_column: Option<String>,

    /// Read a header line with the field names from delimited input.
    #[arg(long)]
    read_header: bool,

    /// Accepted for compatibility. Delimited output always starts with a
    /// header line.
    #[arg(long)]
    write_header: bool,

    /// The number of leading SDF records to read to determine field names.
    #[arg(long, default_value_t = 100)]
    sdf_read_records: usize,

    /// A TOML configuration file, currently only for `model_dir`.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    if cli.write_header {
        debug!("--write-header has no effect, the header is always written");
    }

    let opts = RunOptions {
        model_id: cli.model,
        input: cli.input,
        output: cli.output,
        model_dir: config.model_dir(),
        reader: ReaderOptions {
            delimiter: parse_delimiter(cli.delimiter.as_deref())?,
            read_header: cli.read_header,
            id_column: cli.id_column,
            sdf_read_records: cli.sdf_read_records,
        },
    };
    debug!("model directory {}", opts.model_dir.display());

    run(&opts).with_context(|| format!("running model {}", opts.model_id))?;

    Ok(())
}
