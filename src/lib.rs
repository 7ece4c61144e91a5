//! Run pre-trained molecular models over files of molecules.
//!
//! [runner::run] loads a model by ID, streams records from a SMILES or SDF
//! file through it, and writes each molecule's predictions alongside its
//! original fields.

pub mod config;
pub mod error;
pub mod events;
pub mod io;
pub mod matrix;
pub mod model;
pub mod mol;
pub mod runner;
pub mod schema;

pub use error::{Error, Result};
pub use runner::{run, Outcome, RunOptions};
