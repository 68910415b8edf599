use std::{
    fs::File,
    io::{self, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use neurocar_genomes::VehicleParams;

use crate::schema::car_model::CarModel;

/// Buffered file that remembers its path for error messages.
#[derive(Debug)]
pub struct Output {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl Output {
    pub fn create<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Replaces the file at `path` with the pretty-printed JSON of `value`.
    pub fn save_json<T, P>(value: &T, path: P) -> anyhow::Result<()>
    where
        T: serde::Serialize,
        P: AsRef<Path>,
    {
        let mut output = Self::create(path)?;
        serde_json::to_writer_pretty(&mut output.writer, value)
            .with_context(|| format!("Failed to write JSON to {}", output.path.display()))?;
        output.write_line("")
    }

    /// Writes one line and flushes it, so that the file can be followed while a run is
    /// in progress.
    pub fn write_line(&mut self, line: &str) -> anyhow::Result<()> {
        writeln!(self.writer, "{line}")
            .and_then(|()| self.writer.flush())
            .with_context(|| format!("Failed to write to {}", self.path.display()))
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read a driving scenario from a JSON file
///
/// Fields missing from the file take their default values.
pub fn read_scenario_file<P>(path: P) -> anyhow::Result<VehicleParams>
where
    P: AsRef<Path>,
{
    read_json_file("scenario", path)
}

/// Read a trained car model from a JSON file
pub fn read_car_model_file<P>(path: P) -> anyhow::Result<CarModel>
where
    P: AsRef<Path>,
{
    read_json_file("car model", path)
}
