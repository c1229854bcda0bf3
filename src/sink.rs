use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::features::FeatureRow;
use crate::record::VehicleRecord;

/// Destination for finished records. Each record is emitted exactly once.
pub trait RecordSink {
    fn emit(&mut self, record: VehicleRecord) -> Result<()>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn emit(&mut self, record: VehicleRecord) -> Result<()> {
        (**self).emit(record)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<VehicleRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordSink for MemorySink {
    fn emit(&mut self, record: VehicleRecord) -> Result<()> {
        self.records.push(record);
        Ok(())
    }
}

pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn emit(&mut self, record: VehicleRecord) -> Result<()> {
        self.write_line(&record)
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects every record and writes them as one JSON array on `finish`.
pub struct JsonFileSink {
    path: PathBuf,
    records: Vec<VehicleRecord>,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }
}

impl RecordSink for JsonFileSink {
    fn emit(&mut self, record: VehicleRecord) -> Result<()> {
        self.records.push(record);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        save_as_json(&self.records, &self.path)
    }
}

/// Writes the numeric model-feature projection of each record, one per line.
pub struct FeatureSink<W: Write> {
    lines: JsonLinesSink<W>,
}

impl<W: Write> FeatureSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            lines: JsonLinesSink::new(writer),
        }
    }
}

impl<W: Write> RecordSink for FeatureSink<W> {
    fn emit(&mut self, record: VehicleRecord) -> Result<()> {
        self.lines.write_line(&FeatureRow::from_record(&record))
    }

    fn finish(&mut self) -> Result<()> {
        self.lines.finish()
    }
}

pub fn save_as_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

pub fn load_json(path: &Path) -> Result<Vec<VehicleRecord>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
