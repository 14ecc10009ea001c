//! FileSink - appends batches to one JSON-lines file per destination

use contracts::{ContractError, DestinationId, OperationKind, WriteResult, WriteSink};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));

        Self { base_path }
    }
}

/// One line of a destination file
#[derive(Serialize)]
struct Line<'a> {
    operation: OperationKind,
    payload: &'a Value,
}

/// Sink that writes `<base_path>/<destination>.jsonl`
///
/// Null payloads are rejected per record; IO errors fail the whole batch.
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
}

impl FileSink {
    /// Create a new FileSink
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: name.into(),
            config,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileSinkConfig::from_params(params))
    }

    /// File a destination's records are appended to
    pub fn path_for(&self, destination: &DestinationId) -> PathBuf {
        let file_name: String = destination
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.config.base_path.join(format!("{file_name}.jsonl"))
    }

    fn append_batch(
        &self,
        operation: OperationKind,
        destination: &DestinationId,
        records: &[Value],
    ) -> std::io::Result<Vec<WriteResult>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(destination))?;
        let mut writer = BufWriter::new(file);
        let mut results = Vec::with_capacity(records.len());

        for payload in records {
            if payload.is_null() {
                results.push(WriteResult::failed(payload.clone(), "null payload"));
                continue;
            }
            serde_json::to_writer(&mut writer, &Line { operation, payload })
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            writer.write_all(b"\n")?;
            results.push(WriteResult::ok(payload.clone()));
        }

        writer.flush()?;
        Ok(results)
    }

    fn persist(
        &self,
        operation: OperationKind,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError> {
        let results = self
            .append_batch(operation, destination, records)
            .map_err(|e| {
                error!(
                    sink = %self.name,
                    destination = %destination,
                    error = %e,
                    "Write failed"
                );
                ContractError::sink_write(&self.name, e.to_string())
            })?;
        debug!(
            sink = %self.name,
            destination = %destination,
            operation = %operation,
            records = records.len(),
            "Batch appended"
        );
        Ok(results)
    }
}

impl WriteSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_insert",
        skip(self, records),
        fields(sink = %self.name, records = records.len())
    )]
    async fn insert(
        &mut self,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError> {
        self.persist(OperationKind::Insert, destination, records)
    }

    #[instrument(
        name = "file_sink_update",
        skip(self, records),
        fields(sink = %self.name, records = records.len())
    )]
    async fn update(
        &mut self,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError> {
        self.persist(OperationKind::Update, destination, records)
    }

    #[instrument(
        name = "file_sink_upsert",
        skip(self, records),
        fields(sink = %self.name, records = records.len())
    )]
    async fn upsert(
        &mut self,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError> {
        self.persist(OperationKind::Upsert, destination, records)
    }
}
