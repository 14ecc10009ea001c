//! NetworkSink - ships batches as UDP datagrams

use contracts::{ContractError, DestinationId, OperationKind, WriteResult, WriteSink};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, instrument, warn};

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkFormat {
    /// JSON (human-readable, larger)
    #[default]
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

/// Configuration for NetworkSink
#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: NetworkFormat,
    /// Max datagram size (UDP typically 65507 for IPv4)
    pub max_packet_size: usize,
}

impl NetworkSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => NetworkFormat::Bincode,
            Some("json") | None => NetworkFormat::Json,
            Some(other) => return Err(format!("unknown format '{}'", other)),
        };

        let max_packet_size = params
            .get("max_packet_size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(65000);

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Datagram body
#[derive(Serialize)]
struct Envelope<'a> {
    destination: &'a str,
    operation: OperationKind,
    /// JSON text per record, so bincode never has to encode a `Value`
    records: Vec<String>,
}

/// Sink that sends batches over UDP
///
/// A batch that does not fit one datagram is split; a single record that
/// does not fit is reported as a failed result. Socket errors fail the call.
pub struct NetworkSink {
    name: String,
    config: NetworkSinkConfig,
    socket: UdpSocket,
    datagrams: u64,
}

impl NetworkSink {
    /// Create a new NetworkSink
    #[instrument(name = "network_sink_new", skip(name, config))]
    pub async fn new(name: impl Into<String>, config: NetworkSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        let bind_addr = if config.addr.is_ipv6() {
            "[::]:0"
        } else {
            "0.0.0.0:0"
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(&config.addr).await?;

        debug!(
            sink = %name,
            target = %config.addr,
            "NetworkSink connected"
        );

        Ok(Self {
            name,
            config,
            socket,
            datagrams: 0,
        })
    }

    /// Create from params (for factory)
    #[instrument(name = "network_sink_from_params", skip(name, params))]
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = NetworkSinkConfig::from_params(params)
            .map_err(|e| ContractError::sink_write(&name, e))?;

        let sink_name = name.clone();
        Self::new(name, config)
            .await
            .map_err(|e| ContractError::sink_connection(sink_name, e))
    }

    /// Datagrams sent so far
    pub fn datagrams(&self) -> u64 {
        self.datagrams
    }

    fn encode(
        &self,
        operation: OperationKind,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<u8>, ContractError> {
        let envelope = Envelope {
            destination: destination.as_str(),
            operation,
            records: records.iter().map(Value::to_string).collect(),
        };
        match self.config.format {
            NetworkFormat::Json => serde_json::to_vec(&envelope)
                .map_err(|e| ContractError::sink_write(&self.name, format!("json error: {e}"))),
            NetworkFormat::Bincode => bincode::serialize(&envelope)
                .map_err(|e| ContractError::sink_write(&self.name, format!("bincode error: {e}"))),
        }
    }

    async fn send_batch(
        &mut self,
        operation: OperationKind,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError> {
        let mut results = Vec::with_capacity(records.len());
        // Work list of slices still to send, split in half while too large
        let mut pending: Vec<&[Value]> = vec![records];

        while let Some(chunk) = pending.pop() {
            if chunk.is_empty() {
                continue;
            }
            let data = self.encode(operation, destination, chunk)?;
            if data.len() > self.config.max_packet_size {
                if chunk.len() == 1 {
                    warn!(
                        sink = %self.name,
                        size = data.len(),
                        max = self.config.max_packet_size,
                        "Record too large for one datagram"
                    );
                    results.push(WriteResult::failed(
                        chunk[0].clone(),
                        format!(
                            "record encodes to {} bytes, max packet size is {}",
                            data.len(),
                            self.config.max_packet_size
                        ),
                    ));
                    continue;
                }
                let (head, tail) = chunk.split_at(chunk.len() / 2);
                // Stack order: head is sent before tail
                pending.push(tail);
                pending.push(head);
                continue;
            }

            let sent = self
                .socket
                .send(&data)
                .await
                .map_err(|e| ContractError::sink_connection(self.name.clone(), e))?;
            self.datagrams += 1;
            debug!(
                sink = %self.name,
                destination = %destination,
                records = chunk.len(),
                bytes = sent,
                "Sent"
            );
            results.extend(chunk.iter().cloned().map(WriteResult::ok));
        }

        Ok(results)
    }
}

impl WriteSink for NetworkSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_sink_insert",
        skip(self, records),
        fields(sink = %self.name, records = records.len())
    )]
    async fn insert(
        &mut self,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError> {
        self.send_batch(OperationKind::Insert, destination, records)
            .await
    }

    #[instrument(
        name = "network_sink_update",
        skip(self, records),
        fields(sink = %self.name, records = records.len())
    )]
    async fn update(
        &mut self,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError> {
        self.send_batch(OperationKind::Update, destination, records)
            .await
    }

    #[instrument(
        name = "network_sink_upsert",
        skip(self, records),
        fields(sink = %self.name, records = records.len())
    )]
    async fn upsert(
        &mut self,
        destination: &DestinationId,
        records: &[Value],
    ) -> Result<Vec<WriteResult>, ContractError> {
        self.send_batch(OperationKind::Upsert, destination, records)
            .await
    }
}
