//! # Integration Tests
//!
//! Integration and end-to-end tests.
//!
//! - Dispatch scenarios against a recording write sink
//! - Batching, ordering and cancellation properties
//! - Config-driven runs through the real sinks

#[cfg(test)]
mod support {
    use std::sync::{Arc, Mutex};

    use contracts::{
        ContractError, DestinationId, LogLevel, OperationKind, TaskLog, TaskLogFactory,
        TaskParams, WriteResult, WriteSink,
    };
    use serde_json::Value;

    /// One write sink invocation
    #[derive(Debug, Clone, PartialEq)]
    pub struct SinkCall {
        pub operation: OperationKind,
        pub destination: String,
        pub records: Vec<Value>,
    }

    /// Write sink that records every call
    ///
    /// Calls for `fail_destination` raise a connection error; payloads listed
    /// in `rejections` come back as failed results.
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        pub calls: Arc<Mutex<Vec<SinkCall>>>,
        pub fail_destination: Option<String>,
        pub rejections: Vec<(Value, String)>,
    }

    impl RecordingSink {
        pub fn failing_for(destination: &str) -> Self {
            Self {
                fail_destination: Some(destination.to_string()),
                ..Default::default()
            }
        }

        pub fn rejecting(payload: Value, error: &str) -> Self {
            Self {
                rejections: vec![(payload, error.to_string())],
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<SinkCall> {
            self.calls.lock().unwrap().clone()
        }

        fn write(
            &mut self,
            operation: OperationKind,
            destination: &DestinationId,
            records: &[Value],
        ) -> Result<Vec<WriteResult>, ContractError> {
            if self.fail_destination.as_deref() == Some(destination.as_str()) {
                let io = std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                );
                return Err(ContractError::sink_connection("recording", io));
            }

            self.calls.lock().unwrap().push(SinkCall {
                operation,
                destination: destination.to_string(),
                records: records.to_vec(),
            });

            Ok(records
                .iter()
                .map(|record| {
                    match self.rejections.iter().find(|(payload, _)| payload == record) {
                        Some((_, error)) => WriteResult::failed(record.clone(), error.as_str()),
                        None => WriteResult::ok(record.clone()),
                    }
                })
                .collect())
        }
    }

    impl WriteSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn insert(
            &mut self,
            destination: &DestinationId,
            records: &[Value],
        ) -> Result<Vec<WriteResult>, ContractError> {
            self.write(OperationKind::Insert, destination, records)
        }

        async fn update(
            &mut self,
            destination: &DestinationId,
            records: &[Value],
        ) -> Result<Vec<WriteResult>, ContractError> {
            self.write(OperationKind::Update, destination, records)
        }

        async fn upsert(
            &mut self,
            destination: &DestinationId,
            records: &[Value],
        ) -> Result<Vec<WriteResult>, ContractError> {
            self.write(OperationKind::Upsert, destination, records)
        }
    }

    /// Task logs kept in memory, with open/close counters
    #[derive(Clone, Default)]
    pub struct RecordingTaskLogs {
        pub lines: Arc<Mutex<Vec<(LogLevel, String)>>>,
        pub opens: Arc<Mutex<u32>>,
        pub closes: Arc<Mutex<u32>>,
    }

    impl RecordingTaskLogs {
        pub fn lines_at(&self, level: LogLevel) -> Vec<String> {
            self.lines
                .lock()
                .unwrap()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, message)| message.clone())
                .collect()
        }

        pub fn opens(&self) -> u32 {
            *self.opens.lock().unwrap()
        }

        pub fn closes(&self) -> u32 {
            *self.closes.lock().unwrap()
        }
    }

    pub struct RecordingTaskLog {
        logs: RecordingTaskLogs,
    }

    impl TaskLogFactory for RecordingTaskLogs {
        type Handle = RecordingTaskLog;

        fn open(&self, _params: &TaskParams) -> Result<RecordingTaskLog, ContractError> {
            *self.opens.lock().unwrap() += 1;
            Ok(RecordingTaskLog { logs: self.clone() })
        }
    }

    impl TaskLog for RecordingTaskLog {
        fn log(&mut self, level: LogLevel, message: &str) {
            self.logs
                .lines
                .lock()
                .unwrap()
                .push((level, message.to_string()));
        }

        fn close(&mut self) {
            *self.logs.closes.lock().unwrap() += 1;
        }
    }
}

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
        assert_eq!(contracts::OperationKind::ALL.len(), 3);
    }
}

#[cfg(test)]
mod scenario_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use contracts::{
        CancellationSource, InboundRecord, LogLevel, NeverCancelled, OperationKind, TaskParams,
    };
    use dispatcher::{BatchDispatcher, DestinationTable, DispatcherError, InboundQueue};
    use serde_json::json;

    use crate::support::{RecordingSink, RecordingTaskLogs, SinkCall};

    const POLL: Duration = Duration::from_millis(20);

    /// Turns on once it has been asked more than `after` times
    struct CancelAfterChecks {
        checks: AtomicUsize,
        after: usize,
    }

    impl CancellationSource for CancelAfterChecks {
        fn is_cancelled(&self) -> bool {
            self.checks.fetch_add(1, Ordering::SeqCst) >= self.after
        }
    }

    async fn finished_queue(records: Vec<InboundRecord>) -> InboundQueue {
        let (producer, queue) = dispatcher::bounded(records.len().max(1));
        for record in records {
            producer.send(record).await.unwrap();
        }
        producer.finish();
        queue
    }

    fn call(operation: OperationKind, destination: &str, records: Vec<serde_json::Value>) -> SinkCall {
        SinkCall {
            operation,
            destination: destination.to_string(),
            records,
        }
    }

    #[tokio::test]
    async fn test_single_destination_flush_then_drain() {
        let sink = RecordingSink::default();
        let logs = RecordingTaskLogs::default();
        let table = DestinationTable::builder().route("A", 2).build();
        let mut queue = finished_queue(vec![
            InboundRecord::insert("A", json!("p1")),
            InboundRecord::insert("A", json!("p2")),
            InboundRecord::insert("A", json!("p3")),
        ])
        .await;

        let mut dispatcher = BatchDispatcher::with_sink(sink.clone()).poll_timeout(POLL);
        let summary = dispatcher
            .run(&table, &mut queue, &NeverCancelled, &TaskParams::now("s1"), &logs)
            .await
            .unwrap();

        assert_eq!(
            sink.calls(),
            vec![
                call(OperationKind::Insert, "A", vec![json!("p1"), json!("p2")]),
                call(OperationKind::Insert, "A", vec![json!("p3")]),
            ]
        );
        assert_eq!(summary.metrics.threshold_flushes, 1);
        assert_eq!(summary.metrics.drain_flushes, 1);
        assert!(dispatcher.pending().is_empty());
        assert_eq!((logs.opens(), logs.closes()), (1, 1));
    }

    #[tokio::test]
    async fn test_interleaved_destinations_with_own_batch_sizes() {
        let sink = RecordingSink::default();
        let table = DestinationTable::builder()
            .route("A", 2)
            .route("B", 3)
            .build();
        let mut queue = finished_queue(vec![
            InboundRecord::insert("A", json!("a1")),
            InboundRecord::insert("B", json!("b1")),
            InboundRecord::insert("A", json!("a2")),
            InboundRecord::insert("B", json!("b2")),
            InboundRecord::insert("B", json!("b3")),
            InboundRecord::insert("A", json!("a3")),
        ])
        .await;

        let mut dispatcher = BatchDispatcher::with_sink(sink.clone()).poll_timeout(POLL);
        dispatcher
            .run(
                &table,
                &mut queue,
                &NeverCancelled,
                &TaskParams::now("s2"),
                &RecordingTaskLogs::default(),
            )
            .await
            .unwrap();

        assert_eq!(
            sink.calls(),
            vec![
                call(OperationKind::Insert, "A", vec![json!("a1"), json!("a2")]),
                call(
                    OperationKind::Insert,
                    "B",
                    vec![json!("b1"), json!("b2"), json!("b3")]
                ),
                call(OperationKind::Insert, "A", vec![json!("a3")]),
            ]
        );
    }

    #[tokio::test]
    async fn test_cancellation_mid_stream_skips_flush_and_drain() {
        let sink = RecordingSink::default();
        let logs = RecordingTaskLogs::default();
        let table = DestinationTable::builder().route("A", 10).build();
        let mut queue = finished_queue(
            (1..=5)
                .map(|i| InboundRecord::insert("A", json!(i)))
                .collect(),
        )
        .await;
        // Two records get through, the third check observes the kill
        let cancel = CancelAfterChecks {
            checks: AtomicUsize::new(0),
            after: 2,
        };

        let mut dispatcher = BatchDispatcher::with_sink(sink.clone()).poll_timeout(POLL);
        let summary = dispatcher
            .run(&table, &mut queue, &cancel, &TaskParams::now("s3"), &logs)
            .await
            .unwrap();

        assert!(summary.is_cancelled());
        assert_eq!(summary.metrics.records_received, 2);
        assert_eq!(summary.pending, 2);
        assert!(sink.calls().is_empty());
        assert_eq!(logs.lines_at(LogLevel::Warn).len(), 1);
        assert_eq!(logs.closes(), 1);
    }

    #[tokio::test]
    async fn test_rejected_record_is_logged_once_and_run_continues() {
        let sink = RecordingSink::rejecting(json!("p2"), "duplicate key");
        let logs = RecordingTaskLogs::default();
        let table = DestinationTable::builder().route("A", 3).build();
        let mut queue = finished_queue(vec![
            InboundRecord::upsert("A", json!("p1")),
            InboundRecord::upsert("A", json!("p2")),
            InboundRecord::upsert("A", json!("p3")),
            InboundRecord::upsert("A", json!("p4")),
        ])
        .await;

        let mut dispatcher = BatchDispatcher::with_sink(sink.clone()).poll_timeout(POLL);
        let summary = dispatcher
            .run(&table, &mut queue, &NeverCancelled, &TaskParams::now("s4"), &logs)
            .await
            .unwrap();

        let errors = logs.lines_at(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("duplicate key"));
        assert!(errors[0].contains("p2"));

        // p4 arrived after the partial failure and was still written
        let calls = sink.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].records, vec![json!("p4")]);
        assert_eq!(summary.metrics.records_written, 3);
        assert_eq!(summary.metrics.record_failures, 1);
    }

    /// Known data-loss window: a mid-stream sink failure abandons every
    /// other destination's buffered records.
    #[tokio::test]
    async fn test_sink_failure_mid_stream_abandons_other_buffers() {
        let sink = RecordingSink::failing_for("A");
        let logs = RecordingTaskLogs::default();
        let table = DestinationTable::builder()
            .route("A", 2)
            .route("B", 5)
            .build();
        let mut queue = finished_queue(vec![
            InboundRecord::insert("B", json!("b1")),
            InboundRecord::insert("A", json!("a1")),
            InboundRecord::insert("A", json!("a2")),
            InboundRecord::insert("B", json!("b2")),
        ])
        .await;

        let mut dispatcher = BatchDispatcher::with_sink(sink.clone()).poll_timeout(POLL);
        let err = dispatcher
            .run(&table, &mut queue, &NeverCancelled, &TaskParams::now("s5"), &logs)
            .await
            .unwrap_err();

        assert_eq!(err.destination().map(|d| d.as_str()), Some("A"));
        assert!(matches!(err, DispatcherError::Flush { records: 2, .. }));
        assert!(err.trace().contains("connection reset by peer"));

        // B was never flushed and the remaining record was never read
        assert!(sink.calls().is_empty());
        assert_eq!(dispatcher.pending().len(&"B".into(), OperationKind::Insert), 1);
        assert_eq!(dispatcher.pending().len(&"A".into(), OperationKind::Insert), 2);
        assert!(!queue.is_empty());

        let errors = logs.lines_at(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'A'"));
        assert_eq!(logs.closes(), 1);
    }

    #[tokio::test]
    async fn test_unknown_routing_key_aborts_and_closes_log() {
        let sink = RecordingSink::default();
        let logs = RecordingTaskLogs::default();
        let table = DestinationTable::builder().route("A", 1).build();
        let mut queue = finished_queue(vec![
            InboundRecord::insert("A", json!(1)),
            InboundRecord::insert("nowhere", json!(2)),
            InboundRecord::insert("A", json!(3)),
        ])
        .await;

        let mut dispatcher = BatchDispatcher::with_sink(sink.clone()).poll_timeout(POLL);
        let err = dispatcher
            .run(&table, &mut queue, &NeverCancelled, &TaskParams::now("s6"), &logs)
            .await
            .unwrap_err();

        assert!(matches!(err, DispatcherError::DestinationNotFound { .. }));
        assert_eq!(sink.calls().len(), 1);
        assert_eq!(logs.lines_at(LogLevel::Error).len(), 1);
        assert_eq!(logs.closes(), 1);
    }
}

#[cfg(test)]
mod property_tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use contracts::{InboundRecord, NeverCancelled, OperationKind, TaskParams};
    use dispatcher::{BatchDispatcher, DestinationTable};
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    use crate::support::{RecordingSink, RecordingTaskLogs};

    const POLL: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn test_batching_completeness() {
        for (n, batch_size) in [(0usize, 3usize), (1, 1), (6, 3), (7, 3), (5, 10)] {
            let sink = RecordingSink::default();
            let table = DestinationTable::builder().route("D", batch_size).build();
            let (producer, mut queue) = dispatcher::bounded(n.max(1));
            for i in 0..n {
                producer
                    .send(InboundRecord::update("D", json!(i)))
                    .await
                    .unwrap();
            }
            producer.finish();

            let mut dispatcher = BatchDispatcher::with_sink(sink.clone()).poll_timeout(POLL);
            let summary = dispatcher
                .run(
                    &table,
                    &mut queue,
                    &NeverCancelled,
                    &TaskParams::now("batching"),
                    &RecordingTaskLogs::default(),
                )
                .await
                .unwrap();

            let calls = sink.calls();
            let full = n / batch_size;
            let rest = n % batch_size;
            assert_eq!(calls.len(), full + usize::from(rest > 0), "n={n} b={batch_size}");
            assert!(calls[..full].iter().all(|c| c.records.len() == batch_size));
            if rest > 0 {
                assert_eq!(calls[full].records.len(), rest);
            }
            assert_eq!(summary.metrics.threshold_flushes, full as u64);
            assert_eq!(summary.metrics.drain_flushes, u64::from(rest > 0));
        }
    }

    #[tokio::test]
    async fn test_buffer_isolation_and_order_with_concurrent_producer() {
        let sink = RecordingSink::default();
        let table = DestinationTable::builder()
            .route("X", 4)
            .route("Y", 3)
            .build();
        let (producer, queue) = dispatcher::bounded(2);
        let dispatcher = BatchDispatcher::with_sink(sink.clone()).poll_timeout(POLL);
        let handle = dispatcher.spawn(
            table,
            queue,
            NeverCancelled,
            TaskParams::now("isolation"),
            RecordingTaskLogs::default(),
        );

        let operations = OperationKind::ALL;
        let mut expected: HashMap<(String, OperationKind), Vec<serde_json::Value>> =
            HashMap::new();
        for i in 0..60u64 {
            let destination = if i % 2 == 0 { "X" } else { "Y" };
            let operation = operations[(i % 3) as usize];
            let payload = json!({"seq": i});
            expected
                .entry((destination.to_string(), operation))
                .or_default()
                .push(payload.clone());
            producer
                .send(InboundRecord::new(destination, operation, payload))
                .await
                .unwrap();
        }
        producer.finish();

        let (dispatcher, result) = handle.await.unwrap();
        let summary = result.unwrap();
        assert_eq!(summary.metrics.records_received, 60);
        assert!(dispatcher.pending().is_empty());

        let mut delivered: HashMap<(String, OperationKind), Vec<serde_json::Value>> =
            HashMap::new();
        for call in sink.calls() {
            delivered
                .entry((call.destination.clone(), call.operation))
                .or_default()
                .extend(call.records);
        }
        assert_eq!(delivered, expected);
    }

    #[tokio::test]
    async fn test_cancellation_latency_bounded_by_poll_timeout() {
        let sink = RecordingSink::default();
        let logs = RecordingTaskLogs::default();
        let table = DestinationTable::builder().route("A", 10).build();
        let (producer, queue) = dispatcher::bounded(4);
        let cancel = CancellationToken::new();
        let poll = Duration::from_millis(50);

        let handle = BatchDispatcher::with_sink(sink.clone())
            .poll_timeout(poll)
            .spawn(
                table,
                queue,
                cancel.clone(),
                TaskParams::now("latency"),
                logs.clone(),
            );

        producer
            .send(InboundRecord::insert("A", json!(1)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let cancelled_at = Instant::now();
        cancel.cancel();
        let (_, result) = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("dispatcher did not stop")
            .unwrap();

        // At most one more poll wait, with slack for the scheduler
        assert!(cancelled_at.elapsed() < poll * 4);
        assert!(result.unwrap().is_cancelled());
        assert!(sink.calls().is_empty());
        assert_eq!(logs.closes(), 1);
        drop(producer);
    }

    #[tokio::test]
    async fn test_stream_ends_when_producers_dropped() {
        let sink = RecordingSink::default();
        let table = DestinationTable::builder().route("A", 10).build();
        let (producer, queue) = dispatcher::bounded(4);
        let handle = BatchDispatcher::with_sink(sink.clone())
            .poll_timeout(POLL)
            .spawn(
                table,
                queue,
                Arc::new(std::sync::atomic::AtomicBool::new(false)),
                TaskParams::now("dropped"),
                RecordingTaskLogs::default(),
            );

        producer
            .send(InboundRecord::insert("A", json!("last")))
            .await
            .unwrap();
        drop(producer);

        let (_, result) = handle.await.unwrap();
        assert!(!result.unwrap().is_cancelled());
        assert_eq!(sink.calls().len(), 1);
        assert_eq!(sink.calls()[0].records, vec![json!("last")]);
    }

    #[tokio::test]
    async fn test_drain_failure_is_logged_and_sweep_continues() {
        let sink = RecordingSink::failing_for("A");
        let logs = RecordingTaskLogs::default();
        let table = DestinationTable::builder()
            .route("A", 5)
            .route("B", 5)
            .build();
        let (producer, mut queue) = dispatcher::bounded(4);
        producer
            .send(InboundRecord::insert("A", json!("a")))
            .await
            .unwrap();
        producer
            .send(InboundRecord::upsert("B", json!("b")))
            .await
            .unwrap();
        producer.finish();

        let mut dispatcher = BatchDispatcher::with_sink(sink.clone()).poll_timeout(POLL);
        let summary = dispatcher
            .run(&table, &mut queue, &NeverCancelled, &TaskParams::now("drain"), &logs)
            .await
            .unwrap();

        assert_eq!(summary.metrics.drain_failures, 1);
        assert_eq!(sink.calls().len(), 1);
        assert_eq!(sink.calls()[0].destination, "B");
        assert!(!logs.lines_at(contracts::LogLevel::Error).is_empty());
        assert_eq!(logs.closes(), 1);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{InboundRecord, NeverCancelled, TaskParams};
    use dispatcher::{create_dispatcher, TaskLogs};
    use serde_json::{json, Value};
    use tokio::net::UdpSocket;

    /// End-to-end: TOML config -> file sink + file task log
    #[tokio::test]
    async fn test_e2e_file_sink_from_config() {
        let out = tempfile::tempdir().unwrap();
        let log_dir = tempfile::tempdir().unwrap();
        let content = format!(
            r#"
[dispatcher]
default_batch_size = 2
poll_timeout_ms = 20
queue_capacity = 4

[[destinations]]
id = "warehouse.orders"
routing_keys = ["orders", "orders_v2"]

[[destinations]]
id = "warehouse.customers"
routing_keys = ["customers"]
batch_size = 10

[sink]
name = "jsonl"
sink_type = "file"
params = {{ base_path = "{}" }}

[task_log]
dir = "{}"
"#,
            out.path().display(),
            log_dir.path().display()
        );
        let blueprint = ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap();

        let (dispatcher, table) = create_dispatcher(&blueprint).await.unwrap();
        let (producer, queue) = dispatcher::bounded(blueprint.dispatcher.queue_capacity);
        let logs = TaskLogs::from_config(&blueprint.task_log);
        let handle = dispatcher.spawn(
            table,
            queue,
            NeverCancelled,
            TaskParams::now("e2e"),
            logs,
        );

        for i in 0..5 {
            let key = if i % 2 == 0 { "orders" } else { "orders_v2" };
            producer
                .send(InboundRecord::insert(key, json!({"order": i})))
                .await
                .unwrap();
        }
        producer
            .send(InboundRecord::upsert("customers", json!({"customer": 1})))
            .await
            .unwrap();
        producer
            .send(InboundRecord::update("customers", Value::Null))
            .await
            .unwrap();
        producer.finish();

        let (_, result) = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        let summary = result.unwrap();
        assert_eq!(summary.metrics.records_received, 7);
        assert_eq!(summary.metrics.records_written, 6);
        assert_eq!(summary.metrics.record_failures, 1);

        let orders = std::fs::read_to_string(out.path().join("warehouse.orders.jsonl")).unwrap();
        let payloads: Vec<Value> = orders
            .lines()
            .map(|l| serde_json::from_str::<Value>(l).unwrap()["payload"]["order"].clone())
            .collect();
        assert_eq!(payloads, (0..5).map(|i| json!(i)).collect::<Vec<_>>());

        let task_dir = log_dir.path().join("e2e");
        let entry = std::fs::read_dir(task_dir).unwrap().next().unwrap().unwrap();
        let log = std::fs::read_to_string(entry.path()).unwrap();
        assert!(log.contains("[ERROR]"));
        assert!(log.contains("null payload"));
    }

    /// End-to-end: JSON config -> network sink over loopback UDP
    #[tokio::test]
    async fn test_e2e_network_sink_from_config() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let content = json!({
            "dispatcher": {"default_batch_size": 3, "poll_timeout_ms": 20},
            "destinations": [{"id": "metrics", "routing_keys": ["m"]}],
            "sink": {
                "name": "udp",
                "sink_type": "network",
                "params": {"addr": receiver.local_addr().unwrap().to_string()}
            }
        })
        .to_string();
        let blueprint = ConfigLoader::load_from_str(&content, ConfigFormat::Json).unwrap();

        let (mut dispatcher, table) = create_dispatcher(&blueprint).await.unwrap();
        let (producer, mut queue) = dispatcher::bounded(8);
        for i in 0..3 {
            producer
                .send(InboundRecord::insert("m", json!(i)))
                .await
                .unwrap();
        }
        producer.finish();

        let summary = dispatcher
            .run(
                &table,
                &mut queue,
                &NeverCancelled,
                &TaskParams::now("udp"),
                &TaskLogs::from_config(&blueprint.task_log),
            )
            .await
            .unwrap();
        assert_eq!(summary.metrics.records_written, 3);

        let mut buf = vec![0u8; 65536];
        let n = tokio::time::timeout(Duration::from_secs(2), receiver.recv(&mut buf))
            .await
            .unwrap()
            .unwrap();
        let datagram: Value = serde_json::from_slice(&buf[..n]).unwrap();
        assert_eq!(datagram["destination"], "metrics");
        assert_eq!(datagram["records"].as_array().unwrap().len(), 3);
    }
}
