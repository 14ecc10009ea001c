//! JSON-lines input feeding the inbound queue.

use std::path::Path;

use contracts::InboundRecord;
use dispatcher::RecordProducer;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{CliError, Result};

/// Counters of the input side
#[derive(Debug, Clone, Copy, Default)]
pub struct InputStats {
    pub lines_read: u64,
    pub lines_skipped: u64,
    pub records_sent: u64,
}

/// Parse one input line; blank lines yield `None`
pub fn parse_record(line_no: u64, line: &str) -> Result<Option<InboundRecord>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| CliError::invalid_record(line_no, e.to_string()))
}

/// Boxed line source the reader consumes
pub type InputReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Open `input`, or stdin when `None`
///
/// A pending stdin read cannot be interrupted; the reader task stops
/// waiting on it, but the blocked read itself lives until the next line
/// or EOF.
pub async fn open_input(input: Option<&Path>) -> Result<InputReader> {
    match input {
        Some(path) => {
            info!(input = %path.display(), "Reading records from file");
            Ok(Box::new(BufReader::new(File::open(path).await?)))
        }
        None => {
            info!("Reading records from stdin");
            Ok(Box::new(BufReader::new(tokio::io::stdin())))
        }
    }
}

/// Read JSON lines from `reader` into `producer` until EOF or cancellation
///
/// Invalid lines are skipped with a warning. The reader also stops as soon
/// as the dispatcher drops its end of the queue, even while `reader` has
/// nothing to deliver. The producer is finished on every clean exit; on an
/// IO error it is dropped, which also ends the stream.
pub async fn read_records<R>(
    reader: R,
    producer: RecordProducer,
    cancel: CancellationToken,
) -> Result<InputStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = InputStats::default();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Input reader cancelled");
                break;
            }
            _ = producer.closed() => {
                debug!("Dispatcher stopped consuming, input reader exiting");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };
        stats.lines_read += 1;

        match parse_record(stats.lines_read, &line) {
            Ok(Some(record)) => {
                if producer.send(record).await.is_err() {
                    debug!("Dispatcher stopped consuming, input reader exiting");
                    break;
                }
                stats.records_sent += 1;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Skipping input line");
                stats.lines_skipped += 1;
            }
        }
    }

    producer.finish();
    info!(
        lines = stats.lines_read,
        skipped = stats.lines_skipped,
        records = stats.records_sent,
        "Input finished"
    );
    Ok(stats)
}
