//! Publisher for the carbon plaintext protocol
//!
//! Every point becomes one `<name> <value> <timestamp>\n` record. Nothing is
//! read back from the listener.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use crate::config::Endpoint;
use crate::error::{BridgeError, BridgeResult};
use crate::fetch::Point;
use crate::munin::connect_stream;

#[derive(Debug)]
pub struct CarbonClient {
    stream: Option<TcpStream>,
    io_timeout: Duration,
}

impl CarbonClient {
    pub async fn connect(endpoint: &Endpoint, io_timeout: Duration) -> BridgeResult<Self> {
        let stream = connect_stream(endpoint, io_timeout).await?;
        Ok(Self {
            stream: Some(stream),
            io_timeout,
        })
    }

    /// Write all points in order, returning how many records went out
    ///
    /// A failure part way through reports the number of records written
    /// before it.
    pub async fn publish(&mut self, points: &[Point]) -> BridgeResult<usize> {
        let io_timeout = self.io_timeout;
        let stream = self.stream.as_mut().ok_or_else(|| BridgeError::SinkWrite {
            written: 0,
            source: std::io::Error::new(std::io::ErrorKind::NotConnected, "carbon not connected"),
        })?;

        for (written, point) in points.iter().enumerate() {
            let record = format!("{point}\n");
            trace!("sending {}", record.trim_end());
            write_bounded(stream, io_timeout, record.as_bytes(), written).await?;
        }

        Ok(points.len())
    }

    /// Shut the connection down; a no-op when already closed
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                trace!("carbon shutdown: {e}");
            }
        }
    }
}

async fn write_bounded(
    stream: &mut TcpStream,
    io_timeout: Duration,
    record: &[u8],
    written: usize,
) -> BridgeResult<()> {
    match timeout(io_timeout, stream.write_all(record)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(BridgeError::SinkWrite { written, source }),
        Err(_) => Err(BridgeError::Timeout {
            operation: format!("write to carbon after {written} records"),
        }),
    }
}
