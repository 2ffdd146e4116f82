//! Client for the munin-node line protocol
//!
//! ## Framing
//!
//! ```text
//! connect      → "# munin node at host\n"     (greeting, discarded)
//! "nodes\n"    → "a.example.com\n" ... ".\n"
//! "list\n"     → "cpu load memory\n"          (single line, no terminator)
//! "config x\n" → "graph_category system\n" ... ".\n"
//! "fetch x\n"  → "load.value 0.42\n" ... ".\n"
//! ```

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;
use tracing::trace;

use crate::config::Endpoint;
use crate::error::{BridgeError, BridgeResult};

/// Commands whose answer is exactly one line without a `.` terminator
const SINGLE_LINE_COMMANDS: &[&str] = &["list"];

const TERMINATOR: &str = ".";

#[derive(Debug)]
struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

/// Connection to a munin node
///
/// Dropping the client closes the socket; [`MuninClient::close`] does the
/// same explicitly and may be called any number of times.
#[derive(Debug)]
pub struct MuninClient {
    conn: Option<Connection>,
    io_timeout: Duration,
}

impl MuninClient {
    /// Open a connection and discard the greeting line
    pub async fn connect(endpoint: &Endpoint, io_timeout: Duration) -> BridgeResult<Self> {
        let stream = connect_stream(endpoint, io_timeout).await?;
        let (reader, writer) = stream.into_split();

        let mut client = Self {
            conn: Some(Connection {
                reader: BufReader::new(reader),
                writer,
            }),
            io_timeout,
        };

        match client.read_line("greeting").await? {
            Some(greeting) => trace!("munin greeting: {greeting}"),
            None => {
                return Err(BridgeError::UnexpectedEof {
                    command: "greeting".to_string(),
                });
            }
        }

        Ok(client)
    }

    /// Send `cmd` and collect its response lines
    ///
    /// Reads until a line consisting of exactly `.`, which is dropped. For
    /// `list` only the first line is read. A closed stream before the
    /// response is complete is an error.
    pub async fn command(&mut self, cmd: &str) -> BridgeResult<Vec<String>> {
        let io_timeout = self.io_timeout;
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| BridgeError::Protocol(format!("not connected, cannot send {cmd}")))?;

        trace!("> {cmd}");
        let request = format!("{cmd}\n");
        bounded(io_timeout, cmd, async {
            conn.writer.write_all(request.as_bytes()).await?;
            conn.writer.flush().await
        })
        .await?;

        let single_line = SINGLE_LINE_COMMANDS.contains(&cmd);
        let mut response = Vec::new();

        loop {
            let Some(line) = self.read_line(cmd).await? else {
                return Err(BridgeError::UnexpectedEof {
                    command: cmd.to_string(),
                });
            };

            if line == TERMINATOR {
                break;
            }

            response.push(line);

            if single_line {
                break;
            }
        }

        trace!("< {} lines for {cmd}", response.len());
        Ok(response)
    }

    /// Shut the connection down; a no-op when already closed
    pub async fn close(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            if let Err(e) = conn.writer.shutdown().await {
                trace!("munin shutdown: {e}");
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Next line without its line ending, `None` at end of stream
    async fn read_line(&mut self, cmd: &str) -> BridgeResult<Option<String>> {
        let io_timeout = self.io_timeout;
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| BridgeError::Protocol(format!("not connected, cannot read {cmd}")))?;

        let mut buf = String::new();
        let read = bounded(io_timeout, cmd, conn.reader.read_line(&mut buf)).await?;
        if read == 0 {
            return Ok(None);
        }

        Ok(Some(buf.trim_end_matches(['\r', '\n']).to_string()))
    }
}

pub(crate) async fn connect_stream(
    endpoint: &Endpoint,
    io_timeout: Duration,
) -> BridgeResult<TcpStream> {
    let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
    match timeout(io_timeout, connect).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(source)) => Err(BridgeError::Connect {
            endpoint: endpoint.to_string(),
            source,
        }),
        Err(_) => Err(BridgeError::Timeout {
            operation: format!("connect to {endpoint}"),
        }),
    }
}

async fn bounded<T>(
    io_timeout: Duration,
    operation: &str,
    fut: impl Future<Output = io::Result<T>>,
) -> BridgeResult<T> {
    match timeout(io_timeout, fut).await {
        Ok(result) => result.map_err(BridgeError::from),
        Err(_) => Err(BridgeError::Timeout {
            operation: operation.to_string(),
        }),
    }
}
