//! Fake munin node, fake carbon listener and a recording reporter

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use munin_graphite::config::{BridgeConfig, Endpoint};
use munin_graphite::report::{Reporter, Severity};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Scripted answers of a munin node
#[derive(Debug, Clone, Default)]
pub struct FakeNode {
    pub nodes: Vec<String>,
    pub list: String,
    pub configs: HashMap<String, Vec<String>>,
    pub fetches: HashMap<String, Vec<String>>,
    /// Close the connection instead of answering this command
    pub hang_up_on: Option<String>,
    /// Wait this long before answering any fetch
    pub fetch_delay: Duration,
}

impl FakeNode {
    pub fn new(nodes: &[&str], list: &str) -> Self {
        Self {
            nodes: nodes.iter().map(|n| n.to_string()).collect(),
            list: list.to_string(),
            ..Default::default()
        }
    }

    pub fn metric(mut self, metric: &str, config: &[&str], fetch: &[&str]) -> Self {
        self.configs.insert(
            metric.to_string(),
            config.iter().map(|l| l.to_string()).collect(),
        );
        self.fetches.insert(
            metric.to_string(),
            fetch.iter().map(|l| l.to_string()).collect(),
        );
        self
    }

    fn answer(&self, command: &str) -> String {
        let mut lines = match command.split_once(' ') {
            None if command == "nodes" => self.nodes.clone(),
            None if command == "list" => return format!("{}\n", self.list),
            Some(("config", metric)) => self
                .configs
                .get(metric)
                .cloned()
                .unwrap_or_else(|| vec!["# Unknown service".to_string()]),
            Some(("fetch", metric)) => self
                .fetches
                .get(metric)
                .cloned()
                .unwrap_or_else(|| vec!["# Unknown service".to_string()]),
            _ => vec!["# Unknown command".to_string()],
        };
        lines.push(".".to_string());
        lines.iter().map(|l| format!("{l}\n")).collect()
    }
}

/// Handle to a running fake munin node
pub struct MuninServer {
    pub endpoint: Endpoint,
    disconnects: Arc<AtomicUsize>,
}

impl MuninServer {
    pub async fn wait_for_disconnects(&self, expected: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.disconnects.load(Ordering::SeqCst) < expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("client never closed the munin connection");
    }
}

pub async fn spawn_munin(node: FakeNode) -> MuninServer {
    spawn_munin_on(0, node).await
}

/// Serve `node` on `port` (0 picks a free one), any number of connections
pub async fn spawn_munin_on(port: u16, node: FakeNode) -> MuninServer {
    let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let disconnects = Arc::new(AtomicUsize::new(0));
    let node = Arc::new(node);

    let counter = disconnects.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let node = node.clone();
            let counter = counter.clone();
            tokio::spawn(async move {
                let (reader, mut writer) = stream.into_split();
                let mut reader = BufReader::new(reader);
                if writer
                    .write_all(b"# munin node at fake.example.com\n")
                    .await
                    .is_err()
                {
                    return;
                }

                let mut line = String::new();
                loop {
                    line.clear();
                    match reader.read_line(&mut line).await {
                        Ok(0) | Err(_) => {
                            counter.fetch_add(1, Ordering::SeqCst);
                            return;
                        }
                        Ok(_) => {}
                    }

                    let command = line.trim_end();
                    if node.hang_up_on.as_deref() == Some(command) {
                        counter.fetch_add(1, Ordering::SeqCst);
                        return;
                    }
                    if command.starts_with("fetch ") && !node.fetch_delay.is_zero() {
                        tokio::time::sleep(node.fetch_delay).await;
                    }
                    if writer.write_all(node.answer(command).as_bytes()).await.is_err() {
                        counter.fetch_add(1, Ordering::SeqCst);
                        return;
                    }
                }
            });
        }
    });

    MuninServer {
        endpoint: Endpoint::new("127.0.0.1", port),
        disconnects,
    }
}

/// Start a carbon listener forwarding every received record
pub async fn spawn_carbon() -> (Endpoint, mpsc::UnboundedReceiver<String>) {
    spawn_carbon_on(0).await
}

/// Carbon listener on `port` (0 picks a free one)
pub async fn spawn_carbon_on(port: u16) -> (Endpoint, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stream).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let _ = tx.send(line);
                }
            });
        }
    });

    (Endpoint::new("127.0.0.1", port), rx)
}

/// Receive records until none arrives for a short while
pub async fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
    let mut records = Vec::new();
    while let Ok(Some(record)) = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await
    {
        records.push(record);
    }
    records
}

/// A localhost port with nothing listening on it
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

pub fn create_test_config(munin: Endpoint, carbon: Endpoint) -> BridgeConfig {
    BridgeConfig {
        munin,
        carbon,
        interval: 300,
        timeout: 2,
        prefix: "servers".to_string(),
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl RecordingReporter {
    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn count_containing(&self, severity: Severity, needle: &str) -> usize {
        self.messages(severity)
            .iter()
            .filter(|m| m.contains(needle))
            .count()
    }
}

impl Reporter for RecordingReporter {
    fn log(&self, severity: Severity, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((severity, message.to_string()));
    }
}
