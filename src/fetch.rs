//! One pass over every node and metric of a munin node
//!
//! ```text
//! nodes → for each node: list → for each metric: config, fetch → Points
//! ```
//!
//! All points of a node are collected before the next node is queried, and
//! the client is closed on every exit path.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, instrument};

use crate::config::BridgeConfig;
use crate::error::BridgeResult;
use crate::grammar::{self, Line};
use crate::munin::MuninClient;
use crate::naming;
use crate::report::Reporter;

/// Name suffix of the synthetic point carrying the cycle duration
pub const FETCH_TIME_METRIC: &str = "munin_fetch_time";

/// One graphite measurement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    pub name: String,
    /// Passed through as received from munin
    pub value: String,
    /// Seconds since the epoch, taken when the point was built
    pub timestamp: i64,
}

impl Point {
    pub fn new(name: impl Into<String>, value: impl Into<String>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            timestamp,
        }
    }

    fn now(name: String, value: String) -> Self {
        Self::new(name, value, Utc::now().timestamp())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.value, self.timestamp)
    }
}

/// Points of one fetch cycle, in collection order
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub points: Vec<Point>,
    pub fetch_duration: Duration,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Connect to munin, collect a batch and close the connection again
///
/// Connection failures are returned before anything is sent. Errors of
/// individual metrics (`#` lines, malformed lines) are reported and skipped.
#[instrument(skip_all, fields(munin = %config.munin))]
pub async fn fetch_cycle(config: &BridgeConfig, reporter: &dyn Reporter) -> BridgeResult<Batch> {
    let started = Instant::now();

    let mut client = MuninClient::connect(&config.munin, config.timeout()).await?;
    let result = collect(&mut client, &config.prefix, reporter).await;
    client.close().await;

    let mut points = result?;
    let fetch_duration = started.elapsed();
    points.push(Point::now(
        format!("{}.{}", config.prefix, FETCH_TIME_METRIC),
        format!("{:.3}", fetch_duration.as_secs_f64()),
    ));

    debug!("collected {} points in {:?}", points.len(), fetch_duration);

    Ok(Batch {
        points,
        fetch_duration,
    })
}

async fn collect(
    client: &mut MuninClient,
    prefix: &str,
    reporter: &dyn Reporter,
) -> BridgeResult<Vec<Point>> {
    let mut points = Vec::new();

    for node in client.command("nodes").await? {
        let base = naming::build_base_name(prefix, &node);
        debug!("collecting {node} as {base}");

        let listing = client.command("list").await?;
        let metrics = listing
            .first()
            .map(|line| {
                line.split_whitespace()
                    .map(naming::sanitize)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        for metric in metrics {
            let started = Instant::now();
            let collected = collect_metric(client, &base, &metric, reporter).await?;
            debug!(
                "fetched {metric}: {} points in {:?}",
                collected.len(),
                started.elapsed()
            );
            points.extend(collected);
        }
    }

    Ok(points)
}

async fn collect_metric(
    client: &mut MuninClient,
    base: &str,
    metric: &str,
    reporter: &dyn Reporter,
) -> BridgeResult<Vec<Point>> {
    let config_lines = client.command(&format!("config {metric}")).await?;
    let categorized = naming::apply_category(base, &config_lines);
    if let Some(graph_base) = categorized.base {
        debug!("{metric} graphs with base {graph_base}");
    }

    let value_lines = client.command(&format!("fetch {metric}")).await?;
    Ok(parse_samples(
        &categorized.name,
        metric,
        &value_lines,
        reporter,
    ))
}

/// Turn the lines of a `fetch` response into points
///
/// `#` lines are logged as errors and malformed lines as warnings; neither
/// stops the remaining lines from being used.
pub fn parse_samples<S: AsRef<str>>(
    categorized: &str,
    metric: &str,
    lines: &[S],
    reporter: &dyn Reporter,
) -> Vec<Point> {
    let mut points = Vec::with_capacity(lines.len());

    for line in lines {
        let line = line.as_ref();
        match grammar::classify_fetch(line) {
            Line::ValueSample { field, value } => {
                let name = naming::point_name(categorized, metric, &field);
                points.push(Point::now(name, value));
            }
            Line::CommentError(text) => {
                reporter.error(&format!("munin reported an error fetching {metric}: {text}"));
            }
            _ => {
                reporter.warn(&format!("ignoring malformed line fetching {metric}: {line}"));
            }
        }
    }

    points
}
