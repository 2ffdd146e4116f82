//! The poll loop tying munin fetching and carbon publishing together
//!
//! ## Cycle
//!
//! ```text
//! Idle → Fetching ──ok──→ Publishing → Sleeping → Idle
//!            └──failed──────────────────↗
//! ```
//!
//! Failures on either side never end the loop. Each side has its own
//! [`LinkHealth`] so an outage is logged once when it starts and once when
//! it ends.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument};

use crate::carbon::CarbonClient;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::fetch::{Batch, fetch_cycle};
use crate::health::{LinkHealth, Transition};
use crate::report::Reporter;
use crate::schedule::Pause;

pub struct Bridge {
    config: BridgeConfig,
    reporter: Arc<dyn Reporter>,
    munin_health: LinkHealth,
    carbon_health: LinkHealth,
}

impl Bridge {
    pub fn new(config: BridgeConfig, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            config,
            reporter,
            munin_health: LinkHealth::default(),
            carbon_health: LinkHealth::default(),
        }
    }

    pub fn munin_health(&self) -> LinkHealth {
        self.munin_health
    }

    pub fn carbon_health(&self) -> LinkHealth {
        self.carbon_health
    }

    /// Run cycles forever, sleeping between them
    pub async fn run(mut self) {
        self.reporter.info(&format!(
            "Forwarding stats from munin {} to carbon {} every {} seconds",
            self.config.munin, self.config.carbon, self.config.interval
        ));

        loop {
            let pause = self.run_once().await;
            tokio::time::sleep(pause.duration()).await;
        }
    }

    /// One fetch and publish, returning how long to wait before the next
    #[instrument(skip(self))]
    pub async fn run_once(&mut self) -> Pause {
        let fetch_start = Instant::now();

        let fetched = fetch_cycle(&self.config, self.reporter.as_ref()).await;
        let succeeded = fetched.is_ok();
        self.munin_health = self.track(self.munin_health, "munin", fetched.as_ref().err());

        if let Ok(batch) = fetched {
            debug!(
                "fetched {} points in {:?}",
                batch.len(),
                fetch_start.elapsed()
            );
            self.reporter
                .info(&format!("Sending munin stats to {}", self.config.carbon));

            let published = self.publish(&batch).await;
            self.carbon_health = self.track(self.carbon_health, "carbon", published.as_ref().err());
        }

        let pause = Pause::after(self.config.interval(), fetch_start.elapsed());
        if let Pause::Overrun { elapsed } = pause {
            self.reporter.warn(&format!(
                "cycle took {:.1}s, longer than the {}s interval, not sleeping",
                elapsed.as_secs_f64(),
                self.config.interval
            ));
        } else if !succeeded {
            debug!("retrying munin in {:?}", pause.duration());
        }

        pause
    }

    async fn publish(&self, batch: &Batch) -> BridgeResult<usize> {
        let mut carbon = CarbonClient::connect(&self.config.carbon, self.config.timeout()).await?;
        let result = carbon.publish(&batch.points).await;
        carbon.close().await;

        if let Ok(written) = result {
            debug!("sent {written} records to {}", self.config.carbon);
        }
        result
    }

    fn track(
        &self,
        health: LinkHealth,
        side: &str,
        error: Option<&BridgeError>,
    ) -> LinkHealth {
        let (next, transition) = health.observe(error.is_none());
        match (transition, error) {
            (Transition::WentDown, Some(e)) => {
                self.reporter
                    .error(&format!("Error communicating with {side}: {e}"));
            }
            (Transition::StillDown, Some(e)) => {
                debug!("{side} still unavailable: {e}");
            }
            (Transition::Recovered, _) => {
                self.reporter
                    .info(&format!("Connection to {side} re-established"));
            }
            _ => {}
        }
        next
    }
}
