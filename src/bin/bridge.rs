use std::sync::Arc;

use clap::Parser;
use munin_graphite::{
    bridge::Bridge,
    config::{BridgeConfig, read_config_file},
    report::{Reporter, TracingReporter},
};
use tracing::{level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

/// Forward munin-node stats to a carbon listener
#[derive(Debug, Clone, Parser)]
#[command(version)]
struct Args {
    /// Carbon host to send stats to (default: localhost)
    carbon_host: Option<String>,

    /// Log per-metric timing and protocol details
    #[arg(short, long)]
    verbose: bool,

    /// JSON config file
    #[arg(short, long)]
    file: Option<String>,
}

fn init(verbose: bool) {
    dotenv::dotenv().ok();

    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = filter::Targets::new().with_target("munin_graphite", level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init(args.verbose);
    trace!("started with args: {args:?}");

    let reporter: Arc<dyn Reporter> = Arc::new(TracingReporter);

    let mut config = match &args.file {
        Some(path) => read_config_file(path)?,
        None => BridgeConfig::default(),
    };

    if let Some(host) = args.carbon_host {
        config.carbon.host = host;
    } else if config.uses_default_carbon_host() {
        reporter.info(&format!(
            "Carbon host not specified, using {}",
            config.carbon.host
        ));
    }

    Bridge::new(config, reporter).run().await;

    Ok(())
}
