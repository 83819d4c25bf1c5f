use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use fleetwatch::{
    Host,
    actors::{RetentionPolicy, SweepHandle},
    config::{Config, read_config_file},
    fetch::HttpFetcher,
    notify::NotificationSender,
    storage::{StatusStore, open_store},
    sweep::{SweepOptions, SweepRunner},
    transition::TransitionDetector,
    util::{get_concurrency_override, get_config_path},
};
use tracing::{debug, info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file (defaults to $FLEETWATCH_CONFIG or ./fleetwatch.json)
    #[arg(short, long)]
    file: Option<String>,

    /// Run a single sweep and exit
    #[arg(long)]
    once: bool,

    /// Trace logging
    #[arg(short, long)]
    verbose: bool,
}

fn init(verbose: bool) {
    dotenv::dotenv().ok();

    let level = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::DEBUG
    };

    let filter = filter::Targets::new().with_targets(vec![
        ("fleetwatch", level),
        ("fleetwatch_hub", level),
    ]);
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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init(args.verbose);
    trace!("started with args: {args:?}");

    let path = get_config_path(args.file.clone());
    let config = read_config_file(&path)?;
    debug!("loaded config from {path}");

    let storage = config.storage.clone().unwrap_or_default();
    let store = open_store(&storage)
        .await
        .context("failed to open store")?;

    seed_store(store.as_ref(), &config).await?;

    let notifier = NotificationSender::from_config(config.notifications.as_deref().unwrap_or(&[]));
    info!("{} notification channel(s) configured", notifier.len());

    let options = SweepOptions {
        concurrency: get_concurrency_override().unwrap_or(config.sweep.concurrency),
        store_timeout: config.sweep.store_timeout(),
    };

    let runner = Arc::new(SweepRunner::new(
        Arc::new(HttpFetcher::new(config.sweep.http_timeout())),
        store.clone(),
        Arc::new(notifier),
        Arc::new(TransitionDetector::new()),
        options,
    ));

    if args.once {
        let summary = runner.sweep_all().await?;
        debug!("{summary:?}");
    } else {
        let retention = storage
            .retention_days()
            .map(|days| RetentionPolicy::new(days, config.sweep.cleanup_interval_hours));

        let handle = SweepHandle::spawn(runner, config.sweep.interval(), retention);
        info!("sweeping every {:?}", config.sweep.interval());

        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for ctrl-c")?;

        info!("shutting down");
        handle.shutdown().await?;
    }

    store.close().await?;

    Ok(())
}

/// Register configured hosts and the notification template
async fn seed_store(store: &dyn StatusStore, config: &Config) -> anyhow::Result<()> {
    for host in config.hosts.iter().flatten() {
        let host = Host::from(host.clone());
        store
            .register_host(&host)
            .await
            .with_context(|| format!("failed to register host {}", host.name))?;
    }

    if let Some(template) = &config.notification_template {
        store
            .set_notification_template(template)
            .await
            .context("failed to store notification template")?;
    }

    Ok(())
}
