use std::sync::Arc;

use chrono::Local;
use clap::Subcommand;
use studydash_core::activity::{activity_channel, seconds_on};
use studydash_core::sync::{InMemoryRemote, RemoteHandles, RemoteProfileWriter};
use studydash_core::{Config, DashboardSession, Event};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;

use super::{current_profile, open_cache, CmdResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a session against an in-memory remote and print its events
    Run {
        /// Number of persistence ticks to wait for
        #[arg(long, default_value = "3")]
        ticks: u32,
        /// Seconds of study added before each tick
        #[arg(long, default_value = "60")]
        study_per_tick: u64,
        /// Tick interval in seconds (default: session.tick_interval_secs)
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

pub async fn run(action: SessionAction) -> CmdResult {
    let SessionAction::Run {
        ticks,
        study_per_tick,
        interval_secs,
    } = action;

    let mut config = Config::load()?;
    if let Some(secs) = interval_secs {
        config.set("session.tick_interval_secs", &secs.to_string())?;
    }
    let cache = open_cache()?;
    let profile = current_profile(&cache).await?;

    let remote = Arc::new(InMemoryRemote::new());
    remote.save_profile(&profile).await?;

    let mut seconds = seconds_on(&cache, &profile.id, Local::now().date_naive()).await?;
    let (feed, reader) = activity_channel(seconds);
    let session = DashboardSession::start(
        profile,
        reader,
        cache,
        RemoteHandles::from_backend(remote),
        config,
    )
    .await?;
    let mut events = session.events();

    let mut done = 0;
    while done < ticks {
        seconds += study_per_tick;
        feed.publish(seconds);
        loop {
            match events.recv().await {
                Ok(event) => {
                    println!("{}", serde_json::to_string(&event)?);
                    if matches!(event, Event::TickPersisted { .. }) {
                        break;
                    }
                }
                Err(RecvError::Lagged(n)) => info!(skipped = n, "event printer lagged"),
                Err(RecvError::Closed) => return Err("session closed unexpectedly".into()),
            }
        }
        done += 1;
    }

    let profile = session.profile();
    session.shutdown().await;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}
