mod actor;
mod app_state;
mod browser;
mod checker;
mod commands;
mod config;
mod domain;
mod feed;
mod notifier;
mod repository;
mod routes;

use actor::AppActor;
use app_state::AppState;
use envconfig::Envconfig;
use repository::LastUpdateRepository;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use std::time::Duration;

use crate::actor::AppActorMessage;
use crate::domain::{IndicatorStatus, Preferences};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();
    let config = config::Config::init_from_env()?;

    let capabilities = notifier::detect_capabilities(&config.macros_dir, &config.sound_player);
    let notifier = notifier::Notifier::new(
        config.macros_dir.clone(),
        config.sound_player.clone(),
        capabilities,
    )?;
    log::info!(
        "Serving macros from {}, sound {}",
        notifier.macros_dir().display(),
        if capabilities.sound { "available" } else { "unavailable" }
    );

    let mut repository = repository::FileLastUpdateRepository::new(config.state_file_path()?);
    let last_update = repository.load().await?;
    log::info!(
        "Last seen page {} ({})",
        last_update,
        repository.path().display()
    );

    let feed = feed::HttpFeedSource::new(&config.feed_url, config.fetch_timeout())?;

    let preferences = Preferences::from_startup(config.check_interval_secs, config.sound);
    if preferences.check_interval().as_secs() != config.check_interval_secs {
        log::warn!(
            "Check interval of {}s adjusted to {} minutes",
            config.check_interval_secs,
            preferences.check_interval_minutes
        );
    }
    let (interval_tx, interval_rx) = watch::channel(preferences.check_interval());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let state = AppState {
        repository,
        feed,
        link_pattern: feed::PageLinkPattern::new(),
        notifier,
        config: config.clone(),
        last_update,
        status: IndicatorStatus::Active,
        preferences,
        notification: None,
        check_interval: interval_tx,
        shutdown: shutdown_tx,
    };

    let (tx, rx) = mpsc::channel(100);
    let app_actor = AppActor::new(state, rx);

    tokio::spawn(schedule_checks(tx.clone(), interval_rx, shutdown_rx.clone()));
    let actor_handle = tokio::spawn(async move { actor::run(app_actor).await });

    let interrupt_tx = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupted");
            if let Err(err) = interrupt_tx.send(AppActorMessage::Shutdown).await {
                log::error!("Failed to send shutdown with {}", err);
            }
        }
    });

    let app = routes::router(tx, &config.macros_dir);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    log::info!("Listening on {}", config.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx))
        .await?;

    actor_handle.await?;
    Ok(())
}

async fn schedule_checks(
    tx: mpsc::Sender<AppActorMessage>,
    mut interval: watch::Receiver<Duration>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        log::info!("Sending update check msg");
        if let Err(err) = tx.send(AppActorMessage::CheckForUpdate).await {
            log::error!("Failed to send update check with {}", err);
            return;
        }

        let mut deadline = Instant::now() + *interval.borrow_and_update();
        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => break,
                changed = interval.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    deadline = Instant::now() + *interval.borrow_and_update();
                }
                _ = shutdown.changed() => return,
            }
        }
    }
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
