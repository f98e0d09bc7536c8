use serde::Serialize;

use crate::app_state::AppState;
use crate::browser;
use crate::checker;
use crate::domain::{
    Capabilities, IndicatorStatus, Notification, PageNumber, Preferences, PreferencesError,
    UpdateResult,
};
use crate::feed::FeedSource;
use crate::repository::LastUpdateRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    OpenComic,
    CheckNow,
    FakeCheck,
    Preferences,
    Dismiss,
    Quit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 6] = [
        MenuAction::OpenComic,
        MenuAction::CheckNow,
        MenuAction::FakeCheck,
        MenuAction::Preferences,
        MenuAction::Dismiss,
        MenuAction::Quit,
    ];

    pub fn id(self) -> &'static str {
        match self {
            MenuAction::OpenComic => "open",
            MenuAction::CheckNow => "check",
            MenuAction::FakeCheck => "fake-check",
            MenuAction::Preferences => "preferences",
            MenuAction::Dismiss => "dismiss",
            MenuAction::Quit => "quit",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuAction::OpenComic => "Open MSPA in browser",
            MenuAction::CheckNow => "Check now",
            MenuAction::FakeCheck => "Fake check",
            MenuAction::Preferences => "Preferences",
            MenuAction::Dismiss => "Dismiss notification",
            MenuAction::Quit => "Quit",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.id() == id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuEntry {
    pub id: &'static str,
    pub label: &'static str,
}

pub fn menu() -> Vec<MenuEntry> {
    MenuAction::ALL
        .into_iter()
        .map(|action| MenuEntry {
            id: action.id(),
            label: action.label(),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MenuOutcome {
    Opened { url: String },
    NewContent { page: PageNumber },
    NoNewUpdates,
    Notified { notification: Notification },
    Preferences { preferences: Preferences },
    Dismissed,
    Quitting,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub last_update: PageNumber,
    pub status: IndicatorStatus,
    pub preferences: Preferences,
    pub capabilities: Capabilities,
    pub notification: Option<Notification>,
}

pub async fn dispatch<R, F>(
    action: MenuAction,
    state: &mut AppState<R, F>,
) -> anyhow::Result<MenuOutcome>
where
    R: LastUpdateRepository,
    F: FeedSource,
{
    log::info!("Menu action {}", action.id());
    match action {
        MenuAction::OpenComic => open_comic(state),
        MenuAction::CheckNow => check_now(state).await,
        MenuAction::FakeCheck => fake_check(state),
        MenuAction::Preferences => Ok(MenuOutcome::Preferences {
            preferences: state.preferences,
        }),
        MenuAction::Dismiss => Ok(dismiss(state)),
        MenuAction::Quit => quit(state).await,
    }
}

pub async fn check<R, F>(state: &mut AppState<R, F>) -> anyhow::Result<UpdateResult>
where
    R: LastUpdateRepository,
    F: FeedSource,
{
    let result = checker::check_for_update(
        &state.feed,
        &state.link_pattern,
        &mut state.repository,
        &mut state.last_update,
    )
    .await?;

    if let UpdateResult::NewContent(page) = result {
        log::info!("New page {}", page);
        state.status = IndicatorStatus::Attention;
        // The page is already persisted, so a missing notification must not fail the check.
        match state.notifier.show(Some(page), state.preferences.sound) {
            Ok(notification) => state.notification = Some(notification),
            Err(e) => log::error!("Failed to show notification for page {}: {}", page, e),
        }
    }
    Ok(result)
}

async fn check_now<R, F>(state: &mut AppState<R, F>) -> anyhow::Result<MenuOutcome>
where
    R: LastUpdateRepository,
    F: FeedSource,
{
    match check(state).await? {
        UpdateResult::NewContent(page) => Ok(MenuOutcome::NewContent { page }),
        UpdateResult::NoChange => Ok(MenuOutcome::NoNewUpdates),
    }
}

fn open_comic<R, F>(state: &mut AppState<R, F>) -> anyhow::Result<MenuOutcome>
where
    R: LastUpdateRepository,
    F: FeedSource,
{
    let url = browser::comic_page_url(
        &state.config.comic_url,
        state.config.story_id,
        state.last_update,
    );
    browser::open_in_browser(&url)
        .map_err(|e| anyhow::anyhow!("Failed to open {} in browser: {}", url, e))?;
    state.status = IndicatorStatus::Active;
    Ok(MenuOutcome::Opened { url })
}

fn fake_check<R, F>(state: &mut AppState<R, F>) -> anyhow::Result<MenuOutcome>
where
    R: LastUpdateRepository,
    F: FeedSource,
{
    let notification = state.notifier.show(None, state.preferences.sound)?;
    state.notification = Some(notification.clone());
    Ok(MenuOutcome::Notified { notification })
}

fn dismiss<R, F>(state: &mut AppState<R, F>) -> MenuOutcome
where
    R: LastUpdateRepository,
    F: FeedSource,
{
    state.notification = None;
    MenuOutcome::Dismissed
}

async fn quit<R, F>(state: &mut AppState<R, F>) -> anyhow::Result<MenuOutcome>
where
    R: LastUpdateRepository,
    F: FeedSource,
{
    state.repository.save(state.last_update).await?;
    log::info!("Saved page {}", state.last_update);
    stop(state);
    Ok(MenuOutcome::Quitting)
}

/// Shutdown on interrupt. Unlike the Quit menu entry it always stops, even
/// when the last update cannot be written.
pub async fn shutdown<R, F>(state: &mut AppState<R, F>)
where
    R: LastUpdateRepository,
    F: FeedSource,
{
    match state.repository.save(state.last_update).await {
        Ok(()) => log::info!("Saved page {}", state.last_update),
        Err(e) => log::error!("Failed to save page {}: {}", state.last_update, e),
    }
    stop(state);
}

fn stop<R, F>(state: &mut AppState<R, F>)
where
    R: LastUpdateRepository,
    F: FeedSource,
{
    state.notifier.stop_playback();
    state.shutdown.send_replace(true);
    log::info!("Shutting down");
}

pub fn set_preferences<R, F>(
    state: &mut AppState<R, F>,
    preferences: Preferences,
) -> Result<Preferences, PreferencesError>
where
    R: LastUpdateRepository,
    F: FeedSource,
{
    let preferences = preferences.validate()?;
    if preferences.check_interval() != state.preferences.check_interval() {
        log::info!(
            "Checking every {} minutes",
            preferences.check_interval_minutes
        );
        state.check_interval.send_replace(preferences.check_interval());
    }
    state.preferences = preferences;
    Ok(preferences)
}

pub fn status<R, F>(state: &AppState<R, F>) -> StatusSnapshot
where
    R: LastUpdateRepository,
    F: FeedSource,
{
    StatusSnapshot {
        last_update: state.last_update,
        status: state.status,
        preferences: state.preferences,
        capabilities: state.notifier.capabilities(),
        notification: state.notification.clone(),
    }
}
