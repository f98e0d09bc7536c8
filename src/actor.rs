use crate::app_state::AppState;
use crate::commands::{self, MenuAction, MenuOutcome, StatusSnapshot};
use crate::domain::{Preferences, PreferencesError};
use crate::feed::FeedSource;
use crate::repository;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug)]
pub enum AppActorMessage {
    CheckForUpdate,
    Shutdown,
    Menu {
        action: MenuAction,
        reply: oneshot::Sender<anyhow::Result<MenuOutcome>>,
    },
    GetStatus {
        reply: oneshot::Sender<StatusSnapshot>,
    },
    SetPreferences {
        preferences: Preferences,
        reply: oneshot::Sender<Result<Preferences, PreferencesError>>,
    },
}

pub async fn run<R, F>(mut actor: AppActor<R, F>)
where
    R: repository::LastUpdateRepository,
    F: FeedSource,
{
    log::info!("Starting main actor");
    while let Some(msg) = actor.receiver.recv().await {
        log::debug!("Got new msg");
        match actor.handle_message(msg).await {
            Err(e) => log::error!("Failed to process with {}", e),
            Ok(_) => log::debug!("Msg processed"),
        }
        if *actor.state.shutdown.borrow() {
            break;
        }
    }
    log::info!("Main actor stopped");
}

pub struct AppActor<R, F>
where
    R: repository::LastUpdateRepository,
    F: FeedSource,
{
    state: AppState<R, F>,
    receiver: mpsc::Receiver<AppActorMessage>,
}

impl<R, F> AppActor<R, F>
where
    R: repository::LastUpdateRepository,
    F: FeedSource,
{
    pub fn new(state: AppState<R, F>, receiver: mpsc::Receiver<AppActorMessage>) -> Self {
        Self { state, receiver }
    }

    async fn handle_message(&mut self, msg: AppActorMessage) -> anyhow::Result<()> {
        match msg {
            AppActorMessage::CheckForUpdate => {
                commands::check(&mut self.state).await?;
            }
            AppActorMessage::Shutdown => commands::shutdown(&mut self.state).await,
            AppActorMessage::Menu { action, reply } => {
                let outcome = commands::dispatch(action, &mut self.state).await;
                if let Err(e) = &outcome {
                    log::error!("Menu action {} failed with {}", action.id(), e);
                }
                let _ = reply.send(outcome);
            }
            AppActorMessage::GetStatus { reply } => {
                let _ = reply.send(commands::status(&self.state));
            }
            AppActorMessage::SetPreferences { preferences, reply } => {
                let _ = reply.send(commands::set_preferences(&mut self.state, preferences));
            }
        }
        Ok(())
    }
}
