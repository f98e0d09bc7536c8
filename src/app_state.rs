use std::time::Duration;

use tokio::sync::watch;

use crate::domain::{IndicatorStatus, Notification, PageNumber, Preferences};
use crate::feed::{FeedSource, PageLinkPattern};
use crate::notifier::Notifier;
use crate::{config, repository};

pub struct AppState<R, F>
where
    R: repository::LastUpdateRepository,
    F: FeedSource,
{
    pub repository: R,
    pub feed: F,
    pub link_pattern: PageLinkPattern,
    pub notifier: Notifier,
    pub config: config::Config,
    pub last_update: PageNumber,
    pub status: IndicatorStatus,
    pub preferences: Preferences,
    pub notification: Option<Notification>,
    pub check_interval: watch::Sender<Duration>,
    pub shutdown: watch::Sender<bool>,
}
