use thiserror::Error;

use crate::domain::{PageNumber, UpdateResult};
use crate::feed::{FeedError, FeedSource, PageLinkPattern};
use crate::repository::{LastUpdateRepository, PersistenceError};

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Feed(FeedError),
    #[error("Feed has no entries")]
    EmptyFeed,
    #[error("Feed entry link {0:?} is not a comic page")]
    UnrecognizedLink(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<FeedError> for CheckError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::Empty => CheckError::EmptyFeed,
            other => CheckError::Feed(other),
        }
    }
}

/// Compares the newest feed entry against `last_update`, persisting and
/// advancing it only when the remote page is strictly greater.
pub async fn check_for_update(
    feed: &impl FeedSource,
    pattern: &PageLinkPattern,
    repository: &mut impl LastUpdateRepository,
    last_update: &mut PageNumber,
) -> Result<UpdateResult, CheckError> {
    let entry = feed.latest_entry().await?;
    let link = pattern
        .parse(&entry.link)
        .ok_or_else(|| CheckError::UnrecognizedLink(entry.link.clone()))?;

    log::info!(
        "Latest page is {} of story {}, last seen {}",
        link.page,
        link.story,
        last_update
    );
    if link.page <= *last_update {
        return Ok(UpdateResult::NoChange);
    }

    repository.save(link.page).await?;
    *last_update = link.page;
    Ok(UpdateResult::NewContent(link.page))
}
