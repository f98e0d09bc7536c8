use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::{InvalidPageNumber, PageNumber};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupt state file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: InvalidPageNumber,
    },
}

pub trait LastUpdateRepository {
    fn load(
        &mut self,
    ) -> impl std::future::Future<Output = Result<PageNumber, PersistenceError>> + Send;

    fn save(
        &mut self,
        last_update: PageNumber,
    ) -> impl std::future::Future<Output = Result<(), PersistenceError>> + Send;
}

pub struct FileLastUpdateRepository {
    path: PathBuf,
}

impl FileLastUpdateRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl LastUpdateRepository for FileLastUpdateRepository {
    async fn load(&mut self) -> Result<PageNumber, PersistenceError> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        if !exists {
            log::info!(
                "No state file at {}, starting from page {}",
                self.path.display(),
                PageNumber::DEFAULT
            );
            self.save(PageNumber::DEFAULT).await?;
            return Ok(PageNumber::DEFAULT);
        }

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        contents
            .parse()
            .map_err(|source| PersistenceError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    async fn save(&mut self, last_update: PageNumber) -> Result<(), PersistenceError> {
        tokio::fs::write(&self.path, last_update.to_string())
            .await
            .map_err(|e| self.io_error(e))
    }
}
