use std::io::ErrorKind;
use std::path::Path;
use async_trait::async_trait;
use log::trace;
use tokio::fs;

use crate::token_store::TokenStoreError;

#[async_trait]
pub trait TokenStoreIo: Send + Sync + 'static {
    async fn create_state_directory(
        &self,
        path: &Path,
    ) -> Result<(), TokenStoreError>;

    /// `None` when the key does not exist.
    async fn read_key(
        &self,
        path: &Path,
    ) -> Result<Option<String>, TokenStoreError>;

    async fn write_key(
        &self,
        path: &Path,
        value: &str,
    ) -> Result<(), TokenStoreError>;

    /// Removing a missing key is not an error.
    async fn remove_key(&self, path: &Path) -> Result<(), TokenStoreError>;
}

#[derive(Debug)]
pub struct ProductionTokenStoreIo;

#[async_trait]
impl TokenStoreIo for ProductionTokenStoreIo {
    async fn create_state_directory(
        &self,
        path: &Path,
    ) -> Result<(), TokenStoreError> {
        Ok(fs::create_dir_all(path).await?)
    }

    async fn read_key(
        &self,
        path: &Path,
    ) -> Result<Option<String>, TokenStoreError> {
        match fs::read_to_string(path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!("no key at {}", path.display());
                Ok(None)
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn write_key(
        &self,
        path: &Path,
        value: &str,
    ) -> Result<(), TokenStoreError> {
        Ok(fs::write(path, value).await?)
    }

    async fn remove_key(&self, path: &Path) -> Result<(), TokenStoreError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
