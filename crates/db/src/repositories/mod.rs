use async_trait::async_trait;
use thiserror::Error;

use kindness_core::install::InstallRecord;

pub mod install;
pub mod memory;

pub use install::SqlInstallStore;
pub use memory::MemoryInstallStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("stale write for team {team_id}: no row at version {expected}")]
    VersionConflict { team_id: String, expected: i64 },
}

#[async_trait]
pub trait InstallStore: Send + Sync {
    async fn fetch(&self, team_id: &str) -> Result<Option<InstallRecord>, StoreError>;

    /// Writes a freshly issued installation. A reinstall replaces the stored
    /// row wholesale and bumps its version so in-flight season edits lose.
    async fn install(&self, record: &InstallRecord) -> Result<(), StoreError>;

    /// Writes back a locally modified record only while the stored version
    /// still equals `record.version`; the stored version advances by one.
    async fn compare_and_swap(&self, record: &InstallRecord) -> Result<(), StoreError>;
}
