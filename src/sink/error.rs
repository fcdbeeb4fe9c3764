use crate::normalize::records::Entity;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to build the {entity} dataset frame")]
    Frame {
        entity: Entity,
        #[source]
        source: PolarsError,
    },

    #[error("I/O error writing snapshot '{0}'")]
    SnapshotIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing snapshot '{0}'")]
    SnapshotEncode(PathBuf, #[source] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Database write for {entity} failed")]
    Upsert {
        entity: Entity,
        #[source]
        source: sqlx::Error,
    },
}
