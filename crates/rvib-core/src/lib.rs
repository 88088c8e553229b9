#![forbid(unsafe_code)]
#![deny(unreachable_pub)]

//! Shared data model for the remote vector index build orchestrator:
//! the job description, blob naming, credentials, and settings every
//! other `rvib-*` crate builds on.

mod cursor;
mod error;
mod job;
mod secret;
mod settings;
mod types;

pub use cursor::{CursorFactory, VectorCursor};
pub use error::{Error, Result};
pub use job::{BlobNames, DataType, IndexParameters, SegmentBuildJob};
pub use secret::{Credentials, SecretStore};
pub use settings::RemoteBuildSettings;
pub use types::{Algorithm, Engine, SpaceType};
