#![forbid(unsafe_code)]
#![deny(unreachable_pub)]

//! Uploads a job's vector and doc-id blobs to a [`BlobRepository`], and
//! downloads a finished build artifact back into a segment sink.

mod accessor;
mod blob_repository;
mod memory;

pub use accessor::RepositoryAccessor;
pub use blob_repository::{engine_artifact_extension, BlobPart, BlobRepository, WriteOutcome};
pub use memory::MemoryRepository;
