#![forbid(unsafe_code)]
#![deny(unreachable_pub)]

//! HTTP client for the remote build service: request/response wire
//! types, JSON codec, endpoint round-robin with admission control, and
//! the process-wide job-to-endpoint registry.

mod client;
mod codec;
mod dto;
mod registry;

pub use client::{BuildClient, RetryPolicy};
pub use codec::BuildRequestCodec;
pub use dto::{BuildStatus, RemoteBuildRequest};
pub use registry::JobRegistry;
