#![forbid(unsafe_code)]
#![deny(unreachable_pub)]

//! The state machine that drives one segment's vector index build
//! through upload, remote submission, polling, and download — falling
//! back to a local build strategy on any recoverable failure.
//!
//! This crate ties together [`rvib_core`], [`rvib_repository`], and
//! [`rvib_client`]: it owns no I/O of its own beyond what those crates
//! already expose.

mod eligibility;
mod local;
mod orchestrator;
mod stats;

pub use eligibility::EligibilityPolicy;
pub use local::{LocalBuildError, LocalBuildStrategy};
pub use orchestrator::{BuildOutcome, Orchestrator, OrchestratorError, OrchestratorIdentity};
pub use stats::{StatsRegistry, StatsSnapshot};
