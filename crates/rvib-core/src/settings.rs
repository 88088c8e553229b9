use std::time::Duration;

use crate::secret::Credentials;

/// The resolved configuration for one index's remote build behavior.
///
/// Loading this from a config file or environment is the host's
/// responsibility; this type only carries the resolved values and their
/// defaults.
#[derive(Clone)]
pub struct RemoteBuildSettings {
    /// `remote_build.enabled` — per-index gate.
    pub enabled: bool,
    /// `remote_build.threshold_bytes` — minimum vector-blob size for
    /// remote build.
    pub threshold_bytes: u64,
    /// `remote_build.repository` — repository name to use; empty means
    /// "not configured".
    pub repository: String,
    /// `remote_build.endpoints` — round-robin pool, in list order.
    pub endpoints: Vec<url::Url>,
    /// `remote_build.timeout` — total await budget.
    pub timeout: Duration,
    /// `remote_build.poll_interval` — inter-poll sleep.
    pub poll_interval: Duration,
    /// `remote_build.initial_delay` — pre-first-poll sleep.
    pub initial_delay: Duration,
    /// `remote_build.username` / `remote_build.password` — optional Basic
    /// auth pair.
    pub credentials: Option<Credentials>,
    /// `upload.buffer_bytes` — single-stream and download buffer size.
    pub upload_buffer_bytes: usize,
    /// `upload.force_single_stream` — disables the parallel multi-part
    /// path even when the repository supports it.
    pub force_single_stream: bool,
}

impl RemoteBuildSettings {
    /// Default upload/download buffer size.
    pub const DEFAULT_UPLOAD_BUFFER_BYTES: usize = 64 * 1024;

    /// Default build-await timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

    /// Default inter-poll sleep.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

    /// Default pre-first-poll delay: none. Builds that finish fast enough
    /// to beat one poll interval still get detected on the first poll.
    pub const DEFAULT_INITIAL_DELAY: Duration = Duration::ZERO;
}

impl Default for RemoteBuildSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold_bytes: 0,
            repository: String::new(),
            endpoints: Vec::new(),
            timeout: Self::DEFAULT_TIMEOUT,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            credentials: None,
            upload_buffer_bytes: Self::DEFAULT_UPLOAD_BUFFER_BYTES,
            force_single_stream: false,
        }
    }
}
