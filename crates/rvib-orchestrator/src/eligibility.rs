use rvib_core::RemoteBuildSettings;

/// Decides, per call, whether a segment build should be attempted
/// remotely at all.
///
/// This check runs *before* an [`crate::Orchestrator`] is ever invoked:
/// a caller that gets `false` back routes straight to the local build
/// strategy and touches no orchestrator counters.
pub struct EligibilityPolicy;

impl EligibilityPolicy {
    /// `true` iff the per-index feature flag is enabled, a non-empty
    /// vector repository is configured cluster-wide, and the vector
    /// blob would be at least `settings.threshold_bytes`.
    pub fn should_build_remotely(settings: &RemoteBuildSettings, vector_blob_len: u64) -> bool {
        settings.enabled
            && !settings.repository.is_empty()
            && vector_blob_len >= settings.threshold_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings(enabled: bool, repository: &str, threshold_bytes: u64) -> RemoteBuildSettings {
        RemoteBuildSettings {
            enabled,
            threshold_bytes,
            repository: repository.to_string(),
            endpoints: Vec::new(),
            timeout: Duration::from_secs(1),
            poll_interval: Duration::from_millis(1),
            initial_delay: Duration::ZERO,
            credentials: None,
            upload_buffer_bytes: 4096,
            force_single_stream: false,
        }
    }

    #[test]
    fn truth_table() {
        assert!(EligibilityPolicy::should_build_remotely(
            &settings(true, "repo", 10),
            10
        ));
        assert!(!EligibilityPolicy::should_build_remotely(
            &settings(false, "repo", 10),
            10
        ));
        assert!(!EligibilityPolicy::should_build_remotely(
            &settings(true, "", 10),
            10
        ));
        assert!(!EligibilityPolicy::should_build_remotely(
            &settings(true, "repo", 10),
            9
        ));
    }
}
