use dashmap::DashMap;
use url::Url;

/// Process-wide map from an accepted build's `jobId` to the endpoint
/// that accepted it. Entries are inserted on submit success and removed
/// once the build reaches a terminal state, so a given `jobId`'s status
/// queries always target the endpoint that accepted the submission.
#[derive(Default)]
pub struct JobRegistry {
    entries: DashMap<String, Url>,
}

impl JobRegistry {
    /// Builds an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `job_id` was accepted by `endpoint`.
    pub fn insert(&self, job_id: String, endpoint: Url) {
        self.entries.insert(job_id, endpoint);
    }

    /// The endpoint `job_id` was submitted to, if it is still tracked.
    pub fn endpoint_for(&self, job_id: &str) -> Option<Url> {
        self.entries.get(job_id).map(|entry| entry.clone())
    }

    /// Drops `job_id`'s entry once its build reaches a terminal state.
    pub fn remove(&self, job_id: &str) {
        self.entries.remove(job_id);
    }

    /// Number of builds currently in flight.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no builds are currently in flight.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
