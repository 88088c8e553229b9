use rvib_core::{Error, Result};

use crate::dto::{BuildStatus, BuildStatusWire, RemoteBuildRequest, RemoteBuildResponseWire};

/// Serializes [`RemoteBuildRequest`] and parses the service's status and
/// submit responses.
pub struct BuildRequestCodec;

impl BuildRequestCodec {
    /// Serializes a request to its exact wire JSON shape.
    pub fn encode(request: &RemoteBuildRequest) -> Result<String> {
        serde_json::to_string(request).map_err(|e| Error::ProtocolViolation(e.to_string()))
    }

    /// Parses the body of a successful submit response, rejecting a
    /// missing or empty `job_id`.
    pub fn decode_submit_response(body: &str) -> Result<String> {
        let parsed: RemoteBuildResponseWire = serde_json::from_str(body)
            .map_err(|e| Error::ProtocolViolation(format!("malformed submit response: {e}")))?;
        if parsed.job_id.is_empty() {
            return Err(Error::ProtocolViolation(
                "submit response job_id is missing or empty".to_string(),
            ));
        }
        Ok(parsed.job_id)
    }

    /// Parses a status response body into a validated [`BuildStatus`].
    pub fn decode_status(body: &str) -> Result<BuildStatus> {
        let raw: BuildStatusWire = serde_json::from_str(body)
            .map_err(|e| Error::ProtocolViolation(format!("malformed status response: {e}")))?;

        match raw.task_status.as_str() {
            "RUNNING_INDEX_BUILD" => Ok(BuildStatus::Running),
            "COMPLETED_INDEX_BUILD" => {
                let index_path = raw.index_path.filter(|p| !p.is_empty()).ok_or_else(|| {
                    Error::ProtocolViolation(
                        "completed status missing a non-empty index_path".to_string(),
                    )
                })?;
                Ok(BuildStatus::Completed { index_path })
            }
            "FAILED_INDEX_BUILD" => {
                let error = raw
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| "no error message".to_string());
                Ok(BuildStatus::Failed { error })
            }
            other => Err(Error::ProtocolViolation(format!(
                "unrecognized task_status: {other}"
            ))),
        }
    }
}
